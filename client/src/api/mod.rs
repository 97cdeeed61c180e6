//! Client interface to the WORK360 REST backend.
//!
//! This module defines the seam between the state core and the backend: a
//! trait covering the six operations the core consumes, the wire shapes
//! they exchange, and the reqwest-based implementation used in production.
//! The services never see HTTP details; they hold a `dyn BackendApi`.

pub mod http;
pub mod models;

use async_trait::async_trait;

use crate::api::models::{AuthPayload, UserProfile};
use crate::auth::models::{LoginRequest, RegisterRequest};
use crate::dashboard::models::{DashboardSummary, Site, SiteId, SiteReport};
use crate::errors::ApiError;

/// Unified interface to the backend operations used by the state core.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Fetches the authoritative profile of the current token's bearer.
    async fn me(&self) -> Result<UserProfile, ApiError>;
    /// Exchanges credentials for a token and profile.
    async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError>;
    /// Creates a company account and returns its first token and profile.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError>;
    /// Lists the company's construction sites.
    async fn list_sites(&self) -> Result<Vec<Site>, ApiError>;
    /// Fetches the company-wide dashboard summary.
    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError>;
    /// Fetches the analytics report for one site.
    async fn site_report(&self, site_id: SiteId) -> Result<SiteReport, ApiError>;
}
