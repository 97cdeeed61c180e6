//! Dashboard module for company-wide figures and per-site analytics.
//!
//! This module provides the cached view of the data an owner sees after
//! signing in: the summary roll-up, the site list, and on-demand per-site
//! reports, all published as `CachedResource` snapshots.

pub mod models;
pub mod resource;
pub mod service;

// Re-exports for convenience
pub use models::{DashboardSummary, Site, SiteId, SiteReport, SiteStatus, WorkerHours};
pub use resource::{CachedResource, ResourceStatus};
pub use service::{DEFAULT_TTL, DashboardService, DashboardState};
