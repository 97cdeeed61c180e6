//! Client-side state core for WORK360, a management tool for small Italian
//! construction companies.
//!
//! The crate owns the two long-lived state machines every WORK360 frontend
//! needs: the session manager (token check, login, registration, logout)
//! and the dashboard cache (company summary, site list, per-site reports).
//! Both publish their state through watch channels so any UI layer can
//! render snapshots without holding locks.
//!
//! A typical embedding wires the pieces together like this:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use client::api::http::HttpBackend;
//! use client::auth::{AuthService, FileStore};
//! use client::config::Config;
//! use client::dashboard::DashboardService;
//!
//! # async fn wire() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let store = Arc::new(FileStore::new(&config.credentials_file));
//! let api = Arc::new(HttpBackend::from_config(&config, store.clone()));
//!
//! let auth = Arc::new(AuthService::new(api.clone(), store));
//! let dashboard = Arc::new(DashboardService::new(api));
//! let _autoload = dashboard.clone().spawn_autoload(auth.subscribe());
//!
//! auth.check_auth().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod utils;
