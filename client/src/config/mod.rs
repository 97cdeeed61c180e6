//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the backend base URL, the request timeout, and the credentials file path.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub http_timeout_seconds: u64,
    pub credentials_file: String,
    pub dashboard_ttl_seconds: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("WORK360_API_URL").context("WORK360_API_URL not set")?;

        let http_timeout_seconds = env::var("WORK360_HTTP_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("WORK360_HTTP_TIMEOUT_SECONDS must be a valid number")?;

        let credentials_file = env::var("WORK360_CREDENTIALS_FILE")
            .unwrap_or_else(|_| "~/.work360/credentials.json".to_string());

        let dashboard_ttl_seconds = env::var("WORK360_DASHBOARD_TTL_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("WORK360_DASHBOARD_TTL_SECONDS must be a valid number")?;

        Ok(Config {
            api_url,
            http_timeout_seconds,
            credentials_file,
            dashboard_ttl_seconds,
        })
    }
}
