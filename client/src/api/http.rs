//! reqwest-backed implementation of the backend interface.
//!
//! Applies the bearer token from the credential store on authenticated
//! calls, unwraps the standard response envelope, and classifies transport
//! failures into the `ApiError` taxonomy the services branch on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::BackendApi;
use crate::api::models::{ApiResponse, AuthPayload, UserProfile};
use crate::auth::models::{LoginRequest, RegisterRequest};
use crate::auth::store::CredentialStore;
use crate::config::Config;
use crate::dashboard::models::{DashboardSummary, Site, SiteId, SiteReport};
use crate::errors::ApiError;

/// HTTP client for the WORK360 REST API.
#[derive(Clone)]
pub struct HttpBackend {
    http_client: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl HttpBackend {
    /// Creates a new backend client against `base_url`.
    ///
    /// The store is read-only here: the bearer header is built from it on
    /// every authenticated call, so a token swap takes effect immediately.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            http_client,
            base_url,
            store,
        }
    }

    /// Creates a backend client from loaded configuration.
    pub fn from_config(config: &Config, store: Arc<dyn CredentialStore>) -> Self {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.http_timeout_seconds),
            store,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn bearer(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.load_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and unwraps the response envelope.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Payload(e.to_string()))?;

        if !envelope.success {
            // A 2xx carrying success:false is a backend refusal in disguise.
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request failed".to_string()),
            });
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Payload("missing data in successful response".to_string()))
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn me(&self) -> Result<UserProfile, ApiError> {
        let request = self.bearer(self.http_client.get(self.url("/auth/me"))).await;
        self.execute(request).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError> {
        let request = self.http_client.post(self.url("/auth/login")).json(request);
        self.execute(request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        let request = self
            .http_client
            .post(self.url("/auth/register"))
            .json(request);
        self.execute(request).await
    }

    async fn list_sites(&self) -> Result<Vec<Site>, ApiError> {
        let request = self.bearer(self.http_client.get(self.url("/sites"))).await;
        self.execute(request).await
    }

    async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        let request = self
            .bearer(self.http_client.get(self.url("/dashboard/summary")))
            .await;
        self.execute(request).await
    }

    async fn site_report(&self, site_id: SiteId) -> Result<SiteReport, ApiError> {
        let path = format!("/sites/{}/report", site_id);
        let request = self.bearer(self.http_client.get(self.url(&path))).await;
        self.execute(request).await
    }
}

/// Maps reqwest transport failures onto the error taxonomy.
fn classify_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Payload(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Builds the error for a non-2xx status, pulling the envelope message out
/// of the body when one is there.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Rejected {
            status: status.as_u16(),
            message,
        },
        s if s.is_server_error() => ApiError::Server {
            status: s.as_u16(),
            message,
        },
        s => ApiError::Status {
            status: s.as_u16(),
            message,
        },
    }
}
