//! Durable storage for the bearer token and the last-known role.
//!
//! These two values are the only state the core persists. The token is an
//! opaque credential consumed by the HTTP layer; the role is a display hint
//! used before reconciliation completes. The auth service is the only
//! writer; everything else holds, at most, a read-only handle.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::auth::models::Role;

/// Persistence seam for the auth credentials.
///
/// Failures are absorbed: a store that cannot read behaves as empty, a
/// store that cannot write logs and moves on. Logout must never be blocked
/// by a broken disk.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load_token(&self) -> Option<String>;
    async fn store_token(&self, token: &str);
    async fn clear_token(&self);
    async fn load_role(&self) -> Option<Role>;
    async fn store_role(&self, role: Role);
    async fn clear_role(&self);
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoredCredentials {
    token: Option<String>,
    #[serde(default)]
    last_role: Option<Role>,
}

/// In-process store for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoredCredentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load_token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    async fn store_token(&self, token: &str) {
        self.inner.write().await.token = Some(token.to_string());
    }

    async fn clear_token(&self) {
        self.inner.write().await.token = None;
    }

    async fn load_role(&self) -> Option<Role> {
        self.inner.read().await.last_role
    }

    async fn store_role(&self, role: Role) {
        self.inner.write().await.last_role = Some(role);
    }

    async fn clear_role(&self) {
        self.inner.write().await.last_role = None;
    }
}

/// JSON-file store at a configurable path; `~` is expanded.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: &str) -> Self {
        let path = expanduser::expanduser(path).unwrap_or_else(|_| PathBuf::from(path));
        Self { path }
    }

    async fn read(&self) -> StoredCredentials {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("credentials file unreadable, treating as empty: {}", e);
                StoredCredentials::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => StoredCredentials::default(),
            Err(e) => {
                warn!("failed to read credentials file: {}", e);
                StoredCredentials::default()
            }
        }
    }

    async fn write(&self, credentials: &StoredCredentials) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("failed to create credentials directory: {}", e);
                return;
            }
        }
        match serde_json::to_vec_pretty(credentials) {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&self.path, bytes).await {
                    warn!("failed to write credentials file: {}", e);
                }
            }
            Err(e) => warn!("failed to encode credentials: {}", e),
        }
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn load_token(&self) -> Option<String> {
        self.read().await.token
    }

    async fn store_token(&self, token: &str) {
        let mut credentials = self.read().await;
        credentials.token = Some(token.to_string());
        self.write(&credentials).await;
    }

    async fn clear_token(&self) {
        let mut credentials = self.read().await;
        credentials.token = None;
        self.write(&credentials).await;
    }

    async fn load_role(&self) -> Option<Role> {
        self.read().await.last_role
    }

    async fn store_role(&self, role: Role) {
        let mut credentials = self.read().await;
        credentials.last_role = Some(role);
        self.write(&credentials).await;
    }

    async fn clear_role(&self) {
        let mut credentials = self.read().await;
        credentials.last_role = None;
        self.write(&credentials).await;
    }
}
