//! Wire-format structures for the WORK360 REST API.
//!
//! Every backend endpoint wraps its payload in a common envelope; payload
//! shapes are camelCase JSON as served. These types only describe what the
//! client consumes; the shapes are owned by the backend.

use serde::{Deserialize, Serialize};

use crate::auth::models::Role;

/// Standard response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful.
    pub success: bool,
    /// Response data (present on success).
    pub data: Option<T>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Error details (present on failure).
    #[serde(default)]
    pub error: Option<ErrorDetails>,
}

/// Machine-readable error block on failed responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(default)]
    pub error_type: Option<String>,
}

/// Profile returned by the identity endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Token and profile pair returned by login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}
