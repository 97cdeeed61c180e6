//! Data structures for the authentication state machine.
//!
//! The session carries its own provenance: `Token` means "claims read from
//! the stored token, not yet confirmed", `Server` means "confirmed by the
//! reconciliation endpoint". View code legitimately needs to tell
//! "probably logged in" from "confirmed", so the two phases stay explicit.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::models::UserProfile;
use crate::utils::jwt::Claims;

/// Role of the authenticated user within the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Titolare: runs the company, sees the company-wide dashboard.
    Owner,
    /// Operaio: field staff, logs attendance and materials on site.
    Worker,
    /// Not yet known, or a value this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }

    /// True for every role except `Unknown`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Unknown)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Worker => write!(f, "worker"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where the current session's identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Claims read from the stored token; not yet confirmed by the server.
    Token,
    /// Profile confirmed by the reconciliation endpoint.
    Server,
}

/// The current authenticated identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub origin: SessionOrigin,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_id: Option<i64>,
    pub company_name: Option<String>,
}

impl Session {
    /// Builds the optimistic session from token claims alone.
    ///
    /// The role claim wins; a missing claim falls back to the last role the
    /// server was seen returning, so a transient omission never demotes a
    /// known owner to `Unknown`.
    pub(crate) fn from_claims(claims: &Claims, fallback_role: Option<Role>) -> Self {
        Session {
            user_id: claims.sub.clone(),
            role: claims
                .role
                .filter(Role::is_known)
                .or(fallback_role.filter(Role::is_known))
                .unwrap_or(Role::Unknown),
            origin: SessionOrigin::Token,
            username: None,
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            company_id: None,
            company_name: None,
        }
    }

    /// Builds the authoritative session from a server profile.
    ///
    /// `previous_role` fills the gap when the server omits the role field;
    /// an observed role is never silently cleared.
    pub(crate) fn from_profile(profile: UserProfile, previous_role: Option<Role>) -> Self {
        Session {
            user_id: profile.id,
            role: profile
                .role
                .filter(Role::is_known)
                .or(previous_role.filter(Role::is_known))
                .unwrap_or(Role::Unknown),
            origin: SessionOrigin::Server,
            username: Some(profile.username),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            phone: profile.phone,
            company_id: profile.company_id,
            company_name: profile.company_name,
        }
    }

    /// True once the server has confirmed this identity.
    pub fn is_authoritative(&self) -> bool {
        self.origin == SessionOrigin::Server
    }
}

/// Snapshot published by the auth service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Current identity, `None` when logged out.
    pub session: Option<Session>,
    /// True while an auth check pass is running.
    pub checking: bool,
    /// True when the last reconciliation failed for a reason that is not
    /// proof the token is invalid (timeout, network down, 5xx). The UI shows
    /// a warning banner instead of forcing a logout.
    pub degraded: bool,
}

/// Login request payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration payload: the owner sign-up form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    pub phone: Option<String>,

    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
}
