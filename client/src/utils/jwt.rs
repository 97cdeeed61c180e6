//! JWT token inspection for the client side of authentication.
//!
//! Access tokens are minted and signed by the backend; this client only
//! reads them. Claims are decoded without signature verification (the
//! signing secret never leaves the server) and expiry is checked locally
//! against the `exp` claim, so a stale token can be discarded without a
//! network round-trip.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::auth::models::Role;
use crate::errors::{ServiceError, ServiceResult};

/// Claims carried by a WORK360 access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user id.
    #[serde(alias = "id")]
    pub sub: String,
    /// Role claim; absent on tokens minted before roles were added.
    #[serde(default)]
    pub role: Option<Role>,
    /// Token expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Token issued at timestamp.
    #[serde(default)]
    pub iat: usize,
}

impl Claims {
    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as usize;
        now > self.exp
    }
}

/// Decode a token's claims without verifying its signature.
///
/// A decode failure means the token is garbage or truncated; callers treat
/// that the same as an expired token.
pub fn decode_unverified(token: &str) -> ServiceResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    // Expiry is evaluated by the caller so an exactly-expired token is not
    // saved by the default leeway.
    validation.validate_exp = false;

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|token_data| token_data.claims)
        .map_err(|e| ServiceError::validation(format!("token decode failed: {}", e)))
}
