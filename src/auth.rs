//! Caller identity extraction.
//!
//! Token issuance and verification live upstream; by the time a request
//! reaches this server a trusted proxy has validated the caller and attached
//! the account headers. The extractor only checks that an identity is
//! present, rejecting with `Unauthorized` otherwise.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::GameError;
use crate::types::AccountId;

pub const ACCOUNT_ID_HEADER: &str = "x-account-id";
pub const USERNAME_HEADER: &str = "x-username";

/// An already-validated caller identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub account_id: AccountId,
    /// Account-level display name; room memberships may override it.
    pub username: Option<String>,
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = GameError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account_id = header_value(parts, ACCOUNT_ID_HEADER).ok_or_else(|| {
            GameError::Unauthorized(format!("missing {} header", ACCOUNT_ID_HEADER))
        })?;

        Ok(Identity {
            account_id,
            username: header_value(parts, USERNAME_HEADER),
        })
    }
}
