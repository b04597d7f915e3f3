//! Caller identity extractor.
//!
//! Authentication happens upstream. The gateway forwards the authenticated user
//! as an opaque id in the `X-User-Id` header, which the ledger trusts as is.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use caja_shared::types::UserId;
use serde_json::json;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user making the request, if the gateway identified one.
///
/// ```ignore
/// async fn handler(caller: Caller) -> impl IntoResponse {
///     let user = caller.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Caller(pub Option<UserId>);

impl Caller {
    /// Returns the caller's user id.
    #[must_use]
    pub const fn user_id(self) -> Option<UserId> {
        self.0
    }

    /// Prefers an explicit user id, falling back to the caller.
    #[must_use]
    pub fn or_explicit(self, explicit: Option<UserId>) -> Option<UserId> {
        explicit.or(self.0)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Self(None));
        };

        raw.to_str()
            .ok()
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .map(|id| Self(Some(id)))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "INVALID_CALLER",
                        "message": "X-User-Id header must be a UUID"
                    })),
                )
            })
    }
}
