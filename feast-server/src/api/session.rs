//! Session identity extractor
//!
//! The caller's table session travels as an opaque token resolved
//! upstream into a UUID and forwarded in the `X-Session-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use shared::error::{AppError, ErrorCode};

pub const SESSION_HEADER: &str = "x-session-id";

/// The caller's session id
#[derive(Debug, Clone, Copy)]
pub struct SessionId(pub Uuid);

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let id = Uuid::parse_str(raw).map_err(|_| {
            AppError::with_message(ErrorCode::TokenInvalid, "Malformed session id")
        })?;

        Ok(SessionId(id))
    }
}
