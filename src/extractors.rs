use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// The caller's stable external identity, resolved upstream and passed
/// through verbatim: either `Authorization: Bearer <identity>` or the
/// configured identity header. The login token IS the identity.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

fn extract_identity(parts: &Parts, state: &AppState) -> Option<String> {
    if let Some(value) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    parts
        .headers
        .get(state.config.auth.identity_header.as_str())
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extract_identity(parts, state)
            .map(Caller)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional identity for public surfaces (approved listings, leaderboards,
/// catalog). Anonymous callers only ever see approved content.
pub struct MaybeCaller(pub Option<String>);

impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(extract_identity(parts, state)))
    }
}
