use super::state::ServerState;
use crate::store::AuthTokenValue;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

#[derive(Debug)]
pub enum SessionExtractionError {
    AccessDenied,
    InternalError,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::AccessDenied => StatusCode::FORBIDDEN.into_response(),
            SessionExtractionError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

async fn extract_session_token_from_cookies(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<String> {
    CookieJar::from_request_parts(parts, ctx)
        .await
        .ok()?
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .map(|s| s.to_string())
}

/// Accepts both a bare token and `Bearer <token>`.
fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}

async fn extract_session_from_request_parts(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Result<Session, SessionExtractionError> {
    let token = match extract_session_token_from_cookies(parts, ctx).await {
        Some(token) => token,
        None => extract_session_token_from_headers(parts).ok_or_else(|| {
            debug!("No token in cookies nor headers.");
            SessionExtractionError::AccessDenied
        })?,
    };

    let auth_token_value = AuthTokenValue(token);
    let auth_token = match ctx.store.get_auth_token(&auth_token_value) {
        Ok(Some(token)) => token,
        Ok(None) => {
            debug!("Auth token not found in database");
            return Err(SessionExtractionError::AccessDenied);
        }
        Err(e) => {
            warn!("Failed to get auth token from database: {:#}", e);
            return Err(SessionExtractionError::InternalError);
        }
    };
    debug!("Found auth token for user_id={}", auth_token.user_id);

    if let Err(e) = ctx.store.update_auth_token_last_used(&auth_token_value) {
        debug!("Failed to update auth token last_used timestamp: {}", e);
    }

    Ok(Session {
        user_id: auth_token.user_id,
    })
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx).await
    }
}
