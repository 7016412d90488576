//! Session authentication middleware.
//!
//! Looks the cookie up in the server-side store by its SHA-256, enforces the
//! idle timeout lazily on every authenticated request and inserts a
//! [`SessionContext`] extension for the handler.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::models::session::SessionContext;
use crate::services::session;
use crate::state::AppState;
use crate::utils::cookies::{extract_cookie_value, SESSION_COOKIE_NAME};
use crate::utils::security::hash_token;

pub async fn session_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Session auth plus the super-admin gate for review routes.
pub async fn super_admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = authenticate(&state, request.headers()).await?;
    if !context.data.is_super_admin() {
        return Err(AppError::Forbidden(
            "Super admin privileges are required".to_string(),
        ));
    }
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<SessionContext, AppError> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let token = extract_cookie_value(cookie_header, SESSION_COOKIE_NAME)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    let token_hash = hash_token(&token);

    let data = state
        .sessions
        .get(&token_hash)
        .await
        .ok_or_else(|| AppError::Unauthorized("Session is invalid or has expired".to_string()))?;

    let now = Utc::now();
    let idle_limit = Duration::seconds(state.config.session_idle_timeout_seconds);
    if now - data.last_activity > idle_limit {
        session::expire_idle_session(state, &token_hash).await;
        return Err(AppError::Unauthorized(
            "Session expired due to inactivity. Sign in again.".to_string(),
        ));
    }

    state.sessions.touch(&token_hash, now).await;

    Ok(SessionContext {
        session_token: token,
        data,
    })
}
