use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;

use crate::error::AppError;
use crate::models::account::{LoginRequest, LogoutRequest};
use crate::models::session::SessionContext;
use crate::services::{login, session};
use crate::state::AppState;
use crate::utils::cookies::{
    build_clear_cookie, build_session_cookie, CookieOptions, SESSION_COOKIE_NAME,
    SESSION_COOKIE_PATH,
};
use crate::utils::http::{client_ip, user_agent};

fn cookie_options(state: &AppState) -> CookieOptions {
    CookieOptions {
        secure: state.config.cookie_secure,
        same_site: state.config.cookie_same_site,
    }
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let ip = client_ip(&headers);
    let agent = user_agent(&headers);

    let outcome = login::login(&state, payload, &ip, &agent).await?;

    // Cookie lifetime matches the idle timeout; the middleware enforces the
    // actual expiry server-side.
    let cookie = build_session_cookie(
        SESSION_COOKIE_NAME,
        &outcome.session_token,
        Duration::from_secs(state.config.session_idle_timeout_seconds.max(0) as u64),
        SESSION_COOKIE_PATH,
        cookie_options(&state),
    );

    let body = Json(json!({
        "success": true,
        "message": "Login successful",
        "data": outcome.user,
    }));

    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
    Json(payload): Json<LogoutRequest>,
) -> Result<Response, AppError> {
    // A session can only log itself out.
    if payload.logout_id != context.data.account.user_id {
        return Err(AppError::Forbidden(
            "You can only log out your own session".to_string(),
        ));
    }

    let logout_time = session::logout(&state, &context.session_token).await?;

    let cookie = build_clear_cookie(SESSION_COOKIE_NAME, SESSION_COOKIE_PATH, cookie_options(&state));
    let body = Json(json!({
        "success": true,
        "message": "Logged out",
        "logout_time": logout_time,
    }));

    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

pub async fn me(
    Extension(context): Extension<SessionContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data = &context.data;
    Ok(Json(json!({
        "success": true,
        "data": {
            "user_id": data.account.user_id,
            "user_type": data.account.user_type,
            "firstname": data.firstname,
            "lastname": data.lastname,
            "role": data.role,
            "login_time": data.created_at,
        },
    })))
}
