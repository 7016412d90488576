use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::models::otp::GenerateOtpRequest;
use crate::models::reactivation::SubmitReactivationRequest;
use crate::services::{otp, reactivation};
use crate::state::AppState;
use crate::utils::http::{client_ip, user_agent};

pub async fn generate_otp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<GenerateOtpRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ip = client_ip(&headers);
    let message = otp::generate_otp(
        &state,
        &payload.email,
        payload.user_type,
        &ip,
        "account reactivation",
    )
    .await?;
    Ok(Json(json!({
        "success": true,
        "message": message,
    })))
}

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitReactivationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ip = client_ip(&headers);
    let agent = user_agent(&headers);
    let outcome = reactivation::submit_request(&state, payload, &ip, &agent).await?;
    Ok(Json(json!({
        "success": true,
        "message": outcome.message,
        "request_id": outcome.request_id,
        "review_time": "within 2 business days",
    })))
}
