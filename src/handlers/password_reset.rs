use axum::{extract::State, Json};
use serde_json::json;

use crate::error::AppError;
use crate::models::password_reset::ResetPasswordRequest;
use crate::services::password_reset;
use crate::state::AppState;

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let message = password_reset::reset_password(&state, payload).await?;
    Ok(Json(json!({
        "success": true,
        "message": message,
    })))
}
