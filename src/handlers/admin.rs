use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::models::reactivation::{ReactivationListQuery, ReviewReactivationRequest};
use crate::models::session::SessionContext;
use crate::services::reactivation;
use crate::state::AppState;

pub async fn review_reactivation(
    State(state): State<AppState>,
    Extension(context): Extension<SessionContext>,
    Json(payload): Json<ReviewReactivationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reviewer_id = context.data.account.user_id.clone();
    let outcome = reactivation::review_request(&state, payload, &reviewer_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Reactivation request reviewed",
        "status": outcome.status,
        "request_id": outcome.request_id,
    })))
}

pub async fn list_reactivation_requests(
    State(state): State<AppState>,
    Query(query): Query<ReactivationListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let rows =
        reactivation::list_requests(&state, query.status, query.page, query.per_page).await?;
    Ok(Json(json!({
        "success": true,
        "data": rows,
    })))
}
