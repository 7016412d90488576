//! Models for the reactivation request pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::account::UserType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReactivationStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// A deactivated account holder's auditable petition to be reinstated.
/// At most one `pending` row exists per account; a `rejected` row imposes a
/// cooldown before the next submission.
pub struct ReactivationRequest {
    pub request_id: String,
    pub user_type: UserType,
    pub user_id: String,
    pub email: String,
    /// The verified OTP row that proved email access at submission time.
    pub otp_request_id: String,
    pub request_reason: String,
    pub status: ReactivationStatus,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub review_timestamp: Option<DateTime<Utc>>,
    pub request_ip: String,
    pub request_user_agent: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload submitted by a deactivated account holder.
pub struct SubmitReactivationRequest {
    pub email: String,
    pub user_type: UserType,
    pub otp: String,
    pub request_reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Super-admin decision on a pending request. `rejection_reason` is required
/// when the action is `reject`.
pub struct ReviewReactivationRequest {
    pub request_id: String,
    pub action: ReviewAction,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Listing filter for the review screen.
pub struct ReactivationListQuery {
    pub status: Option<ReactivationStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
