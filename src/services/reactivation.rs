//! Reactivation request pipeline: submission by the account holder, review by
//! a super admin.
//!
//! Review is single-shot. The `FOR UPDATE` row lock plus the pending-status
//! guard means only one reviewer can ever act on a given request, and an
//! approval that matches no account row rolls back instead of silently
//! no-opping.

use chrono::{Duration, Utc};
use serde_json::json;

use crate::error::AppError;
use crate::models::account::AccountKey;
use crate::models::reactivation::{
    ReactivationRequest, ReactivationStatus, ReviewAction, ReviewReactivationRequest,
    SubmitReactivationRequest,
};
use crate::repositories::{accounts, otp_requests, reactivation_requests};
use crate::services::otp;
use crate::state::AppState;
use crate::utils::time::hours_remaining_ceil;
use crate::validation::rules::is_valid_email;

pub struct SubmitOutcome {
    pub request_id: String,
    pub message: String,
}

pub struct ReviewOutcome {
    pub request_id: String,
    pub status: ReactivationStatus,
}

pub async fn submit_request(
    state: &AppState,
    payload: SubmitReactivationRequest,
    ip_address: &str,
    user_agent: &str,
) -> Result<SubmitOutcome, AppError> {
    let email = payload.email.trim().to_lowercase();
    let otp = payload.otp.trim();
    let reason = payload.request_reason.trim();

    if email.is_empty() || otp.is_empty() || reason.is_empty() {
        return Err(AppError::BadRequest(
            "Email, verification code and request reason are required".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest(
            "A valid email address is required".to_string(),
        ));
    }

    // Generic wording for the unknown-email case.
    let account = accounts::find_by_email(&state.pool, payload.user_type, &email)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No account matches the provided details".to_string())
        })?;
    let key = account.key();

    if account.is_active() {
        return Err(AppError::BadRequest(
            "This account is already active".to_string(),
        ));
    }

    // OTP failures propagate with their own codes and wording.
    let otp_request_id = otp::verify_otp(state, &key, &email, otp).await?;

    let now = Utc::now();
    let today = now.date_naive();

    // Cap, pending and cooldown checks share a transaction with the insert,
    // serialized per account, so concurrent submissions cannot slip past them.
    // An early return drops the transaction and releases the lock.
    let mut tx = state.pool.begin().await.map_err(AppError::from)?;
    accounts::lock_account(&mut *tx, &key).await?;

    let submitted_today = reactivation_requests::count_for_day(&mut *tx, &key, today).await?;
    if submitted_today >= state.config.reactivation_max_requests_per_day {
        return Err(AppError::RateLimited(
            "Daily reactivation request limit reached. Try again tomorrow.".to_string(),
        ));
    }

    if let Some(pending) = reactivation_requests::find_pending(&mut *tx, &key).await? {
        return Err(AppError::BadRequestDetailed(
            "A reactivation request is already pending review".to_string(),
            json!({ "request_id": pending.request_id }),
        ));
    }

    let cooldown_hours = state.config.reactivation_rejection_cooldown_hours;
    if let Some(rejected) = reactivation_requests::find_latest_rejected(&mut *tx, &key).await? {
        if now - rejected.created_at < Duration::hours(cooldown_hours) {
            let wait = hours_remaining_ceil(cooldown_hours, rejected.created_at, now);
            return Err(AppError::RateLimited(format!(
                "A recent request was rejected. Wait {} hour(s) before submitting again.",
                wait
            )));
        }
    }

    let row = ReactivationRequest {
        request_id: uuid::Uuid::new_v4().to_string(),
        user_type: key.user_type,
        user_id: key.user_id.clone(),
        email: email.clone(),
        otp_request_id: otp_request_id.clone(),
        request_reason: reason.to_string(),
        status: ReactivationStatus::Pending,
        reviewed_by: None,
        review_notes: None,
        rejection_reason: None,
        review_timestamp: None,
        request_ip: ip_address.to_string(),
        request_user_agent: user_agent.to_string(),
        created_at: now,
    };

    reactivation_requests::insert(&mut *tx, &row).await?;
    otp_requests::tag_usage(
        &mut *tx,
        &otp_request_id,
        &format!("account reactivation request {}", row.request_id),
    )
    .await?;
    tx.commit().await.map_err(AppError::from)?;

    notify_super_admins(state, &row.request_id, &email).await;

    Ok(SubmitOutcome {
        request_id: row.request_id,
        message: "Reactivation request submitted. An administrator will review it.".to_string(),
    })
}

/// Fans the pending-review notice out to every active super admin.
/// Best-effort: delivery problems are logged, the submission stands.
async fn notify_super_admins(state: &AppState, request_id: &str, requester_email: &str) {
    let recipients = match accounts::list_super_admin_emails(&state.pool).await {
        Ok(recipients) => recipients,
        Err(err) => {
            tracing::warn!(error = %err, "failed to list reviewers for notification");
            return;
        }
    };
    for recipient in recipients {
        if let Err(err) =
            state
                .email
                .send_reactivation_submitted_notice(&recipient, request_id, requester_email)
        {
            tracing::warn!(recipient, error = %err, "failed to send review notice");
        }
    }
}

pub async fn review_request(
    state: &AppState,
    payload: ReviewReactivationRequest,
    reviewer_id: &str,
) -> Result<ReviewOutcome, AppError> {
    let request_id = payload.request_id.trim();
    if request_id.is_empty() {
        return Err(AppError::BadRequest("A request id is required".to_string()));
    }

    let rejection_reason = match payload.action {
        ReviewAction::Approve => None,
        ReviewAction::Reject => {
            let reason = payload
                .rejection_reason
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if reason.is_empty() {
                return Err(AppError::BadRequest(
                    "A rejection reason is required when rejecting".to_string(),
                ));
            }
            Some(reason.to_string())
        }
    };

    let mut tx = state.pool.begin().await.map_err(AppError::from)?;

    let request = reactivation_requests::find_for_update(&mut *tx, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reactivation request not found".to_string()))?;

    if request.status != ReactivationStatus::Pending {
        return Err(AppError::Conflict(
            "This request has already been reviewed".to_string(),
        ));
    }

    let new_status = match payload.action {
        ReviewAction::Approve => ReactivationStatus::Approved,
        ReviewAction::Reject => ReactivationStatus::Rejected,
    };
    let now = Utc::now();

    reactivation_requests::update_review(
        &mut *tx,
        request_id,
        new_status,
        reviewer_id,
        payload.notes.as_deref(),
        rejection_reason.as_deref(),
        now,
    )
    .await?;

    if new_status == ReactivationStatus::Approved {
        let key = AccountKey {
            user_type: request.user_type,
            user_id: request.user_id.clone(),
        };
        let activated = accounts::activate_account(&mut *tx, &key, &request.email).await?;
        if activated == 0 {
            // Returning drops the open transaction, which rolls the review
            // back with it.
            return Err(AppError::Integrity(format!(
                "approval of {} matched no account row for {}",
                request_id, key
            )));
        }
    }

    tx.commit().await.map_err(AppError::from)?;

    let approved = new_status == ReactivationStatus::Approved;
    if let Err(err) =
        state
            .email
            .send_reactivation_outcome(&request.email, approved, payload.notes.as_deref())
    {
        tracing::warn!(request_id, error = %err, "failed to send review outcome notice");
    }

    Ok(ReviewOutcome {
        request_id: request_id.to_string(),
        status: new_status,
    })
}

/// Review-screen listing with pending-first ordering and simple pagination.
pub async fn list_requests(
    state: &AppState,
    status: Option<ReactivationStatus>,
    page: Option<i64>,
    per_page: Option<i64>,
) -> Result<Vec<ReactivationRequest>, AppError> {
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let page = page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;
    let rows = reactivation_requests::list(&state.pool, status, per_page, offset).await?;
    Ok(rows)
}
