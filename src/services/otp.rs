//! One-time code issuance and verification.
//!
//! Generation answers with the same message whether or not the email maps to
//! an account, so the endpoint cannot be used to enumerate identities. Codes
//! are stored as argon2 hashes and are strictly single-use: a wrong guess
//! burns the row just like a correct one.

use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::models::account::{AccountKey, UserType};
use crate::models::otp::{OtpRequest, OtpStatus};
use crate::repositories::{accounts, otp_requests};
use crate::state::AppState;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::security::generate_otp_code;
use crate::validation::rules::is_valid_email;

/// Single success wording for the generate endpoint. Unknown emails get this
/// exact message too.
const OTP_SENT_MESSAGE: &str =
    "If the email is registered, a verification code has been sent. Check your inbox.";

/// Requests a one-time code for `email`. Returns the message to surface; the
/// caller cannot distinguish the unknown-email path from the delivered path.
pub async fn generate_otp(
    state: &AppState,
    email: &str,
    user_type: UserType,
    ip_address: &str,
    purpose: &str,
) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest(
            "A valid email address is required".to_string(),
        ));
    }

    // Deactivated accounts are eligible: the reactivation flow depends on
    // proving email access while the account is inactive. Blocked accounts
    // and unknown emails fall into the same silent no-op.
    let account = match accounts::find_by_email(&state.pool, user_type, &email).await? {
        Some(account) if !account.is_blocked => account,
        _ => return Ok(OTP_SENT_MESSAGE.to_string()),
    };
    let key = account.key();
    let now = Utc::now();

    // Sweep, window count, active-code guard and insert run in one
    // transaction serialized per account, so two concurrent requests cannot
    // both pass the checks and issue duplicate codes. An early error return
    // drops the transaction and releases the lock.
    let mut tx = state.pool.begin().await.map_err(AppError::from)?;
    accounts::lock_account(&mut *tx, &key).await?;

    otp_requests::sweep_expired(&mut *tx, &key, now).await?;

    let window_start = now - Duration::minutes(state.config.otp_window_minutes);
    let recent = otp_requests::count_since(&mut *tx, &key, window_start).await?;
    if recent >= state.config.otp_max_requests {
        return Err(AppError::RateLimited(format!(
            "Too many code requests. Try again in {} minute(s).",
            state.config.otp_window_minutes
        )));
    }

    // A live pending code is never silently replaced: a very fresh one asks
    // the caller to wait, an older one points them at their inbox. Both paths
    // keep the mailbox from being flooded with duplicate codes.
    if let Some(pending) = otp_requests::find_active_pending(&mut *tx, &key, now).await? {
        let age_seconds = (now - pending.created_at).num_seconds();
        if age_seconds < state.config.otp_resend_wait_seconds {
            let wait = state.config.otp_resend_wait_seconds - age_seconds;
            return Err(AppError::RateLimited(format!(
                "A code was just sent. Wait {} second(s) before requesting another.",
                wait
            )));
        }
        tx.commit().await.map_err(AppError::from)?;
        return Ok(
            "A verification code was already sent recently. Check your inbox.".to_string(),
        );
    }

    let code = generate_otp_code();
    let otp_hash = hash_password(&code).map_err(AppError::InternalServerError)?;
    let row = OtpRequest {
        id: uuid::Uuid::new_v4().to_string(),
        user_type: key.user_type,
        user_id: key.user_id.clone(),
        email: email.clone(),
        otp_hash,
        status: OtpStatus::Pending,
        expires_at: now + Duration::minutes(state.config.otp_expiry_minutes),
        created_at: now,
        ip_address: ip_address.to_string(),
        usage_description: None,
    };
    otp_requests::insert(&mut *tx, &row).await?;
    tx.commit().await.map_err(AppError::from)?;

    if let Err(err) = state.email.send_otp_email(&email, &code, purpose) {
        tracing::warn!(account = %key, error = %err, "failed to deliver one-time code");
        otp_requests::mark_email_failed(&state.pool, &row.id).await?;
    }

    Ok(OTP_SENT_MESSAGE.to_string())
}

/// Verifies a code against the newest live pending row for the account. A
/// wrong guess transitions the row to `invalid_attempt`, so a fresh code must
/// be requested; a correct one transitions it to `verified`. Returns the id of
/// the consumed row.
pub async fn verify_otp(
    state: &AppState,
    key: &AccountKey,
    email: &str,
    code: &str,
) -> Result<String, AppError> {
    let now = Utc::now();
    otp_requests::sweep_expired(&state.pool, key, now).await?;

    let pending = otp_requests::find_pending_for_verification(&state.pool, key, email, now)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("The verification code is invalid or has expired".to_string())
        })?;

    let matches = verify_password(code.trim(), &pending.otp_hash)
        .map_err(AppError::InternalServerError)?;

    if !matches {
        otp_requests::transition_from_pending(&state.pool, &pending.id, OtpStatus::InvalidAttempt)
            .await?;
        return Err(AppError::BadRequest(
            "The verification code is invalid or has expired".to_string(),
        ));
    }

    // The status guard makes the consume single-shot; losing the race means
    // another verification already burned this row.
    let consumed =
        otp_requests::transition_from_pending(&state.pool, &pending.id, OtpStatus::Verified)
            .await?;
    if !consumed {
        return Err(AppError::BadRequest(
            "The verification code is invalid or has expired".to_string(),
        ));
    }

    Ok(pending.id)
}
