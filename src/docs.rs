#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::models::{
    account::{LoginRequest, LoginUserData, LogoutRequest, UserType},
    otp::{GenerateOtpRequest, OtpStatus},
    reactivation::{
        ReactivationListQuery, ReactivationRequest, ReactivationStatus, ReviewAction,
        ReviewReactivationRequest, SubmitReactivationRequest,
    },
    password_reset::ResetPasswordRequest,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        login_doc,
        logout_doc,
        me_doc,
        reset_password_doc,
        generate_otp_doc,
        submit_reactivation_doc,
        review_reactivation_doc,
        list_reactivation_doc
    ),
    components(
        schemas(
            LoginRequest,
            LoginUserData,
            LogoutRequest,
            UserType,
            ResetPasswordRequest,
            GenerateOtpRequest,
            OtpStatus,
            SubmitReactivationRequest,
            ReviewReactivationRequest,
            ReviewAction,
            ReactivationListQuery,
            ReactivationRequest,
            ReactivationStatus
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout and session identity"),
        (name = "Password", description = "Secret-answer password reset"),
        (name = "Reactivation", description = "OTP and account reactivation requests"),
        (name = "Admin", description = "Super-admin review endpoints")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginUserData),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account blocked or deactivated"),
        (status = 423, description = "Account locked")
    ),
    tag = "Auth"
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session terminated"),
        (status = 403, description = "logout_id does not match the session")
    ),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Current session identity")),
    tag = "Auth"
)]
fn me_doc() {}

#[utoipa::path(
    post,
    path = "/api/password/reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Secret answer mismatch"),
        (status = 429, description = "Daily reset quota exhausted")
    ),
    tag = "Password"
)]
fn reset_password_doc() {}

#[utoipa::path(
    post,
    path = "/api/otp/generate",
    request_body = GenerateOtpRequest,
    responses(
        (status = 200, description = "Generic acknowledgement (sent or ignored)"),
        (status = 429, description = "Request window exhausted or resend too soon")
    ),
    tag = "Reactivation"
)]
fn generate_otp_doc() {}

#[utoipa::path(
    post,
    path = "/api/reactivation/submit",
    request_body = SubmitReactivationRequest,
    responses(
        (status = 200, description = "Request submitted for review"),
        (status = 400, description = "Invalid input, bad OTP, or duplicate pending request"),
        (status = 429, description = "Daily cap or rejection cooldown")
    ),
    tag = "Reactivation"
)]
fn submit_reactivation_doc() {}

#[utoipa::path(
    post,
    path = "/api/admin/reactivation/review",
    request_body = ReviewReactivationRequest,
    responses(
        (status = 200, description = "Review recorded"),
        (status = 404, description = "Unknown request id"),
        (status = 409, description = "Request already reviewed")
    ),
    tag = "Admin"
)]
fn review_reactivation_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/reactivation",
    responses((status = 200, description = "Reactivation requests, pending first", body = [ReactivationRequest])),
    tag = "Admin"
)]
fn list_reactivation_doc() {}
