use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use propdesk_backend::models::account::{Account, UserType};
use propdesk_backend::models::otp::OtpStatus;

mod support;
use support::{
    account_status, seed_account, seed_otp, seed_pending_otp, test_pool, test_state, SeedAccount,
    TEST_PASSWORD,
};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn submit(app: &Router, account: &Account, otp: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/reactivation/submit",
            &json!({
                "email": account.email,
                "user_type": account.user_type,
                "otp": otp,
                "request_reason": "returning tenant, lease renewed",
            }),
            None,
        ),
    )
    .await
}

async fn login_cookie(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({ "username": email, "password": TEST_PASSWORD }),
            None,
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Inserts a reactivation request row directly, for cap/cooldown scenarios.
async fn seed_request(
    pool: &PgPool,
    account: &Account,
    status: &str,
    created_at: DateTime<Utc>,
) -> String {
    let otp_id = seed_otp(
        pool,
        account,
        "999999",
        OtpStatus::Verified,
        created_at + Duration::minutes(2),
    )
    .await;
    let request_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO account_reactivation_requests \
            (request_id, user_type, user_id, email, otp_request_id, request_reason, status, \
             request_ip, request_user_agent, created_at) \
         VALUES ($1, $2, $3, $4, $5, 'seeded', $6, '127.0.0.1', 'tests', $7)",
    )
    .bind(&request_id)
    .bind(account.user_type)
    .bind(&account.user_id)
    .bind(&account.email)
    .bind(&otp_id)
    .bind(status)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("insert reactivation request");
    request_id
}

#[tokio::test]
async fn submit_requires_a_valid_otp() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Tenant)).await;

    let (status, body) = submit(&app, &account, "000000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("invalid or has expired"));
}

#[tokio::test]
async fn submit_rejects_an_already_active_account() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Client)).await;
    seed_pending_otp(&pool, &account, "123456").await;

    let (status, body) = submit(&app, &account, "123456").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("already active"));
}

#[tokio::test]
async fn submit_creates_a_pending_request_and_tags_the_otp() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Tenant)).await;
    let otp_id = seed_pending_otp(&pool, &account, "123456").await;

    let (status, body) = submit(&app, &account, "123456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let request_id = body["request_id"].as_str().expect("request id").to_string();

    let (db_status, linked_otp): (String, String) = sqlx::query_as(
        "SELECT status, otp_request_id FROM account_reactivation_requests WHERE request_id = $1",
    )
    .bind(&request_id)
    .fetch_one(&pool)
    .await
    .expect("read request row");
    assert_eq!(db_status, "pending");
    assert_eq!(linked_otp, otp_id);

    let usage: Option<String> =
        sqlx::query_scalar("SELECT usage_description FROM otp_requests WHERE id = $1")
            .bind(&otp_id)
            .fetch_one(&pool)
            .await
            .expect("read otp usage");
    assert!(usage.expect("usage tag").contains(&request_id));
}

#[tokio::test]
async fn duplicate_pending_request_returns_the_existing_id() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Agent)).await;

    seed_pending_otp(&pool, &account, "123456").await;
    let (status, body) = submit(&app, &account, "123456").await;
    assert_eq!(status, StatusCode::OK);
    let first_id = body["request_id"].as_str().expect("request id").to_string();

    // A fresh OTP passes verification, but the pending request blocks a second
    // submission and hands back the existing id.
    seed_pending_otp(&pool, &account, "222222").await;
    let (status, body) = submit(&app, &account, "222222").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["request_id"], first_id.as_str());
}

#[tokio::test]
async fn daily_cap_limits_submissions() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Client)).await;

    // Two counted requests already today, neither pending. The cap trips
    // before the rejection cooldown is even consulted.
    seed_request(&pool, &account, "approved", Utc::now() - Duration::minutes(10)).await;
    seed_request(&pool, &account, "rejected", Utc::now() - Duration::minutes(5)).await;

    seed_pending_otp(&pool, &account, "123456").await;
    let (status, body) = submit(&app, &account, "123456").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("Daily reactivation request limit"));
}

#[tokio::test]
async fn expired_requests_do_not_count_toward_the_daily_cap() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Agent)).await;

    seed_request(&pool, &account, "expired", Utc::now() - Duration::minutes(10)).await;
    seed_request(&pool, &account, "expired", Utc::now() - Duration::minutes(5)).await;

    seed_pending_otp(&pool, &account, "123456").await;
    let (status, body) = submit(&app, &account, "123456").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn two_pending_requests_for_one_account_cannot_coexist() {
    let pool = test_pool().await;
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Tenant)).await;
    seed_request(&pool, &account, "pending", Utc::now()).await;

    // A second pending row violates the partial unique index even when it
    // bypasses the service-level checks entirely.
    let otp_id = seed_otp(
        &pool,
        &account,
        "888888",
        OtpStatus::Verified,
        Utc::now() + Duration::minutes(2),
    )
    .await;
    let result = sqlx::query(
        "INSERT INTO account_reactivation_requests \
            (request_id, user_type, user_id, email, otp_request_id, request_reason, status, \
             request_ip, request_user_agent, created_at) \
         VALUES ($1, $2, $3, $4, $5, 'duplicate', 'pending', '127.0.0.1', 'tests', NOW())",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(account.user_type)
    .bind(&account.user_id)
    .bind(&account.email)
    .bind(&otp_id)
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn rejection_cooldown_reports_hours_remaining() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Tenant)).await;

    // Rejected 10 hours ago; 14 of the 24 cooldown hours remain.
    seed_request(&pool, &account, "rejected", Utc::now() - Duration::hours(10)).await;

    seed_pending_otp(&pool, &account, "123456").await;
    let (status, body) = submit(&app, &account, "123456").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("14 hour(s)"));
}

#[tokio::test]
async fn review_approves_once_and_reactivates_the_account() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Client)).await;
    let reviewer = seed_account(&pool, SeedAccount::super_admin()).await;

    seed_pending_otp(&pool, &account, "123456").await;
    let (status, body) = submit(&app, &account, "123456").await;
    assert_eq!(status, StatusCode::OK);
    let request_id = body["request_id"].as_str().expect("request id").to_string();

    let cookie = login_cookie(&app, &reviewer.email).await;
    let review = json!({
        "request_id": request_id,
        "action": "approve",
        "notes": "verified over the phone",
    });
    let (status, body) = send(
        &app,
        post_json("/api/admin/reactivation/review", &review, Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(account_status(&pool, &account.key()).await, "active");

    let reviewed_by: Option<String> = sqlx::query_scalar(
        "SELECT reviewed_by FROM account_reactivation_requests WHERE request_id = $1",
    )
    .bind(&request_id)
    .fetch_one(&pool)
    .await
    .expect("read reviewer");
    assert_eq!(reviewed_by.as_deref(), Some(reviewer.user_id.as_str()));

    // Only one reviewer ever acts on a request.
    let (status, _) = send(
        &app,
        post_json("/api/admin/reactivation/review", &review, Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reject_requires_a_reason_and_leaves_the_account_inactive() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Agent)).await;
    let reviewer = seed_account(&pool, SeedAccount::super_admin()).await;
    let request_id = seed_request(&pool, &account, "pending", Utc::now()).await;

    let cookie = login_cookie(&app, &reviewer.email).await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/admin/reactivation/review",
            &json!({ "request_id": request_id, "action": "reject" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_json(
            "/api/admin/reactivation/review",
            &json!({
                "request_id": request_id,
                "action": "reject",
                "rejection_reason": "identity could not be confirmed",
            }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(account_status(&pool, &account.key()).await, "inactive");
}

#[tokio::test]
async fn review_of_an_unknown_request_is_not_found() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let reviewer = seed_account(&pool, SeedAccount::super_admin()).await;
    let cookie = login_cookie(&app, &reviewer.email).await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/admin/reactivation/review",
            &json!({ "request_id": "no-such-request", "action": "approve" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn approval_that_matches_no_account_rolls_back() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Tenant)).await;
    let reviewer = seed_account(&pool, SeedAccount::super_admin()).await;
    let request_id = seed_request(&pool, &account, "pending", Utc::now()).await;

    // The stored email no longer matches the account row.
    sqlx::query(
        "UPDATE account_reactivation_requests SET email = 'drifted@example.com' \
         WHERE request_id = $1",
    )
    .bind(&request_id)
    .execute(&pool)
    .await
    .expect("drift email");

    let cookie = login_cookie(&app, &reviewer.email).await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/admin/reactivation/review",
            &json!({ "request_id": request_id, "action": "approve" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTEGRITY_ERROR");

    // The review itself rolled back with the failed activation.
    let db_status: String = sqlx::query_scalar(
        "SELECT status FROM account_reactivation_requests WHERE request_id = $1",
    )
    .bind(&request_id)
    .fetch_one(&pool)
    .await
    .expect("read status");
    assert_eq!(db_status, "pending");
    assert_eq!(account_status(&pool, &account.key()).await, "inactive");
}

#[tokio::test]
async fn review_routes_demand_a_super_admin() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let plain_admin = seed_account(&pool, SeedAccount::active(UserType::Admin)).await;
    let cookie = login_cookie(&app, &plain_admin.email).await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/admin/reactivation/review",
            &json!({ "request_id": "x", "action": "approve" }),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/api/admin/reactivation")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("build request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listing_puts_pending_requests_first() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::inactive(UserType::Client)).await;
    let reviewer = seed_account(&pool, SeedAccount::super_admin()).await;

    let rejected_id =
        seed_request(&pool, &account, "rejected", Utc::now() - Duration::hours(30)).await;
    let pending_id = seed_request(&pool, &account, "pending", Utc::now() - Duration::hours(31)).await;

    let cookie = login_cookie(&app, &reviewer.email).await;
    let request = Request::builder()
        .uri("/api/admin/reactivation")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .expect("build request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["data"].as_array().expect("rows");
    let ids: Vec<&str> = rows
        .iter()
        .map(|row| row["request_id"].as_str().expect("id"))
        .collect();
    let pending_pos = ids.iter().position(|id| *id == pending_id).expect("pending listed");
    let rejected_pos = ids.iter().position(|id| *id == rejected_id).expect("rejected listed");
    assert!(pending_pos < rejected_pos);
}
