use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use propdesk_backend::models::account::UserType;

mod support;
use support::{
    login_attempt_count, seed_account, set_login_attempts, test_pool, test_state, SeedAccount,
    TEST_PASSWORD,
};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let headers = response.headers().clone();
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
    (status, headers, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("build request")
}

fn session_cookie(headers: &axum::http::HeaderMap) -> String {
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header");
    assert!(set_cookie.starts_with("propdesk_session="));
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    send(
        app,
        post_json(
            "/api/auth/login",
            &json!({ "username": username, "password": password }),
        ),
    )
    .await
}

#[tokio::test]
async fn login_succeeds_and_sets_session_cookie() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Agent)).await;

    let (status, headers, body) = login(&app, &account.email, TEST_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user_id"], account.user_id);
    assert_eq!(body["data"]["role"], "agent");

    let cookie = session_cookie(&headers);
    let (status, _, body) = send(&app, get_with_cookie("/api/auth/me", &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], account.user_id);
}

#[tokio::test]
async fn login_accepts_phone_as_identifier() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Tenant)).await;
    let phone = account.phone.clone().expect("seeded phone");

    let (status, _, body) = login(&app, &phone, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], account.user_id);
}

#[tokio::test]
async fn unknown_identifier_gets_generic_denial() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));

    let (status, _, body) = login(&app, "nobody@example.com", "whatever").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn missing_fields_are_rejected_before_any_lookup() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));

    let (status, _, body) = login(&app, "", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn wrong_password_counts_down_and_locks_at_threshold() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Client)).await;

    let (status, _, body) = login(&app, &account.email, "Wrong1!pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("2 attempt(s) remaining"));
    assert_eq!(login_attempt_count(&pool, &account.key()).await, Some(1));

    let (status, _, _) = login(&app, &account.email, "Wrong1!pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = login(&app, &account.email, "Wrong1!pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("Account locked"));

    // Correct credentials are refused while the lock holds, with time left.
    let (status, _, body) = login(&app, &account.email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::LOCKED);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("Try again in"));
}

#[tokio::test]
async fn expired_lock_clears_on_next_login() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Agent)).await;
    let key = account.key();

    set_login_attempts(
        &pool,
        &key,
        3,
        Some(chrono::Utc::now() - chrono::Duration::minutes(1)),
    )
    .await;

    let (status, _, _) = login(&app, &account.email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    // Counters are gone and the auto-unlock is audited.
    assert_eq!(login_attempt_count(&pool, &key).await, None);
    let unlocks: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM lock_history \
         WHERE user_type = $1 AND user_id = $2 AND event = 'unlocked'",
    )
    .bind(key.user_type)
    .bind(&key.user_id)
    .fetch_one(&pool)
    .await
    .expect("count unlock rows");
    assert_eq!(unlocks, 1);
}

#[tokio::test]
async fn blocked_and_deactivated_accounts_are_forbidden() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));

    let blocked = seed_account(&pool, SeedAccount::blocked(UserType::Tenant)).await;
    let (status, _, body) = login(&app, &blocked.email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().expect("message").contains("blocked"));

    let inactive = seed_account(&pool, SeedAccount::inactive(UserType::Tenant)).await;
    let (status, _, body) = login(&app, &inactive.email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"]
        .as_str()
        .expect("message")
        .contains("deactivated"));
}

#[tokio::test]
async fn second_login_invalidates_the_first_session() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Client)).await;

    let (_, headers, _) = login(&app, &account.email, TEST_PASSWORD).await;
    let first_cookie = session_cookie(&headers);

    let (_, headers, _) = login(&app, &account.email, TEST_PASSWORD).await;
    let second_cookie = session_cookie(&headers);
    assert_ne!(first_cookie, second_cookie);

    let (status, _, _) = send(&app, get_with_cookie("/api/auth/me", &first_cookie)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, get_with_cookie("/api/auth/me", &second_cookie)).await;
    assert_eq!(status, StatusCode::OK);

    let sessions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM active_sessions WHERE user_type = $1 AND user_id = $2",
    )
    .bind(account.user_type)
    .bind(&account.user_id)
    .fetch_one(&pool)
    .await
    .expect("count sessions");
    assert_eq!(sessions, 1);
}

#[tokio::test]
async fn logout_requires_the_sessions_own_id() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Agent)).await;

    let (_, headers, _) = login(&app, &account.email, TEST_PASSWORD).await;
    let cookie = session_cookie(&headers);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(json!({ "logout_id": "SOMEONE-ELSE" }).to_string()))
        .expect("build request");
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            json!({ "logout_id": account.user_id }).to_string(),
        ))
        .expect("build request");
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["logout_time"].is_string());

    let (status, _, _) = send(&app, get_with_cookie("/api/auth/me", &cookie)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn successful_login_resets_the_failure_counter() {
    let pool = test_pool().await;
    let app = propdesk_backend::app(test_state(pool.clone()));
    let account = seed_account(&pool, SeedAccount::active(UserType::Admin)).await;
    let key = account.key();

    let (status, _, _) = login(&app, &account.email, "Wrong1!pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(login_attempt_count(&pool, &key).await, Some(1));

    let (status, _, _) = login(&app, &account.email, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login_attempt_count(&pool, &key).await, None);
}
