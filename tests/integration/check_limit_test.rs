//! Integration tests for the quota probe endpoint
//!
//! `POST /api/check-limit` is read-only, fail-open, and tolerant of
//! malformed bodies. These tests exercise it for anonymous visitors and for
//! free/paid accounts across the reset window.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, test, web, App};
use chrono::{Duration, Utc};
use dhaki_server::routes;
use serde_json::{json, Value};

use crate::common::{create_test_config, create_test_user, session_cookie, set_counter_state, TestDb};

macro_rules! limit_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(create_test_config()))
                .wrap(
                    SessionMiddleware::builder(
                        CookieSessionStore::default(),
                        Key::from(&[0u8; 64]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(routes::auth::configure)
                .configure(routes::limits::configure),
        )
        .await
    };
}

macro_rules! login_cookie {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": $email, "password": "password123" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);
        session_cookie(&resp)
    }};
}

// =============================================================================
// Anonymous visitors
// =============================================================================

#[actix_web::test]
async fn test_anonymous_fresh_counter() {
    let db = TestDb::new().await;
    let app = limit_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/api/check-limit")
        .set_json(json!({ "anonymousCount": 0 }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isAnonymous"], json!(true));
    assert_eq!(body["hasReachedLimit"], json!(false));
    assert_eq!(body["questionsLeft"], json!(3));
    assert_eq!(body["daysToReset"], Value::Null);
}

#[actix_web::test]
async fn test_anonymous_at_limit() {
    // Client-local counter already at the cap
    let db = TestDb::new().await;
    let app = limit_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/api/check-limit")
        .set_json(json!({ "anonymousCount": 3 }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["hasReachedLimit"], json!(true));
    assert_eq!(body["questionsLeft"], json!(0));
}

#[actix_web::test]
async fn test_malformed_body_treated_as_empty() {
    let db = TestDb::new().await;
    let app = limit_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/api/check-limit")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not valid json")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["isAnonymous"], json!(true));
    assert_eq!(body["questionsLeft"], json!(3));
}

#[actix_web::test]
async fn test_missing_body_treated_as_empty() {
    let db = TestDb::new().await;
    let app = limit_app!(db.pool);

    let req = test::TestRequest::post().uri("/api/check-limit").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

// =============================================================================
// Accounts
// =============================================================================

#[actix_web::test]
async fn test_fresh_account_has_full_allowance() {
    let db = TestDb::new().await;
    create_test_user(&db.pool, "fresh@example.com", "password123").await;
    let app = limit_app!(db.pool);
    let cookie = login_cookie!(app, "fresh@example.com");

    let req = test::TestRequest::post()
        .uri("/api/check-limit")
        .insert_header(("Cookie", cookie))
        .set_json(json!({}))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isAnonymous"], json!(false));
    assert_eq!(body["hasReachedLimit"], json!(false));
    assert_eq!(body["questionsLeft"], json!(25));
    assert_eq!(body["daysToReset"], json!(3));
}

#[actix_web::test]
async fn test_exhausted_account_within_window() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool, "maxed@example.com", "password123").await;
    set_counter_state(&db.pool, user.id, 25, Utc::now(), false).await;
    let app = limit_app!(db.pool);
    let cookie = login_cookie!(app, "maxed@example.com");

    let req = test::TestRequest::post()
        .uri("/api/check-limit")
        .insert_header(("Cookie", cookie))
        .set_json(json!({}))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["hasReachedLimit"], json!(true));
    assert_eq!(body["questionsLeft"], json!(0));
    assert_eq!(body["daysToReset"], json!(3));
}

#[actix_web::test]
async fn test_elapsed_window_restores_allowance() {
    // Window opened 4 days ago, stored used=25
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool, "stale@example.com", "password123").await;
    set_counter_state(&db.pool, user.id, 25, Utc::now() - Duration::days(4), false).await;
    let app = limit_app!(db.pool);
    let cookie = login_cookie!(app, "stale@example.com");

    let req = test::TestRequest::post()
        .uri("/api/check-limit")
        .insert_header(("Cookie", cookie))
        .set_json(json!({}))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["hasReachedLimit"], json!(false));
    assert_eq!(body["questionsLeft"], json!(25));
    assert_eq!(body["daysToReset"], json!(0));

    // The probe is read-only: the stored counter is untouched
    let (count,): (i32,) = sqlx::query_as("SELECT questions_count FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&db.pool)
        .await
        .expect("row exists");
    assert_eq!(count, 25);
}

#[actix_web::test]
async fn test_paid_account_is_unlimited() {
    // Paid tier with an absurd stored counter
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool, "paid@example.com", "password123").await;
    set_counter_state(&db.pool, user.id, 1000, Utc::now(), true).await;
    let app = limit_app!(db.pool);
    let cookie = login_cookie!(app, "paid@example.com");

    let req = test::TestRequest::post()
        .uri("/api/check-limit")
        .insert_header(("Cookie", cookie))
        .set_json(json!({}))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["hasReachedLimit"], json!(false));
    assert_eq!(body["questionsLeft"], Value::Null);
    assert_eq!(body["daysToReset"], Value::Null);
}

#[actix_web::test]
async fn test_repeated_probes_never_mutate_the_counter() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool, "probe@example.com", "password123").await;
    set_counter_state(&db.pool, user.id, 7, Utc::now(), false).await;
    let app = limit_app!(db.pool);
    let cookie = login_cookie!(app, "probe@example.com");

    for _ in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/check-limit")
            .insert_header(("Cookie", cookie.clone()))
            .set_json(json!({}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["questionsLeft"], json!(18));
    }

    let (count,): (i32,) = sqlx::query_as("SELECT questions_count FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&db.pool)
        .await
        .expect("row exists");
    assert_eq!(count, 7);
}
