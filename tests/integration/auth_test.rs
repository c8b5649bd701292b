//! Integration tests for the Authentication API
//!
//! Tests the complete authentication flow with a real PostgreSQL database:
//! register, login, logout, current user, and the counter columns created
//! alongside the account.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, test, web, App};
use dhaki_server::routes;
use serde_json::{json, Value};

use crate::common::{create_test_config, create_test_user, session_cookie, TestDb};

macro_rules! auth_app {
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
                    .cookie_http_only(true)
                    .build(),
                )
                .configure(routes::auth::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_register_success_creates_zeroed_counter() {
    let db = TestDb::new().await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "newuser@example.com",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    // Session cookie is set on registration
    assert!(resp.headers().get("set-cookie").is_some());

    // The quota counter row starts at zero, free tier
    let (count, paid): (i32, bool) = sqlx::query_as(
        "SELECT questions_count, is_paid_user FROM users WHERE email = 'newuser@example.com'",
    )
    .fetch_one(&db.pool)
    .await
    .expect("user row exists");
    assert_eq!(count, 0);
    assert!(!paid);
}

#[actix_web::test]
async fn test_register_duplicate_email_rejected() {
    let db = TestDb::new().await;
    create_test_user(&db.pool, "existing@example.com", "password123").await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "existing@example.com",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_register_invalid_email_rejected() {
    let db = TestDb::new().await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "not-an-email",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_login_and_get_current_user() {
    let db = TestDb::new().await;
    create_test_user(&db.pool, "logintest@example.com", "password123").await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "email": "logintest@example.com",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Cookie", cookie))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "logintest@example.com");
}

#[actix_web::test]
async fn test_login_wrong_password_rejected() {
    let db = TestDb::new().await;
    create_test_user(&db.pool, "wrongpass@example.com", "password123").await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "email": "wrongpass@example.com",
            "password": "nope"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_me_without_session_rejected() {
    let db = TestDb::new().await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let db = TestDb::new().await;
    create_test_user(&db.pool, "logout@example.com", "password123").await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "email": "logout@example.com",
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(("Cookie", cookie))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);
}

// Password hashes must never round-trip to the client
#[actix_web::test]
async fn test_user_payload_omits_password_hash() {
    let db = TestDb::new().await;
    let _ = create_test_user(&db.pool, "hash@example.com", "password123").await;
    let app = auth_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "email": "hash@example.com",
            "password": "password123"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert!(body["user"].get("password_hash").is_none());
}
