//! Integration tests for the chat endpoint's pre-LLM surface
//!
//! Only the paths that stop before the provider call are exercised here:
//! request validation and the structured quota denial. The provider itself
//! is never contacted.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, test, web, App};
use chrono::Utc;
use dhaki_server::college::CollegeKb;
use dhaki_server::llm::LlmClient;
use dhaki_server::routes;
use serde_json::{json, Value};

use crate::common::{create_test_config, create_test_user, session_cookie, set_counter_state, TestDb};

macro_rules! chat_app {
    ($pool:expr) => {{
        let config = create_test_config();
        let llm = web::Data::new(LlmClient::new(config.llm.clone()).expect("client builds"));
        let kb = web::Data::new(CollegeKb::new(config.college_data_dir.clone()));
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(config))
                .app_data(llm)
                .app_data(kb)
                .wrap(
                    SessionMiddleware::builder(
                        CookieSessionStore::default(),
                        Key::from(&[0u8; 64]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .configure(routes::auth::configure)
                .configure(routes::chat::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_empty_message_rejected_without_consuming_quota() {
    let db = TestDb::new().await;
    let app = chat_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "   " }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_anonymous_over_limit_gets_sign_in_denial() {
    let db = TestDb::new().await;
    let app = chat_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "hello", "anonymousCount": 3 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "question_limit_reached");
    assert_eq!(body["requiresSignIn"], json!(true));
    assert_eq!(body["questionsLeft"], json!(0));
    assert_eq!(body["daysToReset"], Value::Null);
}

#[actix_web::test]
async fn test_exhausted_account_gets_wait_period_denial() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool, "chatmaxed@example.com", "password123").await;
    set_counter_state(&db.pool, user.id, 25, Utc::now(), false).await;
    let app = chat_app!(db.pool);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "chatmaxed@example.com", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .insert_header(("Cookie", cookie))
        .set_json(json!({ "message": "hello" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["requiresSignIn"], json!(false));
    assert_eq!(body["daysToReset"], json!(3));

    // Denial costs nothing
    let (count,): (i32,) = sqlx::query_as("SELECT questions_count FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&db.pool)
        .await
        .expect("row exists");
    assert_eq!(count, 25);
}
