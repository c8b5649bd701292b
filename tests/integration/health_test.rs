//! Integration tests for the health endpoints.

use actix_web::{test, web, App};
use dhaki_server::routes;
use serde_json::Value;

use crate::common::TestDb;

#[actix_web::test]
async fn test_liveness_always_ok() {
    let db = TestDb::new().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .route("/health", web::get().to(routes::health::liveness)),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_readiness_reflects_database() {
    let db = TestDb::new().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .route("/health/ready", web::get().to(routes::health::readiness)),
    )
    .await;

    let req = test::TestRequest::get().uri("/health/ready").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ready");

    db.pool.close().await;

    let req = test::TestRequest::get().uri("/health/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
}
