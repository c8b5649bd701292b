use actix_web::{web, HttpResponse};

use crate::auth::ResolvedIdentity;
use crate::config::Config;
use crate::db::DbPool;
use crate::quota::{LimitStatus, QuotaGate};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckLimitRequest {
    /// Client-local question counter for anonymous visitors
    #[serde(default, alias = "anonymous_count")]
    pub anonymous_count: u32,
}

/// POST /api/check-limit
/// Read-only quota probe, safe to call on page load. Never mutates a
/// counter and never returns a 5xx: a malformed body is treated as an empty
/// one, and any internal failure degrades to the permissive anonymous shape
/// (fail-open, availability over strict accounting).
pub async fn check_limit(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    identity: ResolvedIdentity,
    body: web::Bytes,
) -> HttpResponse {
    // Tolerate a missing or malformed body rather than rejecting the probe
    let request: CheckLimitRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        if !body.is_empty() {
            log::debug!("check-limit: unparseable body ({}), using defaults", e);
        }
        CheckLimitRequest::default()
    });

    let status: LimitStatus = QuotaGate::check(
        pool.get_ref(),
        &config.quota,
        &identity.0,
        request.anonymous_count,
    )
    .await;

    HttpResponse::Ok().json(status)
}

/// Configure quota probe routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/check-limit", web::post().to(check_limit));
}
