use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::quota::policy::{self, CounterState, IdentityClass};
use crate::quota::CounterStore;
use crate::services::QuestionsService;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    id: i32,
    email: String,
    display_name: Option<String>,
    is_paid_user: bool,
    questions_count: i32,
    questions_left: Option<u32>,
    days_to_reset: Option<i64>,
}

/// GET /api/user/profile
/// The account's profile plus its derived quota window (read-only; reuses
/// the policy, mutates nothing).
pub async fn get_profile(config: web::Data<Config>, user: AuthenticatedUser) -> HttpResponse {
    let user = user.0;

    let class = if user.is_paid_user {
        IdentityClass::Paid
    } else {
        IdentityClass::Free
    };
    let state = CounterState {
        used: user.questions_count.max(0) as u32,
        last_reset: Some(user.last_questions_reset),
    };
    let decision = policy::decide(class, &state, chrono::Utc::now(), &config.quota);

    HttpResponse::Ok().json(ProfileResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        is_paid_user: user.is_paid_user,
        questions_count: user.questions_count,
        questions_left: decision.remaining,
        days_to_reset: decision.days_to_reset,
    })
}

/// POST /api/user/reset-quota
/// Explicitly zeroes the caller's counter and opens a fresh window.
pub async fn reset_quota(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    CounterStore::reset(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/user/questions
/// Lists the caller's saved questions, newest first
pub async fn list_questions(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let questions = QuestionsService::list_for_user(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(questions))
}

/// GET /api/user/questions/{id}
/// Fetches one saved question (owner only)
pub async fn get_question(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let question =
        QuestionsService::get_owned(pool.get_ref(), path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(question))
}

/// DELETE /api/user/questions/{id}
/// Deletes one saved question (owner only)
pub async fn delete_question(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    QuestionsService::delete_owned(pool.get_ref(), path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure account routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/user")
            .route("/profile", web::get().to(get_profile))
            .route("/reset-quota", web::post().to(reset_quota))
            .route("/questions", web::get().to(list_questions))
            .route("/questions/{id}", web::get().to(get_question))
            .route("/questions/{id}", web::delete().to(delete_question)),
    );
}
