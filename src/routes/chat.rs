use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{Identity, ResolvedIdentity};
use crate::college::CollegeKb;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::llm::{build_system_prompt, ChatMessage, LlmClient};
use crate::quota::QuotaGate;
use crate::services::QuestionsService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    /// Prior conversation turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Client-local question counter for anonymous visitors
    #[serde(default, alias = "anonymous_count")]
    pub anonymous_count: u32,
    /// When true, the provider's SSE stream is passed through verbatim
    #[serde(default)]
    pub stream: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    answer: String,
    questions_left: Option<u32>,
    days_to_reset: Option<i64>,
    new_anonymous_count: Option<u32>,
}

/// Structured denial surfaced when the quota is exhausted. The client either
/// prompts sign-in (anonymous) or shows the wait period (account).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LimitReachedResponse {
    error: &'static str,
    questions_left: Option<u32>,
    days_to_reset: Option<i64>,
    requires_sign_in: bool,
}

/// POST /api/chat
/// The question-submission entry point. The quota gate runs strictly before
/// the LLM dispatch; a denial costs nothing, a permitted question is counted
/// even if the submission is later cancelled or the provider fails
/// (at-least-counted, never rolled back).
pub async fn chat(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    llm: web::Data<LlmClient>,
    kb: web::Data<CollegeKb>,
    identity: ResolvedIdentity,
    req: web::Json<ChatRequest>,
) -> AppResult<HttpResponse> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_string()));
    }

    let outcome = QuotaGate::submit(
        pool.get_ref(),
        &config.quota,
        &identity.0,
        req.anonymous_count,
    )
    .await;

    if !outcome.can_proceed {
        return Ok(HttpResponse::Forbidden().json(LimitReachedResponse {
            error: "question_limit_reached",
            questions_left: outcome.questions_left,
            days_to_reset: outcome.days_to_reset,
            requires_sign_in: outcome.is_anonymous,
        }));
    }

    // Assemble the conversation: bilingual system prompt (plus curated
    // college context when the question mentions one), prior turns, question
    let context = kb.context_for(&req.message);
    let mut messages = Vec::with_capacity(req.history.len() + 2);
    messages.push(ChatMessage::system(build_system_prompt(context.as_deref())));
    messages.extend(req.history.iter().cloned());
    messages.push(ChatMessage::user(req.message.clone()));

    if req.stream {
        let stream = llm.stream(&messages).await?;
        return Ok(HttpResponse::Ok()
            .content_type("text/event-stream")
            .streaming(stream));
    }

    let answer = llm.complete(&messages).await?;

    // Persist the Q&A for accounts; a failed save never fails the response
    if let Identity::Account { id, .. } = identity.0 {
        if let Err(e) = QuestionsService::save(pool.get_ref(), id, &req.message, &answer).await {
            log::error!("Failed to save question for user {}: {}", id, e);
        }
    }

    Ok(HttpResponse::Ok().json(ChatResponse {
        answer,
        questions_left: outcome.questions_left,
        days_to_reset: outcome.days_to_reset,
        new_anonymous_count: outcome.new_anonymous_count,
    }))
}

/// Configure chat routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/chat", web::post().to(chat));
}
