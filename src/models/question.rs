use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A saved question/answer pair belonging to an authenticated user
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: Uuid,
    pub user_id: i32,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}
