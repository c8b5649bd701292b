use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Question;

pub struct QuestionsService;

impl QuestionsService {
    /// Saves a question/answer pair for a user
    pub async fn save(
        pool: &PgPool,
        user_id: i32,
        question: &str,
        answer: &str,
    ) -> AppResult<Question> {
        let saved = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (user_id, question, answer)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, question, answer, created_at
            "#,
        )
        .bind(user_id)
        .bind(question)
        .bind(answer)
        .fetch_one(pool)
        .await?;

        Ok(saved)
    }

    /// Lists a user's saved questions, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: i32) -> AppResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, user_id, question, answer, created_at
            FROM questions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(questions)
    }

    /// Gets one question by ID, verifying ownership
    pub async fn get_owned(pool: &PgPool, question_id: Uuid, user_id: i32) -> AppResult<Question> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, user_id, question, answer, created_at
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(question_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))?;

        if question.user_id != user_id {
            // Hide other users' rows rather than admitting they exist
            return Err(AppError::NotFound(format!(
                "Question {} not found",
                question_id
            )));
        }

        Ok(question)
    }

    /// Deletes a question after verifying it belongs to the user
    pub async fn delete_owned(pool: &PgPool, question_id: Uuid, user_id: i32) -> AppResult<()> {
        // Ownership check first; a blind DELETE would leak nothing but would
        // also not distinguish "not found" from "not yours"
        Self::get_owned(pool, question_id, user_id).await?;

        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(question_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
