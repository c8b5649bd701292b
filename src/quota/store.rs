use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppResult;

/// Counter columns of one account row, as read in a single point query
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct AccountCounter {
    pub questions_count: i32,
    pub last_questions_reset: DateTime<Utc>,
    pub is_paid_user: bool,
}

/// Per-account question-counter persistence.
///
/// All operations are single-row reads/updates on the users table. The
/// increment is a plain `count + 1` with no locking or compare-and-swap:
/// concurrent submissions from the same account may lose an update, which is
/// accepted looseness for this counter.
pub struct CounterStore;

impl CounterStore {
    /// Reads the counter state for an account
    pub async fn read(pool: &PgPool, account_id: i32) -> AppResult<AccountCounter> {
        let counter = sqlx::query_as::<_, AccountCounter>(
            r#"
            SELECT questions_count, last_questions_reset, is_paid_user
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_one(pool)
        .await?;

        Ok(counter)
    }

    /// Increments the stored counter by one
    pub async fn increment(pool: &PgPool, account_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET questions_count = questions_count + 1
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Zeroes the counter and starts a fresh window at `now`
    pub async fn reset(pool: &PgPool, account_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET questions_count = 0,
                last_questions_reset = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lazy physical reset followed by the increment for the submission that
    /// triggered it: the elapsed window starts over with one question used.
    pub async fn reset_and_increment(pool: &PgPool, account_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET questions_count = 1,
                last_questions_reset = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
