use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, User};

pub struct UsersService;

impl UsersService {
    /// Creates a new user. The quota counter columns start at zero with the
    /// first reset window opening now; account creation and counter-row
    /// creation are one INSERT.
    pub async fn create_user(pool: &PgPool, req: &CreateUserRequest) -> AppResult<User> {
        let password_hash = User::hash_password(&req.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, display_name, questions_count, last_questions_reset)
            VALUES ($1, $2, $3, 0, NOW())
            RETURNING id, email, password_hash, display_name, is_active, is_paid_user,
                      questions_count, last_questions_reset, created_at, last_login
            "#,
        )
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.display_name)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Validation("Email already exists".to_string())
            }
            _ => AppError::Internal(format!("Failed to create user: {}", e)),
        })?;

        Ok(user)
    }

    /// Gets a user by email
    pub async fn get_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, is_active, is_paid_user,
                   questions_count, last_questions_reset, created_at, last_login
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID
    pub async fn get_by_id(pool: &PgPool, user_id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, display_name, is_active, is_paid_user,
                   questions_count, last_questions_reset, created_at, last_login
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates the last login timestamp for a user
    pub async fn update_last_login(pool: &PgPool, user_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
