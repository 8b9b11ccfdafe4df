//! Users repository for database operations

use sqlx::AnyPool;

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: AnyPool,
}

impl UsersRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Get user by username
    pub async fn get(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT username, secret FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if username already exists
    pub async fn exists(&self, username: &str) -> AppResult<bool> {
        let found: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Insert a new user with an already hashed secret
    pub async fn create(&self, username: &str, secret: &[u8]) -> AppResult<User> {
        sqlx::query("INSERT INTO users (username, secret) VALUES ($1, $2)")
            .bind(username)
            .bind(secret.to_vec())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::Conflict(format!("Username {} is already taken", username))
                }
                other => AppError::Database(other),
            })?;

        Ok(User {
            username: username.to_string(),
            secret: secret.to_vec(),
        })
    }
}
