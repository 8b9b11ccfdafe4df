//! Registration and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new user with a salted Argon2 hash of the password
    pub async fn register(&self, username: &str, password: &str) -> AppResult<User> {
        if self.repository.users.exists(username).await? {
            return Err(AppError::Conflict(format!("Username {} is already taken", username)));
        }

        let secret = hash_password(password)?;
        let user = self.repository.users.create(username, secret.as_bytes()).await?;

        tracing::info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Authenticate by username and password. Unknown users and wrong
    /// passwords fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let user = self
            .repository
            .users
            .get(username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&user, password)? {
            tracing::debug!(username, "Password mismatch");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!(username, "User logged in");
        Ok(user)
    }

    /// Whether a username resolves to a registered user
    pub async fn exists(&self, username: &str) -> AppResult<bool> {
        self.repository.users.exists(username).await
    }
}

/// Hash password using Argon2
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify password against the stored Argon2 hash
fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let stored = std::str::from_utf8(&user.secret)
        .map_err(|_| AppError::Internal(format!("Stored secret for {} is not UTF-8", user.username)))?;

    let parsed_hash = PasswordHash::new(stored)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
