//! Repository layer for database operations
//!
//! All statements go through sqlx's `Any` driver so the same queries run on
//! SQLite (development, tests) and PostgreSQL (production). Placeholders are
//! written as `$n`, which both backends accept.

pub mod books;
pub mod users;

use sqlx::{any::AnyPoolOptions, AnyPool};

use crate::{config::DatabaseConfig, error::AppResult};

/// Database engine behind a connection URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Backend::Postgres
        } else {
            Backend::Sqlite
        }
    }
}

/// Open a connection pool for the configured database
pub async fn connect(config: &DatabaseConfig) -> AppResult<AnyPool> {
    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect(&config.url)
        .await?;

    Ok(pool)
}

/// Apply the embedded migrations for the given backend
pub async fn migrate(pool: &AnyPool, backend: Backend) -> AppResult<()> {
    let migrator = match backend {
        Backend::Sqlite => sqlx::migrate!("./migrations/sqlite"),
        Backend::Postgres => sqlx::migrate!("./migrations/postgres"),
    };

    migrator
        .run(pool)
        .await
        .map_err(|e| crate::error::AppError::Database(e.into()))?;

    Ok(())
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: AnyPool,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: AnyPool) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check the database answers a trivial query
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// In-memory SQLite repository for tests. A single connection keeps every
/// query on the same in-memory database.
#[cfg(test)]
pub(crate) async fn test_repository() -> Repository {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let pool = connect(&config).await.expect("connect to in-memory sqlite");
    migrate(&pool, Backend::Sqlite).await.expect("run migrations");
    Repository::new(pool)
}
