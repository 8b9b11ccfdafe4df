//! Configuration management for Bookshelf server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Minimum length of the session signing secret, in bytes
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    pub fn from_env() -> Self {
        match env::var("RUN_MODE").as_deref() {
            Ok("production") => RunMode::Production,
            _ => RunMode::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Production => "production",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie signing secret. Required in production.
    pub secret: Option<String>,
    pub cookie_name: String,
    pub max_age_hours: i64,
    /// Send the cookie over HTTPS only
    pub secure: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifyConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub run_mode: RunMode,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub classify: ClassifyConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = RunMode::from_env();

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode.as_str())).required(false))
            // Add environment variables (with prefix BOOKSHELF_)
            .add_source(
                Environment::with_prefix("BOOKSHELF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("run_mode", run_mode.as_str())?
            // Override database URL from DATABASE_URL env var if present
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            // Override session secret from SESSION_SECRET env var if present
            .set_override_option("session.secret", env::var("SESSION_SECRET").ok())?
            // Override listening port from PORT env var if present
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check rules that depend on the run mode
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = self.session.secret.as_deref() {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(ConfigError::Message(format!(
                    "session.secret must be at least {} bytes",
                    MIN_SESSION_SECRET_LEN
                )));
            }
        }

        if self.run_mode == RunMode::Production {
            if self.session.secret.is_none() {
                return Err(ConfigError::Message(
                    "session.secret (or SESSION_SECRET) is required in production".to_string(),
                ));
            }
            if !self.database.url.starts_with("postgres") {
                return Err(ConfigError::Message(
                    "production mode requires a PostgreSQL database.url (or DATABASE_URL)".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://dev.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            cookie_name: "bookshelf_session".to_string(),
            max_age_hours: 24 * 7,
            secure: false,
        }
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://classify.oclc.org/classify2/Classify".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
