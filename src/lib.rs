//! Bookshelf personal library catalog
//!
//! Users log in, keep a list of their books, filter and sort it, and add new
//! books found through a remote bibliographic classification service.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod templates;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub templates: Arc<templates::Templates>,
    /// Key signing the session cookie
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> AppResult<Self> {
        let cookie_key = match config.session.secret.as_deref() {
            Some(secret) if secret.len() >= config::MIN_SESSION_SECRET_LEN => Key::derive_from(secret.as_bytes()),
            Some(_) => {
                return Err(AppError::Internal(format!(
                    "session secret must be at least {} bytes",
                    config::MIN_SESSION_SECRET_LEN
                )))
            }
            None => {
                tracing::warn!("No session secret configured, generating one; sessions will not survive a restart");
                Key::generate()
            }
        };

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
            templates: Arc::new(templates::Templates::new()?),
            cookie_key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
