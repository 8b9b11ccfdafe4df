//! User model and login form

use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

/// Registered user. The secret is an Argon2 PHC string stored as bytes.
#[derive(Clone, FromRow)]
pub struct User {
    pub username: String,
    pub secret: Vec<u8>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Form posted to `/login`. Exactly one of `login` / `register` is set,
/// depending on which button was pressed.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 64))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    #[serde(default)]
    pub password: String,
    pub login: Option<String>,
    pub register: Option<String>,
}

/// What the login form asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAction {
    Login,
    Register,
}

impl LoginForm {
    /// Register wins when both buttons are present
    pub fn action(&self) -> Option<LoginAction> {
        let pressed = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        if pressed(&self.register) {
            Some(LoginAction::Register)
        } else if pressed(&self.login) {
            Some(LoginAction::Login)
        } else {
            None
        }
    }
}
