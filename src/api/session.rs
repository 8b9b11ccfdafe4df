//! Cookie-backed session
//!
//! The whole session is a small string map serialized as JSON, base64
//! encoded, and stored in one signed cookie. A cookie that fails signature
//! verification or decoding is treated as an empty session.

use std::{collections::BTreeMap, convert::Infallible};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use crate::{config::SessionConfig, AppState};

/// Logged-in username
pub const USER: &str = "User";
/// Last collection filter
pub const FILTER: &str = "Filter";
/// Last sort column
pub const SORT_BY: &str = "SortBy";

pub struct Session {
    jar: SignedCookieJar,
    config: SessionConfig,
    values: BTreeMap<String, String>,
    changed: bool,
}

impl Session {
    pub fn from_jar(jar: SignedCookieJar, config: &SessionConfig) -> Self {
        let values = jar
            .get(&config.cookie_name)
            .and_then(|cookie| decode_values(cookie.value()))
            .unwrap_or_default();

        Self {
            jar,
            config: config.clone(),
            values,
            changed: false,
        }
    }

    /// Value for `key`, empty if absent
    pub fn get(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }

    /// Set `key`; an empty value clears it
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.clear(key);
            return;
        }
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.changed = true;
        }
    }

    pub fn clear(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.changed = true;
        }
    }

    /// Username stored at login, if any
    pub fn username(&self) -> Option<String> {
        self.values.get(USER).filter(|u| !u.is_empty()).cloned()
    }

    fn cookie(&self) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), encode_values(&self.values)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure)
            .max_age(time::Duration::hours(self.config.max_age_hours))
            .build()
    }
}

fn encode_values(values: &BTreeMap<String, String>) -> String {
    // BTreeMap<String, String> always serializes
    let json = serde_json::to_vec(values).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_values(raw: &str) -> Option<BTreeMap<String, String>> {
    let json = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice(&json).ok()
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        Ok(Session::from_jar(jar, &state.config.session))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.changed {
            return Ok(res);
        }

        let jar = if self.values.is_empty() {
            let name = self.config.cookie_name.clone();
            self.jar.remove(Cookie::build((name, "")).path("/"))
        } else {
            let cookie = self.cookie();
            self.jar.add(cookie)
        };

        jar.into_response_parts(res)
    }
}
