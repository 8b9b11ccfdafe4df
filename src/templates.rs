//! HTML pages rendered with minijinja
//!
//! Templates are embedded at compile time and auto-escaped (their names end
//! in `.html`).

use minijinja::Environment;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, SortColumn},
};

/// Context for the collection page
#[derive(Debug, Serialize)]
pub struct IndexPage<'a> {
    pub user: &'a str,
    pub filter: BookFilter,
    pub sort: SortColumn,
    pub books: &'a [Book],
}

/// Context for the login / registration form
#[derive(Debug, Default, Serialize)]
pub struct LoginPage {
    pub error: Option<String>,
    pub username: String,
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> AppResult<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../templates/index.html"))?;
        env.add_template("login.html", include_str!("../templates/login.html"))?;
        Ok(Self { env })
    }

    pub fn render_index(&self, page: &IndexPage<'_>) -> AppResult<String> {
        Ok(self.env.get_template("index.html")?.render(page)?)
    }

    pub fn render_login(&self, page: &LoginPage) -> AppResult<String> {
        Ok(self.env.get_template("login.html")?.render(page)?)
    }
}
