//! Classification search endpoint

use axum::{extract::State, Form, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppResult, models::classify::SearchResult, AppState};

use super::CurrentUser;

/// Search form posted by the collection page
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SearchForm {
    /// Title text to look for
    #[serde(default)]
    #[validate(length(min = 1, max = 256))]
    pub search: String,
}

impl SearchForm {
    /// Drop surrounding whitespace so a blank search fails validation
    fn trimmed(self) -> Self {
        Self {
            search: self.search.trim().to_string(),
        }
    }
}

/// Search the classification service by title
#[utoipa::path(
    post,
    path = "/search",
    tag = "search",
    request_body(content = SearchForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Matching works", body = Vec<SearchResult>),
        (status = 400, description = "Empty search"),
        (status = 500, description = "Classification service failure")
    )
)]
pub async fn search(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<SearchForm>,
) -> AppResult<Json<Vec<SearchResult>>> {
    let form = form.trimmed();
    form.validate()?;

    tracing::debug!(user, "Searching for {:?}", form.search);
    let results = state.services.classify.search(&form.search).await?;
    Ok(Json(results))
}
