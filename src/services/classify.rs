//! Client for the remote classification service
//!
//! Lookups are plain HTTP GETs with query-string parameters; the XML answers
//! are decoded by `models::classify`.

use std::time::Duration;

use crate::{
    config::ClassifyConfig,
    error::{AppError, AppResult},
    models::classify::{parse_search_document, parse_work_document, ClassificationRecord, SearchResult},
};

#[derive(Clone)]
pub struct ClassifyService {
    client: reqwest::Client,
    base_url: String,
}

impl ClassifyService {
    pub fn new(config: &ClassifyConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("bookshelf-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Search works by title
    pub async fn search(&self, title: &str) -> AppResult<Vec<SearchResult>> {
        tracing::debug!(title, "Classification search");

        let body = self.fetch(&[("title", title)]).await?;
        let results = parse_search_document(&body)?;

        tracing::info!("Classification search for {:?} returned {} works", title, results.len());
        Ok(results)
    }

    /// Look up one work by identifier, with its most popular classification
    pub async fn find_by_id(&self, work_id: &str) -> AppResult<ClassificationRecord> {
        tracing::debug!(work_id, "Classification lookup");

        let body = self.fetch(&[("owi", work_id)]).await?;
        parse_work_document(&body, work_id)
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> AppResult<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("summary", "true")])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Classification service unreachable: {}", e);
                AppError::Classify(format!("Failed to reach classification service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Classify(format!(
                "Classification service answered {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Classify(format!("Failed to read classification response: {}", e)))
    }
}
