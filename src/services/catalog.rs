//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, NewBook, SortColumn},
    repository::Repository,
    services::classify::ClassifyService,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    classify: ClassifyService,
}

impl CatalogService {
    pub fn new(repository: Repository, classify: ClassifyService) -> Self {
        Self { repository, classify }
    }

    /// List the owner's books with the given order and filter
    pub async fn list_books(&self, owner: &str, sort: SortColumn, filter: BookFilter) -> AppResult<Vec<Book>> {
        self.repository.books.list(owner, sort, filter).await
    }

    /// Look a work up by its external identifier and add it to the owner's collection
    pub async fn add_book(&self, owner: &str, external_id: &str) -> AppResult<Book> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(AppError::BadRequest("Work identifier is required".to_string()));
        }

        let record = self.classify.find_by_id(external_id).await?;

        let book = self
            .repository
            .books
            .insert(&NewBook {
                title: record.title,
                author: record.author,
                classification: record.classification,
                id: external_id.to_string(),
                user: owner.to_string(),
            })
            .await?;

        tracing::info!(owner, pk = book.pk, "Added book {:?}", book.title);
        Ok(book)
    }

    /// Remove one of the owner's books
    pub async fn remove_book(&self, owner: &str, pk: i64) -> AppResult<()> {
        self.repository.books.delete(pk, owner).await?;
        tracing::info!(owner, pk, "Removed book");
        Ok(())
    }
}
