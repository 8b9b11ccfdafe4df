//! OpenAPI documentation for the JSON endpoints

use axum::Json;
use utoipa::OpenApi;

use crate::api::{books, search};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "0.1.0",
        description = "Personal library catalog JSON API. All endpoints require a logged-in session cookie."
    ),
    paths(
        books::list_books,
        books::add_book,
        books::delete_book,
        search::search,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::BookFilter,
            crate::models::book::SortColumn,
            crate::models::classify::SearchResult,
            crate::models::classify::ClassificationRecord,
            search::SearchForm,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "books", description = "Book collection"),
        (name = "search", description = "Classification service search")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
