//! Book collection endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{AddBookQuery, Book, BookFilter, BooksQuery, SortColumn},
    AppState,
};

use super::{
    session::{Session, FILTER, SORT_BY},
    CurrentUser,
};

/// List the current user's books
///
/// A `filter` or `sortBy` given here is remembered in the session and applies
/// to later listings until changed.
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BooksQuery),
    responses(
        (status = 200, description = "Books of the current user", body = Vec<Book>),
        (status = 400, description = "Unknown filter or sort column")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut session: Session,
    Query(query): Query<BooksQuery>,
) -> AppResult<(Session, Json<Vec<Book>>)> {
    let filter = match query.filter {
        Some(filter) => {
            session.set(FILTER, filter.as_str());
            filter
        }
        None => BookFilter::from_session(&session.get(FILTER)),
    };

    let sort = match query.sort_by {
        Some(sort) => {
            session.set(SORT_BY, sort.as_str());
            sort
        }
        None => SortColumn::from_session(&session.get(SORT_BY)),
    };

    let books = state.services.catalog.list_books(&user, sort, filter).await?;
    Ok((session, Json(books)))
}

/// Look a work up by identifier and add it to the current user's books
#[utoipa::path(
    put,
    path = "/books",
    tag = "books",
    params(AddBookQuery),
    responses(
        (status = 201, description = "Book added", body = Book),
        (status = 404, description = "Unknown work identifier"),
        (status = 500, description = "Classification service failure")
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AddBookQuery>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.add_book(&user, &query.id).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Remove one of the current user's books
#[utoipa::path(
    delete,
    path = "/books/{pk}",
    tag = "books",
    params(
        ("pk" = i64, Path, description = "Book primary key")
    ),
    responses(
        (status = 204, description = "Book removed"),
        (status = 404, description = "No such book in the current user's collection")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.catalog.remove_book(&user, pk).await?;
    Ok(StatusCode::NO_CONTENT)
}
