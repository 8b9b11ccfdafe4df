//! Books repository for database operations

use sqlx::AnyPool;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, NewBook, SortColumn},
};

const BOOK_COLUMNS: &str = r#"pk, title, author, classification, id, "user""#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: AnyPool,
}

impl BooksRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// List an owner's books, filtered and ordered
    pub async fn list(&self, owner: &str, sort: SortColumn, filter: BookFilter) -> AppResult<Vec<Book>> {
        let query = format!(
            r#"SELECT {} FROM books WHERE "user" = $1{} ORDER BY {}"#,
            BOOK_COLUMNS,
            filter.sql_condition(),
            sort.sql_order()
        );

        let books = sqlx::query_as::<_, Book>(&query)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Get one of an owner's books
    #[cfg(test)]
    pub(crate) async fn get(&self, pk: i64, owner: &str) -> AppResult<Book> {
        let query = format!(
            r#"SELECT {} FROM books WHERE pk = $1 AND "user" = $2"#,
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(pk)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with pk {} not found", pk)))
    }

    /// Insert a book; the primary key is assigned by the database
    pub async fn insert(&self, book: &NewBook) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books (title, author, classification, id, "user")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let created = sqlx::query_as::<_, Book>(&query)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.classification)
            .bind(&book.id)
            .bind(&book.user)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Delete one of an owner's books. Another user's book is reported as not found.
    pub async fn delete(&self, pk: i64, owner: &str) -> AppResult<()> {
        let result = sqlx::query(r#"DELETE FROM books WHERE pk = $1 AND "user" = $2"#)
            .bind(pk)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with pk {} not found", pk)));
        }

        Ok(())
    }
}
