//! Data models for Bookshelf

pub mod book;
pub mod classify;
pub mod user;

// Re-export commonly used types
pub use book::{AddBookQuery, Book, BookFilter, BooksQuery, NewBook, SortColumn};
pub use classify::{ClassificationRecord, SearchResult};
pub use user::{LoginForm, User};
