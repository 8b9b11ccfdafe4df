//! Book model and catalog query types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Lower bound of the fiction classification range (inclusive)
pub const FICTION_FROM: &str = "800";
/// Upper bound of the fiction classification range (inclusive)
pub const FICTION_TO: &str = "900";

/// Book owned by a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Server-assigned primary key
    pub pk: i64,
    pub title: String,
    pub author: String,
    /// Dewey-like classification code, e.g. "813.54"
    pub classification: String,
    /// External work identifier used by the classification service
    pub id: String,
    /// Owning username
    pub user: String,
}

/// Book not yet persisted; the database assigns its primary key
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub classification: String,
    pub id: String,
    pub user: String,
}

#[cfg(test)]
impl Book {
    /// Whether the classification code falls in the fiction range
    pub(crate) fn is_fiction(&self) -> bool {
        is_fiction_code(&self.classification)
    }
}

/// Lexical range check matching `classification BETWEEN '800' AND '900'`
#[cfg(test)]
pub(crate) fn is_fiction_code(code: &str) -> bool {
    code >= FICTION_FROM && code <= FICTION_TO
}

/// Which part of the collection to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookFilter {
    #[default]
    All,
    Fiction,
    Nonfiction,
}

impl BookFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookFilter::All => "all",
            BookFilter::Fiction => "fiction",
            BookFilter::Nonfiction => "nonfiction",
        }
    }

    /// Extra SQL condition appended after the owner restriction
    pub(crate) fn sql_condition(&self) -> String {
        match self {
            BookFilter::All => String::new(),
            BookFilter::Fiction => format!(
                " AND classification BETWEEN '{}' AND '{}'",
                FICTION_FROM, FICTION_TO
            ),
            BookFilter::Nonfiction => format!(
                " AND classification NOT BETWEEN '{}' AND '{}'",
                FICTION_FROM, FICTION_TO
            ),
        }
    }

    /// Parse a value remembered in the session; unknown or empty means `All`
    pub fn from_session(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for BookFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(BookFilter::All),
            "fiction" => Ok(BookFilter::Fiction),
            "nonfiction" => Ok(BookFilter::Nonfiction),
            other => Err(format!("Unknown filter: {}", other)),
        }
    }
}

impl std::fmt::Display for BookFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column the collection is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    #[default]
    Pk,
    Title,
    Author,
    Classification,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Pk => "pk",
            SortColumn::Title => "title",
            SortColumn::Author => "author",
            SortColumn::Classification => "classification",
        }
    }

    /// ORDER BY clause; ties fall back to insertion order
    pub(crate) fn sql_order(&self) -> &'static str {
        match self {
            SortColumn::Pk => "pk",
            SortColumn::Title => "title, pk",
            SortColumn::Author => "author, pk",
            SortColumn::Classification => "classification, pk",
        }
    }

    /// Parse a value remembered in the session; unknown or empty means `Pk`
    pub fn from_session(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pk" => Ok(SortColumn::Pk),
            "title" => Ok(SortColumn::Title),
            "author" => Ok(SortColumn::Author),
            "classification" => Ok(SortColumn::Classification),
            other => Err(format!("Unknown sort column: {}", other)),
        }
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query parameters for `GET /books`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BooksQuery {
    /// Restrict to fiction or nonfiction; remembered in the session
    pub filter: Option<BookFilter>,
    /// Ordering column; remembered in the session
    #[serde(rename = "sortBy")]
    pub sort_by: Option<SortColumn>,
}

/// Query parameters for `PUT /books`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddBookQuery {
    /// External work identifier to look up and add
    pub id: String,
}
