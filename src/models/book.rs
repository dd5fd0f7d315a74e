//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book lifecycle status. Inactive titles stay in the catalog but cannot
/// be borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookStatus {
    Active,
    Inactive,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Active => "Active",
            BookStatus::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(BookStatus::Active),
            "inactive" => Ok(BookStatus::Inactive),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

impl Default for BookStatus {
    fn default() -> Self {
        BookStatus::Active
    }
}

// SQLx conversions for BookStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BookStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Catalog category. Fixed set of ten values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookCategory {
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Science,
    Technology,
    History,
    Biography,
    Mathematics,
    Engineering,
    Literature,
    Other,
}

impl BookCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCategory::Fiction => "Fiction",
            BookCategory::NonFiction => "Non-Fiction",
            BookCategory::Science => "Science",
            BookCategory::Technology => "Technology",
            BookCategory::History => "History",
            BookCategory::Biography => "Biography",
            BookCategory::Mathematics => "Mathematics",
            BookCategory::Engineering => "Engineering",
            BookCategory::Literature => "Literature",
            BookCategory::Other => "Other",
        }
    }

    /// All ten categories, in catalog display order
    pub fn all() -> &'static [BookCategory] {
        &[
            BookCategory::Fiction,
            BookCategory::NonFiction,
            BookCategory::Science,
            BookCategory::Technology,
            BookCategory::History,
            BookCategory::Biography,
            BookCategory::Mathematics,
            BookCategory::Engineering,
            BookCategory::Literature,
            BookCategory::Other,
        ]
    }
}

impl std::fmt::Display for BookCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fiction" => Ok(BookCategory::Fiction),
            "non-fiction" => Ok(BookCategory::NonFiction),
            "science" => Ok(BookCategory::Science),
            "technology" => Ok(BookCategory::Technology),
            "history" => Ok(BookCategory::History),
            "biography" => Ok(BookCategory::Biography),
            "mathematics" => Ok(BookCategory::Mathematics),
            "engineering" => Ok(BookCategory::Engineering),
            "literature" => Ok(BookCategory::Literature),
            "other" => Ok(BookCategory::Other),
            _ => Err(format!("Invalid book category: {}", s)),
        }
    }
}

// SQLx conversions for BookCategory (stored as TEXT)
impl sqlx::Type<Postgres> for BookCategory {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookCategory {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookCategory {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full book model from database.
/// Invariant: `0 <= available_copies <= total_copies`, and the difference
/// equals the number of active loans for this title.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: BookCategory,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One active borrower of a book, derived from the loan ledger
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowerEntry {
    pub student_id: i32,
    pub student_name: String,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Book with its derived active-borrower list, for detail views
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub borrowed_by: Vec<BorrowerEntry>,
}

/// Catalog query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Filter by category ("All" disables the filter)
    pub category: Option<String>,
    /// Case-insensitive search in title, author, or ISBN
    pub search: Option<String>,
    /// Filter by status (default: Active)
    pub status: Option<BookStatus>,
}

fn default_copies() -> i32 {
    1
}

/// Create book request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    pub category: BookCategory,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    #[validate(range(min = 0, message = "total_copies must be non-negative"))]
    #[serde(default = "default_copies")]
    pub total_copies: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

/// Update book request (admin only). Absent fields are left unchanged.
/// Changing `total_copies` re-derives `available_copies` while preserving
/// the currently-borrowed count.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    pub category: Option<BookCategory>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    #[validate(range(min = 0, message = "total_copies must be non-negative"))]
    pub total_copies: Option<i32>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<BookStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_strings() {
        for category in BookCategory::all() {
            let parsed: BookCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, *category);
        }
        assert_eq!(BookCategory::all().len(), 10);
    }

    #[test]
    fn category_parsing_is_case_insensitive() {
        assert_eq!("non-fiction".parse::<BookCategory>().unwrap(), BookCategory::NonFiction);
        assert_eq!("SCIENCE".parse::<BookCategory>().unwrap(), BookCategory::Science);
        assert!("poetry".parse::<BookCategory>().is_err());
    }

    #[test]
    fn status_parses_and_defaults_to_active() {
        assert_eq!("active".parse::<BookStatus>().unwrap(), BookStatus::Active);
        assert_eq!("Inactive".parse::<BookStatus>().unwrap(), BookStatus::Inactive);
        assert_eq!(BookStatus::default(), BookStatus::Active);
        assert!("retired".parse::<BookStatus>().is_err());
    }
}
