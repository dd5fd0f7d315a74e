//! Student model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Student account. The role is fixed: every row in the students table
/// authenticates with role "student".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub roll_no: String,
    pub department: Option<String>,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Student registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterStudent {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Roll number is required"))]
    pub roll_no: String,
    pub department: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// A book currently held by a student, annotated with loan dates,
/// derived from the loan ledger
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowedBookView {
    #[serde(flatten)]
    pub book: Book,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub is_overdue: bool,
}
