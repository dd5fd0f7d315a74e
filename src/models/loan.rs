//! Loan (borrow) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Borrowing period applied to every new loan
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Loan ledger row. Active while `returned_date` is NULL; returned loans
/// are kept as history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub student_id: i32,
    pub book_id: i32,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.returned_date.is_none()
    }
}
