//! Loan ledger repository.
//!
//! The ledger is the single source of truth for borrows: one row per loan,
//! active while `returned_date` is NULL. Per-book borrower lists and
//! per-student borrowed lists are derived views. Every mutation pairs the
//! ledger write with the counter update on the book row inside one
//! transaction, so the two can never drift apart.

use chrono::{Duration, Utc};
use sqlx::{FromRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookStatus, BorrowerEntry},
        loan::{Loan, LOAN_PERIOD_DAYS},
        student::BorrowedBookView,
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book: decrement availability and open a loan, atomically.
    ///
    /// The availability guard is re-checked at the point of the decrement
    /// (`WHERE available_copies > 0`), not only at read time, so two
    /// concurrent borrows cannot both take the last copy.
    pub async fn borrow(&self, student_id: i32, book_id: i32) -> AppResult<(Book, Loan)> {
        let now = Utc::now();
        let due_date = now + Duration::days(LOAN_PERIOD_DAYS);

        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book.status != BookStatus::Active {
            return Err(AppError::BookInactive);
        }

        if book.available_copies <= 0 {
            return Err(AppError::NoCopiesAvailable);
        }

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE student_id = $1 AND book_id = $2 AND returned_date IS NULL)",
        )
        .bind(student_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::AlreadyBorrowed);
        }

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1, updated_at = $2
            WHERE id = $1 AND available_copies > 0
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NoCopiesAvailable)?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (student_id, book_id, borrowed_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            student_id,
            book_id,
            available = updated.available_copies,
            "book borrowed"
        );

        Ok((updated, loan))
    }

    /// Return a borrowed book: close the active loan and increment
    /// availability, atomically. The active loan on the student's side is
    /// the authoritative existence check.
    pub async fn return_book(&self, student_id: i32, book_id: i32) -> AppResult<Book> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Lock the book row before touching the ledger
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let closed: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE loans SET returned_date = $3
            WHERE id = (
                SELECT id FROM loans
                WHERE student_id = $1 AND book_id = $2 AND returned_date IS NULL
                ORDER BY borrowed_date
                LIMIT 1
            )
            RETURNING id
            "#,
        )
        .bind(student_id)
        .bind(book_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        if closed.is_none() {
            return Err(AppError::NoActiveLoan);
        }

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET available_copies = available_copies + 1, updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            student_id,
            book_id,
            available = updated.available_copies,
            "book returned"
        );

        Ok(updated)
    }

    /// Active borrowers of a book, oldest loan first
    pub async fn book_borrowers(&self, book_id: i32) -> AppResult<Vec<BorrowerEntry>> {
        let borrowers = sqlx::query_as::<_, BorrowerEntry>(
            r#"
            SELECT l.student_id, s.name AS student_name, l.borrowed_date, l.due_date
            FROM loans l
            JOIN students s ON l.student_id = s.id
            WHERE l.book_id = $1 AND l.returned_date IS NULL
            ORDER BY l.borrowed_date
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(borrowers)
    }

    /// Books currently held by a student, annotated with loan dates and
    /// overdue status
    pub async fn student_borrowed(&self, student_id: i32) -> AppResult<Vec<BorrowedBookView>> {
        let rows = sqlx::query(
            r#"
            SELECT b.*, l.borrowed_date, l.due_date
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.student_id = $1 AND l.returned_date IS NULL
            ORDER BY l.borrowed_date
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let book = Book::from_row(&row)?;
            let borrowed_date = row.try_get("borrowed_date")?;
            let due_date = row.try_get("due_date")?;
            result.push(BorrowedBookView {
                book,
                borrowed_date,
                due_date,
                is_overdue: now > due_date,
            });
        }

        Ok(result)
    }
}
