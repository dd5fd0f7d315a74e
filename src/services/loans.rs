//! Borrowing ledger service

use crate::{
    error::AppResult,
    models::{book::Book, loan::Loan, student::BorrowedBookView},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for a student
    pub async fn borrow(&self, student_id: i32, book_id: i32) -> AppResult<(Book, Loan)> {
        // Verify student exists
        self.repository.students.get_by_id(student_id).await?;
        self.repository.loans.borrow(student_id, book_id).await
    }

    /// Return a borrowed book
    pub async fn return_book(&self, student_id: i32, book_id: i32) -> AppResult<Book> {
        // Verify student exists
        self.repository.students.get_by_id(student_id).await?;
        self.repository.loans.return_book(student_id, book_id).await
    }

    /// Books currently held by a student
    pub async fn my_borrowed(&self, student_id: i32) -> AppResult<Vec<BorrowedBookView>> {
        // Verify student exists
        self.repository.students.get_by_id(student_id).await?;
        self.repository.loans.student_borrowed(student_id).await
    }
}
