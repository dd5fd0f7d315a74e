//! Borrowing endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::student::BorrowedBookView};

use super::AuthenticatedUser;

/// Borrow response with updated availability and due date
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    pub message: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub available_copies: i32,
    pub due_date: DateTime<Utc>,
}

/// Return response with updated availability
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    pub title: String,
    pub author: String,
    pub available_copies: i32,
}

/// Borrow a book as the authenticated student
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book borrowed", body = BorrowResponse),
        (status = 403, description = "Students only"),
        (status = 404, description = "Book or student not found"),
        (status = 409, description = "Inactive, no copies available, or already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BorrowResponse>> {
    claims.require_student()?;

    let (book, loan) = state.services.loans.borrow(claims.id, book_id).await?;

    Ok(Json(BorrowResponse {
        message: "Book borrowed successfully".to_string(),
        title: book.title,
        author: book.author,
        isbn: book.isbn,
        available_copies: book.available_copies,
        due_date: loan.due_date,
    }))
}

/// Return a borrowed book as the authenticated student
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 403, description = "Students only"),
        (status = 404, description = "Book, student, or active loan not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_student()?;

    let book = state.services.loans.return_book(claims.id, book_id).await?;

    Ok(Json(ReturnResponse {
        message: "Book returned successfully".to_string(),
        title: book.title,
        author: book.author,
        available_copies: book.available_copies,
    }))
}

/// List books currently held by the authenticated student, each annotated
/// with its due date and overdue flag
#[utoipa::path(
    get,
    path = "/students/me/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Currently borrowed books", body = Vec<BorrowedBookView>),
        (status = 403, description = "Students only"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn my_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowedBookView>>> {
    claims.require_student()?;

    let borrowed = state.services.loans.my_borrowed(claims.id).await?;
    Ok(Json(borrowed))
}
