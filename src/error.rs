//! Error types for the Biblos server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Wire-level error codes. Each borrow/return failure condition gets its
/// own code so API clients can tell them apart without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    BadValue = 5,
    Duplicate = 6,
    NotBorrowable = 7,
    NoCopiesAvailable = 8,
    AlreadyBorrowed = 9,
    NoActiveLoan = 10,
    CopiesStillBorrowed = 11,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("This book is not available for borrowing")]
    BookInactive,

    #[error("No copies available for borrowing")]
    NoCopiesAvailable,

    #[error("You have already borrowed this book")]
    AlreadyBorrowed,

    #[error("You haven't borrowed this book")]
    NoActiveLoan,

    #[error("Cannot delete book. Some copies are currently borrowed.")]
    CopiesStillBorrowed,
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::BookInactive => {
                (StatusCode::CONFLICT, ErrorCode::NotBorrowable, self.to_string())
            }
            AppError::NoCopiesAvailable => {
                (StatusCode::CONFLICT, ErrorCode::NoCopiesAvailable, self.to_string())
            }
            AppError::AlreadyBorrowed => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyBorrowed, self.to_string())
            }
            AppError::NoActiveLoan => {
                (StatusCode::NOT_FOUND, ErrorCode::NoActiveLoan, self.to_string())
            }
            AppError::CopiesStillBorrowed => {
                (StatusCode::CONFLICT, ErrorCode::CopiesStillBorrowed, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
