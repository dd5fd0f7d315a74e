//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblos API",
        version = "0.1.0",
        description = "Campus Library Management REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register_student,
        auth::login_student,
        auth::register_admin,
        auth::login_admin,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::borrow_book,
        loans::return_book,
        loans::my_borrowed,
        // Stats
        stats::get_overview,
    ),
    components(
        schemas(
            // Auth
            auth::StudentLoginRequest,
            auth::AdminLoginRequest,
            auth::LoginResponse,
            crate::models::auth::Role,
            // Books
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::BookStatus,
            crate::models::book::BookCategory,
            crate::models::book::BorrowerEntry,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Accounts
            crate::models::student::Student,
            crate::models::student::RegisterStudent,
            crate::models::student::BorrowedBookView,
            crate::models::admin::Admin,
            crate::models::admin::RegisterAdmin,
            // Loans
            crate::models::loan::Loan,
            loans::BorrowResponse,
            loans::ReturnResponse,
            // Stats
            stats::OverviewStats,
            stats::CategoryCount,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "loans", description = "Borrowing and returns"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
