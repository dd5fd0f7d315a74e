//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Catalog overview statistics (Active books only)
#[derive(Serialize, ToSchema)]
pub struct OverviewStats {
    /// Number of active titles
    pub total_books: i64,
    /// Sum of total_copies over active titles
    pub total_copies: i64,
    /// Sum of available_copies over active titles
    pub available_copies: i64,
    /// Copies currently out on loan
    pub borrowed_copies: i64,
    /// Title counts per category, largest first
    pub category_stats: Vec<CategoryCount>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryCount {
    /// Category label
    pub category: String,
    /// Number of active titles in this category
    pub count: i64,
}

/// Get catalog overview statistics
#[utoipa::path(
    get,
    path = "/books/stats/overview",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Catalog statistics", body = OverviewStats),
        (status = 403, description = "Admin only")
    )
)]
pub async fn get_overview(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<OverviewStats>> {
    claims.require_admin()?;

    let stats = state.services.stats.overview().await?;
    Ok(Json(stats))
}
