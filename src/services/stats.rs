//! Statistics service

use sqlx::Row;

use crate::{
    api::stats::{CategoryCount, OverviewStats},
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Catalog overview: copy totals and per-category counts over Active
    /// books only
    pub async fn overview(&self) -> AppResult<OverviewStats> {
        let pool = &self.repository.pool;

        let totals = sqlx::query(
            r#"
            SELECT COUNT(*) AS total_books,
                   COALESCE(SUM(total_copies), 0)::BIGINT AS total_copies,
                   COALESCE(SUM(available_copies), 0)::BIGINT AS available_copies
            FROM books
            WHERE status = 'Active'
            "#,
        )
        .fetch_one(pool)
        .await?;

        let total_books: i64 = totals.try_get("total_books")?;
        let total_copies: i64 = totals.try_get("total_copies")?;
        let available_copies: i64 = totals.try_get("available_copies")?;

        let category_stats = sqlx::query(
            r#"
            SELECT category, COUNT(*) AS count
            FROM books
            WHERE status = 'Active'
            GROUP BY category
            ORDER BY count DESC, category
            "#,
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| CategoryCount {
            category: row.get("category"),
            count: row.get("count"),
        })
        .collect();

        Ok(OverviewStats {
            total_books,
            total_copies,
            available_copies,
            borrowed_copies: total_copies - available_copies,
            category_stats,
        })
    }
}
