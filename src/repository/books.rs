//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if an ISBN is already taken by another book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search the catalog. Status defaults to Active, a category of "All"
    /// disables the category filter, and search matches title, author or
    /// ISBN case-insensitively. Newest first.
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        let status = query.status.unwrap_or_default();
        params.push(status.as_str().to_string());
        conditions.push(format!("status = ${}", params.len()));

        if let Some(ref category) = query.category {
            if !category.eq_ignore_ascii_case("all") {
                params.push(category.clone());
                conditions.push(format!("category = ${}", params.len()));
            }
        }

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", search.to_lowercase()));
            conditions.push(format!(
                "(LOWER(title) LIKE ${n} OR LOWER(author) LIKE ${n} OR LOWER(isbn) LIKE ${n})",
                n = params.len()
            ));
        }

        let select_query = format!(
            "SELECT * FROM books WHERE {} ORDER BY created_at DESC",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, Book>(&select_query);
        for param in &params {
            builder = builder.bind(param);
        }
        let books = builder.fetch_all(&self.pool).await?;

        Ok(books)
    }

    /// Create a new book. All copies start available.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, isbn, category, publisher, published_year,
                total_copies, available_copies, description, cover_image
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.category)
        .bind(book.publisher.as_deref())
        .bind(book.published_year)
        .bind(book.total_copies)
        .bind(book.description.as_deref())
        .bind(book.cover_image.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book. Absent fields keep their current value. A change to
    /// `total_copies` re-derives `available_copies` so that the number of
    /// currently-borrowed copies is preserved; the update is rejected when
    /// the new total is below that count. Runs in a transaction so a
    /// concurrent borrow cannot slip between the read and the write.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let (total_copies, available_copies) = match update.total_copies {
            Some(new_total) => {
                let borrowed = current.total_copies - current.available_copies;
                let available = new_total - borrowed;
                if available < 0 {
                    return Err(AppError::Conflict(format!(
                        "Cannot reduce total copies below {} (currently borrowed)",
                        borrowed
                    )));
                }
                (new_total, available)
            }
            None => (current.total_copies, current.available_copies),
        };

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = $2, author = $3, isbn = $4, category = $5,
                publisher = $6, published_year = $7, total_copies = $8,
                available_copies = $9, description = $10, cover_image = $11,
                status = $12, updated_at = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref().unwrap_or(&current.title))
        .bind(update.author.as_deref().unwrap_or(&current.author))
        .bind(update.isbn.as_deref().unwrap_or(&current.isbn))
        .bind(update.category.unwrap_or(current.category))
        .bind(update.publisher.as_deref().or(current.publisher.as_deref()))
        .bind(update.published_year.or(current.published_year))
        .bind(total_copies)
        .bind(available_copies)
        .bind(update.description.as_deref().or(current.description.as_deref()))
        .bind(update.cover_image.as_deref().or(current.cover_image.as_deref()))
        .bind(update.status.unwrap_or(current.status))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a book. Only allowed while no copies are out on loan.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if book.available_copies < book.total_copies {
            return Err(AppError::CopiesStillBorrowed);
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
