//! Students repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::student::{RegisterStudent, Student},
};

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get student by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Student> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with id {} not found", id)))
    }

    /// Get student by email (primary authentication method)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    /// Check if a student already exists with this email or roll number
    pub async fn identity_exists(&self, email: &str, roll_no: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM students WHERE LOWER(email) = LOWER($1) OR roll_no = $2)",
        )
        .bind(email)
        .bind(roll_no)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new student with an already-hashed password
    pub async fn create(&self, student: &RegisterStudent, password_hash: &str) -> AppResult<Student> {
        let created = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (name, roll_no, department, email, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&student.name)
        .bind(&student.roll_no)
        .bind(student.department.as_deref())
        .bind(&student.email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
