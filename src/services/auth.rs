//! Authentication service: registration, login, token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        admin::{Admin, RegisterAdmin},
        auth::{Claims, Role},
        student::{RegisterStudent, Student},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new student account
    pub async fn register_student(&self, request: RegisterStudent) -> AppResult<Student> {
        if self
            .repository
            .students
            .identity_exists(&request.email, &request.roll_no)
            .await?
        {
            return Err(AppError::Conflict(
                "Student already exists with this email or roll number".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let student = self.repository.students.create(&request, &password_hash).await?;

        tracing::info!(student_id = student.id, "student registered");

        Ok(student)
    }

    /// Authenticate a student by email and issue a token
    pub async fn login_student(&self, email: &str, password: &str) -> AppResult<(String, Student)> {
        let student = self
            .repository
            .students
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Student not found".to_string()))?;

        if !verify_password(password, &student.password) {
            return Err(AppError::Authentication("Invalid password".to_string()));
        }

        let token = self.issue_token(student.email.clone(), student.id, Role::Student)?;

        Ok((token, student))
    }

    /// Register a new admin account
    pub async fn register_admin(&self, request: RegisterAdmin) -> AppResult<Admin> {
        if self.repository.admins.username_exists(&request.username).await? {
            return Err(AppError::Conflict("Admin already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let admin = self
            .repository
            .admins
            .create(&request.username, &password_hash)
            .await?;

        tracing::info!(admin_id = admin.id, "admin registered");

        Ok(admin)
    }

    /// Authenticate an admin by username and issue a token
    pub async fn login_admin(&self, username: &str, password: &str) -> AppResult<(String, Admin)> {
        let admin = self
            .repository
            .admins
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Admin not found".to_string()))?;

        if !verify_password(password, &admin.password) {
            return Err(AppError::Authentication("Invalid password".to_string()));
        }

        let token = self.issue_token(admin.username.clone(), admin.id, Role::Admin)?;

        Ok((token, admin))
    }

    fn issue_token(&self, sub: String, id: i32, role: Role) -> AppResult<String> {
        Claims::new(sub, id, role, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))
    }
}

/// Hash a password with argon2 and a fresh random salt
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored argon2 hash
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}
