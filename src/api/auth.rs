//! Authentication endpoints: registration and login for students and admins

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        admin::{Admin, RegisterAdmin},
        auth::Role,
        student::{RegisterStudent, Student},
    },
};

/// Student login request
#[derive(Deserialize, ToSchema)]
pub struct StudentLoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin login request
#[derive(Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// Register a new student account
#[utoipa::path(
    post,
    path = "/auth/student/register",
    tag = "auth",
    request_body = RegisterStudent,
    responses(
        (status = 201, description = "Student registered", body = Student),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email or roll number already registered")
    )
)]
pub async fn register_student(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let student = state.services.auth.register_student(request).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Log in as a student
#[utoipa::path(
    post,
    path = "/auth/student/login",
    tag = "auth",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
pub async fn login_student(
    State(state): State<crate::AppState>,
    Json(request): Json<StudentLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, _student) = state
        .services
        .auth
        .login_student(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        role: Role::Student,
    }))
}

/// Register a new admin account
#[utoipa::path(
    post,
    path = "/auth/admin/register",
    tag = "auth",
    request_body = RegisterAdmin,
    responses(
        (status = 201, description = "Admin registered", body = Admin),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already registered")
    )
)]
pub async fn register_admin(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterAdmin>,
) -> AppResult<(StatusCode, Json<Admin>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let admin = state.services.auth.register_admin(request).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// Log in as an admin
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    tag = "auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Unknown username or wrong password")
    )
)]
pub async fn login_admin(
    State(state): State<crate::AppState>,
    Json(request): Json<AdminLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, _admin) = state
        .services
        .auth
        .login_admin(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        role: Role::Admin,
    }))
}
