use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{Claims, PasswordService};
use crate::error::{AppError, DomainError};
use crate::extract::ApiJson;
use crate::state::AppState;
use infra::models::UserRow;
use infra::repos::{users, CreateUserData, UserRole};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// `player` (default) or `venue_owner`
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserRow,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_string();

    if !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }

    let role = match req.role.as_deref() {
        None => UserRole::Player,
        Some(value) => value
            .parse::<UserRole>()
            .map_err(AppError::BadRequest)?,
    };
    if role == UserRole::Admin {
        return Err(DomainError::Forbidden("administrators cannot self-register".to_string()).into());
    }

    PasswordService::validate_password_strength(&req.password)?;

    if users::get_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::BadRequest(
            "User with this email already exists".to_string(),
        ));
    }
    if users::get_by_username(&state.db, &username).await?.is_some() {
        return Err(AppError::BadRequest("Username is already taken".to_string()));
    }

    let password_hash = PasswordService::hash_password(&req.password)?;

    let user = users::create(
        &state.db,
        CreateUserData {
            email,
            username,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            role,
        },
    )
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            AppError::BadRequest("User with this email or username already exists".to_string())
        }
        _ => AppError::Db(e),
    })?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");
    issue_token(&state, user)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = users::get_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !PasswordService::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    issue_token(&state, user)
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<UserRow>, AppError> {
    let Extension(claims) =
        claims.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

    let user = users::get_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(user))
}

fn issue_token(state: &AppState, user: UserRow) -> Result<Json<AuthResponse>, AppError> {
    let token = state
        .jwt_service()
        .create_token(user.id, user.email.clone(), user.role.as_str().to_string())?;

    Ok(Json(AuthResponse { token, user }))
}
