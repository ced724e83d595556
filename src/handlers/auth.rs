//! Registration, login, and logout.

use axum::{extract::State, http::StatusCode, Json};
use tower_sessions::Session;
use validator::Validate;

use crate::dtos::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserResponse};
use crate::error::AppError;
use crate::middleware::session::{SESSION_ROLE_KEY, SESSION_USERNAME_KEY};
use crate::models::User;
use crate::utils::password::{hash_password, verify_password};
use crate::AppState;

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    req.validate()?;

    let existing = state
        .users
        .find_by_username(&req.username)
        .await
        .map_err(AppError::DatabaseError)?;
    if existing.is_some() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Username already exists"
        )));
    }

    let password_hash = hash_password(&req.password)?;
    let user = User {
        username: req.username.clone(),
        password_hash,
        role: req.role,
    };
    state.users.insert(user).await.map_err(AppError::DatabaseError)?;

    tracing::info!(username = %req.username, role = req.role.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .users
        .find_by_username(&req.username)
        .await
        .map_err(AppError::DatabaseError)?;

    let Some(user) = user else {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid username or password"
        )));
    };
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid username or password"
        )));
    }

    session
        .insert(SESSION_USERNAME_KEY, &user.username)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Session error: {}", e)))?;
    session
        .insert(SESSION_ROLE_KEY, user.role)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Session error: {}", e)))?;

    tracing::info!(username = %user.username, "Login successful");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: UserResponse::from(user),
    }))
}

/// POST /logout
pub async fn logout(session: Session) -> Result<Json<MessageResponse>, AppError> {
    session
        .flush()
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Session error: {}", e)))?;

    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}
