//! Authentication Handlers
//!
//! Register, login, refresh and the current profile (read and update).

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use shared::models::{
    LoginResponse, RefreshResponse, RegisterResponse, UserActionResponse, UserInfo, UserRole,
};
use validator::Validate;

use crate::auth::{CurrentUser, JwtError, password};
use crate::core::ServerState;
use crate::db::repository::user::{self, UserUpdate};
use crate::db::repository::RepoError;
use crate::security_log;
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

const DUPLICATE_ACCOUNT: &str = "Username or email already exists.";

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
}

/// Omitted fields keep their current value
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Unique violation on `users` as the matching account error
pub(crate) fn duplicate_account(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) if msg.contains("email") => {
            AppError::with_message(ErrorCode::EmailExists, DUPLICATE_ACCOUNT)
        }
        RepoError::Duplicate(_) => AppError::with_message(ErrorCode::UsernameExists, DUPLICATE_ACCOUNT),
        other => other.into(),
    }
}

fn invalid_login() -> AppError {
    AppError::with_message(ErrorCode::InvalidCredentials, "Invalid email or password")
}

/// POST /api/auth/register - create a `user` account
pub async fn register(
    State(state): State<ServerState>,
    Json(mut req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    req.username = req.username.trim().to_string();
    req.email = req.email.trim().to_lowercase();
    validate_payload(&req)?;

    if let Some(existing) =
        user::find_by_username_or_email(&state.pool, &req.username, &req.email).await?
    {
        let code = if existing.email.eq_ignore_ascii_case(&req.email) {
            ErrorCode::EmailExists
        } else {
            ErrorCode::UsernameExists
        };
        return Err(AppError::with_message(code, DUPLICATE_ACCOUNT));
    }

    let hash = password::hash_password(&req.password)?;
    let created = user::create(&state.pool, &req.username, &req.email, &hash, UserRole::User)
        .await
        .map_err(duplicate_account)?;

    tracing::info!(user_id = created.id, username = %created.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: created.id,
            role: created.role,
        }),
    ))
}

/// POST /api/auth/login - exchange credentials for tokens
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = req.email.trim().to_lowercase();
    let found = user::find_by_email(&state.pool, &email).await?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match found {
        Some(u) if password::verify_password(&req.password, &u.password_hash) => u,
        Some(u) => {
            security_log!("WARN", "login_failed", user_id = u.id, reason = "invalid_password");
            return Err(invalid_login());
        }
        None => {
            security_log!("WARN", "login_failed", email = email.clone(), reason = "unknown_email");
            return Err(invalid_login());
        }
    };

    let jwt = &state.jwt_service;
    let token = jwt.generate_access_token(account.id, &account.username, account.role)?;
    let refresh_token = jwt.generate_refresh_token(account.id, &account.username, account.role)?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = %account.role,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        refresh_token,
        expires_in: jwt.access_ttl_secs(),
        user: UserInfo::from(account),
    }))
}

/// POST /api/auth/refresh - new access token from a refresh token
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let claims = state
        .jwt_service
        .validate_refresh_token(&req.refresh_token)
        .map_err(|e| {
            security_log!("WARN", "refresh_failed", error = e.to_string());
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid refresh token"),
            }
        })?;
    let holder = CurrentUser::try_from(claims)?;

    // Role may have changed since the refresh token was issued
    let account = user::find_by_id(&state.pool, holder.id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Account no longer exists"))?;

    let token =
        state
            .jwt_service
            .generate_access_token(account.id, &account.username, account.role)?;

    Ok(Json(RefreshResponse {
        token,
        expires_in: state.jwt_service.access_ttl_secs(),
    }))
}

/// GET /api/auth/me - current user's profile
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<Json<UserInfo>> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(UserInfo::from(account)))
}

/// PUT /api/auth/me - update own username, email or password
///
/// Role is not editable here; tokens already issued keep their claims until
/// refreshed.
pub async fn update_profile(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(mut req): Json<ProfileUpdateRequest>,
) -> AppResult<Json<UserActionResponse>> {
    req.username = req.username.map(|u| u.trim().to_string());
    req.email = req.email.map(|e| e.trim().to_lowercase());
    validate_payload(&req)?;

    let hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let updated = user::update(
        &state.pool,
        current.id,
        UserUpdate {
            username: req.username.as_deref(),
            email: req.email.as_deref(),
            password_hash: hash.as_deref(),
            role: None,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::NotFound(_) => AppError::new(ErrorCode::UserNotFound),
        other => duplicate_account(other),
    })?;

    tracing::info!(user_id = updated.id, username = %updated.username, "Profile updated");
    if hash.is_some() {
        security_log!("INFO", "password_changed", user_id = updated.id);
    }

    Ok(Json(UserActionResponse {
        message: "Profile updated successfully".to_string(),
        user: UserInfo::from(updated),
    }))
}
