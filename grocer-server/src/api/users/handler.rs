//! User Administration Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{RoleUpdateRequest, UserActionResponse, UserInfo, UserRole};
use validator::Validate;

use crate::api::auth::handler::duplicate_account;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::db::repository::user::{self, UserUpdate};
use crate::security_log;
use crate::utils::validation::validate_payload;
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdateRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub user_id: i64,
}

fn user_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("user_id", id)
}

/// Admins may not demote or delete the account they are signed in with
fn ensure_not_self(current: &CurrentUser, target: i64, action: &str) -> AppResult<()> {
    if current.id == target {
        security_log!(
            "WARN",
            "self_modification_denied",
            user_id = current.id,
            action = action.to_string()
        );
        return Err(AppError::new(ErrorCode::SelfModificationDenied));
    }
    Ok(())
}

fn map_update_error(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound(_) => user_not_found(id),
        other => duplicate_account(other),
    }
}

/// GET /api/users - every account, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserInfo>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// PUT /api/users/{id}/role - promote or demote
///
/// Takes effect on the user's next login or token refresh.
pub async fn update_role(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<RoleUpdateRequest>,
) -> AppResult<Json<UserActionResponse>> {
    let role: UserRole = req.role.parse()?;
    if role != UserRole::Admin {
        ensure_not_self(&current, id, "demote")?;
    }

    let updated = user::update(
        &state.pool,
        id,
        UserUpdate {
            role: Some(role),
            ..Default::default()
        },
    )
    .await
    .map_err(map_update_error(id))?;

    security_log!(
        "INFO",
        "role_changed",
        admin_id = current.id,
        user_id = updated.id,
        role = updated.role.as_str()
    );

    Ok(Json(UserActionResponse {
        message: "User role updated successfully".to_string(),
        user: UserInfo::from(updated),
    }))
}

/// PUT /api/users/{id} - edit username, email or role
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(mut req): Json<UserUpdateRequest>,
) -> AppResult<Json<UserActionResponse>> {
    req.username = req.username.map(|u| u.trim().to_string());
    req.email = req.email.map(|e| e.trim().to_lowercase());
    validate_payload(&req)?;

    let role = req.role.as_deref().map(str::parse::<UserRole>).transpose()?;
    if role.is_some_and(|r| r != UserRole::Admin) {
        ensure_not_self(&current, id, "demote")?;
    }

    let updated = user::update(
        &state.pool,
        id,
        UserUpdate {
            username: req.username.as_deref(),
            email: req.email.as_deref(),
            password_hash: None,
            role,
        },
    )
    .await
    .map_err(map_update_error(id))?;

    tracing::info!(
        admin_id = current.id,
        user_id = updated.id,
        username = %updated.username,
        role = %updated.role,
        "User updated"
    );

    Ok(Json(UserActionResponse {
        message: "User updated successfully".to_string(),
        user: UserInfo::from(updated),
    }))
}

/// DELETE /api/users/{id} - removes the account with its cart, orders and notifications
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteUserResponse>> {
    ensure_not_self(&current, id, "delete")?;

    if !user::delete(&state.pool, id).await? {
        return Err(user_not_found(id));
    }
    security_log!("INFO", "user_deleted", admin_id = current.id, user_id = id);

    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
        user_id: id,
    }))
}
