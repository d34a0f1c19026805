//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::notification;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::live::LiveMessage;
use shared::models::{MarkAllReadResponse, Notification};

/// Load a notification the caller owns (404 / 403 otherwise)
async fn find_owned(state: &ServerState, current: &CurrentUser, id: i64) -> AppResult<Notification> {
    let found = notification::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotificationNotFound, "Notification not found")
                .with_detail("notification_id", id)
        })?;
    if found.user_id != current.id {
        return Err(AppError::forbidden(
            "You do not have permission to access this notification",
        ));
    }
    Ok(found)
}

/// Push the fresh unread count to the user's open sockets
async fn push_unread(state: &ServerState, user_id: i64) -> AppResult<()> {
    let count = notification::count_unread(&state.pool, user_id).await?;
    state.hub.send_to(user_id, LiveMessage::Unread { count });
    Ok(())
}

/// GET /api/notifications - newest first
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    Ok(Json(notification::find_by_user(&state.pool, current.id).await?))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Notification>> {
    find_owned(&state, &current, id).await?;
    let updated = notification::mark_read(&state.pool, id).await?;
    push_unread(&state, current.id).await?;
    Ok(Json(updated))
}

/// PUT /api/notifications/mark-all-as-read
pub async fn mark_all_read(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let updated = notification::mark_all_read(&state.pool, current.id).await?;
    state.hub.send_to(current.id, LiveMessage::Unread { count: 0 });
    Ok(Json(MarkAllReadResponse { updated }))
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let found = find_owned(&state, &current, id).await?;
    let deleted = notification::delete(&state.pool, id).await?;
    if !found.is_read {
        push_unread(&state, current.id).await?;
    }
    Ok(Json(deleted))
}
