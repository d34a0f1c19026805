//! Contact API Handlers

use axum::{Json, extract::State, http::StatusCode};
use shared::models::{ContactMessage, ContactMessageCreate, ContactMessageResponse};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{contact, user};
use crate::utils::validation::{MAX_DESCRIPTION_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// POST /api/contact - sent under the caller's username and email
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ContactMessageCreate>,
) -> AppResult<(StatusCode, Json<ContactMessageResponse>)> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::validation("Please provide a message."));
    }
    validate_required_text(message, "message", MAX_DESCRIPTION_LEN)?;

    let sender = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    let saved = contact::create(&state.pool, &sender, message).await?;

    tracing::info!(message_id = saved.id, user_id = sender.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(ContactMessageResponse {
            message: "Message sent successfully!".to_string(),
            data: saved,
        }),
    ))
}

/// GET /api/contact - admin, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ContactMessage>>> {
    let messages = contact::find_all(&state.pool).await?;
    Ok(Json(messages))
}
