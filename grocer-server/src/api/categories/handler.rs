//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::repository::{RepoError, category};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Category, CategoryCreate};

/// GET /api/categories - sorted by name
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = category::find_all(&state.pool).await?;
    Ok(Json(categories))
}

/// POST /api/categories - admin
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = payload.name.trim();
    validate_required_text(name, "name", MAX_NAME_LEN)?;

    let c = category::create(&state.pool, name).await.map_err(|e| match e {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::CategoryNameExists, msg),
        other => other.into(),
    })?;
    tracing::info!(category_id = c.id, name = %c.name, "Category created");
    Ok((StatusCode::CREATED, Json(c)))
}

/// DELETE /api/categories/{id} - admin; products are uncategorised, not deleted
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !category::delete(&state.pool, id).await? {
        return Err(AppError::with_message(ErrorCode::CategoryNotFound, "Category not found")
            .with_detail("category_id", id));
    }
    tracing::info!(category_id = id, "Category deleted");
    Ok(Json(true))
}
