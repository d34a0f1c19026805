//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::repository::{category, product};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_URL_LEN, validate_non_negative, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate};

fn product_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, "Product not found").with_detail("product_id", id)
}

async fn ensure_category(state: &ServerState, category_id: Option<i64>) -> AppResult<()> {
    if let Some(id) = category_id
        && category::find_by_id(&state.pool, id).await?.is_none()
    {
        return Err(AppError::with_message(ErrorCode::CategoryNotFound, "Category not found")
            .with_detail("category_id", id));
    }
    Ok(())
}

/// GET /api/products - all products, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let p = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(Json(p))
}

/// POST /api/products - admin
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    payload.name = payload.name.trim().to_string();
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    validate_non_negative(payload.price, "price")?;
    validate_non_negative(payload.stock, "stock")?;
    ensure_category(&state, payload.category_id).await?;

    let p = product::create(&state.pool, payload).await?;
    tracing::info!(product_id = p.id, name = %p.name, stock = p.stock, "Product created");
    Ok((StatusCode::CREATED, Json(p)))
}

/// PUT /api/products/{id} - admin, partial update
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_non_negative(price, "price")?;
    }
    if let Some(stock) = payload.stock {
        validate_non_negative(stock, "stock")?;
    }
    ensure_category(&state, payload.category_id).await?;

    let p = product::update(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::NotFound(_) => product_not_found(id),
            other => other.into(),
        })?;
    tracing::info!(product_id = id, stock = p.stock, "Product updated");
    Ok(Json(p))
}

/// DELETE /api/products/{id} - admin
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if !product::delete(&state.pool, id).await? {
        return Err(product_not_found(id));
    }
    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(true))
}
