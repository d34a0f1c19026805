//! Cart API Handlers
//!
//! Every mutation re-checks the line against live stock. Stock is only
//! taken when the order is placed.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{cart, product};
use crate::orders::stock;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{CartLineRequest, CartRemoveRequest, CartView, Product};

/// Ensure the cart exists and load it with its lines
async fn load_view(state: &ServerState, user_id: i64) -> AppResult<CartView> {
    let c = cart::ensure_cart(&state.pool, user_id).await?;
    let lines = cart::find_lines(&state.pool, c.id).await?;
    Ok(CartView::new(c, lines))
}

async fn find_product(state: &ServerState, product_id: i64) -> AppResult<Product> {
    product::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, "Product not found")
                .with_detail("product_id", product_id)
        })
}

fn item_not_in_cart(product_id: i64) -> AppError {
    AppError::with_message(ErrorCode::CartItemNotFound, "Item not found in cart")
        .with_detail("product_id", product_id)
}

/// GET /api/carts/me
pub async fn get_mine(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<CartView>> {
    Ok(Json(load_view(&state, current.id).await?))
}

/// GET /api/carts/user/{user_id} - owner or admin
pub async fn get_for_user(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<CartView>> {
    current.ensure_can_access(user_id)?;
    Ok(Json(load_view(&state, user_id).await?))
}

/// POST /api/carts/add - add to a line, merging with any existing quantity
pub async fn add(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<CartLineRequest>,
) -> AppResult<Json<CartView>> {
    if req.quantity < 1 {
        return Err(AppError::validation("Quantity must be at least 1"));
    }
    let p = find_product(&state, req.product_id).await?;
    let c = cart::ensure_cart(&state.pool, current.id).await?;

    let existing = cart::find_item(&state.pool, c.id, p.id)
        .await?
        .map(|item| item.quantity);
    let quantity = stock::check_add(&p, existing, req.quantity)?;
    cart::set_quantity(&state.pool, c.id, p.id, quantity).await?;

    tracing::debug!(user_id = current.id, product_id = p.id, quantity, "Cart line added");
    Ok(Json(load_view(&state, current.id).await?))
}

/// PUT /api/carts/update - set a line's quantity; zero or less removes it
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<CartLineRequest>,
) -> AppResult<Json<CartView>> {
    let c = cart::ensure_cart(&state.pool, current.id).await?;
    if cart::find_item(&state.pool, c.id, req.product_id)
        .await?
        .is_none()
    {
        return Err(item_not_in_cart(req.product_id));
    }

    if req.quantity <= 0 {
        cart::remove_item(&state.pool, c.id, req.product_id).await?;
    } else {
        let p = find_product(&state, req.product_id).await?;
        stock::check_set(&p, req.quantity)?;
        cart::set_quantity(&state.pool, c.id, p.id, req.quantity).await?;
    }

    Ok(Json(load_view(&state, current.id).await?))
}

/// DELETE /api/carts/remove - drop one line
pub async fn remove(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<CartRemoveRequest>,
) -> AppResult<Json<CartView>> {
    let c = cart::ensure_cart(&state.pool, current.id).await?;
    if !cart::remove_item(&state.pool, c.id, req.product_id).await? {
        return Err(item_not_in_cart(req.product_id));
    }
    Ok(Json(load_view(&state, current.id).await?))
}

/// DELETE /api/carts/clear/{user_id} - owner or admin
pub async fn clear(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<CartView>> {
    current.ensure_can_access(user_id)?;
    let c = cart::ensure_cart(&state.pool, user_id).await?;
    let removed = cart::clear(&state.pool, c.id).await?;

    tracing::info!(user_id, cleared_by = current.id, removed, "Cart cleared");
    Ok(Json(load_view(&state, user_id).await?))
}
