//! Order API Handlers
//!
//! Thin wrappers over [`crate::orders::OrderEngine`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{
    ClearHistoryResponse, OrderActionResponse, OrderDetail, PlaceOrderRequest, PlaceOrderResponse,
    UpdateStatusRequest,
};
use shared::order::OrderStatus;

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminClearQuery {
    pub user_id: Option<i64>,
}

/// POST /api/orders - place an order from the caller's cart
pub async fn place(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<PlaceOrderResponse>)> {
    let placed = state.orders.place_order(&current, req).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    Ok(Json(state.orders.order_detail(&current, id).await?))
}

/// PUT /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderActionResponse>> {
    let order = state.orders.cancel(&current, id).await?;
    Ok(Json(OrderActionResponse {
        message: "Order cancelled successfully".to_string(),
        order,
    }))
}

/// GET /api/orders/user/{user_id} - newest first
pub async fn list_for_user(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    Ok(Json(state.orders.orders_for_user(&current, user_id).await?))
}

/// DELETE /api/orders/user/clear-history - caller's picked-up / cancelled orders
pub async fn clear_my_history(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ClearHistoryResponse>> {
    let deleted = state.orders.clear_history(Some(current.id)).await?;
    Ok(Json(ClearHistoryResponse { deleted }))
}

/// GET /api/orders/admin?status= - every order
pub async fn list_all(
    State(state): State<ServerState>,
    Query(query): Query<AdminListQuery>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<OrderStatus>())
        .transpose()?;
    Ok(Json(state.orders.all_orders(status).await?))
}

/// PUT /api/orders/admin/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderActionResponse>> {
    let target = req.status.trim().parse::<OrderStatus>()?;
    let order = state.orders.update_status(id, target).await?;
    Ok(Json(OrderActionResponse {
        message: "Order status updated successfully".to_string(),
        order,
    }))
}

/// DELETE /api/orders/admin/clear-history?user_id= - all users, or one
pub async fn clear_all_history(
    State(state): State<ServerState>,
    Query(query): Query<AdminClearQuery>,
) -> AppResult<Json<ClearHistoryResponse>> {
    let deleted = state.orders.clear_history(query.user_id).await?;
    Ok(Json(ClearHistoryResponse { deleted }))
}
