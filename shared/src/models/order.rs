//! Order Model

use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::order::{OrderStatus, OrderType};

/// Order entity
///
/// Immutable after creation except for `status`, `pickup_time` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// Σ(item.price × item.quantity) at creation, minor units
    pub total_amount: i64,
    pub order_type: OrderType,
    pub payment_method: String,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    /// Unix millis
    pub pickup_deadline: Option<i64>,
    /// Unix millis, stamped on entering ready_for_pickup
    pub pickup_time: Option<i64>,
    pub store_location: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line snapshot
///
/// `price` is the unit price at time of purchase. `product_id` becomes NULL
/// if the product is later deleted; `product_name` keeps the line readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub price: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }
}

/// Order with its items and owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Place order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    /// "pickup" (default) or "delivery"
    pub order_type: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
}

/// Place order response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: i64,
    pub order: OrderDetail,
    /// RFC 3339, pickup orders only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_location: Option<String>,
}

/// Admin status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Status update / cancel response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderActionResponse {
    pub message: String,
    pub order: Order,
}

/// Clear history response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub deleted: u64,
}
