//! Cart Model

use serde::{Deserialize, Serialize};

/// Cart entity (one per user)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cart line row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cart line joined with the live product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub product_name: String,
    /// Current unit price in minor units
    pub price: i64,
    /// Current recorded stock
    pub stock: i64,
    pub image_url: Option<String>,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }
}

/// Cart aggregate as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub id: i64,
    pub user_id: i64,
    pub items: Vec<CartLine>,
    pub subtotal: i64,
    pub updated_at: i64,
}

impl CartView {
    pub fn new(cart: Cart, items: Vec<CartLine>) -> Self {
        let subtotal = items.iter().map(CartLine::line_total).sum();
        Self {
            id: cart.id,
            user_id: cart.user_id,
            items,
            subtotal,
            updated_at: cart.updated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add / update line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Remove line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRemoveRequest {
    pub product_id: i64,
}
