//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity
///
/// `stock` is the stock ledger: only order placement decrements it, and the
/// table constraint keeps it at or above zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor units (satang)
    pub price: i64,
    pub stock: i64,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
}
