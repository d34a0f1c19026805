//! Shared types for the grocer backend
//!
//! Domain models, the order status machine, error codes and the
//! response envelope used by grocer-server and its API clients.

pub mod error;
pub mod live;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use order::{OrderStatus, OrderType};
