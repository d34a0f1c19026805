//! Order lifecycle types
//!
//! - [`OrderStatus`]: the five-state status machine and its transition table
//! - [`OrderType`]: pickup or delivery

pub mod status;

pub use status::{OrderStatus, OrderType, TransitionError, UnknownStatus};

/// Payment method used when the client does not send one
pub const DEFAULT_PAYMENT_METHOD: &str = "cashOnPickup";
