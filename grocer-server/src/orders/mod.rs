//! Order lifecycle
//!
//! - [`engine`] - placement, status changes, cancellation, history
//! - [`stock`] - stock ledger checks and guarded decrements
//! - [`pickup`] - pickup deadline computation

pub mod engine;
pub mod pickup;
pub mod stock;

pub use engine::OrderEngine;
pub use pickup::compute_pickup_deadline;
