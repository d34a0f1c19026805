//! Data models
//!
//! Shared between grocer-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps are Unix millis.

pub mod cart;
pub mod category;
pub mod contact;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use cart::*;
pub use category::*;
pub use contact::*;
pub use notification::*;
pub use order::*;
pub use product::*;
pub use user::*;
