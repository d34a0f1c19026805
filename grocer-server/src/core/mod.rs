//! Core - configuration, shared state, HTTP server
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - services shared by every handler
//! - [`Server`] - listener and graceful shutdown
//! - [`ServerError`] - startup / runtime failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{AdminBootstrap, Config, StoreConfig};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
