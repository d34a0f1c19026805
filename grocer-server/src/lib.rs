//! Grocer Server - grocery store backend
//!
//! # Module layout
//!
//! ```text
//! grocer-server/src/
//! ├── core/           # config, state, server
//! ├── auth/           # JWT, argon2, middleware, extractor
//! ├── db/             # SQLite pool, migrations, repositories
//! ├── orders/         # lifecycle engine, stock ledger, pickup deadline
//! ├── notifications/  # notification sink
//! ├── live/           # per-user connection registry
//! ├── api/            # HTTP routers and handlers
//! └── utils/          # errors, logger, time, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod live;
pub mod notifications;
pub mod orders;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use live::ConnectionHub;
pub use notifications::NotificationService;
pub use orders::OrderEngine;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - accepts tracing field syntax
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   ____
  / ___|_ __ ___   ___ ___ _ __
 | |  _| '__/ _ \ / __/ _ \ '__|
 | |_| | | | (_) | (_|  __/ |
  \____|_|  \___/ \___\___|_|
    "#
    );
}
