//! Startup and runtime failures of the server process
//!
//! Request-level failures are [`AppError`]; this type only covers what can
//! stop the process (bad config, unreachable database, port in use).

use thiserror::Error;

use crate::auth::JwtError;
use crate::db::repository::RepoError;
use crate::utils::AppError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Initialization failed: {0}")]
    Init(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] RepoError),

    #[error("Invalid JWT configuration: {0}")]
    Jwt(#[from] JwtError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
