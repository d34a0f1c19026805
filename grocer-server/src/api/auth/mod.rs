//! Authentication Routes
//!
//! register / login / refresh are public; me (read and update) goes through
//! the global `require_auth` middleware.

pub(crate) mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/refresh", post(handler::refresh))
        .route("/api/auth/me", get(handler::me).put(handler::update_profile))
}
