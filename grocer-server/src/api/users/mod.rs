//! User Administration API
//!
//! Every route is admin-only.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/role", put(handler::update_role))
        .layer(middleware::from_fn(require_admin))
}
