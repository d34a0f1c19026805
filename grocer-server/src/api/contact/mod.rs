//! Contact API
//!
//! Any signed-in user can send; only admins read.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/contact", routes())
}

fn routes() -> Router<ServerState> {
    let send_routes = Router::new().route("/", post(handler::create));

    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_admin));

    send_routes.merge(admin_routes)
}
