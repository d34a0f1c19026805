//! Cart API
//!
//! All routes are authenticated; the acting user comes from the token.

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/me", get(handler::get_mine))
        .route("/user/{user_id}", get(handler::get_for_user))
        .route("/add", post(handler::add))
        .route("/update", put(handler::update))
        .route("/remove", delete(handler::remove))
        .route("/clear/{user_id}", delete(handler::clear))
}
