//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/orders | POST | user |
//! | /api/orders/{id} | GET | owner or admin |
//! | /api/orders/{id}/cancel | PUT | owner or admin |
//! | /api/orders/user/{user_id} | GET | owner or admin |
//! | /api/orders/user/clear-history | DELETE | user |
//! | /api/orders/admin | GET | admin |
//! | /api/orders/admin/{id}/status | PUT | admin |
//! | /api/orders/admin/clear-history | DELETE | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/", post(handler::place))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", put(handler::cancel))
        .route("/user/clear-history", delete(handler::clear_my_history))
        .route("/user/{user_id}", get(handler::list_for_user));

    let admin_routes = Router::new()
        .route("/admin", get(handler::list_all))
        .route("/admin/{id}/status", put(handler::update_status))
        .route("/admin/clear-history", delete(handler::clear_all_history))
        .layer(middleware::from_fn(require_admin));

    user_routes.merge(admin_routes)
}
