//! HTTP API
//!
//! - [`health`] - liveness
//! - [`auth`] - register, login, refresh, profile
//! - [`users`] - admin user management
//! - [`products`] / [`categories`] - catalog
//! - [`carts`] - cart aggregate
//! - [`orders`] - order lifecycle
//! - [`notifications`] - per-user inbox
//! - [`contact`] - contact form
//! - [`live`] - WebSocket push

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;

pub mod auth;
pub mod carts;
pub mod categories;
pub mod contact;
pub mod health;
pub mod live;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator (uuid v4)
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Every route, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(carts::router())
        .merge(orders::router())
        .merge(notifications::router())
        .merge(contact::router())
        .merge(live::router())
}

/// Routes plus the middleware stack; used by the server and by tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        // JWT - runs before routes, injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        // Outermost: every response, including auth rejections, carries the id
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
