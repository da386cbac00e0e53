//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//!
//! # Pages (behind the session gate)
//! GET  /cards                       - Card listing
//! GET  /cards/{id}                  - Card detail
//!
//! # Cart API
//! GET    /api/cart                    - Session cart with items
//! POST   /api/cart/items              - Add a product to the cart
//! POST   /api/cart/subscription-items - Add a subscription item
//! DELETE /api/cart/items/{item_id}    - Remove an item
//!
//! # Auth API
//! POST /api/auth/login              - Account-member login
//! POST /api/auth/logout             - Clear the account cookie
//!
//! # Checkout API
//! POST /api/checkout                - Pay, convert the cart to an order,
//!                                     start a fresh cart
//! ```
//!
//! The session gate wraps page routes only. API routes, like the original
//! middleware matcher, are excluded and rely on cookies the gate set on a
//! previous page load.

pub mod auth;
pub mod cards;
pub mod cart;
pub mod checkout;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    request_id_middleware, security_headers_middleware, session_gate_middleware,
};
use crate::state::AppState;

/// Create the page routes router (session-gated).
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/cards", get(cards::index))
        .route("/cards/{id}", get(cards::show))
}

/// Create the API routes router (not session-gated).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/subscription-items", post(cart::add_subscription_item))
        .route("/cart/items/{item_id}", delete(cart::remove_item))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/checkout", post(checkout::checkout))
}

/// Assemble the full application router.
///
/// The cookie manager wraps everything that touches the jar; the session
/// gate is a route layer on pages only, so unmatched paths and API routes
/// never trigger a bootstrap.
pub fn router(state: AppState) -> Router {
    let pages = page_routes()
        .route_layer(from_fn_with_state(state.clone(), session_gate_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .merge(pages)
        .layer(CookieManagerLayer::new())
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
