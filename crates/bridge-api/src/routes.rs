//! # Routes
//!
//! Axum router configuration for the checkout bridge.
//!
//! Routes:
//! - API:
//!   - POST /api/v1/orders - Register an order
//!   - GET  /api/v1/orders/{order_key} - Fetch order state
//!   - POST /api/v1/checkout - Initiate a SoleasPay session
//!
//! - Callback:
//!   - GET /soleaspay/v1/response/{token} - Processor callback; the token
//!     must match the namespace persisted at install time
//!
//! - Static pages:
//!   - GET /checkout/order-received/{order_key} - Terminal page
//!   - GET /cart - Cart page (soft-failure redirect target)

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - the checkout frontend calls the API cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/orders", post(handlers::create_order))
        .route("/orders/{order_key}", get(handlers::get_order))
        .route("/checkout", post(handlers::create_checkout));

    let page_routes = Router::new()
        .route("/order-received/{order_key}", get(handlers::order_received));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Terminal pages
        .nest("/checkout", page_routes)
        .route("/cart", get(handlers::cart_page))
        // API v1
        .nest("/api/v1", api_routes)
        // Callback route registered for every method so the handler can
        // answer non-GET with the same blunt 404 as a token mismatch
        .route(
            "/soleaspay/v1/response/{token}",
            any(handlers::soleaspay_callback),
        )
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
