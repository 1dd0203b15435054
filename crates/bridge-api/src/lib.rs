//! # bridge-api
//!
//! HTTP layer for soleas-bridge-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for order registration and checkout
//! - The namespace-firewalled SoleasPay callback endpoint
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/orders` | Register an order |
//! | GET | `/api/v1/orders/{order_key}` | Fetch order state |
//! | POST | `/api/v1/checkout` | Initiate a SoleasPay session |
//! | GET | `/soleaspay/v1/response/{token}` | SoleasPay callback |
//! | GET | `/checkout/order-received/{order_key}` | Terminal page |
//! | GET | `/cart` | Cart page |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
