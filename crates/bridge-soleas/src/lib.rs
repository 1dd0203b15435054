//! # bridge-soleas
//!
//! SoleasPay connector for the checkout bridge.
//!
//! This crate provides:
//!
//! 1. **SoleasGateway** — the Session Initiator
//!    - Resolves the settlement amount (converting at most once)
//!    - Submits the form-encoded session request to the hosted checkout
//!    - Renders the one-time auto-submitting bridge document
//!
//! 2. **SoleasConverter** — the HTTP currency converter behind the
//!    `CurrencyConverter` seam
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bridge_soleas::SoleasGateway;
//!
//! // Create gateway from environment
//! let gateway = SoleasGateway::from_env()?;
//!
//! // Initiate a session; the storefront injects and submits the
//! // returned bridge document exactly once
//! let session = gateway.create_session(&order, &callback_url).await?;
//! ```

pub mod config;
pub mod convert;
pub mod session;

// Re-exports
pub use config::{SoleasConfig, CHECKOUT_URI, CONVERT_URI, REQUEST_TIMEOUT_SECS};
pub use convert::SoleasConverter;
pub use session::{render_bridge_document, SessionPayload, SessionResult, SoleasGateway};
