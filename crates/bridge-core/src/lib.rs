//! # bridge-core
//!
//! Core types and protocol logic for the SoleasPay checkout bridge.
//!
//! This crate provides:
//! - `Currency`, `CurrencyConverter` and `resolve_amount` for settlement
//!   currency resolution
//! - `Order`, `LineItem` and the `OrderStore` / `CartService` seams
//! - `SettingsStore` and the persisted callback namespace
//! - `validate_payload` for structural callback validation
//! - `reconcile` for exactly-once order reconciliation
//! - `BridgeError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use bridge_core::{reconcile, validate_payload, CheckoutPages};
//!
//! // Validate the raw notification from the processor
//! let outcome = validate_payload(&raw)?;
//!
//! // Look up the order and reconcile, exactly once
//! let order = store.find_by_key(&key).await?;
//! let target = reconcile(&store, &cart, &pages, order, outcome).await?;
//!
//! // Redirect the browser (301) to target.url()
//! ```

pub mod callback;
pub mod currency;
pub mod error;
pub mod namespace;
pub mod order;
pub mod reconcile;
pub mod settings;
pub mod store;

// Re-exports for convenience
pub use callback::{validate_payload, CallbackOutcome};
pub use currency::{format_amount, resolve_amount, Currency, CurrencyConverter, ResolvedAmount};
pub use error::{BridgeError, BridgeResult, RejectReason};
pub use namespace::{ensure_callback_namespace, namespace_token, NAMESPACE_PREFIX};
pub use order::{LineItem, Order, OrderStatus};
pub use reconcile::{reconcile, CheckoutPages, RedirectTarget};
pub use settings::{FileSettings, GatewaySettings, MemorySettings, SettingsStore, NAMESPACE_KEY};
pub use store::{Applied, CartService, MemoryCart, MemoryOrderStore, OrderStore};
