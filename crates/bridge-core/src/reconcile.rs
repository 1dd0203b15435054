//! # Reconciliation Engine
//!
//! Maps a validated callback outcome onto the order it belongs to, exactly
//! once. The at-most-once guarantee lives in the order store's gated
//! transitions; this module owns the sequencing, the cart side effects and
//! the redirect the browser ends up on.

use crate::callback::CallbackOutcome;
use crate::error::BridgeResult;
use crate::order::Order;
use crate::store::{Applied, CartService, OrderStore};
use tracing::{info, warn};

/// Terminal pages reconciliation redirects to
#[derive(Debug, Clone)]
pub struct CheckoutPages {
    /// Base URL of the storefront (e.g. "https://shop.example")
    pub base_url: String,
}

impl CheckoutPages {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The order-received page for a reconciled order
    pub fn order_received_url(&self, order_key: &str) -> String {
        format!("{}/checkout/order-received/{}", self.base_url, order_key)
    }

    /// The cart page, where ambiguous callbacks are sent
    pub fn cart_url(&self) -> String {
        format!("{}/cart", self.base_url)
    }
}

impl Default for CheckoutPages {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

/// Where the browser is sent after a callback, always via HTTP 301
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Terminal page for the reconciled order
    OrderReceived(String),
    /// Soft failure: no order to reconcile against
    Cart(String),
}

impl RedirectTarget {
    pub fn url(&self) -> &str {
        match self {
            RedirectTarget::OrderReceived(url) | RedirectTarget::Cart(url) => url,
        }
    }
}

/// Reconcile a validated outcome against its order.
///
/// The request terminates on the returned redirect; nothing else is emitted.
/// An order already in the terminal `completed` state is never mutated
/// again — replays and duplicate processor retries degrade to the redirect
/// alone.
pub async fn reconcile(
    store: &dyn OrderStore,
    cart: &dyn CartService,
    pages: &CheckoutPages,
    order: Option<Order>,
    outcome: CallbackOutcome,
) -> BridgeResult<RedirectTarget> {
    cart.ensure_session().await;
    cart.clear().await;

    let order = match order {
        Some(order) => order,
        None => return Ok(RedirectTarget::Cart(pages.cart_url())),
    };

    match outcome {
        CallbackOutcome::Success { transaction_id, .. } => {
            let applied = store
                .complete(
                    &order.order_key,
                    &transaction_id,
                    "Payment completed successfully with SoleasPay",
                )
                .await?;
            match applied {
                Applied::Updated => {
                    info!(
                        order_key = %order.order_key,
                        transaction_id = %transaction_id,
                        "payment completed"
                    );
                }
                Applied::AlreadyCompleted => {
                    info!(order_key = %order.order_key, "replayed callback ignored");
                }
            }
        }
        CallbackOutcome::Failed { message, .. } => {
            let note = format!("Payment failed with: {}", message);
            let applied = store.fail(&order.order_key, &note).await?;
            if applied == Applied::Updated {
                warn!(
                    title = "Payment failed",
                    order_key = %order.order_key,
                    content = %message,
                    "payment failed"
                );
            } else {
                info!(order_key = %order.order_key, "replayed callback ignored");
            }
        }
    }

    Ok(RedirectTarget::OrderReceived(
        pages.order_received_url(&order.order_key),
    ))
}
