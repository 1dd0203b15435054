//! # Order Store and Cart Service Seams
//!
//! The bridge never owns orders; it talks to the host platform through the
//! [`OrderStore`] trait. The store is the single authority for the
//! at-most-once guarantee: the completed-status check and the status update
//! happen inside one logically atomic read-modify-write per order. The
//! in-memory implementation serializes on its lock; a database-backed one
//! would serialize on a row lock or compare-and-set.

use crate::error::{BridgeError, BridgeResult};
use crate::order::{Order, OrderStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Result of a terminal-state transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The transition was applied
    Updated,
    /// The order was already completed; nothing was touched
    AlreadyCompleted,
}

/// Host platform's order storage and status engine
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Look up an order by its opaque key
    async fn find_by_key(&self, order_key: &str) -> BridgeResult<Option<Order>>;

    /// Insert a new order
    async fn insert(&self, order: Order) -> BridgeResult<()>;

    /// Append an audit note to an order
    async fn add_note(&self, order_key: &str, note: &str) -> BridgeResult<()>;

    /// Move an order into `processing` after the session was accepted
    async fn mark_processing(&self, order_key: &str) -> BridgeResult<()>;

    /// Apply a successful payment: transaction id, audit note, `completed`
    /// status and the payment-complete timestamp, all in one atomic step.
    /// Returns [`Applied::AlreadyCompleted`] without mutating anything when
    /// the order is already in the terminal `completed` state.
    async fn complete(
        &self,
        order_key: &str,
        transaction_id: &str,
        note: &str,
    ) -> BridgeResult<Applied>;

    /// Apply a failed payment: audit note and `failed` status. Gated the
    /// same way: a `completed` order is never moved back out.
    async fn fail(&self, order_key: &str, note: &str) -> BridgeResult<Applied>;
}

/// Customer cart collaborator. Clearing is unconditional once a payment
/// attempt has concluded, success or failure.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Lazily initialize the session context backing the cart
    async fn ensure_session(&self);

    /// Empty the active cart
    async fn clear(&self);
}

/// In-memory order store, used for tests and single-process deployments
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_order<T>(
        &self,
        order_key: &str,
        f: impl FnOnce(&mut Order) -> T,
    ) -> BridgeResult<T> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|_| BridgeError::Store("order store lock poisoned".into()))?;
        let order = orders
            .get_mut(order_key)
            .ok_or_else(|| BridgeError::Store(format!("no order with key {}", order_key)))?;
        Ok(f(order))
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find_by_key(&self, order_key: &str) -> BridgeResult<Option<Order>> {
        let orders = self
            .orders
            .lock()
            .map_err(|_| BridgeError::Store("order store lock poisoned".into()))?;
        Ok(orders.get(order_key).cloned())
    }

    async fn insert(&self, order: Order) -> BridgeResult<()> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|_| BridgeError::Store("order store lock poisoned".into()))?;
        orders.insert(order.order_key.clone(), order);
        Ok(())
    }

    async fn add_note(&self, order_key: &str, note: &str) -> BridgeResult<()> {
        self.with_order(order_key, |order| order.add_note(note))
    }

    async fn mark_processing(&self, order_key: &str) -> BridgeResult<()> {
        self.with_order(order_key, |order| {
            order.status = OrderStatus::Processing;
        })
    }

    async fn complete(
        &self,
        order_key: &str,
        transaction_id: &str,
        note: &str,
    ) -> BridgeResult<Applied> {
        self.with_order(order_key, |order| {
            if order.status == OrderStatus::Completed {
                return Applied::AlreadyCompleted;
            }
            order.transaction_id = Some(transaction_id.to_string());
            order.add_note(note);
            order.status = OrderStatus::Completed;
            order.paid_at = Some(Utc::now());
            Applied::Updated
        })
    }

    async fn fail(&self, order_key: &str, note: &str) -> BridgeResult<Applied> {
        self.with_order(order_key, |order| {
            if order.status == OrderStatus::Completed {
                return Applied::AlreadyCompleted;
            }
            order.add_note(note);
            order.status = OrderStatus::Failed;
            Applied::Updated
        })
    }
}

/// In-memory cart with a lazily initialized session flag
#[derive(Default)]
pub struct MemoryCart {
    session_ready: Mutex<bool>,
    items: Mutex<Vec<String>>,
}

impl MemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an item in the cart (test and demo plumbing)
    pub fn add(&self, item: impl Into<String>) {
        self.items.lock().unwrap().push(item.into());
    }

    /// Number of items currently in the cart
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CartService for MemoryCart {
    async fn ensure_session(&self) {
        let mut ready = self.session_ready.lock().unwrap();
        if !*ready {
            *ready = true;
        }
    }

    async fn clear(&self) {
        self.items.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::order::LineItem;

    async fn seeded_store() -> (MemoryOrderStore, String) {
        let store = MemoryOrderStore::new();
        let order = Order::new(Currency::XAF).with_item(LineItem::new("Basket", 1, 5000.0));
        let key = order.order_key.clone();
        store.insert(order).await.unwrap();
        (store, key)
    }

    #[tokio::test]
    async fn test_complete_is_gated() {
        let (store, key) = seeded_store().await;

        let first = store.complete(&key, "P1", "Payment completed").await.unwrap();
        assert_eq!(first, Applied::Updated);

        let again = store.complete(&key, "P2", "replayed").await.unwrap();
        assert_eq!(again, Applied::AlreadyCompleted);

        let order = store.find_by_key(&key).await.unwrap().unwrap();
        assert_eq!(order.transaction_id.as_deref(), Some("P1"));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.notes.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_never_unwinds_completed() {
        let (store, key) = seeded_store().await;

        store.complete(&key, "P1", "Payment completed").await.unwrap();
        let applied = store.fail(&key, "late failure").await.unwrap();
        assert_eq!(applied, Applied::AlreadyCompleted);

        let order = store.find_by_key(&key).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_unknown_key_lookup() {
        let store = MemoryOrderStore::new();
        assert!(store.find_by_key("order_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cart_clear() {
        let cart = MemoryCart::new();
        cart.add("Basket");
        assert_eq!(cart.len(), 1);

        cart.ensure_session().await;
        cart.clear().await;
        assert!(cart.is_empty());
    }
}
