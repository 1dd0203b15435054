//! # Order Types
//!
//! The order model the bridge reconciles against. In production the order
//! store is the host platform's; the types here are the view of it the
//! bridge needs: a stable opaque key, a status lifecycle, a transaction-id
//! slot and an audit note trail.

use crate::currency::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line item in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Display name, used to assemble the session description
    pub name: String,

    /// Quantity
    pub quantity: u32,

    /// Unit price in the order's billing currency
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Total price for this line item
    pub fn total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, checkout not yet started
    Pending,
    /// Session submitted to the processor, awaiting callback
    Processing,
    /// Payment reconciled successfully — terminal
    Completed,
    /// Payment reconciled as failed — terminal once set
    Failed,
    /// Abandoned by the customer
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    /// Terminal states are never re-processed by reconciliation
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }
}

/// An order awaiting payment reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Opaque stable key, used in place of a numeric id to avoid enumeration
    pub order_key: String,

    /// Line items
    pub line_items: Vec<LineItem>,

    /// Currency the storefront charged the customer in
    pub billing_currency: Currency,

    /// Lifecycle status
    #[serde(default)]
    pub status: OrderStatus,

    /// Processor transaction id, set on successful reconciliation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// Audit note trail
    #[serde(default)]
    pub notes: Vec<String>,

    /// When the payment completed, set once by reconciliation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with a generated key
    pub fn new(billing_currency: Currency) -> Self {
        Self {
            order_key: generate_order_key(),
            line_items: Vec::new(),
            billing_currency,
            status: OrderStatus::Pending,
            transaction_id: None,
            notes: Vec::new(),
            paid_at: None,
            created_at: Utc::now(),
        }
    }

    /// Add a line item
    pub fn add_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Builder: add a line item
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.add_item(item);
        self
    }

    /// Order total in the billing currency
    pub fn total(&self) -> f64 {
        self.line_items.iter().map(LineItem::total).sum()
    }

    /// Session description: line item names joined with ", "
    pub fn description(&self) -> String {
        self.line_items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Append an audit note
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Check if order is empty
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}

/// Generate an opaque, non-sequential order key
fn generate_order_key() -> String {
    format!("order_{}", Uuid::new_v4().simple())
}
