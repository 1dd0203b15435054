//! # Callback Validator
//!
//! Structural validation of the `soleaspay_data` payload the processor
//! appends to the callback redirect. Nothing in the payload is trusted until
//! it has matched exactly one of the two known notification shapes.
//!
//! Shape selection is discriminant-first: `payId` is unique to the success
//! shape and a boolean `success` field to the failure shape. The field-count
//! comparison the protocol also implies is kept as a secondary sanity check,
//! never as the primary discriminant, so equal-count shapes can never be
//! confused.

use crate::error::{BridgeError, BridgeResult, RejectReason};
use serde_json::{Map, Value};

/// Fields of the success notification shape
const SUCCESS_SHAPE: [&str; 5] = ["status", "currency", "amount", "ref", "payId"];

/// Fields of the failure notification shape
const FAILURE_SHAPE: [&str; 2] = ["success", "message"];

/// A validated, classified notification
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    /// Payment succeeded at the processor
    Success {
        /// Processor payment id, recorded as the order's transaction id
        transaction_id: String,
        /// The full validated payload, kept for audit notes
        data: Map<String, Value>,
    },
    /// Payment failed at the processor
    Failed {
        /// Human-readable failure message from the processor
        message: String,
        data: Map<String, Value>,
    },
}

impl CallbackOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallbackOutcome::Success { .. })
    }
}

/// A field is meaningful when it carries an actual value. Booleans always
/// count; empty strings, zero and null do not.
fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn check_shape(data: &Map<String, Value>, shape: &[&str]) -> BridgeResult<()> {
    // sanity check: no extra fields beyond the shape
    if data.len() != shape.len() {
        return Err(BridgeError::rejected(RejectReason::ShapeMismatch));
    }
    for field in shape {
        match data.get(*field) {
            Some(value) if is_meaningful(value) => {}
            _ => return Err(BridgeError::rejected(RejectReason::ShapeMismatch)),
        }
    }
    Ok(())
}

/// Render a value the way it appears in audit notes
fn as_note_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate a raw notification payload and classify it.
///
/// Rejects with [`RejectReason::MalformedPayload`] when the payload is empty
/// or not a JSON object, and [`RejectReason::ShapeMismatch`] when it matches
/// neither shape or carries a contradictory discriminant (a success-shaped
/// payload whose `status` is not `"SUCCESS"`, a failure-shaped payload whose
/// `success` is not `false`).
pub fn validate_payload(raw: &str) -> BridgeResult<CallbackOutcome> {
    if raw.trim().is_empty() {
        return Err(BridgeError::rejected(RejectReason::MalformedPayload));
    }

    let data: Map<String, Value> = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => return Err(BridgeError::rejected(RejectReason::MalformedPayload)),
    };

    if data.contains_key("payId") {
        check_shape(&data, &SUCCESS_SHAPE)?;
        match data.get("status").and_then(Value::as_str) {
            Some("SUCCESS") => {}
            _ => return Err(BridgeError::rejected(RejectReason::ShapeMismatch)),
        }
        let transaction_id = data
            .get("payId")
            .map(as_note_text)
            .ok_or_else(|| BridgeError::rejected(RejectReason::ShapeMismatch))?;
        return Ok(CallbackOutcome::Success {
            transaction_id,
            data,
        });
    }

    if data.get("success").map(Value::is_boolean).unwrap_or(false) {
        check_shape(&data, &FAILURE_SHAPE)?;
        if data.get("success") != Some(&Value::Bool(false)) {
            return Err(BridgeError::rejected(RejectReason::ShapeMismatch));
        }
        let message = data
            .get("message")
            .map(as_note_text)
            .unwrap_or_default();
        return Ok(CallbackOutcome::Failed { message, data });
    }

    Err(BridgeError::rejected(RejectReason::ShapeMismatch))
}
