//! # Bridge Error Types
//!
//! Typed error handling for the checkout bridge.
//! All bridge operations return `Result<T, BridgeError>`.

use thiserror::Error;

/// Why an inbound callback was rejected.
///
/// The callback endpoint is a machine-to-machine channel: every reason maps
/// to a blunt status code plus a short literal body, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Payload was empty or not syntactically valid JSON
    MalformedPayload,
    /// The `key` parameter resolved to no known order
    UnknownOrder,
    /// Payload did not match either known notification shape
    ShapeMismatch,
}

impl RejectReason {
    /// The literal response body the processor sees for this rejection
    pub fn body(&self) -> &'static str {
        match self {
            RejectReason::MalformedPayload | RejectReason::UnknownOrder => "Bad Request !!",
            RejectReason::ShapeMismatch => "Unknown application",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::MalformedPayload => "malformed payload",
            RejectReason::UnknownOrder => "unknown order",
            RejectReason::ShapeMismatch => "shape mismatch",
        };
        write!(f, "{}", s)
    }
}

/// Core error type for all bridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Billing currency outside the supported set
    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// Converter unreachable or answered non-200
    #[error("Currency conversion transport error: {0}")]
    ConversionTransportError(String),

    /// Converter answered 200 but without an explicit success flag
    #[error("Currency conversion response error: {0}")]
    ConversionResponseError(String),

    /// Outbound session request to the processor failed
    #[error("Session initiation failed: {0}")]
    SessionInitiationError(String),

    /// Inbound callback rejected before reconciliation
    #[error("Callback rejected: {reason}")]
    CallbackRejected { reason: RejectReason },

    /// Order store failure (lookup or mutation)
    #[error("Order store error: {0}")]
    Store(String),

    /// Settings store failure (load or persist)
    #[error("Settings error: {0}")]
    Settings(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BridgeError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            BridgeError::Configuration(_) => 500,
            BridgeError::UnsupportedCurrency { .. } => 400,
            BridgeError::ConversionTransportError(_) => 502,
            BridgeError::ConversionResponseError(_) => 502,
            BridgeError::SessionInitiationError(_) => 502,
            BridgeError::CallbackRejected { .. } => 403,
            BridgeError::Store(_) => 500,
            BridgeError::Settings(_) => 500,
            BridgeError::Serialization(_) => 500,
        }
    }

    /// Shorthand for a callback rejection
    pub fn rejected(reason: RejectReason) -> Self {
        BridgeError::CallbackRejected { reason }
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
