//! # SoleasPay Configuration
//!
//! Configuration management for the SoleasPay connector.
//! Secrets are loaded from environment variables.

use bridge_core::{BridgeError, Currency};
use std::env;

/// Hosted checkout endpoint sessions are submitted to
pub const CHECKOUT_URI: &str = "https://checkout.soleaspay.com";

/// Currency conversion endpoint
pub const CONVERT_URI: &str = "https://soleaspay.com/api/convert";

/// Outbound request timeout, both for session submission and conversion
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// SoleasPay API configuration
#[derive(Debug, Clone)]
pub struct SoleasConfig {
    /// Merchant API key
    pub api_key: String,

    /// Shop name shown on the hosted payment page
    pub shop_name: String,

    /// Currency the merchant account settles in
    pub settlement_currency: Currency,

    /// Checkout endpoint (overridable for testing)
    pub checkout_url: String,

    /// Converter endpoint (overridable for testing)
    pub convert_url: String,
}

impl SoleasConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SOLEASPAY_API_KEY`
    ///
    /// Optional:
    /// - `SOLEASPAY_SHOP_NAME` (default "Mysoleas payment App")
    /// - `SOLEASPAY_CURRENCY` (default "XAF")
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = env::var("SOLEASPAY_API_KEY")
            .map_err(|_| BridgeError::Configuration("SOLEASPAY_API_KEY not set".to_string()))?;

        if api_key.is_empty() {
            return Err(BridgeError::Configuration(
                "SOLEASPAY_API_KEY is empty".to_string(),
            ));
        }

        let shop_name = env::var("SOLEASPAY_SHOP_NAME")
            .unwrap_or_else(|_| "Mysoleas payment App".to_string());

        let settlement_currency = match env::var("SOLEASPAY_CURRENCY") {
            Ok(code) => Currency::parse(&code)?,
            Err(_) => Currency::XAF,
        };

        Ok(Self {
            api_key,
            shop_name,
            settlement_currency,
            checkout_url: CHECKOUT_URI.to_string(),
            convert_url: CONVERT_URI.to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        api_key: impl Into<String>,
        shop_name: impl Into<String>,
        settlement_currency: Currency,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            shop_name: shop_name.into(),
            settlement_currency,
            checkout_url: CHECKOUT_URI.to_string(),
            convert_url: CONVERT_URI.to_string(),
        }
    }

    /// Builder: set custom checkout URL (for testing)
    pub fn with_checkout_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_url = url.into();
        self
    }

    /// Builder: set custom converter URL (for testing)
    pub fn with_convert_url(mut self, url: impl Into<String>) -> Self {
        self.convert_url = url.into();
        self
    }
}
