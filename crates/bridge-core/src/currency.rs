//! # Currencies and the Currency Resolver
//!
//! SoleasPay settles in a fixed set of currencies. When the storefront bills
//! in a different member of that set, the amount is converted exactly once
//! before the session is submitted, via an external converter behind the
//! [`CurrencyConverter`] trait.

use crate::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Currencies accepted for a SoleasPay transaction (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    XAF,
    XOF,
    EUR,
    USD,
}

impl Currency {
    /// Every currency the processor can settle in
    pub const ALL: [Currency; 4] = [Currency::XAF, Currency::XOF, Currency::EUR, Currency::USD];

    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::XAF => "XAF",
            Currency::XOF => "XOF",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
        }
    }

    /// Parse a currency code, rejecting anything outside the supported set
    pub fn parse(code: &str) -> BridgeResult<Self> {
        match code.to_uppercase().as_str() {
            "XAF" => Ok(Currency::XAF),
            "XOF" => Ok(Currency::XOF),
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            other => Err(BridgeError::UnsupportedCurrency {
                currency: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Format an amount the way it goes on the wire: no trailing ".0" for whole
/// values, plain decimal otherwise.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

/// External currency converter seam.
///
/// The HTTP implementation lives in the connector crate; tests stub this.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Convert `amount` from one currency to another. Single attempt,
    /// fail fast on transport or response errors.
    async fn convert(&self, amount: f64, from: Currency, to: Currency) -> BridgeResult<f64>;
}

/// Final (amount, currency) pair for a payment session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAmount {
    pub amount: f64,
    pub currency: Currency,
}

/// Determine the final amount/currency pair for a session.
///
/// The billing currency must already be a member of the supported set; the
/// caller maps arbitrary storefront codes through [`Currency::parse`] first.
/// When billing and settlement currencies coincide, the order total passes
/// through untouched and the converter is never called.
pub async fn resolve_amount(
    converter: &dyn CurrencyConverter,
    order_total: f64,
    billing: Currency,
    settlement: Currency,
) -> BridgeResult<ResolvedAmount> {
    if billing == settlement {
        return Ok(ResolvedAmount {
            amount: order_total,
            currency: settlement,
        });
    }

    let amount = converter
        .convert(order_total, billing, settlement)
        .await
        .map_err(|e| {
            error!(
                title = "Currency Request Error",
                from = %billing,
                to = %settlement,
                content = %e,
                "currency conversion failed"
            );
            e
        })?;

    info!(
        from = %billing,
        to = %settlement,
        original = order_total,
        converted = amount,
        "converted order total for settlement"
    );

    Ok(ResolvedAmount {
        amount,
        currency: settlement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingConverter {
        calls: AtomicUsize,
        rate: f64,
    }

    #[async_trait]
    impl CurrencyConverter for CountingConverter {
        async fn convert(&self, amount: f64, _from: Currency, _to: Currency) -> BridgeResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(amount * self.rate)
        }
    }

    struct FailingConverter;

    #[async_trait]
    impl CurrencyConverter for FailingConverter {
        async fn convert(&self, _: f64, _: Currency, _: Currency) -> BridgeResult<f64> {
            Err(BridgeError::ConversionTransportError("refused".into()))
        }
    }

    #[test]
    fn test_parse_supported() {
        assert_eq!(Currency::parse("xaf").unwrap(), Currency::XAF);
        assert_eq!(Currency::parse("EUR").unwrap(), Currency::EUR);
        assert!(matches!(
            Currency::parse("GBP"),
            Err(BridgeError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(5000.0), "5000");
        assert_eq!(format_amount(12.5), "12.5");
    }

    #[tokio::test]
    async fn test_pass_through_skips_converter() {
        let converter = CountingConverter {
            calls: AtomicUsize::new(0),
            rate: 2.0,
        };

        let resolved = resolve_amount(&converter, 5000.0, Currency::XAF, Currency::XAF)
            .await
            .unwrap();

        assert_eq!(resolved.amount, 5000.0);
        assert_eq!(resolved.currency, Currency::XAF);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_conversion_called_once() {
        let converter = CountingConverter {
            calls: AtomicUsize::new(0),
            rate: 655.0,
        };

        let resolved = resolve_amount(&converter, 10.0, Currency::EUR, Currency::XAF)
            .await
            .unwrap();

        assert_eq!(resolved.amount, 6550.0);
        assert_eq!(resolved.currency, Currency::XAF);
        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts() {
        let result = resolve_amount(&FailingConverter, 10.0, Currency::EUR, Currency::XAF).await;
        assert!(matches!(
            result,
            Err(BridgeError::ConversionTransportError(_))
        ));
    }
}
