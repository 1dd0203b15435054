//! # Currency Conversion
//!
//! HTTP implementation of the `CurrencyConverter` seam against the
//! SoleasPay conversion endpoint. One GET per resolution, fail fast: a
//! transport failure or non-200 is a `ConversionTransportError`, a 200
//! without an explicit success flag is a `ConversionResponseError`.

use crate::config::{SoleasConfig, REQUEST_TIMEOUT_SECS};
use async_trait::async_trait;
use bridge_core::{BridgeError, BridgeResult, Currency, CurrencyConverter};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error};

/// Converter response body: `{"success": bool, "data": {"<CUR>": amount}}`
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: HashMap<String, Value>,
}

/// SoleasPay currency converter
pub struct SoleasConverter {
    config: SoleasConfig,
    client: Client,
}

impl SoleasConverter {
    pub fn new(config: SoleasConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BridgeError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

/// The converted amount arrives keyed by target currency, sometimes as a
/// JSON number and sometimes as a numeric string.
fn amount_from(data: &HashMap<String, Value>, to: Currency) -> Option<f64> {
    match data.get(to.as_str())? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl CurrencyConverter for SoleasConverter {
    async fn convert(&self, amount: f64, from: Currency, to: Currency) -> BridgeResult<f64> {
        debug!(%from, %to, amount, "requesting currency conversion");

        let response = self
            .client
            .get(&self.config.convert_url)
            .header("x-api-key", &self.config.api_key)
            .query(&[
                ("amount", bridge_core::format_amount(amount)),
                ("from", from.as_str().to_string()),
                ("to", to.as_str().to_string()),
            ])
            .send()
            .await
            .map_err(|e| BridgeError::ConversionTransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                title = "Currency Request Error",
                status = %status,
                content = %body,
                "converter answered non-200"
            );
            return Err(BridgeError::ConversionTransportError(format!(
                "HTTP {}",
                status
            )));
        }

        let body: ConvertResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::ConversionResponseError(e.to_string()))?;

        if body.success != Some(true) {
            error!(
                title = "Currency Response Error",
                content = "converter response lacks an explicit success flag",
                "invalid conversion"
            );
            return Err(BridgeError::ConversionResponseError(
                "converter did not confirm success".to_string(),
            ));
        }

        amount_from(&body.data, to).ok_or_else(|| {
            BridgeError::ConversionResponseError(format!(
                "no converted amount for {} in response",
                to
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SoleasConfig {
        SoleasConfig::new("spk_test", "Test Shop", Currency::XAF)
            .with_convert_url(format!("{}/api/convert", server.uri()))
    }

    #[tokio::test]
    async fn test_successful_conversion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/convert"))
            .and(header("x-api-key", "spk_test"))
            .and(query_param("amount", "10"))
            .and(query_param("from", "EUR"))
            .and(query_param("to", "XAF"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "XAF": 6550 }
            })))
            .mount(&server)
            .await;

        let converter = SoleasConverter::new(config_for(&server)).unwrap();
        let amount = converter
            .convert(10.0, Currency::EUR, Currency::XAF)
            .await
            .unwrap();

        assert_eq!(amount, 6550.0);
    }

    #[tokio::test]
    async fn test_string_amount_in_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "XAF": "6550.5" }
            })))
            .mount(&server)
            .await;

        let converter = SoleasConverter::new(config_for(&server)).unwrap();
        let amount = converter
            .convert(10.0, Currency::EUR, Currency::XAF)
            .await
            .unwrap();

        assert_eq!(amount, 6550.5);
    }

    #[tokio::test]
    async fn test_non_200_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let converter = SoleasConverter::new(config_for(&server)).unwrap();
        let result = converter.convert(10.0, Currency::EUR, Currency::XAF).await;

        assert!(matches!(
            result,
            Err(BridgeError::ConversionTransportError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_success_flag_is_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "XAF": 6550 }
            })))
            .mount(&server)
            .await;

        let converter = SoleasConverter::new(config_for(&server)).unwrap();
        let result = converter.convert(10.0, Currency::EUR, Currency::XAF).await;

        assert!(matches!(
            result,
            Err(BridgeError::ConversionResponseError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_target_currency_is_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "EUR": 10 }
            })))
            .mount(&server)
            .await;

        let converter = SoleasConverter::new(config_for(&server)).unwrap();
        let result = converter.convert(10.0, Currency::EUR, Currency::XAF).await;

        assert!(matches!(
            result,
            Err(BridgeError::ConversionResponseError(_))
        ));
    }
}
