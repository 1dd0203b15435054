//! # Session Initiator
//!
//! Builds the outbound payment request, submits it to the SoleasPay hosted
//! checkout and renders the bridge document the storefront injects next to
//! the checkout form. Stateless per call: the processor tracks the session,
//! the bridge keeps nothing.

use crate::config::{SoleasConfig, REQUEST_TIMEOUT_SECS};
use crate::convert::SoleasConverter;
use bridge_core::{
    format_amount, resolve_amount, BridgeError, BridgeResult, CurrencyConverter, Order,
};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// The exact payload submitted to the processor and mirrored into the
/// bridge document's hidden inputs.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPayload {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub amount: String,
    pub currency: String,
    pub description: String,
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "successUrl")]
    pub success_url: String,
    #[serde(rename = "failureUrl")]
    pub failure_url: String,
    #[serde(rename = "shopName")]
    pub shop_name: String,
}

impl SessionPayload {
    /// Wire-order field list, shared by the form POST and the bridge document
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("apiKey", &self.api_key),
            ("amount", &self.amount),
            ("currency", &self.currency),
            ("description", &self.description),
            ("orderId", &self.order_id),
            ("successUrl", &self.success_url),
            ("failureUrl", &self.failure_url),
            ("shopName", &self.shop_name),
        ]
    }
}

/// Result of a successful session initiation
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    /// Always "success"; failures are errors, not results
    pub result: &'static str,

    /// Redirect URL; empty because the hand-off happens through the bridge
    /// document, not a server-side redirect
    pub redirect: String,

    /// Self-submitting hidden form carrying the session payload
    pub soleaspay_response_data: String,
}

/// SoleasPay session gateway
pub struct SoleasGateway {
    config: SoleasConfig,
    client: Client,
    converter: Arc<dyn CurrencyConverter>,
}

impl SoleasGateway {
    /// Create a gateway using the HTTP converter
    pub fn new(config: SoleasConfig) -> BridgeResult<Self> {
        let converter = Arc::new(SoleasConverter::new(config.clone())?);
        Self::with_converter(config, converter)
    }

    /// Create a gateway with an injected converter (for tests)
    pub fn with_converter(
        config: SoleasConfig,
        converter: Arc<dyn CurrencyConverter>,
    ) -> BridgeResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BridgeError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            converter,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> BridgeResult<Self> {
        let config = SoleasConfig::from_env()?;
        Self::new(config)
    }

    /// The merchant settlement currency this gateway is configured for
    pub fn settlement_currency(&self) -> bridge_core::Currency {
        self.config.settlement_currency
    }

    /// Assemble the session payload for an order. Currency resolution (and
    /// therefore the single conversion) happens here, exactly once.
    async fn build_payload(
        &self,
        order: &Order,
        callback_url: &str,
    ) -> BridgeResult<SessionPayload> {
        let resolved = resolve_amount(
            self.converter.as_ref(),
            order.total(),
            order.billing_currency,
            self.config.settlement_currency,
        )
        .await?;

        let request_url = format!("{}?key={}", callback_url, order.order_key);

        Ok(SessionPayload {
            api_key: self.config.api_key.clone(),
            amount: format_amount(resolved.amount),
            currency: resolved.currency.as_str().to_string(),
            description: order.description(),
            order_id: order.order_key.clone(),
            success_url: request_url.clone(),
            failure_url: request_url,
            shop_name: self.config.shop_name.clone(),
        })
    }

    /// Initiate a payment session.
    ///
    /// Submits the payload form-encoded to the hosted checkout over TLS with
    /// a 15-second timeout. Any transport failure or non-200 answer aborts
    /// the attempt with `SessionInitiationError`; there is no retry, the
    /// payer re-submits checkout. On acceptance the bridge document is
    /// returned for the storefront to inject and submit once.
    #[instrument(skip(self, order), fields(order_key = %order.order_key))]
    pub async fn create_session(
        &self,
        order: &Order,
        callback_url: &str,
    ) -> BridgeResult<SessionResult> {
        if order.is_empty() {
            return Err(BridgeError::SessionInitiationError(
                "order has no items".to_string(),
            ));
        }

        let payload = self.build_payload(order, callback_url).await?;

        debug!(
            amount = %payload.amount,
            currency = %payload.currency,
            "submitting payment session"
        );

        let response = self
            .client
            .post(&self.config.checkout_url)
            .form(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(
                    title = "Payment Request Error",
                    content = %e,
                    "session submission failed"
                );
                BridgeError::SessionInitiationError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                title = "Payment Request Error",
                status = %status,
                content = %body,
                "processor refused session"
            );
            return Err(BridgeError::SessionInitiationError(format!(
                "HTTP {}",
                status
            )));
        }

        info!(order_key = %order.order_key, "payment session accepted");

        Ok(SessionResult {
            result: "success",
            redirect: String::new(),
            soleaspay_response_data: render_bridge_document(&self.config.checkout_url, &payload),
        })
    }
}

/// HTML-escape a single attribute value
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the one-time auto-submitting bridge form. The storefront injects
/// this adjacent to the checkout form and submits it exactly once, after
/// checkout completion and a successful session result are both observed.
pub fn render_bridge_document(action: &str, payload: &SessionPayload) -> String {
    let mut html = String::from("<div class='soleaspay_fragment_form'>");
    html.push_str(&format!(
        "<form id='soleaspay_data_form' method='post' action='{}'>",
        escape_html(action)
    ));
    for (name, value) in payload.fields() {
        html.push_str(&format!(
            "<input type='hidden' name='{}' value='{}' readonly>",
            name,
            escape_html(value)
        ));
    }
    html.push_str("</form></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_core::{Currency, LineItem};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubConverter {
        calls: AtomicUsize,
        rate: f64,
    }

    impl StubConverter {
        fn new(rate: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rate,
            }
        }
    }

    #[async_trait]
    impl CurrencyConverter for StubConverter {
        async fn convert(&self, amount: f64, _: Currency, _: Currency) -> BridgeResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(amount * self.rate)
        }
    }

    fn xaf_order(total: f64) -> Order {
        Order::new(Currency::XAF).with_item(LineItem::new("Basket", 1, total))
    }

    async fn gateway_for(server: &MockServer, converter: Arc<StubConverter>) -> SoleasGateway {
        let config = SoleasConfig::new("spk_test", "Test Shop", Currency::XAF)
            .with_checkout_url(server.uri());
        SoleasGateway::with_converter(config, converter).unwrap()
    }

    #[tokio::test]
    async fn test_session_posts_exact_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("apiKey=spk_test"))
            .and(body_string_contains("amount=5000"))
            .and(body_string_contains("currency=XAF"))
            .and(body_string_contains("shopName=Test+Shop"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let converter = Arc::new(StubConverter::new(2.0));
        let gateway = gateway_for(&server, converter.clone()).await;
        let order = xaf_order(5000.0);

        let result = gateway
            .create_session(&order, "https://shop.test/soleaspay/v1/response/tok")
            .await
            .unwrap();

        assert_eq!(result.result, "success");
        assert!(result.redirect.is_empty());
        // billing == settlement, the converter must never have been called
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bridge_document_mirrors_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, Arc::new(StubConverter::new(1.0))).await;
        let order = xaf_order(5000.0);
        let key = order.order_key.clone();

        let result = gateway
            .create_session(&order, "https://shop.test/soleaspay/v1/response/tok")
            .await
            .unwrap();

        let doc = &result.soleaspay_response_data;
        assert!(doc.contains("soleaspay_data_form"));
        assert!(doc.contains("name='amount' value='5000'"));
        assert!(doc.contains("name='currency' value='XAF'"));
        assert!(doc.contains(&format!("name='orderId' value='{}'", key)));
        assert!(doc.contains(&format!(
            "name='successUrl' value='https://shop.test/soleaspay/v1/response/tok?key={}'",
            key
        )));
    }

    #[tokio::test]
    async fn test_non_200_aborts_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, Arc::new(StubConverter::new(1.0))).await;
        let order = xaf_order(5000.0);

        let result = gateway.create_session(&order, "https://shop.test/cb").await;
        assert!(matches!(
            result,
            Err(BridgeError::SessionInitiationError(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server, Arc::new(StubConverter::new(1.0))).await;
        let order = Order::new(Currency::XAF);

        let result = gateway.create_session(&order, "https://shop.test/cb").await;
        assert!(matches!(
            result,
            Err(BridgeError::SessionInitiationError(_))
        ));
    }

    #[tokio::test]
    async fn test_conversion_happens_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("amount=6550"))
            .and(body_string_contains("currency=XAF"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let converter = Arc::new(StubConverter::new(655.0));
        let gateway = gateway_for(&server, converter.clone()).await;
        let order = Order::new(Currency::EUR).with_item(LineItem::new("Basket", 1, 10.0));

        gateway
            .create_session(&order, "https://shop.test/cb")
            .await
            .unwrap();

        assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_html_escaping_in_bridge_document() {
        let payload = SessionPayload {
            api_key: "key".into(),
            amount: "5000".into(),
            currency: "XAF".into(),
            description: "Tea & \"biscuits\" <set>".into(),
            order_id: "order_1".into(),
            success_url: "https://shop.test/cb?key=order_1".into(),
            failure_url: "https://shop.test/cb?key=order_1".into(),
            shop_name: "Bob's Shop".into(),
        };

        let doc = render_bridge_document("https://checkout.soleaspay.com", &payload);
        assert!(doc.contains("Tea &amp; &quot;biscuits&quot; &lt;set&gt;"));
        assert!(doc.contains("Bob&#39;s Shop"));
        assert!(!doc.contains("<set>"));
    }
}
