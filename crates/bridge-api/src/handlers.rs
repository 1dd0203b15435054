//! # Request Handlers
//!
//! Axum request handlers for the checkout bridge: order registration,
//! session initiation, the namespace-firewalled SoleasPay callback and the
//! terminal pages the reconciliation redirects land on.

use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bridge_core::{
    reconcile, validate_payload, BridgeError, Currency, LineItem, Order, RejectReason,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Register-order request
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Billing currency code the storefront charged in
    pub currency: String,
    /// Items to purchase
    pub items: Vec<OrderItemRequest>,
}

/// Item in an order request
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub unit_price: f64,
}

fn default_quantity() -> u32 {
    1
}

/// Register-order response
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_key: String,
    pub total: f64,
    pub currency: String,
}

/// Create checkout request
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Key of a previously registered order
    pub order_key: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn bridge_error_to_response(err: BridgeError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// The notice a payer sees when session creation fails. Currency support
/// problems are actionable by the shopper; everything else is a generic
/// try-again.
fn payer_notice(err: &BridgeError) -> String {
    match err {
        BridgeError::UnsupportedCurrency { currency } => format!(
            "Currency '{}' is not currently supported. Please, try using one of the following: \
             XAF, XOF, EUR, USD",
            currency
        ),
        _ => "An Error has occurred. Please try again now or later".to_string(),
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response {
    (status, body).into_response()
}

/// The reconciliation redirect is a plain 301 with no body; the request
/// terminates on it.
fn redirect_301(url: &str) -> Response {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, url)
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "soleas-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Register an order ahead of checkout
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, (StatusCode, Json<ErrorResponse>)> {
    let currency = Currency::parse(&request.currency).map_err(bridge_error_to_response)?;

    if request.items.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No items in order request", 400)),
        ));
    }

    let mut order = Order::new(currency);
    for item in &request.items {
        order.add_item(LineItem::new(&item.name, item.quantity, item.unit_price));
    }

    let response = CreateOrderResponse {
        order_key: order.order_key.clone(),
        total: order.total(),
        currency: currency.as_str().to_string(),
    };

    state
        .store
        .insert(order)
        .await
        .map_err(bridge_error_to_response)?;

    info!(order_key = %response.order_key, total = response.total, "order registered");

    Ok(Json(response))
}

/// Fetch order state
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_key): Path<String>,
) -> Result<Json<Order>, (StatusCode, Json<ErrorResponse>)> {
    let order = state
        .store
        .find_by_key(&order_key)
        .await
        .map_err(bridge_error_to_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    format!("Order not found: {}", order_key),
                    404,
                )),
            )
        })?;

    Ok(Json(order))
}

/// Initiate a SoleasPay session for a registered order.
///
/// On success the response carries the bridge document; the storefront
/// injects it next to the checkout form and submits it exactly once.
#[instrument(skip(state, request), fields(order_key = %request.order_key))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<bridge_soleas::SessionResult>, (StatusCode, Json<ErrorResponse>)> {
    if !state.gateway_settings.enabled {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("SoleasPay gateway is disabled", 503)),
        ));
    }

    let order = state
        .store
        .find_by_key(&request.order_key)
        .await
        .map_err(bridge_error_to_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(
                    format!("Order not found: {}", request.order_key),
                    404,
                )),
            )
        })?;

    let session = match state
        .gateway
        .create_session(&order, &state.callback_url())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            error!(order_key = %order.order_key, "failed to create session: {}", e);
            let notice = payer_notice(&e);
            if let Err(note_err) = state
                .store
                .add_note(
                    &order.order_key,
                    &format!("SoleasPay payment init failed with message {}", notice),
                )
                .await
            {
                warn!(order_key = %order.order_key, "failed to append order note: {}", note_err);
            }
            let code = e.status_code();
            return Err((
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                Json(ErrorResponse::new(format!("Payment error: {}", notice), code)),
            ));
        }
    };

    state
        .store
        .add_note(&order.order_key, "Payment is processing...")
        .await
        .map_err(bridge_error_to_response)?;
    state
        .store
        .mark_processing(&order.order_key)
        .await
        .map_err(bridge_error_to_response)?;

    // the payment attempt is handed off to the processor, the cart is done
    state.cart.clear().await;

    info!(order_key = %order.order_key, "session created, bridge document issued");

    Ok(Json(session))
}

/// Inbound SoleasPay callback.
///
/// The token firewall runs first: a path token that does not match the
/// persisted namespace, or any method other than GET, gets a blunt 404
/// before the payload is even looked at.
#[instrument(skip(state, params), fields(token = %token))]
pub async fn soleaspay_callback(
    State(state): State<AppState>,
    Path(token): Path<String>,
    method: Method,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    if method != Method::GET || token != state.namespace_token() {
        return text_response(StatusCode::NOT_FOUND, "Access denied !!");
    }

    let raw = params
        .get("soleaspay_data")
        .map(String::as_str)
        .unwrap_or_default();

    // syntactic gate before the order lookup, so garbage never hits the store
    if raw.trim().is_empty() || serde_json::from_str::<serde_json::Value>(raw).is_err() {
        return reject(RejectReason::MalformedPayload);
    }

    let key = params.get("key").map(String::as_str).unwrap_or_default();
    let order = match state.store.find_by_key(key).await {
        Ok(order) => order,
        Err(e) => {
            error!("order lookup failed: {}", e);
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
        }
    };
    if order.is_none() {
        return reject(RejectReason::UnknownOrder);
    }

    let outcome = match validate_payload(raw) {
        Ok(outcome) => outcome,
        Err(BridgeError::CallbackRejected { reason }) => return reject(reason),
        Err(e) => {
            error!("callback validation failed: {}", e);
            return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
        }
    };

    match reconcile(
        state.store.as_ref(),
        state.cart.as_ref(),
        &state.pages,
        order,
        outcome,
    )
    .await
    {
        Ok(target) => redirect_301(target.url()),
        Err(e) => {
            error!("reconciliation failed: {}", e);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn reject(reason: RejectReason) -> Response {
    warn!(title = "Callback rejected", content = %reason, "rejected inbound callback");
    (StatusCode::FORBIDDEN, reason.body()).into_response()
}

/// Order-received page, the terminal redirect target for reconciled orders
pub async fn order_received(Path(order_key): Path<String>) -> impl IntoResponse {
    Html(format!(
        r#"
<!DOCTYPE html>
<html>
<head><title>Order Received</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <h1>Thank you</h1>
        <p>Order: <code>{}</code></p>
        <p style="color: #666;">Your payment attempt has concluded. Check your order status for the result.</p>
    </div>
</body>
</html>
"#,
        order_key
    ))
}

/// Cart page, where ambiguous callbacks are sent back to
pub async fn cart_page() -> impl IntoResponse {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head><title>Cart</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <h1>Your Cart</h1>
        <p style="color: #666;">We could not match that payment to an order. Please try again.</p>
    </div>
</body>
</html>
"#,
    )
}
