//! # Soleas-Bridge RS
//!
//! Checkout bridge for the SoleasPay hosted payment page.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export SOLEASPAY_API_KEY=spk_...
//! export SOLEASPAY_SHOP_NAME="My Shop"
//! export SOLEASPAY_CURRENCY=XAF
//! export BASE_URL=https://shop.example.com
//!
//! # Run the server
//! soleas-bridge
//! ```

use bridge_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Settlement currency: {}", state.gateway.settlement_currency());
    info!("Callback URL: {}", state.callback_url());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🌉 Soleas-Bridge starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🧾 Orders: POST http://{}/api/v1/orders", addr);
        info!("💳 Checkout: POST http://{}/api/v1/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🌉 Soleas-Bridge RS 🌉
  ━━━━━━━━━━━━━━━━━━━━━━━
  SoleasPay checkout bridge
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
