//! # Application State
//!
//! Shared state for the Axum application: the SoleasPay gateway, the order
//! store and cart collaborators, the persisted settings and the callback
//! namespace generated at startup.

use bridge_core::{
    ensure_callback_namespace, CartService, CheckoutPages, FileSettings, GatewaySettings,
    MemoryCart, MemoryOrderStore, OrderStore, SettingsStore,
};
use bridge_soleas::SoleasGateway;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL callbacks and terminal pages hang off
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Where the gateway settings file lives
    pub settings_path: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            settings_path: std::env::var("SETTINGS_PATH")
                .unwrap_or_else(|_| "config/gateway.toml".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SoleasPay session gateway
    pub gateway: Arc<SoleasGateway>,
    /// Order store collaborator
    pub store: Arc<dyn OrderStore>,
    /// Cart collaborator
    pub cart: Arc<dyn CartService>,
    /// Persisted gateway settings
    pub settings: Arc<dyn SettingsStore>,
    /// Admin-editable options resolved from the settings store
    pub gateway_settings: GatewaySettings,
    /// Full callback namespace, e.g. `soleaspay/v1/response/<token>`
    pub namespace: String,
    /// Terminal pages reconciliation redirects to
    pub pages: CheckoutPages,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment: file-backed settings, in-memory
    /// order store and cart, SoleasPay gateway from env vars.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let settings: Arc<dyn SettingsStore> = Arc::new(
            FileSettings::open(&config.settings_path)
                .map_err(|e| anyhow::anyhow!("failed to open settings: {}", e))?,
        );
        let namespace = ensure_callback_namespace(settings.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to ensure callback namespace: {}", e))?;
        let gateway_settings = GatewaySettings::load(settings.as_ref());

        let gateway = SoleasGateway::from_env()
            .map_err(|e| anyhow::anyhow!("failed to initialize SoleasPay gateway: {}", e))?;

        let pages = CheckoutPages::new(&config.base_url);

        Ok(Self {
            gateway: Arc::new(gateway),
            store: Arc::new(MemoryOrderStore::new()),
            cart: Arc::new(MemoryCart::new()),
            settings,
            gateway_settings,
            namespace,
            pages,
            config,
        })
    }

    /// The callback URL embedded in every outbound session
    pub fn callback_url(&self) -> String {
        format!("{}/{}", self.config.base_url, self.namespace)
    }

    /// The token segment of the callback namespace
    pub fn namespace_token(&self) -> &str {
        bridge_core::namespace_token(&self.namespace)
    }
}
