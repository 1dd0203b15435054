//! # Gateway Settings
//!
//! Key-value configuration provider for installation state. Secrets come
//! from the environment at the connector layer; this store holds the mutable
//! settings the admin edits plus the persisted callback namespace.
//!
//! The file-backed store reads and writes `config/gateway.toml`.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key under which the callback namespace is persisted
pub const NAMESPACE_KEY: &str = "rest_api_namespace";

/// Arbitrary key-value settings provider
pub trait SettingsStore: Send + Sync {
    /// Read a setting; `None` when unset
    fn get(&self, key: &str) -> Option<String>;

    /// Write a setting, persisting it for future runs
    fn set(&self, key: &str, value: &str) -> BridgeResult<()>;
}

/// The admin-editable gateway options, resolved from a settings store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Whether the gateway is offered at checkout
    pub enabled: bool,

    /// Label on the checkout button
    pub order_button_text: String,

    /// Payment method description shown to customers
    pub description: String,
}

impl GatewaySettings {
    pub fn load(store: &dyn SettingsStore) -> Self {
        Self {
            enabled: store
                .get("enabled")
                .map(|v| v != "no" && v != "false")
                .unwrap_or(true),
            order_button_text: store
                .get("order_button_text")
                .unwrap_or_else(|| "Pay with SoleasPay".to_string()),
            description: store.get("description").unwrap_or_else(|| {
                "Pay safely using Orange Money, MTN Mobile Money, PayPal, Perfect Money, \
                 MasterCard, VISA or Wave"
                    .to_string()
            }),
        }
    }
}

/// In-memory settings, used in tests
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// TOML-file-backed settings, persisted across restarts
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSettings {
    /// Open (or create) the settings file at `path`
    pub fn open(path: impl Into<PathBuf>) -> BridgeResult<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| BridgeError::Settings(format!("failed to parse {:?}: {}", path, e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(BridgeError::Settings(format!(
                    "failed to read {:?}: {}",
                    path, e
                )))
            }
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> BridgeResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BridgeError::Settings(format!("failed to create {:?}: {}", parent, e)))?;
        }
        let content = toml::to_string_pretty(values)
            .map_err(|e| BridgeError::Settings(format!("failed to encode settings: {}", e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| BridgeError::Settings(format!("failed to write {:?}: {}", self.path, e)))
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}
