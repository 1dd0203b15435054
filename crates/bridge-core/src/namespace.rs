//! # Callback Namespace
//!
//! The callback URL embeds a random path segment generated once per
//! installation, so the endpoint cannot be trivially discovered. The token
//! needs to be unguessable, not cryptographically bound to anything: it is
//! the routing firewall, payload validation happens behind it.

use crate::error::BridgeResult;
use crate::settings::{SettingsStore, NAMESPACE_KEY};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

/// REST prefix the callback route is registered under
pub const NAMESPACE_PREFIX: &str = "soleaspay/v1/response/";

/// Derive a fresh namespace token from random entropy and a unique-per-call
/// value
fn generate_token() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode(hasher.finalize())
}

/// Ensure the callback namespace exists, generating and persisting it on
/// first use. Repeated calls are no-ops once a value is stored; under a
/// racing double-init the last write wins, which is acceptable because
/// settings mutation is not on a concurrent request path.
///
/// Returns the full namespace, e.g. `soleaspay/v1/response/<token>`.
pub fn ensure_callback_namespace(settings: &dyn SettingsStore) -> BridgeResult<String> {
    if let Some(existing) = settings.get(NAMESPACE_KEY) {
        return Ok(existing);
    }

    let namespace = format!("{}{}", NAMESPACE_PREFIX, generate_token());
    settings.set(NAMESPACE_KEY, &namespace)?;
    info!(namespace = %namespace, "generated callback namespace");
    Ok(namespace)
}

/// Extract the token from a persisted namespace: the suffix after the last
/// `response/` segment
pub fn namespace_token(namespace: &str) -> &str {
    namespace
        .rsplit_once("response/")
        .map(|(_, token)| token)
        .unwrap_or(namespace)
}
