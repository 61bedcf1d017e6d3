//! API key resolution and storage
//!
//! ## Components
//!
//! - [`StoredApiKey`] - The record kept in the keyring
//! - [`KeyringKeyStorage`] - Secure key storage using the system keyring
//! - [`api_key_from_env`] - Key lookup in the environment

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Keyring service name for storing API keys
const KEYRING_SERVICE: &str = "neodeploy";

/// Environment variables checked for an API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["NEODEPLOY_API_KEY", "NEOCITIES_API_TOKEN"];

/// Returns the first non-empty API key found through `lookup`
///
/// `lookup` is normally `|k| std::env::var(k).ok()`.
pub fn api_key_from_env<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

// ============================================================================
// StoredApiKey
// ============================================================================

/// An API key as kept in the keyring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredApiKey {
    /// The key itself
    pub api_key: String,
    /// When the key was stored
    pub stored_at: DateTime<Utc>,
}

impl StoredApiKey {
    /// Wraps a freshly obtained key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            stored_at: Utc::now(),
        }
    }
}

// ============================================================================
// KeyringKeyStorage
// ============================================================================

/// Stores and retrieves API keys from the system keyring
///
/// Uses the `keyring` crate to store keys in the OS credential store
/// (e.g., GNOME Keyring, KDE Wallet, macOS Keychain). Keys are serialized
/// as JSON with the service name "neodeploy" and the site name as the
/// username.
pub struct KeyringKeyStorage;

impl KeyringKeyStorage {
    /// Stores an API key for the given site
    pub fn store(site_name: &str, key: &StoredApiKey) -> Result<()> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, site_name)
            .context("Failed to create keyring entry")?;

        let json = serde_json::to_string(key).context("Failed to serialize API key")?;

        entry
            .set_password(&json)
            .context("Failed to store API key in keyring")?;

        debug!(site = site_name, "Stored API key in keyring");
        Ok(())
    }

    /// Loads the API key for the given site
    ///
    /// # Returns
    /// `Some(StoredApiKey)` if found, `None` if not found
    pub fn load(site_name: &str) -> Result<Option<StoredApiKey>> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, site_name)
            .context("Failed to create keyring entry")?;

        match entry.get_password() {
            Ok(json) => {
                let key: StoredApiKey = serde_json::from_str(&json)
                    .context("Failed to deserialize API key from keyring")?;
                debug!(site = site_name, "Loaded API key from keyring");
                Ok(Some(key))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(site = site_name, "No API key found in keyring");
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    /// Removes the API key for the given site
    ///
    /// # Returns
    /// `true` if a key was removed, `false` if none was stored
    pub fn clear(site_name: &str) -> Result<bool> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, site_name)
            .context("Failed to create keyring entry")?;

        match entry.delete_credential() {
            Ok(()) => {
                info!(site = site_name, "Cleared API key from keyring");
                Ok(true)
            }
            Err(keyring::Error::NoEntry) => {
                debug!(site = site_name, "No API key to clear");
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}
