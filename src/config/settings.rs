//! # Settings
//!
//! Connection and display preferences for vaultdeck.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::errors::{Result, VaultError};
use crate::types::SecretString;

/// Everything needed to reach Vault and log in.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExplorerConfig {
    /// Vault address, e.g. `https://vault.example.com`
    #[serde(default)]
    #[validate(url(message = "url must be a valid URL (set VAULTDECK_URL)"))]
    pub url: String,

    /// LDAP username
    #[serde(default)]
    #[validate(length(min = 1, message = "username cannot be empty (set VAULTDECK_USERNAME)"))]
    pub username: String,

    /// LDAP password
    #[serde(default)]
    pub password: SecretString,

    /// Mount of the LDAP auth method
    #[serde(default = "default_auth_mount")]
    #[validate(length(min = 1, message = "auth_mount cannot be empty"))]
    pub auth_mount: String,

    /// Mount of the KV v2 secrets engine
    #[serde(default = "default_kv_mount")]
    #[validate(length(min = 1, message = "kv_mount cannot be empty"))]
    pub kv_mount: String,

    /// Space separated labels hidden from listings unless asked for
    #[serde(default)]
    pub technical_paths: String,

    /// Token and namespace cache file; defaults to the user cache directory
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

fn default_auth_mount() -> String {
    "ldap".to_string()
}

fn default_kv_mount() -> String {
    "secret".to_string()
}

impl ExplorerConfig {
    /// Trim the URL's trailing separator and the mounts' surrounding ones.
    pub fn normalize(mut self) -> Self {
        self.url = self.url.trim().trim_end_matches('/').to_string();
        self.username = self.username.trim().to_string();
        self.auth_mount = self.auth_mount.trim().trim_matches('/').to_string();
        self.kv_mount = self.kv_mount.trim().trim_matches('/').to_string();
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(VaultError::from)?;

        if self.password.is_empty() {
            return Err(VaultError::config("password cannot be empty (set VAULTDECK_PASSWORD)"));
        }
        Ok(())
    }

    pub fn technical_paths(&self) -> Vec<String> {
        self.technical_paths.split_whitespace().map(str::to_string).collect()
    }
}
