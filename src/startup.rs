//! Wiring of the credential manager, the Vault engine and the secret tree from
//! the loaded configuration.

use std::sync::Arc;
use tracing::debug;

use crate::auth::{CredentialManager, LdapAuthenticator};
use crate::cache::{CacheStore, FileCache};
use crate::config::ExplorerConfig;
use crate::errors::Result;
use crate::kv::{SecretTree, SecretVersionController, VaultKvEngine};

/// A ready-to-use session against one Vault server.
pub struct Explorer {
    config: ExplorerConfig,
    credentials: Arc<CredentialManager>,
    tree: SecretTree<VaultKvEngine>,
}

impl Explorer {
    /// Build the session with the on-disk token cache.
    pub fn from_config(config: ExplorerConfig) -> Result<Self> {
        let cache_path = match &config.cache_path {
            Some(path) => path.clone(),
            None => FileCache::default_path()?,
        };
        debug!(cache_path = %cache_path.display(), "Using token cache");
        Self::with_store(config, Arc::new(FileCache::new(cache_path)))
    }

    /// Build the session on top of an arbitrary cache store.
    pub fn with_store(config: ExplorerConfig, store: Arc<dyn CacheStore>) -> Result<Self> {
        let authenticator = LdapAuthenticator::new(
            config.url.clone(),
            config.auth_mount.clone(),
            config.username.clone(),
            config.password.clone(),
        )?;
        let credentials =
            Arc::new(CredentialManager::new(config.url.clone(), store, Arc::new(authenticator)));

        let engine = Arc::new(VaultKvEngine::new(credentials.clone(), config.kv_mount.clone()));
        let tree = SecretTree::new(SecretVersionController::new(engine));

        Ok(Self { config, credentials, tree })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    pub fn secrets(&self) -> &SecretVersionController<VaultKvEngine> {
        self.tree.controller()
    }

    pub fn tree(&self) -> &SecretTree<VaultKvEngine> {
        &self.tree
    }
}
