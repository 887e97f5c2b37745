//! Token cache with expiry, namespace state and lazy login.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};

use super::ldap::Authenticator;
use crate::cache::{CacheStore, VAULT_NAMESPACE_CACHE_KEY, VAULT_TOKEN_CACHE_KEY};
use crate::errors::{Result, VaultError};
use crate::types::SecretString;

/// Token plus the instant (epoch millis) after which it must not be used.
///
/// Tokens are namespace-scoped, so the namespace the token was issued for is kept
/// alongside it and a token from another namespace is never handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: SecretString,
    pub expires_at_epoch_millis: i64,
    pub namespace: Option<String>,
}

/// On-disk shape; the token is stored in clear so it can be reused.
#[derive(Serialize, Deserialize)]
struct StoredToken {
    #[serde(with = "crate::types::exposed")]
    token: SecretString,
    expiration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
}

impl CachedToken {
    pub fn new(token: impl Into<SecretString>, expires_at_epoch_millis: i64) -> Self {
        Self { token: token.into(), expires_at_epoch_millis, namespace: None }
    }

    pub fn in_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    /// A token is expired from its expiry instant onwards.
    pub fn is_expired_at(&self, now_epoch_millis: i64) -> bool {
        now_epoch_millis >= self.expires_at_epoch_millis
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&StoredToken {
            token: self.token.clone(),
            expiration: self.expires_at_epoch_millis,
            namespace: self.namespace.clone(),
        })?)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let stored: StoredToken = serde_json::from_str(raw)?;
        Ok(Self {
            token: stored.token,
            expires_at_epoch_millis: stored.expiration,
            namespace: stored.namespace,
        })
    }
}

/// Everything needed to talk to Vault as the logged-in user.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    address: String,
    token: SecretString,
    namespace: Option<String>,
}

impl AuthenticatedClient {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Build a `vaultrs` client bound to this token and namespace.
    pub fn vault_client(&self) -> Result<VaultClient> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&self.address).token(self.token.expose_secret());

        if let Some(namespace) = &self.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        let settings = settings_builder
            .build()
            .map_err(|e| VaultError::config(format!("Invalid Vault configuration: {}", e)))?;

        VaultClient::new(settings)
            .map_err(|e| VaultError::config(format!("Failed to create Vault client: {}", e)))
    }
}

/// Owns the cached token and the namespace.
///
/// At most one valid token is cached at a time, and a client is never handed out
/// with an expired token. The check-expiry / login / store sequence runs under an
/// async mutex, so concurrent callers in one process trigger a single login.
pub struct CredentialManager {
    address: String,
    store: Arc<dyn CacheStore>,
    authenticator: Arc<dyn Authenticator>,
    login_lock: Mutex<()>,
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager").field("address", &self.address).finish()
    }
}

impl CredentialManager {
    pub fn new(
        address: impl Into<String>,
        store: Arc<dyn CacheStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self { address: address.into(), store, authenticator, login_lock: Mutex::new(()) }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Active namespace; `None` is the root namespace.
    pub fn namespace(&self) -> Result<Option<String>> {
        self.store.get(VAULT_NAMESPACE_CACHE_KEY)
    }

    /// Switch namespace and drop the cached token, since tokens are namespace-scoped.
    ///
    /// An empty or blank namespace selects the root namespace. Waits for a login in
    /// flight to finish, so its token is removed rather than outliving the switch.
    pub async fn set_namespace(&self, namespace: Option<&str>) -> Result<()> {
        let _guard = self.login_lock.lock().await;
        match namespace.map(str::trim).filter(|ns| !ns.is_empty()) {
            Some(namespace) => self.store.set(VAULT_NAMESPACE_CACHE_KEY, namespace)?,
            None => self.store.remove(VAULT_NAMESPACE_CACHE_KEY)?,
        }
        self.store.remove(VAULT_TOKEN_CACHE_KEY)?;
        info!(namespace = namespace.unwrap_or("root"), "Namespace changed, cached token removed");
        Ok(())
    }

    /// The cached token if it is still valid. Never logs in.
    pub fn cached_token(&self) -> Result<Option<CachedToken>> {
        let namespace = self.namespace()?;
        self.valid_cached_token(namespace.as_deref(), Utc::now().timestamp_millis())
    }

    /// Forget the cached token.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.login_lock.lock().await;
        self.store.remove(VAULT_TOKEN_CACHE_KEY)
    }

    /// Return a client bound to a valid token, logging in first if needed.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn authenticated_client(&self) -> Result<AuthenticatedClient> {
        let _guard = self.login_lock.lock().await;

        let namespace = self.namespace()?;
        let now = Utc::now().timestamp_millis();

        let token = match self.valid_cached_token(namespace.as_deref(), now)? {
            Some(token) => {
                debug!("Reusing cached Vault token");
                token
            }
            None => self.login(namespace.as_deref(), now).await?,
        };

        Ok(AuthenticatedClient { address: self.address.clone(), token: token.token, namespace })
    }

    fn valid_cached_token(&self, namespace: Option<&str>, now: i64) -> Result<Option<CachedToken>> {
        let Some(raw) = self.store.get(VAULT_TOKEN_CACHE_KEY)? else {
            return Ok(None);
        };

        match CachedToken::decode(&raw) {
            Ok(token) if token.namespace.as_deref() != namespace => {
                info!(
                    issued_for = token.namespace.as_deref().unwrap_or("root"),
                    active = namespace.unwrap_or("root"),
                    "Cached token belongs to another namespace, removing"
                );
                self.store.remove(VAULT_TOKEN_CACHE_KEY)?;
                Ok(None)
            }
            Ok(token) if !token.is_expired_at(now) => Ok(Some(token)),
            Ok(_) => {
                info!("Token expired, removing from cache");
                self.store.remove(VAULT_TOKEN_CACHE_KEY)?;
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cached token");
                self.store.remove(VAULT_TOKEN_CACHE_KEY)?;
                Ok(None)
            }
        }
    }

    async fn login(&self, namespace: Option<&str>, now: i64) -> Result<CachedToken> {
        info!(namespace = namespace.unwrap_or("root"), "Logging in to Vault");

        let grant = self.authenticator.login(namespace).await.map_err(|e| match e {
            VaultError::Authentication { .. } => e,
            other => VaultError::authentication(other.to_string()),
        })?;

        let lease_millis = i64::try_from(grant.lease_duration)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        let token = CachedToken::new(grant.client_token, now.saturating_add(lease_millis))
            .in_namespace(namespace);

        self.store.set(VAULT_TOKEN_CACHE_KEY, &token.encode()?)?;
        info!(lease_duration = grant.lease_duration, "Logged in, token cached");
        Ok(token)
    }
}
