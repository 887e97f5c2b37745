//! Password login against a Vault auth mount (LDAP by default).
//!
//! `POST {address}/v1/auth/{mount}/login/{username}` with `{"password": ...}`. The
//! same request shape serves the `userpass` method, so the mount is configurable.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::errors::{Result, VaultError};
use crate::types::SecretString;

/// Header carrying the Vault Enterprise namespace
pub const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Token issued by a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub client_token: SecretString,
    /// Validity window in seconds
    pub lease_duration: u64,
}

/// Exchanges configured credentials for a token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Log in, scoped to `namespace` when given. Every failure is
    /// [`VaultError::Authentication`].
    async fn login(&self, namespace: Option<&str>) -> Result<LoginGrant>;
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth: LoginAuth,
}

#[derive(Debug, Deserialize)]
struct LoginAuth {
    client_token: String,
    lease_duration: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// [`Authenticator`] posting a username/password to a Vault auth mount.
pub struct LdapAuthenticator {
    http: Client,
    address: String,
    mount: String,
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for LdapAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapAuthenticator")
            .field("address", &self.address)
            .field("mount", &self.mount)
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}

impl LdapAuthenticator {
    pub fn new(
        address: impl Into<String>,
        mount: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| VaultError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            address: address.into(),
            mount: mount.into(),
            username: username.into(),
            password,
        })
    }

    /// Login endpoint, with the username percent-encoded as a single path segment.
    pub fn login_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.address).map_err(|e| {
            VaultError::config(format!("Invalid Vault address '{}': {}", self.address, e))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                VaultError::config(format!("Vault address '{}' cannot be a base", self.address))
            })?;
            segments
                .pop_if_empty()
                .extend(["v1", "auth"])
                .extend(self.mount.split('/').filter(|s| !s.is_empty()))
                .extend(["login", self.username.as_str()]);
        }
        Ok(url)
    }
}

#[async_trait]
impl Authenticator for LdapAuthenticator {
    async fn login(&self, namespace: Option<&str>) -> Result<LoginGrant> {
        let url = self.login_url()?;
        debug!(url = %url, namespace = ?namespace, "POST login");

        let mut request = self
            .http
            .post(url)
            .json(&serde_json::json!({ "password": self.password.expose_secret() }));
        if let Some(namespace) = namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, address = %self.address, "Login request failed");
            VaultError::authentication(format!("Login request to {} failed: {}", self.address, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let errors = serde_json::from_str::<ErrorBody>(&body).unwrap_or_default().errors;
            warn!(status = status.as_u16(), username = %self.username, "Login rejected");
            let detail = if errors.is_empty() { String::new() } else { format!(": {}", errors.join(", ")) };
            return Err(VaultError::authentication(format!(
                "Login for '{}' on mount '{}' rejected with status {}{}",
                self.username,
                self.mount,
                status.as_u16(),
                detail
            )));
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            VaultError::authentication(format!("Unreadable login response: {}", e))
        })?;

        Ok(LoginGrant {
            client_token: SecretString::new(body.auth.client_token),
            lease_duration: body.auth.lease_duration,
        })
    }
}
