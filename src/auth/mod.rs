//! Vault authentication: password login and the cached, expiring token.
//!
//! [`CredentialManager`] owns the token lifecycle. It reads the cached token from an
//! injected [`crate::cache::CacheStore`], logs in through an [`Authenticator`] when
//! the token is missing or expired, and hands out [`AuthenticatedClient`]s bound to
//! the token and the active namespace.

pub mod credentials;
pub mod ldap;

pub use credentials::{AuthenticatedClient, CachedToken, CredentialManager};
pub use ldap::{Authenticator, LdapAuthenticator, LoginGrant, NAMESPACE_HEADER};
