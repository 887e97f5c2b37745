//! # Error Handling
//!
//! Error taxonomy for the Vault KV v2 explorer, built with `thiserror`.
//!
//! Every error that comes back from the secrets engine carries the path and the
//! [`Operation`] that triggered it, so callers can render a message without
//! keeping their own bookkeeping. Nothing is retried internally.
//!
//! A refused read (deleted or destroyed current version) is *not* an error; it is
//! modelled by [`crate::kv::ReadOutcome::Refused`].

use std::fmt;

/// Custom result type for vaultdeck operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Secrets engine operation, used as error and log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    List,
    Read,
    ReadMetadata,
    Write,
    Delete,
    Destroy,
    DestroyAll,
    Undelete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::List => "list",
            Operation::Read => "read",
            Operation::ReadMetadata => "read_metadata",
            Operation::Write => "write",
            Operation::Delete => "delete",
            Operation::Destroy => "destroy",
            Operation::DestroyAll => "destroy_all",
            Operation::Undelete => "undelete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type
#[derive(thiserror::Error, Debug)]
pub enum VaultError {
    /// Login failed (bad credentials, network failure, non-2xx). Never cached.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The current-version pointer does not match any listed version
    #[error("Metadata inconsistency for '{path}': current version {current_version} not found in versions list")]
    MetadataInconsistency { path: String, current_version: u64 },

    /// A version-targeted operation was called without a version number
    #[error("Version is mandatory to {operation} '{path}'")]
    MissingVersion { path: String, operation: Operation },

    /// The targeted version has been destroyed and cannot be recovered
    #[error("Version {version} of '{path}' has been destroyed")]
    AlreadyDestroyed { path: String, version: u64 },

    /// The backend has nothing at this path
    #[error("Nothing found at '{path}' ({operation})")]
    NotFound { operation: Operation, path: String },

    /// Non-2xx or network failure from the secrets engine
    #[error("{operation} failed for '{path}': {message}")]
    Transport { operation: Operation, path: String, message: String },

    /// The backend answered with something we could not interpret
    #[error("Malformed response for '{path}': {message}")]
    MalformedResponse { path: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Token/namespace cache store errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Create a new authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication { message: message.into() }
    }

    /// Create a new transport error
    pub fn transport<P: Into<String>, S: Into<String>>(
        operation: Operation,
        path: P,
        message: S,
    ) -> Self {
        Self::Transport { operation, path: path.into(), message: message.into() }
    }

    /// Create a new missing version error
    pub fn missing_version<P: Into<String>>(operation: Operation, path: P) -> Self {
        Self::MissingVersion { path: path.into(), operation }
    }

    /// Create a new malformed response error
    pub fn malformed<P: Into<String>, S: Into<String>>(path: P, message: S) -> Self {
        Self::MalformedResponse { path: path.into(), message: message.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache { message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<config::ConfigError> for VaultError {
    fn from(error: config::ConfigError) -> Self {
        Self::config(format!("Configuration loading failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for VaultError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect();
        fields.sort();

        Self::config(format!("Validation failed: {}", fields.join("; ")))
    }
}
