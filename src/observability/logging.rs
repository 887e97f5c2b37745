//! # Structured Logging
//!
//! Span helpers for secrets engine calls. Every KV operation runs inside a
//! `kv_operation` span carrying the operation name and the secret path, so a failed
//! call can be traced back to the path that triggered it. Secret values and tokens
//! are never recorded.

/// Create a tracing span for a KV engine call.
///
/// ```rust,ignore
/// let span = kv_span!(Operation::Read, "/app/db");
/// let span = kv_span!(Operation::Destroy, "/app/db", version = 3);
/// ```
#[macro_export]
macro_rules! kv_span {
    ($operation:expr, $path:expr) => {
        tracing::debug_span!(
            "kv_operation",
            operation = %$operation,
            path = %$path
        )
    };
    ($operation:expr, $path:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "kv_operation",
            operation = %$operation,
            path = %$path,
            $($field)*
        )
    };
}

/// Log the effective configuration at startup. Credentials are not logged.
pub fn log_config_info(config: &crate::config::ExplorerConfig) {
    tracing::info!(
        vault_url = %config.url,
        auth_mount = %config.auth_mount,
        username = %config.username,
        kv_mount = %config.kv_mount,
        technical_paths = config.technical_paths().len(),
        "vaultdeck configuration"
    );
}
