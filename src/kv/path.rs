//! Path conventions for the KV hierarchy.
//!
//! Secret paths are absolute (`/app/db`), folder paths end with the separator
//! (`/app/`), the root folder is `/`. Vault itself wants paths relative to the
//! mount, see [`relative`].

use url::Url;

use crate::errors::{Result, VaultError};

pub const SEPARATOR: char = '/';

/// `app/db/` or `/app/db` -> `/app/db`
pub fn secret_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches(SEPARATOR);
    format!("{}{}", SEPARATOR, trimmed)
}

/// `app` or `/app/` -> `/app/`; empty -> `/`
pub fn folder_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        SEPARATOR.to_string()
    } else {
        format!("{}{}{}", SEPARATOR, trimmed, SEPARATOR)
    }
}

pub fn is_folder(key: &str) -> bool {
    key.ends_with(SEPARATOR)
}

/// Path relative to the mount, as expected by the Vault API.
pub fn relative(path: &str) -> &str {
    path.trim_start_matches(SEPARATOR)
}

/// Last segment of a key, keeping the trailing separator of folders.
pub fn label(key: &str) -> &str {
    let body = key.trim_end_matches(SEPARATOR);
    let start = body.rfind(SEPARATOR).map(|i| i + 1).unwrap_or(0);
    &key[start..]
}

/// Link to the Vault web UI for a secret or folder.
///
/// Folders open the list view, secrets the show view; no path opens the secrets
/// engines overview.
pub fn ui_url(address: &str, mount: &str, path: Option<&str>, namespace: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(address)
        .map_err(|e| VaultError::config(format!("Invalid Vault address '{}': {}", address, e)))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| VaultError::config(format!("Vault address '{}' cannot be a base", address)))?;
        segments.pop_if_empty().extend(["ui", "vault", "secrets"]);

        if let Some(path) = path.filter(|p| !relative(p).is_empty()) {
            let view = if is_folder(path) { "list" } else { "show" };
            segments
                .extend(mount.split(SEPARATOR).filter(|s| !s.is_empty()))
                .push(view)
                .extend(relative(path).split(SEPARATOR));
        }
    }
    if let Some(namespace) = namespace {
        url.query_pairs_mut().append_pair("namespace", namespace);
    }
    Ok(url)
}

/// File name used when exporting a secret: `secret_app_db.json` for `/app/db`.
pub fn export_file_name(path: &str) -> String {
    format!("secret{}.json", secret_path(path).replace(SEPARATOR, "_"))
}
