//! # Configuration Management
//!
//! Settings are layered: an optional TOML file (`<config dir>/vaultdeck/config.toml`
//! or `--config`), then `VAULTDECK_*` environment variables, which win. A `.env`
//! file in the working directory is loaded into the environment by `main`.

pub mod settings;

pub use settings::ExplorerConfig;

use config::{Environment, File};
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub const ENV_PREFIX: &str = "VAULTDECK";

/// Default location of the config file, when the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(crate::APP_NAME).join("config.toml"))
}

/// Load, normalize and validate the configuration.
///
/// An explicitly given file must exist; the default one is optional.
pub fn load(explicit: Option<&Path>) -> Result<ExplorerConfig> {
    load_from(explicit, Environment::with_prefix(ENV_PREFIX))
}

pub fn load_from(explicit: Option<&Path>, environment: Environment) -> Result<ExplorerConfig> {
    let mut builder = config::Config::builder();

    match explicit {
        Some(path) => builder = builder.add_source(File::from(path).required(true)),
        None => {
            if let Some(path) = default_config_path() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }
    }

    let config: ExplorerConfig = builder.add_source(environment).build()?.try_deserialize()?;
    let config = config.normalize();
    config.validate()?;
    Ok(config)
}
