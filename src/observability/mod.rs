//! # Observability
//!
//! Structured logging through `tracing`. Events go to stderr so command output on
//! stdout stays machine readable; `--log-json` switches to JSON lines.

pub mod logging;

pub use logging::log_config_info;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging options resolved from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOptions {
    pub verbose: bool,
    pub json: bool,
}

impl LoggingOptions {
    /// Filter used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "vaultdeck=debug,info"
        } else {
            "info"
        }
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(options: LoggingOptions) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(options.default_directive()))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    // A subscriber may already be installed (tests, embedding); keep it.
    if options.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
    Ok(())
}
