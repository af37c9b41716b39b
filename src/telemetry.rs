//! Logging setup

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` overrides `logging.level`.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow!("Invalid log filter: {e}"))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init(),
        "compact" => registry.with(fmt::layer().compact()).try_init(),
        _ => registry.with(fmt::layer().pretty()).try_init(),
    };

    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
