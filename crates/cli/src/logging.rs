use anyhow::{anyhow, Result};
use landed_core::config::{AppConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Output goes to stderr so command results on
/// stdout stay parseable. `RUST_LOG` takes precedence over `logging.level`.
pub fn init(config: &AppConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter(&config.logging.level))
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
