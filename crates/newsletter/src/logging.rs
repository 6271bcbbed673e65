//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

/// Build the filter: `RUST_LOG` if set and valid, else the configured level.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(config))
}

fn configured_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::new(&config.level)
}

/// Install the global fmt subscriber.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow!(err))
}
