//! Log subscriber setup.
//!
//! Events go to stderr so `run --format json` keeps stdout machine-readable.

use crate::config::Verbosity;
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Filter directive used when `RUST_LOG` is unset
#[must_use]
pub fn default_directive(verbosity: Verbosity) -> String {
    let level = verbosity.log_level();
    format!("warn,warnprobe={level},warnprobe_cli={level}")
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
pub fn init_logging(verbosity: Verbosity, format: LogFormat) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|e| CliError::config(format!("cannot install log subscriber: {e}")))
}
