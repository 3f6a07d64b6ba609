//! Structured logging for TalkOne build tooling
//!
//! Installs a `tracing` subscriber writing compact records to stderr, so log
//! lines never interleave with the stdout status output of the CLI.

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs of one run
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize with custom configuration.
///
/// `RUST_LOG` takes precedence over [`TelemetryConfig::log_level`].
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target)
        .with_ansi(config.ansi)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Include the module path in each record
    pub show_target: bool,
    /// Color log records; callers turn this off for `--no-color` or a non-terminal stderr
    pub ansi: bool,
}

impl TelemetryConfig {
    /// Map CLI verbosity flags to a log level.
    ///
    /// Quiet wins over any `-v`.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let log_level = match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        };

        Self {
            log_level: log_level.to_string(),
            show_target: verbose >= 2,
            ansi: true,
        }
    }
}
