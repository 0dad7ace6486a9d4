//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Honor `RUST_LOG`, then the configured level, then the binary's default
//!
//! # Design Decisions
//! - Uses the tracing crate for structured fields (`connection_id`, `peer_addr`)
//! - JSON format for machine parsing, pretty/compact for terminals
//! - The interactive client writes to stderr; stdout belongs to its prompts

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig};

/// Error returned when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("failed to install log subscriber: {0}")]
pub struct LoggingError(#[from] tracing_subscriber::util::TryInitError);

/// Stream log lines are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

/// What a binary falls back to when the config leaves logging unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogDefaults {
    /// Target the configured level applies to; everything else logs at `warn`.
    pub crate_filter: &'static str,
    pub level: &'static str,
    pub target: LogTarget,
}

impl LogDefaults {
    pub const SERVER: Self = Self {
        crate_filter: "time_server",
        level: "info",
        target: LogTarget::Stdout,
    };

    pub const CLIENT: Self = Self {
        crate_filter: "time_server",
        level: "warn",
        target: LogTarget::Stderr,
    };
}

/// `EnvFilter` directive used when `RUST_LOG` is not set.
pub fn filter_directive(config: &ObservabilityConfig, defaults: &LogDefaults) -> String {
    let level = config.log_level.as_deref().unwrap_or(defaults.level);
    format!("warn,{}={}", defaults.crate_filter, level.to_ascii_lowercase())
}

/// Install the global subscriber.
pub fn init_logging(
    config: &ObservabilityConfig,
    defaults: LogDefaults,
) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, &defaults)));

    let fmt_layer = match defaults.target {
        LogTarget::Stdout => fmt_layer(config.log_format, std::io::stdout),
        LogTarget::Stderr => fmt_layer(config.log_format, std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

fn fmt_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
