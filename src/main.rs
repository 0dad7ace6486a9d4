//! TLS time server.
//!
//! ```text
//!  time-client ──TLS──▶ listener ──spawn──▶ handshake ──▶ ConnectionHandler
//!                                                          │  Session (own offset)
//!                                                          └─ TimezoneTable (shared)
//! ```

use std::path::PathBuf;

use clap::Parser;

use time_server::config::{load_or_default, validate_config, ConfigError};
use time_server::lifecycle::run_server;
use time_server::observability::{init_logging, LogDefaults};
use time_server::protocol::Framing;

#[derive(Parser)]
#[command(name = "time-server")]
#[command(about = "TLS time server with per-connection timezones", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:12345
    #[arg(short, long)]
    bind: Option<String>,

    /// Server certificate chain (PEM)
    #[arg(long)]
    cert: Option<String>,

    /// Server private key (PEM)
    #[arg(long)]
    key: Option<String>,

    /// Offset every new connection starts with, in minutes
    #[arg(long, allow_hyphen_values = true)]
    initial_offset_minutes: Option<i32>,

    /// Cap on concurrent connections (default: unbounded)
    #[arg(long)]
    max_connections: Option<usize>,

    /// Wire framing: length_prefixed or raw
    #[arg(long)]
    framing: Option<Framing>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(cert) = cli.cert {
        config.tls.cert_path = cert;
    }
    if let Some(key) = cli.key {
        config.tls.key_path = key;
    }
    if let Some(minutes) = cli.initial_offset_minutes {
        config.session.initial_offset_minutes = minutes;
    }
    if let Some(max) = cli.max_connections {
        config.listener.max_connections = Some(max);
    }
    if let Some(framing) = cli.framing {
        config.protocol.framing = framing;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability, LogDefaults::SERVER)?;

    tracing::info!("time-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = ?config.listener.max_connections,
        initial_offset_minutes = config.session.initial_offset_minutes,
        framing = %config.protocol.framing,
        "Configuration loaded"
    );

    run_server(config).await?;

    tracing::info!("Server shutting down");
    Ok(())
}
