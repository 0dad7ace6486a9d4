//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the TLS identity and bind the listener
//! - Start the metrics endpoint when enabled
//! - Run the server until a termination signal, then drain
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use crate::config::TimeServiceConfig;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::net::tls::{self, TlsError};
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::server::TimeServer;

/// Errors that abort server startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("TLS: {0}")]
    Tls(#[from] TlsError),

    #[error("listener: {0}")]
    Listener(#[from] ListenerError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("metrics: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Build the server and bind its listener without starting to accept.
pub async fn prepare_server(
    config: &TimeServiceConfig,
) -> Result<(TimeServer, Listener), StartupError> {
    let tls = tls::load_server_config(
        Path::new(&config.tls.cert_path),
        Path::new(&config.tls.key_path),
    )?;
    let server = TimeServer::new(config, tls);
    let listener = Listener::bind(&config.listener).await?;
    Ok((server, listener))
}

/// Run the server until SIGINT/SIGTERM, then wait for open connections.
pub async fn run_server(config: TimeServiceConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let raw = &config.observability.metrics_address;
        let addr: SocketAddr = raw
            .parse()
            .map_err(|_| StartupError::MetricsAddress(raw.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let (server, listener) = prepare_server(&config).await?;
    let tracker = server.tracker();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;

    let grace = config.lifecycle.shutdown_grace();
    if tokio::time::timeout(grace, tracker.wait_until_idle())
        .await
        .is_err()
    {
        tracing::warn!(
            active_connections = tracker.active_count(),
            grace_secs = grace.as_secs(),
            "Connections still open after grace period; exiting anyway"
        );
    }
    Ok(())
}
