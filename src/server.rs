//! Time server: accept loop and per-connection dispatch.
//!
//! # Responsibilities
//! - Accept TCP connections from the `Listener`
//! - Spawn one task per connection: TLS handshake, then a `ConnectionHandler`
//! - Keep accepting when a single handshake or connection fails
//! - Stop accepting when the shutdown signal fires
//!
//! # Design Decisions
//! - The handshake happens inside the spawned task under a timeout, so a slow
//!   or hostile peer never stalls the accept loop
//! - Shutdown stops new accepts only; in-flight handlers keep running until
//!   their peers disconnect or the process exits

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_rustls::TlsAcceptor;

use crate::config::TimeServiceConfig;
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::protocol::FrameCodec;
use crate::session::{ConnectionHandler, HandlerContext, Session};
use crate::time::{Clock, SystemClock};
use crate::timezone::{TimezoneOffset, TimezoneTable};

/// Back-off after a failed `accept()` (e.g. file descriptor exhaustion).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// State shared by every connection task.
struct Shared {
    acceptor: TlsAcceptor,
    ctx: HandlerContext,
    initial_offset: TimezoneOffset,
    handshake_timeout: Duration,
}

/// TLS time server.
pub struct TimeServer {
    acceptor: TlsAcceptor,
    table: TimezoneTable,
    clock: Arc<dyn Clock>,
    codec: FrameCodec,
    initial_offset: TimezoneOffset,
    handshake_timeout: Duration,
    tracker: ConnectionTracker,
}

impl TimeServer {
    /// Create a server with the standard zone table and the system clock.
    pub fn new(config: &TimeServiceConfig, tls: Arc<rustls::ServerConfig>) -> Self {
        Self {
            acceptor: TlsAcceptor::from(tls),
            table: TimezoneTable::standard(),
            clock: Arc::new(SystemClock),
            codec: FrameCodec::new(config.protocol.framing, config.protocol.max_frame_len),
            initial_offset: config.session.initial_offset(),
            handshake_timeout: config.listener.handshake_timeout(),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the zone table.
    pub fn with_table(mut self, table: TimezoneTable) -> Self {
        self.table = table;
        self
    }

    /// Handle on the live-connection counter.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Accept connections until `shutdown` fires (or its sender is dropped).
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let address = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(
            address = %address,
            framing = %self.codec.framing(),
            initial_offset = %self.initial_offset,
            zones = self.table.len(),
            "Time server started"
        );

        let shared = Arc::new(Shared {
            acceptor: self.acceptor,
            ctx: HandlerContext {
                table: Arc::new(self.table),
                clock: self.clock,
                codec: self.codec,
            },
            initial_offset: self.initial_offset,
            handshake_timeout: self.handshake_timeout,
        });

        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(
                        active_connections = self.tracker.active_count(),
                        "Stopped accepting connections"
                    );
                    break;
                }
                accepted = listener.accept() => accepted,
            };

            let (stream, peer, permit) = match accepted {
                Ok(accepted) => accepted,
                Err(ListenerError::Accept(e)) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            metrics::record_connection_accepted();
            let guard = self.tracker.track();
            tokio::spawn(serve_connection(
                Arc::clone(&shared),
                stream,
                peer,
                guard,
                permit,
            ));
        }

        Ok(())
    }
}

/// Handshake, then serve one client until it leaves.
///
/// `guard` and `permit` are held until this returns.
async fn serve_connection(
    shared: Arc<Shared>,
    stream: TcpStream,
    peer: SocketAddr,
    guard: ConnectionGuard,
    _permit: ConnectionPermit,
) {
    let connection_id = guard.id();
    tracing::debug!(connection_id = %connection_id, peer_addr = %peer, "Starting TLS handshake");

    let handshake = tokio::time::timeout(shared.handshake_timeout, shared.acceptor.accept(stream));
    let tls_stream = match handshake.await {
        Ok(Ok(tls_stream)) => tls_stream,
        Ok(Err(e)) => {
            metrics::record_handshake_failure();
            tracing::warn!(
                connection_id = %connection_id,
                peer_addr = %peer,
                error = %e,
                "TLS handshake failed"
            );
            return;
        }
        Err(_) => {
            metrics::record_handshake_failure();
            tracing::warn!(
                connection_id = %connection_id,
                peer_addr = %peer,
                timeout_secs = shared.handshake_timeout.as_secs(),
                "TLS handshake timed out"
            );
            return;
        }
    };

    tracing::info!(connection_id = %connection_id, peer_addr = %peer, "Connection established");

    let session = Session::new(connection_id, Some(peer), shared.initial_offset);
    match ConnectionHandler::new(tls_stream, session, shared.ctx.clone())
        .run()
        .await
    {
        Ok(()) => {
            tracing::info!(connection_id = %connection_id, peer_addr = %peer, "Connection closed")
        }
        Err(e) => tracing::warn!(
            connection_id = %connection_id,
            peer_addr = %peer,
            error = %e,
            "Connection closed with error"
        ),
    }
}
