//! Connection identity and live-connection accounting.
//!
//! # Responsibilities
//! - Hand out a `conn-N` identifier per accepted socket for log correlation
//! - Count sockets that are handshaking or being served
//! - Wake shutdown when the count reaches zero
//!
//! # Design Decisions
//! - The count lives behind one `Arc` shared by the tracker and every guard,
//!   so a guard can be moved into a spawned task
//! - Idle waiters are woken through `Notify` instead of polling

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::observability::metrics;

/// Source of connection numbers. Only uniqueness matters.
static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Process-unique label for one accepted socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct LiveSet {
    count: AtomicU64,
    idle: Notify,
}

/// Counts open connections. Clones observe the same count.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    live: Arc<LiveSet>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted socket.
    ///
    /// The connection counts as live until the returned guard is dropped.
    pub fn track(&self) -> ConnectionGuard {
        let now_live = self.live.count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_active_connections(now_live);
        ConnectionGuard {
            live: Arc::clone(&self.live),
            id: ConnectionId::new(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.live.count.load(Ordering::SeqCst)
    }

    /// Resolve once no connection is live.
    pub async fn wait_until_idle(&self) {
        loop {
            let notified = self.live.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a release in between is not missed.
            notified.as_mut().enable();
            if self.active_count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks one connection as live for as long as it exists.
#[derive(Debug)]
pub struct ConnectionGuard {
    live: Arc<LiveSet>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let still_live = self.live.count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_active_connections(still_live);
        tracing::trace!(connection_id = %self.id, still_live, "Connection released");
        if still_live == 0 {
            self.live.idle.notify_waiters();
        }
    }
}
