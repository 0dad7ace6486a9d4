//! Stop signal shared by the signal handler and the accept loop.

use tokio::sync::broadcast;

/// Fan-out stop signal.
///
/// Each long-running task holds its own receiver; `trigger` wakes all of them.
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Wake every subscriber. Harmless if nobody is listening.
    pub fn trigger(&self) {
        let listeners = self.sender.send(()).unwrap_or(0);
        tracing::debug!(listeners, "Shutdown triggered");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
