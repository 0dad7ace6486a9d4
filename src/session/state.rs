//! Per-connection session state.

use std::net::SocketAddr;

use crate::net::connection::ConnectionId;
use crate::timezone::TimezoneOffset;

/// State owned by exactly one connection handler.
///
/// Created at accept time and dropped with the connection; never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: ConnectionId,
    peer: Option<SocketAddr>,
    offset: TimezoneOffset,
}

impl Session {
    pub fn new(id: ConnectionId, peer: Option<SocketAddr>, initial_offset: TimezoneOffset) -> Self {
        Self {
            id,
            peer,
            offset: initial_offset,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Offset currently applied to `get_time`.
    pub fn offset(&self) -> TimezoneOffset {
        self.offset
    }

    pub fn set_offset(&mut self, offset: TimezoneOffset) {
        self.offset = offset;
    }
}
