//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, optional connection limit)
//!     → tls.rs (rustls server config, handshake in the connection task)
//!     → connection.rs (ID + lifetime tracking)
//!     → Hand off to the session handler
//!
//! Connection States:
//!     Accepting → Handshaking → Open → Closed
//! ```
//!
//! # Design Decisions
//! - Handshakes run in the spawned task, never on the accept loop
//! - Each connection tracked for graceful shutdown
//! - TLS is mandatory; there is no plaintext mode

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
pub use tls::{HostnamePolicy, TlsError};
