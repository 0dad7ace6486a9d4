//! Session subsystem: one handler per accepted connection.
//!
//! # Data Flow
//! ```text
//! TLS stream (after handshake)
//!     → handler.rs (read frame → decode → dispatch → encode → write, loop)
//!         ↳ state.rs (Session: this connection's offset, owned by the handler)
//!         ↳ TimezoneTable (shared, read-only)
//!     → connection closed on EOF, transport error or malformed bytes
//! ```
//!
//! # Design Decisions
//! - No state is shared between handlers except the read-only table
//! - Unknown zones are an ordinary reply; unrecognized commands are ignored

pub mod handler;
pub mod state;

pub use handler::{ConnectionHandler, HandlerContext, HandlerError};
pub use state::Session;
