//! Client subsystem.
//!
//! # Data Flow
//! ```text
//! terminal line
//!     → menu.rs (local validation, re-prompt on bad input)
//!     → session.rs (encode request, send, wait for exactly one reply)
//!     → interactive.rs (print reply, loop)
//! ```
//!
//! # Design Decisions
//! - One request in flight at a time
//! - Invalid input never reaches the server
//! - Ctrl-C drops the loop and closes the stream; there is no goodbye message

pub mod interactive;
pub mod menu;
pub mod session;

pub use interactive::run_interactive;
pub use session::{ClientError, ClientSession, TlsClientStream};
