//! Wire protocol subsystem.
//!
//! # Data Flow
//! ```text
//! TLS stream bytes
//!     → framing.rs (split into whole messages)
//!     → request.rs (get_time | set_timezone:<code>)
//!     → [session handler]
//!     → response.rs (timestamp | confirmation | "Invalid timezone.")
//!     → framing.rs → TLS stream bytes
//! ```
//!
//! # Design Decisions
//! - Messages are plain UTF-8 text with no escaping
//! - Framing is a separate layer so the text grammar stays identical in both
//!   framing modes

pub mod framing;
pub mod request;
pub mod response;

pub use framing::{FrameCodec, FrameError, Framing, DEFAULT_MAX_FRAME_LEN};
pub use request::{DecodeError, Request};
pub use response::{Response, TIMESTAMP_FORMAT};
