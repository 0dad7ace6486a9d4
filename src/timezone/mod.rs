//! Timezone subsystem.
//!
//! # Data Flow
//! ```text
//! process start
//!     → table.rs (TimezoneTable::standard(), built once)
//!     → shared via Arc to every connection handler (read-only)
//!
//! set_timezone:<code>
//!     → TimezoneTable::lookup (case-insensitive)
//!     → offset.rs (TimezoneOffset copied into the session)
//! ```
//!
//! # Design Decisions
//! - Offsets are whole seconds so fractional-hour zones (NST, IST-style) stay exact
//! - The table is never mutated after construction; no locking required

pub mod offset;
pub mod table;

pub use offset::TimezoneOffset;
pub use table::{TimezoneTable, ZoneEntry};
