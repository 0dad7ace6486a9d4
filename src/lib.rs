//! TLS time service library.
//!
//! A server answers `get_time` and `set_timezone:<code>` over TLS, keeping a
//! timezone offset per connection; an interactive client drives it.

// Core
pub mod protocol;
pub mod session;
pub mod timezone;

// Transport
pub mod net;
pub mod server;

pub mod client;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod time;

pub use client::ClientSession;
pub use config::TimeServiceConfig;
pub use lifecycle::Shutdown;
pub use server::TimeServer;
