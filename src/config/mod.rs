//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI flag overrides (bin targets)
//!     → validation.rs again
//!     → TimeServiceConfig (immutable from here on)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the binaries run without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    ClientConfig, LifecycleConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProtocolConfig,
    SessionConfig, TimeServiceConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
