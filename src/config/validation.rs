//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, limits and timeouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: TimeServiceConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use crate::config::schema::TimeServiceConfig;

/// Frames larger than this are refused outright.
pub const MAX_FRAME_LEN_LIMIT: usize = 16 * 1024 * 1024;

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `listener.bind_address`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every semantic rule and collect all failures.
pub fn validate_config(config: &TimeServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "client.server_address", &config.client.server_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.listener.max_connections == Some(0) {
        errors.push(ValidationError::new(
            "listener.max_connections",
            "must be greater than 0 (omit it for no limit)",
        ));
    }
    if config.listener.handshake_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.handshake_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.client.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "client.connect_timeout_secs",
            "must be greater than 0",
        ));
    }

    let max_frame_len = config.protocol.max_frame_len;
    if max_frame_len == 0 || max_frame_len > MAX_FRAME_LEN_LIMIT {
        errors.push(ValidationError::new(
            "protocol.max_frame_len",
            format!("must be between 1 and {MAX_FRAME_LEN_LIMIT}, got {max_frame_len}"),
        ));
    }

    let offset = config.session.initial_offset_minutes;
    if offset.abs() > MAX_OFFSET_MINUTES {
        errors.push(ValidationError::new(
            "session.initial_offset_minutes",
            format!("must be within ±{MAX_OFFSET_MINUTES}, got {offset}"),
        ));
    }

    for (field, value) in [
        ("tls.cert_path", &config.tls.cert_path),
        ("tls.key_path", &config.tls.key_path),
        ("tls.ca_cert_path", &config.tls.ca_cert_path),
        ("client.server_name", &config.client.server_name),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if let Some(level) = &config.observability.log_level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            errors.push(ValidationError::new(
                "observability.log_level",
                format!("unknown level {level:?}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = value.parse::<SocketAddr>() {
        errors.push(ValidationError::new(field, format!("{value:?} is not a socket address: {e}")));
    }
}
