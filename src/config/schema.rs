//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! server and client binaries. All types derive Serde traits for
//! deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::net::tls::HostnamePolicy;
use crate::protocol::framing::{Framing, DEFAULT_MAX_FRAME_LEN};
use crate::timezone::TimezoneOffset;

/// Root configuration for the time service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeServiceConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Certificate and key locations.
    pub tls: TlsConfig,

    /// Per-connection session defaults.
    pub session: SessionConfig,

    /// Wire framing shared by server and client.
    pub protocol: ProtocolConfig,

    /// Client connection settings.
    pub client: ClientConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Shutdown behavior.
    pub lifecycle: LifecycleConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:12345").
    pub bind_address: String,

    /// Maximum concurrent connections. `None` spawns a task per client with
    /// no limit.
    pub max_connections: Option<usize>,

    /// Time allowed for a TLS handshake to complete.
    pub handshake_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:12345".to_string(),
            max_connections: None,
            handshake_timeout_secs: 10,
        }
    }
}

impl ListenerConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

/// TLS file locations (PEM).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Server certificate chain.
    pub cert_path: String,

    /// Server private key.
    pub key_path: String,

    /// CA certificate the client trusts.
    pub ca_cert_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: "server-cert.pem".to_string(),
            key_path: "server-key.pem".to_string(),
            ca_cert_path: "ca-cert.pem".to_string(),
        }
    }
}

/// Session defaults applied to every new connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Offset a connection starts with, in minutes.
    pub initial_offset_minutes: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_offset_minutes: 45,
        }
    }
}

impl SessionConfig {
    pub fn initial_offset(&self) -> TimezoneOffset {
        TimezoneOffset::from_minutes(self.initial_offset_minutes)
    }
}

/// Wire protocol settings. Server and client must agree.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub framing: Framing,

    /// Largest accepted message payload in bytes.
    pub max_frame_len: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            framing: Framing::LengthPrefixed,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Client connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address (e.g., "127.0.0.1:12345").
    pub server_address: String,

    /// Name expected in the server certificate, also sent as SNI.
    pub server_name: String,

    pub hostname_verification: HostnamePolicy,

    /// TCP connect + TLS handshake timeout.
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:12345".to_string(),
            server_name: "localhost".to_string(),
            hostname_verification: HostnamePolicy::Strict,
            connect_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    ///
    /// Unset means the binary's own default: `info` for the server, `warn`
    /// for the interactive client.
    pub log_level: Option<String>,

    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long shutdown waits for open connections before exiting.
    pub shutdown_grace_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 5,
        }
    }
}

impl LifecycleConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: TimeServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:12345");
        assert_eq!(config.listener.max_connections, None);
        assert_eq!(config.session.initial_offset(), TimezoneOffset::from_minutes(45));
        assert_eq!(config.protocol.framing, Framing::LengthPrefixed);
        assert_eq!(config.protocol.max_frame_len, 1024);
        assert_eq!(config.client.hostname_verification, HostnamePolicy::Strict);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config: TimeServiceConfig = toml::from_str(
            r#"
            [listener]
            max_connections = 64

            [protocol]
            framing = "raw"

            [client]
            hostname_verification = "skip"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.max_connections, Some(64));
        assert_eq!(config.listener.handshake_timeout_secs, 10);
        assert_eq!(config.protocol.framing, Framing::Raw);
        assert_eq!(config.protocol.max_frame_len, 1024);
        assert_eq!(config.client.hostname_verification, HostnamePolicy::Skip);
        assert_eq!(config.client.server_name, "localhost");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, None);
    }
}
