//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use tokio::task::JoinHandle;

use time_server::client::{ClientError, ClientSession};
use time_server::config::TimeServiceConfig;
use time_server::lifecycle::{prepare_server, Shutdown};
use time_server::net::tls;
use time_server::net::{ConnectionTracker, HostnamePolicy, ListenerError};
use time_server::protocol::{FrameCodec, Response};

/// Allowed drift between a returned timestamp and the test's own clock.
pub const CLOCK_TOLERANCE_SECS: i64 = 5;

// Fixtures are P-256 keys generated with openssl, valid until 2126:
//   openssl req -x509 -newkey ec -pkeyopt ec_paramgen_curve:prime256v1 -nodes -days 36500 \
//     -subj "/CN=time-server test CA" -addext "basicConstraints=critical,CA:TRUE" ...
//   openssl x509 -req -CA ca-cert.pem ... -extfile (SAN DNS:localhost,IP:127.0.0.1)

/// CA that signed `server-cert.pem` (valid for `localhost` and `127.0.0.1`).
pub const TRUSTED_CA_PEM: &str = include_str!("../fixtures/ca-cert.pem");

/// Unrelated CA that signed nothing the server presents.
pub const STRANGER_CA_PEM: &str = include_str!("../fixtures/stranger-ca-cert.pem");

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A server running in the background on an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub config: TimeServiceConfig,
    pub shutdown: Shutdown,
    pub tracker: ConnectionTracker,
    pub handle: JoinHandle<Result<(), ListenerError>>,
}

/// Start a server with the fixture identity. `tweak` adjusts the config before startup.
pub async fn start_server(tweak: impl FnOnce(&mut TimeServiceConfig)) -> RunningServer {
    let mut config = TimeServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.tls.cert_path = fixture("server-cert.pem").display().to_string();
    config.tls.key_path = fixture("server-key.pem").display().to_string();
    config.tls.ca_cert_path = fixture("ca-cert.pem").display().to_string();
    tweak(&mut config);

    let (server, listener) = prepare_server(&config).await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.client.server_address = addr.to_string();

    let tracker = server.tracker();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    RunningServer {
        addr,
        config,
        shutdown,
        tracker,
        handle,
    }
}

/// Connect a client with the server's own config.
pub async fn connect(server: &RunningServer) -> ClientSession {
    ClientSession::connect(&server.config).await.unwrap()
}

/// Connect with an explicit trust anchor, server name and hostname policy.
pub async fn connect_as(
    server: &RunningServer,
    trusted_pem: &str,
    server_name: &str,
    policy: HostnamePolicy,
) -> Result<ClientSession, ClientError> {
    let ca = tls::parse_certificates(trusted_pem.as_bytes(), "test CA").unwrap();
    let tls_config = tls::client_config(ca, policy).unwrap();
    let mut client = server.config.client.clone();
    client.server_name = server_name.to_string();
    let codec = FrameCodec::new(
        server.config.protocol.framing,
        server.config.protocol.max_frame_len,
    );
    ClientSession::connect_with(&client, tls_config, codec).await
}

/// Build the rustls client config a test client would use.
pub fn client_tls() -> Arc<rustls::ClientConfig> {
    let ca = tls::parse_certificates(TRUSTED_CA_PEM.as_bytes(), "test CA").unwrap();
    tls::client_config(ca, HostnamePolicy::Strict).unwrap()
}

/// Extract the timestamp from a `get_time` reply.
pub fn timestamp(response: &Response) -> NaiveDateTime {
    match response {
        Response::Time(ts) => *ts,
        other => panic!("expected a timestamp, got {other:?}"),
    }
}

/// Assert a `get_time` reply equals now + `offset_minutes`, within tolerance.
pub fn assert_offset(response: &Response, offset_minutes: i64) {
    let expected = Utc::now().naive_utc() + chrono::Duration::minutes(offset_minutes);
    let actual = timestamp(response);
    let drift = (actual - expected).num_seconds().abs();
    assert!(
        drift <= CLOCK_TOLERANCE_SECS,
        "expected ~{expected} (offset {offset_minutes} min), got {actual}"
    );
}

/// Poll until the server reports `expected` live connections.
pub async fn wait_for_active(tracker: &ConnectionTracker, expected: u64) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tracker.active_count() != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "active connections stuck at {}, expected {expected}",
            tracker.active_count()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
