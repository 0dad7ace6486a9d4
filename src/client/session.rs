//! Client side of one TLS connection.

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::config::{ClientConfig, TimeServiceConfig};
use crate::net::tls::{self, TlsError};
use crate::protocol::{FrameCodec, FrameError, Request, Response};

/// Stream type of a connected client.
pub type TlsClientStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Errors seen by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("TLS setup: {0}")]
    Tls(#[from] TlsError),

    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {address} failed: {source}")]
    Handshake {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connecting to {0} timed out")]
    Timeout(String),

    #[error("transport: {0}")]
    Transport(#[from] FrameError),

    #[error("server closed the connection")]
    Closed,

    #[error("terminal I/O: {0}")]
    Terminal(#[source] std::io::Error),
}

/// One open connection to the time server.
///
/// Every request waits for exactly one response before returning.
pub struct ClientSession<S = TlsClientStream> {
    stream: S,
    codec: FrameCodec,
}

impl ClientSession<TlsClientStream> {
    /// Connect using the file-based trust anchor and client settings in `config`.
    pub async fn connect(config: &TimeServiceConfig) -> Result<Self, ClientError> {
        let tls = tls::load_client_config(
            Path::new(&config.tls.ca_cert_path),
            config.client.hostname_verification,
        )?;
        let codec = FrameCodec::new(config.protocol.framing, config.protocol.max_frame_len);
        Self::connect_with(&config.client, tls, codec).await
    }

    /// Connect with an already built rustls client config.
    pub async fn connect_with(
        client: &ClientConfig,
        tls: Arc<rustls::ClientConfig>,
        codec: FrameCodec,
    ) -> Result<Self, ClientError> {
        let server_name = tls::server_name(&client.server_name)?;
        let connector = TlsConnector::from(tls);
        let address = client.server_address.as_str();

        let connect = async {
            let tcp = TcpStream::connect(address)
                .await
                .map_err(|source| ClientError::Connect {
                    address: address.to_string(),
                    source,
                })?;
            connector
                .connect(server_name, tcp)
                .await
                .map_err(|source| ClientError::Handshake {
                    address: address.to_string(),
                    source,
                })
        };

        let stream = tokio::time::timeout(client.connect_timeout(), connect)
            .await
            .map_err(|_| ClientError::Timeout(address.to_string()))??;

        tracing::info!(
            server_address = %address,
            server_name = %client.server_name,
            "Connected to time server"
        );
        Ok(Self::new(stream, codec))
    }
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established stream.
    pub fn new(stream: S, codec: FrameCodec) -> Self {
        Self { stream, codec }
    }

    /// Send one request and wait for its response.
    pub async fn request(&mut self, request: &Request) -> Result<Response, ClientError> {
        self.codec
            .write_frame(&mut self.stream, &request.encode())
            .await?;
        match self.codec.read_frame(&mut self.stream).await? {
            Some(payload) => Ok(Response::decode(&payload)),
            None => Err(ClientError::Closed),
        }
    }

    pub async fn get_time(&mut self) -> Result<Response, ClientError> {
        self.request(&Request::GetTime).await
    }

    pub async fn set_timezone(&mut self, code: &str) -> Result<Response, ClientError> {
        self.request(&Request::SetTimezone {
            code: code.to_string(),
        })
        .await
    }

    /// Close the stream. No application-level goodbye is sent.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream
            .shutdown()
            .await
            .map_err(|e| ClientError::Transport(FrameError::Io(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn request_waits_for_one_reply() {
        let codec = FrameCodec::default();
        let (client, mut server) = duplex(1024);

        let server_task = tokio::spawn(async move {
            let frame = codec.read_frame(&mut server).await.unwrap().unwrap();
            assert_eq!(frame, b"set_timezone:CET");
            codec
                .write_frame(&mut server, b"Timezone set to CET successfully.")
                .await
                .unwrap();
        });

        let mut session = ClientSession::new(client, codec);
        let response = session.set_timezone("CET").await.unwrap();
        assert_eq!(response, Response::TimezoneSet { code: "CET".into() });
        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn server_hangup_is_reported() {
        let codec = FrameCodec::default();
        let (client, mut server) = duplex(1024);

        let server_task = tokio::spawn(async move {
            codec.read_frame(&mut server).await.unwrap();
        });

        let mut session = ClientSession::new(client, codec);
        assert!(matches!(session.get_time().await, Err(ClientError::Closed)));
        server_task.await.unwrap();
    }
}
