//! Connection handler state machine.
//!
//! # States
//! ```text
//! Open ──read frame──▶ dispatch ──write reply──▶ Open
//!   │                      └── unrecognized: no reply ──▶ Open
//!   ├── EOF ─────────────────────────────────────────────▶ Closed (Ok)
//!   └── transport error / malformed bytes ───────────────▶ Closed (Err)
//! ```
//!
//! # Design Decisions
//! - The handler owns its `Session`; nothing else can observe the offset
//! - Errors end only this connection and are returned to the spawning task
//! - Generic over the stream so tests drive it with in-memory pipes

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::observability::metrics;
use crate::protocol::{DecodeError, FrameCodec, FrameError, Request, Response};
use crate::session::state::Session;
use crate::time::Clock;
use crate::timezone::TimezoneTable;

/// Why a connection ended abnormally.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("transport: {0}")]
    Transport(#[from] FrameError),

    #[error("{0}")]
    Malformed(DecodeError),
}

/// Read-only pieces every handler needs. Cheap to clone.
#[derive(Clone)]
pub struct HandlerContext {
    pub table: Arc<TimezoneTable>,
    pub clock: Arc<dyn Clock>,
    pub codec: FrameCodec,
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("zones", &self.table.len())
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

/// Drives one connection until the peer leaves or an error occurs.
pub struct ConnectionHandler<S> {
    stream: S,
    session: Session,
    ctx: HandlerContext,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, session: Session, ctx: HandlerContext) -> Self {
        Self {
            stream,
            session,
            ctx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Serve requests until EOF.
    ///
    /// Returns `Ok(())` when the peer closed the connection cleanly.
    pub async fn run(mut self) -> Result<(), HandlerError> {
        let connection_id = self.session.id();
        loop {
            let frame = match self.ctx.codec.read_frame(&mut self.stream).await? {
                Some(frame) => frame,
                None => {
                    tracing::debug!(
                        connection_id = %connection_id,
                        peer_addr = ?self.session.peer(),
                        offset = %self.session.offset(),
                        "Peer closed connection"
                    );
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(
                            connection_id = %connection_id,
                            error = %e,
                            "Shutdown after peer close failed"
                        );
                    }
                    return Ok(());
                }
            };

            let request = match Request::decode(&frame) {
                Ok(request) => request,
                Err(DecodeError::Unrecognized(text)) => {
                    metrics::record_request("unrecognized");
                    tracing::warn!(
                        connection_id = %connection_id,
                        request = %text,
                        "Ignoring unrecognized request"
                    );
                    continue;
                }
                Err(err) => return Err(HandlerError::Malformed(err)),
            };

            metrics::record_request(request.kind());
            let response = self.dispatch(request);
            self.ctx
                .codec
                .write_frame(&mut self.stream, &response.encode())
                .await?;
        }
    }

    /// Apply one request to this connection's session.
    pub fn dispatch(&mut self, request: Request) -> Response {
        let connection_id = self.session.id();
        match request {
            Request::GetTime => {
                let now = self.ctx.clock.now() + self.session.offset().as_duration();
                tracing::debug!(
                    connection_id = %connection_id,
                    offset = %self.session.offset(),
                    "Client requested current time"
                );
                Response::Time(now.naive_utc())
            }
            Request::SetTimezone { code } => match self.ctx.table.lookup(&code) {
                Some(offset) => {
                    tracing::info!(
                        connection_id = %connection_id,
                        code = %code,
                        offset = %offset,
                        "Client set timezone"
                    );
                    self.session.set_offset(offset);
                    Response::TimezoneSet { code }
                }
                None => {
                    tracing::info!(
                        connection_id = %connection_id,
                        code = %code,
                        "Client requested unknown timezone"
                    );
                    Response::InvalidTimezone
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::connection::ConnectionId;
    use crate::protocol::Framing;
    use crate::time::FixedClock;
    use crate::timezone::TimezoneOffset;
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use tokio::io::{duplex, AsyncWriteExt, DuplexStream};
    use tokio::task::JoinHandle;

    fn context(framing: Framing) -> HandlerContext {
        HandlerContext {
            table: Arc::new(TimezoneTable::standard()),
            clock: Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            )),
            codec: FrameCodec::new(framing, 1024),
        }
    }

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn spawn_handler(
        framing: Framing,
    ) -> (DuplexStream, JoinHandle<Result<(), HandlerError>>, FrameCodec) {
        let ctx = context(framing);
        let codec = ctx.codec;
        let (client, server) = duplex(4096);
        let session = Session::new(ConnectionId::new(), None, TimezoneOffset::from_minutes(45));
        let handle = tokio::spawn(ConnectionHandler::new(server, session, ctx).run());
        (client, handle, codec)
    }

    async fn roundtrip(client: &mut DuplexStream, codec: &FrameCodec, request: &str) -> String {
        codec.write_frame(client, request.as_bytes()).await.unwrap();
        let reply = codec.read_frame(client).await.unwrap().expect("reply");
        String::from_utf8(reply).unwrap()
    }

    #[test]
    fn dispatch_applies_default_offset() {
        let session = Session::new(ConnectionId::new(), None, TimezoneOffset::from_minutes(45));
        let mut handler = ConnectionHandler::new(duplex(64).1, session, context(Framing::Raw));
        assert_eq!(
            handler.dispatch(Request::GetTime),
            Response::Time(at("2024-03-01 12:45:00"))
        );
    }

    #[test]
    fn dispatch_unknown_zone_keeps_offset() {
        let session = Session::new(ConnectionId::new(), None, TimezoneOffset::from_hours(9));
        let mut handler = ConnectionHandler::new(duplex(64).1, session, context(Framing::Raw));
        assert_eq!(
            handler.dispatch(Request::SetTimezone { code: "ZZZ".into() }),
            Response::InvalidTimezone
        );
        assert_eq!(handler.session().offset(), TimezoneOffset::from_hours(9));
    }

    #[tokio::test]
    async fn set_timezone_then_get_time() {
        let (mut client, handle, codec) = spawn_handler(Framing::LengthPrefixed);

        assert_eq!(roundtrip(&mut client, &codec, "get_time").await, "2024-03-01 12:45:00");
        assert_eq!(
            roundtrip(&mut client, &codec, "set_timezone:est").await,
            "Timezone set to est successfully."
        );
        assert_eq!(roundtrip(&mut client, &codec, "get_time").await, "2024-03-01 07:00:00");
        assert_eq!(
            roundtrip(&mut client, &codec, "set_timezone:NST").await,
            "Timezone set to NST successfully."
        );
        assert_eq!(roundtrip(&mut client, &codec, "get_time").await, "2024-03-01 08:30:00");

        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn invalid_timezone_leaves_offset_alone() {
        let (mut client, handle, codec) = spawn_handler(Framing::LengthPrefixed);

        roundtrip(&mut client, &codec, "set_timezone:JST").await;
        assert_eq!(
            roundtrip(&mut client, &codec, "set_timezone:ZZZ").await,
            "Invalid timezone."
        );
        assert_eq!(roundtrip(&mut client, &codec, "get_time").await, "2024-03-01 21:00:00");

        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn unrecognized_request_gets_no_reply() {
        let (mut client, handle, codec) = spawn_handler(Framing::LengthPrefixed);

        codec.write_frame(&mut client, b"what_time").await.unwrap();
        // The next reply belongs to get_time; nothing was sent for what_time.
        assert_eq!(roundtrip(&mut client, &codec, "get_time").await, "2024-03-01 12:45:00");

        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn malformed_bytes_close_the_connection() {
        let (mut client, handle, codec) = spawn_handler(Framing::LengthPrefixed);

        codec.write_frame(&mut client, &[0xff, 0xfe, 0xfd]).await.unwrap();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(HandlerError::Malformed(_))));
        assert!(codec.read_frame(&mut client).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_frame_is_transport_error() {
        let (mut client, handle, _codec) = spawn_handler(Framing::LengthPrefixed);

        client.write_all(&[0, 0, 0, 8, b'g']).await.unwrap();
        drop(client);
        assert!(matches!(
            handle.await.unwrap(),
            Err(HandlerError::Transport(FrameError::Truncated { .. }))
        ));
    }

    /// Reads EOF at once; every write or shutdown fails.
    struct ClosedWriter;

    impl tokio::io::AsyncRead for ClosedWriter {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    impl tokio::io::AsyncWrite for ClosedWriter {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::NotConnected.into()))
        }
    }

    #[tokio::test]
    async fn failed_shutdown_after_eof_still_closes_cleanly() {
        let peer: std::net::SocketAddr = "127.0.0.1:40000".parse().unwrap();
        let session = Session::new(ConnectionId::new(), Some(peer), TimezoneOffset::ZERO);
        let ctx = context(Framing::LengthPrefixed);
        let handler = ConnectionHandler::new(ClosedWriter, session, ctx);
        assert_eq!(handler.session().peer(), Some(peer));
        assert!(handler.run().await.is_ok());
    }

    #[tokio::test]
    async fn raw_framing_serves_bare_text() {
        let (mut client, handle, codec) = spawn_handler(Framing::Raw);

        assert_eq!(
            roundtrip(&mut client, &codec, "set_timezone:hkt").await,
            "Timezone set to hkt successfully."
        );
        assert_eq!(roundtrip(&mut client, &codec, "get_time").await, "2024-03-01 20:00:00");

        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }
}
