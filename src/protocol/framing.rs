//! Message framing over a byte stream.
//!
//! # Wire Format
//! ```text
//! length_prefixed:  [4 bytes: payload length, big-endian u32] [N bytes: payload]
//! raw:              [payload]   (one read == one message)
//! ```
//!
//! # Design Decisions
//! - Length-prefixed is the default; partial reads are reassembled
//! - Raw mode exists only for peers that send bare text, and relies on every
//!   message arriving in a single read
//! - Both modes enforce `max_frame_len`

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Receive buffer bound of the text protocol.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024;

const HEADER_LEN: usize = 4;

/// How message boundaries are found in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// 4-byte big-endian length prefix.
    #[default]
    LengthPrefixed,
    /// No framing: a single read or write carries one whole message.
    Raw,
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Framing::LengthPrefixed => write!(f, "length_prefixed"),
            Framing::Raw => write!(f, "raw"),
        }
    }
}

impl std::str::FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "length_prefixed" => Ok(Framing::LengthPrefixed),
            "raw" => Ok(Framing::Raw),
            other => Err(format!("unknown framing {other:?} (expected length_prefixed or raw)")),
        }
    }
}

/// Errors raised while reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {len} bytes exceeds limit of {max} bytes")]
    TooLarge { len: usize, max: usize },

    #[error("stream ended mid-frame ({received} of {expected} bytes)")]
    Truncated { received: usize, expected: usize },
}

/// Reads and writes whole messages using one [`Framing`] mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    framing: Framing,
    max_frame_len: usize,
}

impl FrameCodec {
    pub fn new(framing: Framing, max_frame_len: usize) -> Self {
        Self {
            framing,
            max_frame_len,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Read one message.
    ///
    /// Returns `Ok(None)` when the peer closed the stream before a new message
    /// started. A TLS peer that closes without `close_notify` surfaces as
    /// `UnexpectedEof` and is treated the same way.
    pub async fn read_frame<R>(&self, reader: &mut R) -> Result<Option<Vec<u8>>, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        match self.framing {
            Framing::LengthPrefixed => self.read_length_prefixed(reader).await,
            Framing::Raw => self.read_raw(reader).await,
        }
    }

    /// Write one message and flush it.
    pub async fn write_frame<W>(&self, writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
    where
        W: AsyncWrite + Unpin,
    {
        if payload.len() > self.max_frame_len {
            return Err(FrameError::TooLarge {
                len: payload.len(),
                max: self.max_frame_len,
            });
        }

        if self.framing == Framing::LengthPrefixed {
            // Bounded by max_frame_len, which validation caps far below u32::MAX.
            writer.write_u32(payload.len() as u32).await?;
        }
        writer.write_all(payload).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_length_prefixed<R>(&self, reader: &mut R) -> Result<Option<Vec<u8>>, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let mut header = [0u8; HEADER_LEN];
        let mut filled = 0;
        while filled < HEADER_LEN {
            match reader.read(&mut header[filled..]).await {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(FrameError::Truncated {
                        received: filled,
                        expected: HEADER_LEN,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof && filled == 0 => {
                    return Ok(None)
                }
                Err(e) => return Err(e.into()),
            }
        }

        let len = u32::from_be_bytes(header) as usize;
        if len > self.max_frame_len {
            return Err(FrameError::TooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        let mut payload = vec![0u8; len];
        let mut received = 0;
        while received < len {
            match reader.read(&mut payload[received..]).await {
                Ok(0) => {
                    return Err(FrameError::Truncated {
                        received,
                        expected: len,
                    })
                }
                Ok(n) => received += n,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(payload))
    }

    async fn read_raw<R>(&self, reader: &mut R) -> Result<Option<Vec<u8>>, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.max_frame_len];
        let n = match reader.read(&mut buf).await {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => 0,
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(Framing::default(), DEFAULT_MAX_FRAME_LEN)
    }
}
