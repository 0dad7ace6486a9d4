//! Client → server requests.

const GET_TIME: &str = "get_time";
const SET_TIMEZONE_PREFIX: &str = "set_timezone:";

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `get_time`
    GetTime,
    /// `set_timezone:<code>`; `code` is kept exactly as sent.
    SetTimezone { code: String },
}

/// Why a frame could not be turned into a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Payload is not UTF-8 text.
    #[error("malformed request: {0}")]
    Malformed(#[from] std::str::Utf8Error),

    /// Valid text that matches neither request grammar.
    #[error("unrecognized request: {0:?}")]
    Unrecognized(String),
}

impl Request {
    /// Parse one framed payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        if text == GET_TIME {
            return Ok(Request::GetTime);
        }
        match text.strip_prefix(SET_TIMEZONE_PREFIX) {
            Some(code) => Ok(Request::SetTimezone {
                code: code.to_string(),
            }),
            None => Err(DecodeError::Unrecognized(text.to_string())),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Request::GetTime => GET_TIME.as_bytes().to_vec(),
            Request::SetTimezone { code } => format!("{SET_TIMEZONE_PREFIX}{code}").into_bytes(),
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetTime => "get_time",
            Request::SetTimezone { .. } => "set_timezone",
        }
    }
}
