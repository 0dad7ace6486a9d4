//! Server → client responses.
//!
//! The wire carries only the text below; clients recover the variant by
//! matching on it.

use chrono::NaiveDateTime;

/// Format of timestamps sent in reply to `get_time`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const INVALID_TIMEZONE: &str = "Invalid timezone.";
const TIMEZONE_SET_PREFIX: &str = "Timezone set to ";
const TIMEZONE_SET_SUFFIX: &str = " successfully.";

/// A server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Current time shifted by the session offset.
    Time(NaiveDateTime),
    /// `set_timezone` succeeded; `code` echoes the code as the client sent it.
    TimezoneSet { code: String },
    /// `set_timezone` named a zone the server does not know.
    InvalidTimezone,
    /// Text that matches no known reply.
    Other(String),
}

impl Response {
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Classify a reply received from the server.
    ///
    /// Timestamps with fractional seconds are accepted as well.
    pub fn decode(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        if text == INVALID_TIMEZONE {
            return Response::InvalidTimezone;
        }
        if let Some(code) = text
            .strip_prefix(TIMEZONE_SET_PREFIX)
            .and_then(|rest| rest.strip_suffix(TIMEZONE_SET_SUFFIX))
        {
            return Response::TimezoneSet {
                code: code.to_string(),
            };
        }
        match NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f") {
            Ok(timestamp) => Response::Time(timestamp),
            Err(_) => Response::Other(text.into_owned()),
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Time(timestamp) => write!(f, "{}", timestamp.format(TIMESTAMP_FORMAT)),
            Response::TimezoneSet { code } => {
                write!(f, "{TIMEZONE_SET_PREFIX}{code}{TIMEZONE_SET_SUFFIX}")
            }
            Response::InvalidTimezone => f.write_str(INVALID_TIMEZONE),
            Response::Other(text) => f.write_str(text),
        }
    }
}
