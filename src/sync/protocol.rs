//! Snapshot framing: `<version>|<unix-timestamp>|<text>` followed by a NUL
//! byte. Only the first two `|` are delimiters; the text may contain more.

use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const FRAME_TERMINATOR: u8 = b'\0';
const DELIMITER: char = '|';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("text contains a NUL byte at offset {0}")]
    EmbeddedNul(usize),

    #[error("frame is missing the '|' after the {0} field")]
    MissingDelimiter(&'static str),

    #[error("invalid version field: {0:?}")]
    BadVersion(String),

    #[error("invalid timestamp field: {0:?}")]
    BadTimestamp(String),

    #[error("frame is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// A versioned copy of a document's text as exchanged with the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub version: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub text: String,
}

impl RemoteSnapshot {
    /// Frame for a local push. The version field is always 0 on the way out.
    pub fn outgoing(text: &str) -> Result<Vec<u8>, ProtocolError> {
        RemoteSnapshot::encode_parts(0, unix_now(), text)
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        RemoteSnapshot::encode_parts(self.version, self.timestamp, &self.text)
    }

    fn encode_parts(version: u64, timestamp: u64, text: &str) -> Result<Vec<u8>, ProtocolError> {
        if let Some(offset) = text.bytes().position(|b| b == FRAME_TERMINATOR) {
            return Err(ProtocolError::EmbeddedNul(offset));
        }
        let mut frame = format!("{version}{DELIMITER}{timestamp}{DELIMITER}{text}").into_bytes();
        frame.push(FRAME_TERMINATOR);
        Ok(frame)
    }

    /// Parses one frame body, without its terminator.
    pub fn parse(frame: &[u8]) -> Result<Self, ProtocolError> {
        let frame = String::from_utf8(frame.to_vec())?;
        let mut fields = frame.splitn(3, DELIMITER);

        let version = fields.next().unwrap_or_default();
        let Some(timestamp) = fields.next() else {
            return Err(ProtocolError::MissingDelimiter("version"));
        };
        let Some(text) = fields.next() else {
            return Err(ProtocolError::MissingDelimiter("timestamp"));
        };

        Ok(Self {
            version: version
                .parse()
                .map_err(|_| ProtocolError::BadVersion(version.to_string()))?,
            timestamp: timestamp
                .parse()
                .map_err(|_| ProtocolError::BadTimestamp(timestamp.to_string()))?,
            text: text.to_string(),
        })
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
