// MIT License - Copyright (c) 2026 Peter Wright
// lircd client errors

use std::io;
use std::sync::Arc;

use crate::event::CommandReply;
use crate::reader::ParserState;

/// Recoverable problems found while classifying a line from lircd.
///
/// These never end the connection: the read loop logs them and the reader
/// starts over in [`ParserState::Idle`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("event line has {fields} fields, expected 4: {line:?}")]
    MalformedEvent { line: String, fields: usize },

    #[error("button code is not valid hex: {code:?}")]
    InvalidHexCode { code: String },

    #[error("button code decodes to {len} bytes, expected 8")]
    WrongCodeLength { len: usize },

    #[error("repeat count is not a decimal number: {repeat:?}")]
    InvalidRepeatCount { repeat: String },

    #[error("reply has invalid status {line:?}")]
    InvalidStatus { line: String },

    #[error("reply has invalid data start {line:?}")]
    InvalidDataStart { line: String },

    #[error("reply has invalid data length {line:?}")]
    InvalidDataLength { line: String },

    #[error("reply expected END after {declared} data lines, got {line:?}")]
    MissingDataEnd { line: String, declared: usize },
}

impl ProtocolError {
    /// The parser state in which this error is raised.
    pub fn state(&self) -> ParserState {
        match self {
            Self::MalformedEvent { .. }
            | Self::InvalidHexCode { .. }
            | Self::WrongCodeLength { .. }
            | Self::InvalidRepeatCount { .. } => ParserState::Idle,
            Self::InvalidStatus { .. } => ParserState::Status,
            Self::InvalidDataStart { .. } => ParserState::DataStart,
            Self::InvalidDataLength { .. } => ParserState::DataLength,
            Self::MissingDataEnd { .. } => ParserState::DataEnd,
        }
    }
}

/// All errors that can occur in the lirc-client library.
///
/// I/O errors are shared behind an `Arc` so the connection's terminal cause
/// can be handed to every party observing the shutdown.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LircError {
    #[error("cannot dial lircd at {endpoint}: {source}")]
    Dial {
        endpoint: String,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("I/O error on lircd socket: {0}")]
    Io(#[from] Arc<io::Error>),

    #[error("lircd closed the connection")]
    Disconnected,

    #[error("line from lircd exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("lirc: unsuccessful command {}", .reply.command)]
    UnsuccessfulCommand { reply: CommandReply },

    #[error("unexpected reply command {:?}, expected {expected:?}", .reply.command)]
    UnexpectedReply {
        expected: String,
        reply: CommandReply,
    },

    #[error("command timeout: {command}")]
    CommandTimeout { command: String },

    #[error("connection cancelled")]
    Cancelled,

    #[error("connection has already been started")]
    AlreadyStarted,

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid configuration: {details}")]
    Config { details: String },
}

impl From<io::Error> for LircError {
    fn from(err: io::Error) -> Self {
        LircError::Io(Arc::new(err))
    }
}

impl LircError {
    /// Whether this error ends the connection it was raised on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LircError::Dial { .. }
                | LircError::Io(_)
                | LircError::Disconnected
                | LircError::LineTooLong { .. }
        )
    }

    /// The reply that came with a transaction-level failure, if any.
    pub fn reply(&self) -> Option<&CommandReply> {
        match self {
            LircError::UnsuccessfulCommand { reply } | LircError::UnexpectedReply { reply, .. } => {
                Some(reply)
            }
            _ => None,
        }
    }

    /// Consume the error, keeping the reply of a transaction-level failure.
    pub fn into_reply(self) -> Option<CommandReply> {
        match self {
            LircError::UnsuccessfulCommand { reply } | LircError::UnexpectedReply { reply, .. } => {
                Some(reply)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LircError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(LircError::Disconnected.is_fatal());
        assert!(LircError::from(io::Error::from(io::ErrorKind::BrokenPipe)).is_fatal());
        assert!(!LircError::Cancelled.is_fatal());
        assert!(!LircError::CommandTimeout {
            command: "VERSION".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_reply_carried_by_transaction_errors() {
        let reply = CommandReply {
            command: "LIST".to_string(),
            success: false,
            data: Vec::new(),
        };
        let err = LircError::UnsuccessfulCommand {
            reply: reply.clone(),
        };
        assert_eq!(err.reply(), Some(&reply));
        assert_eq!(err.to_string(), "lirc: unsuccessful command LIST");
        assert_eq!(err.into_reply(), Some(reply));
        assert!(LircError::Disconnected.reply().is_none());
    }

    #[test]
    fn test_protocol_error_state() {
        let err = ProtocolError::InvalidStatus {
            line: "MAYBE".to_string(),
        };
        assert_eq!(err.state(), ParserState::Status);
        assert_eq!(
            ProtocolError::WrongCodeLength { len: 9 }.state(),
            ParserState::Idle
        );
    }
}
