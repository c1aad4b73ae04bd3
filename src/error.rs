// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

use std::fmt;

/// Classification of a [`ParseError`], independent of its diagnostic payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Line did not split into exactly four comma-separated segments
    MalformedFrame,
    /// Beep count position held a non-decimal character
    InvalidBeepCount,
    /// Bit field segment too short to reach the mode position
    TruncatedBitField,
    /// Keypad text segment too short to carry its quote marks
    MalformedKeypadText,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedFrame => "MalformedFrame",
            Self::InvalidBeepCount => "InvalidBeepCount",
            Self::TruncatedBitField => "TruncatedBitField",
            Self::MalformedKeypadText => "MalformedKeypadText",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line could not be decoded into an [`AlarmMessage`](crate::AlarmMessage).
///
/// Parse errors are local to one line and never fatal to the stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected 4 segments, got {count}: {segments:?}")]
    MalformedFrame { count: usize, segments: Vec<String> },

    #[error("invalid beep count {found:?} in bit field")]
    InvalidBeepCount { found: char },

    #[error("bit field too short: {len} chars, need at least {required}")]
    TruncatedBitField { len: usize, required: usize },

    #[error("keypad text segment too short: {segment:?}")]
    MalformedKeypadText { segment: String },
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::MalformedFrame { .. } => ParseErrorKind::MalformedFrame,
            Self::InvalidBeepCount { .. } => ParseErrorKind::InvalidBeepCount,
            Self::TruncatedBitField { .. } => ParseErrorKind::TruncatedBitField,
            Self::MalformedKeypadText { .. } => ParseErrorKind::MalformedKeypadText,
        }
    }
}

/// All errors that can occur while talking to an AlarmDecoder device.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("transport closed")]
    TransportClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("disarm requires a user code")]
    MissingCode,
}

impl DecoderError {
    /// Whether the error only affects one line, so the caller may keep reading.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecoderError::Parse(_) | DecoderError::LineTooLong { .. })
    }

    /// Parse error classification, if this is a parse error.
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            DecoderError::Parse(e) => Some(e.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecoderError>;
