//! Error and Result module.

use std::error::Error as StdError;
use std::fmt;

use bytes::Bytes;

/// Result type returned from [`crate::Parser::parse`].
pub type ParseResult<T> = std::result::Result<T, ParserError>;

/// The two ways a call to [`crate::Parser::parse`] can fail.
#[derive(Debug)]
pub enum ParserError {
    /// The input did not conform to the wire grammar.
    Protocol(ProtocolError),
    /// `parse` was called after [`crate::Parser::close`], or after a
    /// previous `parse` call already returned [`ParserError::Protocol`].
    Closed(ParserClosed),
}

/// Returned when `parse` is called on a parser that has already been
/// closed, either explicitly via [`crate::Parser::close`] or implicitly
/// after a prior [`ProtocolError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserClosed;

impl fmt::Display for ParserClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("parser is closed")
    }
}

impl StdError for ParserClosed {}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::Protocol(e) => fmt::Display::fmt(e, f),
            ParserError::Closed(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl StdError for ParserError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ParserError::Protocol(e) => e.source(),
            ParserError::Closed(_) => None,
        }
    }
}

/// A malformed-input error, carrying the offending byte and a bounded
/// snippet of the residual buffer for diagnostics.
pub struct ProtocolError {
    inner: Box<ProtocolErrorImpl>,
}

struct ProtocolErrorImpl {
    kind: ErrorKind,
    offending_byte: u8,
    context: Bytes,
}

/// Caps how much of the residual buffer is copied into a [`ProtocolError`].
pub(crate) const MAX_ERROR_CONTEXT: usize = 128;

#[derive(Debug)]
pub(crate) enum ErrorKind {
    UnknownVerb,
    MalformedControlLine,
    BadArgCount,
    InvalidNumber,
    InvalidSize,
    InvalidUtf8,
    UnterminatedHeaderBlock,
    MissingPayloadTerminator,
    ControlLineTooLong,
    InfoJson(serde_json::Error),
}

impl ProtocolError {
    pub(crate) fn new(kind: ErrorKind, offending_byte: u8, residual: &[u8]) -> ProtocolError {
        let cap = std::cmp::min(residual.len(), MAX_ERROR_CONTEXT);
        ProtocolError {
            inner: Box::new(ProtocolErrorImpl {
                kind,
                offending_byte,
                context: Bytes::copy_from_slice(&residual[..cap]),
            }),
        }
    }

    /// The byte that caused rejection, or the first byte of the malformed
    /// region when detected at a region boundary.
    pub fn offending_byte(&self) -> u8 {
        self.inner.offending_byte
    }

    /// The residual buffer content at the point of failure, capped to a
    /// bounded size.
    pub fn context(&self) -> &[u8] {
        &self.inner.context
    }

    fn description(&self) -> &'static str {
        match self.inner.kind {
            ErrorKind::UnknownVerb => "unrecognized verb at start of control line",
            ErrorKind::MalformedControlLine => "control line is not valid ASCII/CRLF framing",
            ErrorKind::BadArgCount => "wrong number of arguments in control line",
            ErrorKind::InvalidNumber => {
                "sid/header-size/total-size is not a valid non-negative integer"
            }
            ErrorKind::InvalidSize => "total-size is smaller than header-size, or header-size < 4",
            ErrorKind::InvalidUtf8 => "subject/reply-to/message text is not valid UTF-8",
            ErrorKind::UnterminatedHeaderBlock => "HMSG header block does not end in CRLFCRLF",
            ErrorKind::MissingPayloadTerminator => "payload region is not followed by CRLF",
            ErrorKind::ControlLineTooLong => {
                "control line exceeded the configured maximum length"
            }
            ErrorKind::InfoJson(_) => {
                "INFO body is not a well-formed JSON object with the required fields"
            }
        }
    }
}

impl fmt::Debug for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolError")
            .field("kind", &self.inner.kind)
            .field("offending_byte", &self.inner.offending_byte)
            .field("context_len", &self.inner.context.len())
            .finish()
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (offending byte: {:#04x})",
            self.description(),
            self.inner.offending_byte
        )
    }
}

impl StdError for ProtocolError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.inner.kind {
            ErrorKind::InfoJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProtocolError> for ParserError {
    fn from(e: ProtocolError) -> ParserError {
        ParserError::Protocol(e)
    }
}
