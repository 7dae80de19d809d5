use std::fmt;
use std::io;
use thiserror::Error;

/// Custom error types for the utf8stream library.
///
/// The enum is `Clone` so that a failure latched by a file-backed stream can
/// be handed out again on every later call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An operation was attempted on a stream that has already been closed.
    #[error("{op}: stream is closed")]
    StreamClosed { op: &'static str },

    /// An operation was attempted against the stream's declared direction.
    #[error("{op}: stream was not opened for {direction}")]
    WrongDirection {
        op: &'static str,
        direction: &'static str,
    },

    /// `close` was called twice.
    #[error("close: stream is already closed")]
    AlreadyClosed,

    /// A memory-backed output stream has no room left.
    #[error("putc to buffer: out of space")]
    OutOfSpace,

    /// Underlying OS errors from open/read/write/close.
    #[error("{0}")]
    Io(#[from] IoFailure),

    /// The first byte of a sequence is not a valid UTF-8 start byte.
    #[error("invalid start byte decoding UTF-8 (0x{byte:02x})")]
    InvalidStartByte { byte: u8 },

    /// A byte inside a multi-byte sequence is not of the form `10xxxxxx`.
    #[error("invalid continuation byte decoding UTF-8 (byte #{index})")]
    InvalidContinuationByte { index: usize },

    /// The stream ended in the middle of a multi-byte sequence.
    #[error("premature EOF decoding UTF-8 (byte #{index})")]
    PrematureEof { index: usize },

    /// A well-formed sequence decoded to a value above U+10FFFF.
    #[error("invalid unicode codepoint (0x{value:x})")]
    CodepointOutOfRange { value: u32 },
}

impl Error {
    /// Create a new `StreamClosed` error for the named operation.
    pub fn stream_closed(op: &'static str) -> Self {
        Self::StreamClosed { op }
    }

    /// Create a new `WrongDirection` error; `direction` is the missing one
    /// (`"input"` or `"output"`).
    pub fn wrong_direction(op: &'static str, direction: &'static str) -> Self {
        Self::WrongDirection { op, direction }
    }

    /// True for the errors produced by the UTF-8 decoder itself, as opposed
    /// to failures of the stream underneath it.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::InvalidStartByte { .. }
                | Self::InvalidContinuationByte { .. }
                | Self::PrematureEof { .. }
                | Self::CodepointOutOfRange { .. }
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(IoFailure::from(err))
    }
}

/// A cloneable snapshot of an `std::io::Error`.
///
/// Keeps the error kind for matching and the rendered OS message for
/// reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoFailure {
    kind: io::ErrorKind,
    message: String,
}

impl IoFailure {
    pub fn new(kind: io::ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for IoFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for IoFailure {}

impl From<io::Error> for IoFailure {
    fn from(err: io::Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Result type alias for the library operations.
pub type Result<T> = std::result::Result<T, Error>;
