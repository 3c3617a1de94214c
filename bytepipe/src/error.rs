//! Error types for pipe operations.

use std::fmt;
use std::io;

/// Result type alias for bytepipe.
pub type Result<T> = std::result::Result<T, PipeError>;

/// One direction of a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The reading end.
    Read,
    /// The writing end.
    Write,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Read => write!(f, "reader"),
            Side::Write => write!(f, "writer"),
        }
    }
}

/// Reason a pipe end was closed.
///
/// Causes are compared structurally: two causes are the same cause when
/// their kinds and messages are equal, regardless of where they were built.
/// Once recorded on a pipe end a cause never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CloseCause {
    /// End of stream. Default cause when a writer closes.
    Eof,
    /// Closed pipe. Default cause when a reader closes.
    ClosedPipe,
    /// Any other reason, carried to the peer verbatim.
    Other {
        /// Error kind reported through `std::io`.
        kind: io::ErrorKind,
        /// Human readable reason.
        message: String,
    },
}

impl CloseCause {
    /// Creates a cause of kind [`io::ErrorKind::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        Self::with_kind(io::ErrorKind::Other, message)
    }

    /// Creates a cause with an explicit error kind.
    pub fn with_kind(kind: io::ErrorKind, message: impl Into<String>) -> Self {
        CloseCause::Other {
            kind,
            message: message.into(),
        }
    }

    /// Returns the `std::io` kind this cause maps to.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            CloseCause::Eof => io::ErrorKind::UnexpectedEof,
            CloseCause::ClosedPipe => io::ErrorKind::BrokenPipe,
            CloseCause::Other { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for CloseCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseCause::Eof => write!(f, "EOF"),
            CloseCause::ClosedPipe => write!(f, "io: read/write on closed pipe"),
            CloseCause::Other { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CloseCause {}

impl From<io::Error> for CloseCause {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => CloseCause::Eof,
            io::ErrorKind::BrokenPipe => CloseCause::ClosedPipe,
            kind => CloseCause::with_kind(kind, e.to_string()),
        }
    }
}

/// Error type for ring buffer and pipe operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipeError {
    /// The calling end has itself been closed.
    #[error("io: read/write on closed pipe")]
    ClosedPipe,

    /// The peer end was closed with this cause.
    #[error("{0}")]
    Closed(CloseCause),

    /// Not enough free space for the whole source slice.
    ///
    /// The first `written` bytes were stored; the caller retries the rest.
    #[error("short write: wrote {written} of {requested} bytes")]
    ShortWrite { written: usize, requested: usize },

    /// The end was already closed with a different cause.
    #[error("ignoring {side} close with ({requested}); already closed with ({existing})")]
    ConflictingClose {
        side: Side,
        existing: CloseCause,
        requested: CloseCause,
    },

    /// A close was requested without a cause.
    #[error("can't close pipe {0} without a cause")]
    InvalidClose(Side),

    /// Capacity must be positive.
    #[error("invalid capacity {0}: must be greater than 0")]
    InvalidCapacity(usize),
}

impl PipeError {
    /// Returns true if the peer writer closed with end of stream.
    pub fn is_eof(&self) -> bool {
        matches!(self, PipeError::Closed(CloseCause::Eof))
    }

    /// Returns the propagated close cause, if this error carries one.
    pub fn cause(&self) -> Option<&CloseCause> {
        match self {
            PipeError::Closed(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<PipeError> for io::Error {
    fn from(e: PipeError) -> Self {
        let kind = match &e {
            PipeError::ClosedPipe => io::ErrorKind::BrokenPipe,
            PipeError::Closed(cause) => cause.kind(),
            PipeError::ShortWrite { .. } => io::ErrorKind::WriteZero,
            PipeError::ConflictingClose { .. }
            | PipeError::InvalidClose(_)
            | PipeError::InvalidCapacity(_) => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, e)
    }
}
