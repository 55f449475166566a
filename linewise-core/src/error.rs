//! Layered error types
//!
//! Resource failures wrap the underlying `io::Error` so callers can still
//! inspect its kind (`NotFound`, `PermissionDenied`, ...).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by line sources and iteration drivers
#[derive(Error, Debug)]
pub enum LineError {
    /// The byte source could not be opened
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// Path that was being opened
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// A chunk read failed
    #[error("read failed at byte {position}: {source}")]
    Read {
        /// Byte offset the read was issued at
        position: u64,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Closing the byte source failed
    #[error("failed to close source: {0}")]
    Close(#[source] io::Error),

    /// A line was requested after the last one was delivered
    #[error("no more lines to read")]
    Exhausted,

    /// More input was needed but the source had already been closed
    #[error("line source was closed before end of input")]
    SourceClosed,

    /// Encoding label not recognized
    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    /// Separator rejected at construction
    #[error("invalid separator: {0}")]
    InvalidSeparator(String),

    /// Separator pattern failed to compile
    #[error("invalid separator pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration error
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The traversal task was cancelled before it finished
    #[error("line traversal was cancelled")]
    Cancelled,
}

impl LineError {
    /// True for failures of the underlying byte source (open, read, close)
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            LineError::Open { .. } | LineError::Read { .. } | LineError::Close(_)
        )
    }

    /// True when a line was requested past the end of the input
    pub fn is_exhausted(&self) -> bool {
        matches!(self, LineError::Exhausted)
    }

    /// Kind of the wrapped I/O error, if any
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            LineError::Open { source, .. } | LineError::Read { source, .. } => Some(source.kind()),
            LineError::Close(source) => Some(source.kind()),
            _ => None,
        }
    }
}

/// Result type for line reading operations
pub type Result<T> = std::result::Result<T, LineError>;
