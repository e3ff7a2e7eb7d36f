//! Error types for the apiary store
//!
//! A single error enum covers every failure the store can report. Callers
//! that need to branch on the failure class use [`Error::kind`] instead of
//! matching on variants, so new variants do not break them.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for apiary operations
pub type Result<T> = std::result::Result<T, Error>;

/// Discriminant of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// File unreadable or unwritable
    Io,
    /// Malformed line in the data file
    Parse,
    /// A record or collection rule was violated
    Validation,
    /// Configuration could not be read or was invalid
    Config,
    /// Advisory file lock could not be taken
    Lock,
    /// The background save queue no longer accepts work
    QueueClosed,
}

/// Error types for the apiary store
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A data file line that failed field-count or integer validation
    #[error("Parse error on line {line}: {reason}")]
    Parse {
        /// 1-based line number in the data file
        line: usize,
        /// Why the line was rejected
        reason: String,
    },

    /// Collection rule violated (duplicate id or username, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Advisory lock failure
    #[error("Lock error: {0}")]
    Lock(String),

    /// Save submitted after the queue was shut down
    #[error("Save queue is closed")]
    QueueClosed,
}

impl Error {
    /// Build a parse error for the given 1-based line number
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Build a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Build a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Build a lock error
    pub fn lock(msg: impl Into<String>) -> Self {
        Error::Lock(msg.into())
    }

    /// The failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Config(_) => ErrorKind::Config,
            Error::Lock(_) => ErrorKind::Lock,
            Error::QueueClosed => ErrorKind::QueueClosed,
        }
    }
}
