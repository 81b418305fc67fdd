//! Detection Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the underlying stream or
//! decoder library are kept as children of the raised [`ErrorKind`].

use crate::Compression;
use derive_more::{Display, Error};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};

/// A detection error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading from the underlying stream failed.
    #[display("I/O error")]
    Io,
    /// The stream ended before a complete header could be peeked. Whatever
    /// was read is still available from the returned reader.
    #[display("stream ended after {got} of {wanted} header bytes")]
    UnexpectedEof { wanted: usize, got: usize },
    /// Failed to initialize a decoder for the detected compression format.
    #[display("failed to initialize {_0} decoder")]
    Decoder(#[error(not(source))] Compression),
    /// Data is corrupt or malformed. Don't retry with the same input.
    #[display("invalid or corrupted data")]
    InvalidData,
    /// The requested format is not supported.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }

    /// Classify an error from reading decoded output. Failures of the stream
    /// underneath stay retryable; anything else the decoder reports means
    /// the data is bad.
    pub fn from_read(err: &IoError) -> Self {
        match err.kind() {
            IoErrorKind::Interrupted
            | IoErrorKind::WouldBlock
            | IoErrorKind::TimedOut
            | IoErrorKind::ConnectionReset
            | IoErrorKind::ConnectionAborted
            | IoErrorKind::BrokenPipe
            | IoErrorKind::NotConnected => ErrorKind::Io,
            _ => ErrorKind::InvalidData,
        }
    }
}
