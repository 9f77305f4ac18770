//! Error types and handling infrastructure for textlines.
//!
//! Every stage of the line-reading pipeline reports failures through
//! [`TextLinesError`]. A stream carries at most one of these, as its final item.
//!
//! ## Stage errors
//!
//! The byte-level stages (chunk source and gzip decoder) are plumbed through
//! `tokio-util`'s reader adapters, which only speak `std::io::Error`. Errors
//! raised by a stage are wrapped with [`into_stage_error`] and unwrapped again
//! with [`from_stage_error`], so a read failure that travels through the gzip
//! decoder is still reported as a read failure.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for textlines operations.
#[derive(Error, Debug)]
pub enum TextLinesError {
    /// File system related errors (read failure mid-stream, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: io::Error,
    },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Permission denied accessing file
    #[error("Permission denied accessing file: {path}")]
    PermissionDenied { path: PathBuf },

    /// Corrupt or non-gzip content behind a compressed file name
    #[error("Decompression failed: {message}")]
    CompressionError {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Encoding label not known to the decoder
    #[error("Unknown encoding: {label}")]
    UnknownEncoding { label: String },

    /// Byte sequence invalid for the declared encoding (strict decoding only)
    #[error("Failed to decode {encoding} text: {message}")]
    DecodeError { encoding: String, message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid caller supplied arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for textlines operations.
pub type Result<T> = std::result::Result<T, TextLinesError>;

impl TextLinesError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Classify an I/O failure on `path`, keeping the path for the common cases
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::file_error(format!("Failed to read {}", path.display()), source),
        }
    }

    /// Create a CompressionError from the decoder's io::Error
    pub fn compression(source: io::Error) -> Self {
        Self::CompressionError {
            message: source.to_string(),
            source,
        }
    }

    pub fn unknown_encoding(label: impl Into<String>) -> Self {
        Self::UnknownEncoding {
            label: label.into(),
        }
    }

    pub fn decode(encoding: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeError {
            encoding: encoding.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

// Automatic conversion from io::Error to TextLinesError
impl From<io::Error> for TextLinesError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}

/// Wrap a stage failure so it can cross an `io::Error`-only boundary.
pub(crate) fn into_stage_error(err: TextLinesError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

/// Recover a failure wrapped by [`into_stage_error`].
///
/// Errors that carry no stage payload were raised by the adapter in between
/// and are handed to `classify`.
pub(crate) fn from_stage_error(
    err: io::Error,
    classify: impl FnOnce(io::Error) -> TextLinesError,
) -> TextLinesError {
    let tagged = err
        .get_ref()
        .is_some_and(|inner| inner.is::<TextLinesError>());
    if !tagged {
        return classify(err);
    }

    match err.into_inner().map(|inner| inner.downcast::<TextLinesError>()) {
        Some(Ok(inner)) => *inner,
        _ => TextLinesError::other("stage error lost its payload"),
    }
}
