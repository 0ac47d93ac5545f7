//! Error types for ansicanvas.
//!
//! Editing operations never fail: an illegal mutation is a silent no-op.
//! Errors are reserved for loading saved documents and importing images.

use std::fmt;
use std::io;

/// Result type alias for ansicanvas operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ansicanvas operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading or writing a document.
    Io(io::Error),
    /// Malformed table literal.
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    /// A required field is absent from a document.
    MissingField(&'static str),
    /// The document declares a version this crate cannot read.
    UnsupportedVersion(i64),
    /// A field is present but has the wrong shape or value.
    InvalidField { field: String, reason: String },
    /// An image could not be decoded or converted.
    ImageDecode { file: String, reason: String },
}

impl Error {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse {
                line,
                column,
                message,
            } => write!(f, "parse error at {line}:{column}: {message}"),
            Self::MissingField(field) => write!(f, "missing {field} field"),
            Self::UnsupportedVersion(version) => write!(f, "unsupported version {version}"),
            Self::InvalidField { field, reason } => write!(f, "invalid {field} field: {reason}"),
            Self::ImageDecode { file, reason } => {
                write!(f, "failed to import image {file}: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
