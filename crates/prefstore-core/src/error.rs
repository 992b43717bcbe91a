//! Error types for preference storage operations
//!
//! All errors are represented by the PrefError enum, which carries
//! enough context to diagnose adapter failures and corrupt backing files.
//!
//! Absence of a key is never an error: typed reads fall back to the
//! caller-supplied default, and so does a stored value of the wrong kind.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Preference storage error types with detailed context
#[derive(Debug, Clone)]
pub enum PrefError {
    /// A required handle was never initialized (e.g. the process-wide
    /// space registry). Fatal to the calling operation, never retried
    /// internally.
    Precondition {
        /// What was missing and how to fix it
        message: String,
    },

    /// I/O operation in a backing adapter failed
    Io {
        /// The file path where the error occurred
        path: Option<PathBuf>,
        /// The underlying I/O error kind
        kind: std::io::ErrorKind,
        /// Human-readable description
        message: String,
    },

    /// A backing file is corrupted and the record cannot be recovered
    Corrupted {
        /// Path to the corrupted file
        path: PathBuf,
        /// Byte offset where corruption was detected
        offset: u64,
        /// Description of the corruption
        reason: String,
    },

    /// Checksum verification failed
    ChecksumMismatch {
        /// File where checksum failed
        path: PathBuf,
        /// Expected checksum value
        expected: u32,
        /// Actual checksum computed
        actual: u32,
        /// Byte offset of the corrupted record
        offset: u64,
    },

    /// Key or value exceeds the maximum allowed size
    Oversized {
        /// Size of the oversized component
        size: u64,
        /// Maximum allowed size
        max: u64,
        /// Whether it's the key or value that's oversized
        component: String,
    },
}

impl fmt::Display for PrefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefError::Precondition { message } => {
                write!(f, "Precondition failed: {}", message)
            }

            PrefError::Io { path, kind, message } => {
                if let Some(path) = path {
                    write!(f, "I/O error in {}: {} ({})", path.display(), message, kind)
                } else {
                    write!(f, "I/O error: {} ({})", message, kind)
                }
            }

            PrefError::Corrupted { path, offset, reason } => {
                write!(f, "Corrupt record in {} at offset {}: {}", path.display(), offset, reason)
            }

            PrefError::ChecksumMismatch { path, expected, actual, offset } => {
                write!(f, "Checksum mismatch in {} at offset {}: expected 0x{:08x}, got 0x{:08x}",
                       path.display(), offset, expected, actual)
            }

            PrefError::Oversized { size, max, component } => {
                write!(f, "Preference {} too large: {} bytes exceeds limit of {} bytes",
                       component, size, max)
            }
        }
    }
}

impl Error for PrefError {}

/// Convert std::io::Error to PrefError::Io
impl From<std::io::Error> for PrefError {
    fn from(err: std::io::Error) -> Self {
        PrefError::Io {
            path: None,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for preference storage operations
pub type PrefResult<T> = Result<T, PrefError>;
