//! Unified error types for dbbdump.
//!
//! This module provides a single [`DbbError`] enum that covers all error
//! cases in the library, plus [`DecodeErrorKind`] for failures local to a
//! single record.
//!
//! # Error Handling Philosophy
//!
//! - **Per-file errors** (cannot open, cannot determine the stride) abort
//!   processing of that file only
//! - **Per-record errors** (bad magic, unknown field type, truncated slot)
//!   are fatal for the rest of the file: once a record is misaligned the
//!   field boundaries cannot be recovered
//! - Every variant carries the file path and, where it applies, the record
//!   index and byte offset

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A specialized [`Result`] type for dbbdump operations.
///
/// # Example
///
/// ```rust
/// use dbbdump::error::Result;
///
/// fn count_records() -> Result<u64> {
///     Ok(0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, DbbError>;

/// The error type for all dbbdump operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DbbError {
    /// The input file could not be opened or inspected.
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        /// The file that failed to open
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: io::Error,
    },

    /// The record stride could not be determined.
    ///
    /// This happens when no maximum payload size was given and the file
    /// name carries no trailing digit run.
    #[error("Cannot determine record stride for {}: {message}", path.display())]
    Config {
        /// The file being opened
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// A record index past the end of the file was requested.
    #[error("Record {index} not found in {} ({count} records)", path.display())]
    OutOfRange {
        /// The file being read
        path: PathBuf,
        /// The requested index
        index: u64,
        /// Number of record slots in the file
        count: u64,
    },

    /// Reading a record slot failed at the OS level.
    #[error("Cannot read record {index} of {}: {source}", path.display())]
    Read {
        /// The file being read
        path: PathBuf,
        /// Index of the record slot
        index: u64,
        /// The underlying IO error
        #[source]
        source: io::Error,
    },

    /// A record slot ended before a full stride could be read.
    #[error("Truncated record {index} in {}: expected {expected} bytes, got {actual}", path.display())]
    TruncatedRecord {
        /// The file being read
        path: PathBuf,
        /// Index of the short slot
        index: u64,
        /// Stride of the file
        expected: u64,
        /// Bytes actually available
        actual: u64,
    },

    /// A record slot could not be decoded.
    #[error("Failed to decode record {index} of {}: {source}", path.display())]
    Decode {
        /// The file being read
        path: PathBuf,
        /// Index of the record slot
        index: u64,
        /// The record-local failure
        #[source]
        source: DecodeErrorKind,
    },

    /// An I/O error occurred while writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTML size ceiling is malformed or below the minimum.
    #[error("Invalid size limit '{input}': {reason}")]
    InvalidSizeLimit {
        /// The value that was provided
        input: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Failures local to one record chunk.
///
/// Offsets are byte offsets from the start of the record slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// The slot does not start with the `l33l` signature.
    #[error("invalid header magic {found:?}")]
    BadMagic {
        /// The leading bytes actually found
        found: Vec<u8>,
    },
    /// A text field has no NUL terminator before the end of the slot.
    #[error("unterminated string at offset {offset}")]
    UnterminatedString { offset: usize },
    /// A field tag byte is not one of `0x00`, `0x03`, `0x04`.
    #[error("unknown field type {tag:#04x} at offset {offset}")]
    UnknownFieldType { tag: u8, offset: usize },
    /// Decoding ran past the end of the slot.
    #[error("unexpected end of record at offset {offset}")]
    UnexpectedEnd { offset: usize },
    /// A varint carries more than 64 bits of payload.
    #[error("varint at offset {offset} does not fit in 64 bits")]
    VarintOverflow { offset: usize },
}

impl DecodeErrorKind {
    /// Returns the byte offset the failure was detected at, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeErrorKind::BadMagic { .. } => None,
            DecodeErrorKind::UnterminatedString { offset }
            | DecodeErrorKind::UnknownFieldType { offset, .. }
            | DecodeErrorKind::UnexpectedEnd { offset }
            | DecodeErrorKind::VarintOverflow { offset } => Some(*offset),
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl DbbError {
    /// Creates an open error for `path`.
    pub fn open(path: impl AsRef<Path>, source: io::Error) -> Self {
        DbbError::Open {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a stride configuration error for `path`.
    pub fn config(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        DbbError::Config {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a read error for slot `index` of `path`.
    pub fn read(path: impl AsRef<Path>, index: u64, source: io::Error) -> Self {
        DbbError::Read {
            path: path.as_ref().to_path_buf(),
            index,
            source,
        }
    }

    /// Wraps a record-local failure with its file and record index.
    pub fn decode(path: impl AsRef<Path>, index: u64, source: DecodeErrorKind) -> Self {
        DbbError::Decode {
            path: path.as_ref().to_path_buf(),
            index,
            source,
        }
    }

    /// Creates an invalid size limit error.
    pub fn invalid_size_limit(input: impl Into<String>, reason: &'static str) -> Self {
        DbbError::InvalidSizeLimit {
            input: input.into(),
            reason,
        }
    }

    /// Returns the record-local failure, if this is a decode error.
    pub fn decode_kind(&self) -> Option<&DecodeErrorKind> {
        match self {
            DbbError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the input file this error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            DbbError::Open { path, .. }
            | DbbError::Config { path, .. }
            | DbbError::OutOfRange { path, .. }
            | DbbError::Read { path, .. }
            | DbbError::TruncatedRecord { path, .. }
            | DbbError::Decode { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns `true` if this is an open error.
    pub fn is_open(&self) -> bool {
        matches!(self, DbbError::Open { .. })
    }

    /// Returns `true` if this is a stride configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, DbbError::Config { .. })
    }

    /// Returns `true` if this is a record decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, DbbError::Decode { .. })
    }

    /// Returns `true` if this is a truncated record error.
    pub fn is_truncated(&self) -> bool {
        matches!(self, DbbError::TruncatedRecord { .. })
    }

    /// Returns `true` if this is an out-of-range error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, DbbError::OutOfRange { .. })
    }
}
