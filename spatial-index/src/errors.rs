//! Error taxonomy for the spatial index.
//!
//! Every failure the index can report is a variant of [`IndexError`]. All of
//! them are recoverable by the caller; broken internal invariants are not
//! represented here because they panic.

use std::io;
use thiserror::Error;

/// Errors that can occur in spatial index operations
#[derive(Debug, Error)]
pub enum IndexError {
    /// An envelope was constructed with malformed bounds.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// An entry or query does not have the tree's dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A persisted stream failed header or structural validation.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Tree parameters (dimension, fanout) are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A coordinate system transform supplied by the caller failed.
    #[error("Coordinate transform failed: {0}")]
    Transform(String),

    #[error("Index is closed")]
    Closed,

    /// Every [`EntryId`](crate::entry::EntryId) has been assigned.
    #[error("Entry ids exhausted")]
    IdsExhausted,
}

impl IndexError {
    pub(crate) fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        IndexError::DimensionMismatch { expected, actual }
    }

    /// Returns true if rebuilding the index from source data is the expected
    /// recovery for this error.
    pub fn is_corruption(&self) -> bool {
        matches!(self, IndexError::CorruptIndex(_))
    }
}

impl From<bincode::error::EncodeError> for IndexError {
    fn from(err: bincode::error::EncodeError) -> Self {
        match err {
            bincode::error::EncodeError::Io { inner, .. } => IndexError::Io(inner),
            other => IndexError::Serialization(other.to_string()),
        }
    }
}

impl From<bincode::error::DecodeError> for IndexError {
    fn from(err: bincode::error::DecodeError) -> Self {
        match err {
            bincode::error::DecodeError::Io { inner, .. }
                if inner.kind() == io::ErrorKind::UnexpectedEof =>
            {
                IndexError::CorruptIndex("unexpected end of stream".into())
            }
            bincode::error::DecodeError::Io { inner, .. } => IndexError::Io(inner),
            other => IndexError::CorruptIndex(other.to_string()),
        }
    }
}

/// Result type for spatial index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = IndexError::dimension_mismatch(2, 3);
        assert_eq!(err.to_string(), "Dimension mismatch: expected 2, got 3");

        let err = IndexError::CorruptIndex("bad magic".into());
        assert_eq!(err.to_string(), "Corrupt index: bad magic");
        assert!(err.is_corruption());

        assert_eq!(IndexError::Closed.to_string(), "Index is closed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: IndexError = io_err.into();
        assert!(matches!(err, IndexError::Io(_)));
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_truncated_decode_is_corruption() {
        let decode_err = bincode::error::DecodeError::Io {
            inner: io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
            additional: 8,
        };
        let err: IndexError = decode_err.into();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_other_decode_io_stays_io() {
        let decode_err = bincode::error::DecodeError::Io {
            inner: io::Error::new(io::ErrorKind::TimedOut, "slow disk"),
            additional: 8,
        };
        let err: IndexError = decode_err.into();
        assert!(matches!(err, IndexError::Io(_)));
    }
}
