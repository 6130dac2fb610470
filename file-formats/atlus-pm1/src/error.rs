//! Error types for the PM1 library

use std::io;
use thiserror::Error;

/// Result type alias for PM1 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for PM1 operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid PM1 format or corrupted container
    #[error("Invalid PM1 format: {0}")]
    InvalidFormat(String),

    /// No section with the requested type tag exists
    #[error("No section with type tag {kind}")]
    SectionNotFound {
        /// The requested type tag
        kind: i32,
    },

    /// More than one section carries the requested type tag
    #[error("Section type tag {kind} appears {found} times, expected exactly one")]
    DuplicateSection {
        /// The requested type tag
        kind: i32,
        /// Number of matching entries found
        found: usize,
    },

    /// The matching section packs an unexpected number of items
    #[error("Section type tag {kind} has item count {count}, expected exactly 1")]
    UnexpectedItemCount {
        /// The requested type tag
        kind: i32,
        /// The item count recorded in the table
        count: i32,
    },

    /// A section's recorded byte range extends past the end of the container
    #[error(
        "Section type tag {kind} at offset {offset} with size {size} extends past file length {file_len}"
    )]
    SectionOutOfBounds {
        /// The section's type tag
        kind: i32,
        /// Recorded payload offset
        offset: i32,
        /// Recorded payload size
        size: i32,
        /// Actual container length in bytes
        file_len: u64,
    },

    /// Replacement payload too large for a 32-bit size field
    #[error("Payload of {len} bytes does not fit a 32-bit section size field")]
    OversizedPayload {
        /// Length of the rejected payload
        len: usize,
    },
}

impl Error {
    /// Create a new InvalidFormat error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Error::InvalidFormat(msg.into())
    }

    /// Check if this error indicates the container is corrupted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_)
                | Error::DuplicateSection { .. }
                | Error::UnexpectedItemCount { .. }
                | Error::SectionOutOfBounds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_format("bad header");
        assert_eq!(err.to_string(), "Invalid PM1 format: bad header");

        let err = Error::SectionNotFound { kind: 6 };
        assert_eq!(err.to_string(), "No section with type tag 6");

        let err = Error::DuplicateSection { kind: 6, found: 2 };
        assert_eq!(
            err.to_string(),
            "Section type tag 6 appears 2 times, expected exactly one"
        );
    }

    #[test]
    fn test_error_classification() {
        let err = Error::DuplicateSection { kind: 6, found: 3 };
        assert!(err.is_corruption());

        let err = Error::SectionNotFound { kind: 6 };
        assert!(!err.is_corruption());

        let err = Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(!err.is_corruption());
    }
}
