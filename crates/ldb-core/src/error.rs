//! # Error Types
//!
//! Validation failures for the core newtypes. Construction errors carry the
//! rejected input so callers can log it verbatim.

use thiserror::Error;

/// A file name or bundle identifier failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The input was empty after normalization.
    #[error("name must not be empty")]
    Empty,

    /// The input names an absolute path.
    #[error("name must be relative: {0}")]
    Absolute(String),

    /// The input contains a `..`, `.` or empty path segment.
    #[error("name contains an illegal path segment: {0}")]
    IllegalSegment(String),

    /// A bundle identifier contained a path separator.
    #[error("identifier must not contain a path separator: {0}")]
    Separator(String),

    /// The input exceeded the maximum length.
    #[error("name exceeds {max} bytes: {len}")]
    TooLong {
        /// Maximum permitted length in bytes.
        max: usize,
        /// Actual length in bytes.
        len: usize,
    },
}

/// The request suffix did not name a known representation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown representation: {0}")]
pub struct UnknownRepresentation(pub String);
