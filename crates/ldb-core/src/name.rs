//! # Names and Identifiers
//!
//! Newtype wrappers for the two kinds of names the bundler handles:
//!
//! - [`LogicalFileName`]: a relative, forward-slash path naming a part or
//!   primitive file inside a library root (`3001.dat`, `s/3001s01.dat`,
//!   `48/4-4disc.dat`).
//! - [`BundleId`]: the identifier a client requests a bundle for. It names
//!   the entry file (`<id>.dat`) and the cache artifacts (`<id>.zip`,
//!   `<id>.lst`).
//!
//! ## Security Invariant
//!
//! Neither type can hold an absolute path or a `..` segment, so joining one
//! onto a configured directory never leaves that directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NameError, UnknownRepresentation};

/// Extension of part-description files. Entry files are `<id>.dat`.
pub const ENTRY_EXTENSION: &str = "dat";

/// Upper bound on a logical file name, in bytes.
const MAX_FILE_NAME_LEN: usize = 1024;

/// Upper bound on a bundle identifier, in bytes.
const MAX_BUNDLE_ID_LEN: usize = 255;

/// A normalized, relative, forward-slash file name.
///
/// Names are case-sensitive and compared byte-for-byte after backslashes
/// have been rewritten to forward slashes. Ordering is lexicographic, which
/// is the order manifests list their entries in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalFileName(String);

impl LogicalFileName {
    /// Normalize and validate a file name.
    ///
    /// Backslashes become forward slashes. The result must be non-empty,
    /// relative, and free of `.`, `..` and empty segments.
    pub fn new(raw: &str) -> Result<Self, NameError> {
        let normalized = raw.replace('\\', "/");
        if normalized.is_empty() {
            return Err(NameError::Empty);
        }
        if normalized.len() > MAX_FILE_NAME_LEN {
            return Err(NameError::TooLong {
                max: MAX_FILE_NAME_LEN,
                len: normalized.len(),
            });
        }
        if normalized.starts_with('/') || has_drive_prefix(&normalized) {
            return Err(NameError::Absolute(normalized));
        }
        if normalized.split('/').any(is_illegal_segment) {
            return Err(NameError::IllegalSegment(normalized));
        }
        Ok(Self(normalized))
    }

    /// Access the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_illegal_segment(segment: &str) -> bool {
    segment.is_empty() || segment == "." || segment == ".." || segment.contains('\0')
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl fmt::Display for LogicalFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LogicalFileName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<LogicalFileName> for String {
    fn from(name: LogicalFileName) -> Self {
        name.0
    }
}

impl FromStr for LogicalFileName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The identifier a bundle is requested for.
///
/// A single path segment: no separators, not `.` or `..`, at most 255 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BundleId(String);

impl BundleId {
    /// Validate a bundle identifier.
    pub fn new(raw: &str) -> Result<Self, NameError> {
        if raw.is_empty() {
            return Err(NameError::Empty);
        }
        if raw.len() > MAX_BUNDLE_ID_LEN {
            return Err(NameError::TooLong {
                max: MAX_BUNDLE_ID_LEN,
                len: raw.len(),
            });
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(NameError::Separator(raw.to_string()));
        }
        if has_drive_prefix(raw) {
            return Err(NameError::Absolute(raw.to_string()));
        }
        if raw == "." || raw == ".." || raw.contains('\0') {
            return Err(NameError::IllegalSegment(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Split a request file name such as `3001.zip` into its identifier and
    /// representation. The split happens at the last `.`.
    pub fn parse_request(file: &str) -> Option<(Self, Representation)> {
        let (id, ext) = file.rsplit_once('.')?;
        let representation = ext.parse().ok()?;
        let id = Self::new(id).ok()?;
        Some((id, representation))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The entry file resolved for this identifier: `<id>.dat`.
    pub fn entry_file_name(&self) -> LogicalFileName {
        // A separator-free identifier other than `.`/`..` always yields a
        // valid single-segment name.
        LogicalFileName(format!("{}.{ENTRY_EXTENSION}", self.0))
    }

    /// The cache file name for a representation: `<id>.zip` or `<id>.lst`.
    pub fn artifact_file_name(&self, representation: Representation) -> String {
        format!("{}.{}", self.0, representation.extension())
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BundleId {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<BundleId> for String {
    fn from(id: BundleId) -> Self {
        id.0
    }
}

impl FromStr for BundleId {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The two forms a bundle can be delivered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// A zip archive holding every file of the closure.
    Archive,
    /// A `\r\n`-joined list of every file name in the closure.
    Manifest,
}

impl Representation {
    /// All representations, in a fixed order.
    pub const ALL: [Representation; 2] = [Representation::Archive, Representation::Manifest];

    /// File extension used in request paths and cache keys.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Archive => "zip",
            Self::Manifest => "lst",
        }
    }

    /// MIME type of the response body.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Archive => "application/zip",
            Self::Manifest => "text/plain",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Representation {
    type Err = UnknownRepresentation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(Self::Archive),
            "lst" => Ok(Self::Manifest),
            other => Err(UnknownRepresentation(other.to_string())),
        }
    }
}
