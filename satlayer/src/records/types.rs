//! Record type definitions

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Characters Windows refuses in file names.
const RESERVED_CHARS: [char; 7] = [':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows reserves regardless of extension.
const DEVICE_NAMES: [&str; 4] = ["CON", "PRN", "AUX", "NUL"];

fn is_device_name(id: &str) -> bool {
    let base = id.split('.').next().unwrap_or(id).trim_end();
    if DEVICE_NAMES.iter().any(|d| base.eq_ignore_ascii_case(d)) {
        return true;
    }
    match base.as_bytes() {
        [a, b, c, digit] => {
            let prefix = [*a, *b, *c];
            (prefix.eq_ignore_ascii_case(b"COM") || prefix.eq_ignore_ascii_case(b"LPT"))
                && matches!(digit, b'1'..=b'9')
        }
        _ => false,
    }
}

/// Opaque record identifier.
///
/// Identifiers arrive either as integers or strings in the source table and are
/// kept as text. They double as asset file stems, so [`RecordId::file_stem`]
/// refuses anything that could escape the split directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Creates an identifier from any textual key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as it appeared in the source.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the filesystem-safe token used to name this record's asset.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnsafeId`] for empty identifiers, `.`/`..`,
    /// identifiers containing path separators, control characters or any of
    /// `: * ? " < > |`, and Windows device names such as `CON` or `com1.x`.
    pub fn file_stem(&self) -> Result<&str, RecordError> {
        let id = self.0.as_str();
        let unsafe_reason = if id.is_empty() {
            Some("identifier is empty")
        } else if id == "." || id == ".." {
            Some("identifier is a relative path component")
        } else if id.contains(['/', '\\']) {
            Some("identifier contains a path separator")
        } else if id.chars().any(char::is_control) {
            Some("identifier contains a control character")
        } else if id.contains(RESERVED_CHARS) {
            Some("identifier contains a reserved character")
        } else if is_device_name(id) {
            Some("identifier is a reserved device name")
        } else {
            None
        };

        match unsafe_reason {
            Some(reason) => Err(RecordError::UnsafeId {
                id: self.clone(),
                reason,
            }),
            None => Ok(id),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// One tabular row: the unit of work for acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Unique identifier within a split
    pub id: RecordId,
    /// Latitude in decimal degrees (not range-checked)
    pub latitude: f64,
    /// Longitude in decimal degrees (not range-checked)
    pub longitude: f64,
}

impl Record {
    /// Creates a record.
    pub fn new(id: impl Into<RecordId>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }
}

/// Errors raised while loading or validating records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record file could not be opened
    #[error("Failed to open record file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be parsed
    #[error("Malformed record at line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// The same identifier appears twice in one split
    #[error("Duplicate record identifier '{id}' at line {line}")]
    DuplicateId { id: RecordId, line: u64 },

    /// The identifier cannot be used as a file name
    #[error("Identifier '{id}' cannot name an asset: {reason}")]
    UnsafeId { id: RecordId, reason: &'static str },
}
