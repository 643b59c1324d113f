//! Format errors: failures that abort a Save or Restore.

use std::fmt;
use std::io;

/// Errors that can occur while saving or restoring a graph.
///
/// Restore never leaves a partial graph behind: by the time one of these is
/// returned, every arena has been purged.
#[derive(Debug)]
pub enum FormatError {
    /// An I/O error other than a premature end of stream.
    Io(io::Error),
    /// The stream does not start with `b"HDMG"`.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// The stream ended early.
    Truncated {
        /// What was being read.
        detail: String,
    },
    /// A link names a tag outside the catalogue.
    UnknownTypeTag {
        /// The unrecognized tag.
        tag: u16,
    },
    /// A record block appears out of catalogue order.
    TypeOrderMismatch {
        /// The tag expected at this position.
        expected: u16,
        /// The tag found.
        found: u16,
    },
    /// A link index is zero or exceeds its arena's record count.
    IndexOutOfRange {
        /// Tag of the target arena.
        tag: u16,
        /// The offending 1-based index.
        index: u32,
        /// Number of records restored for `tag`.
        count: u32,
    },
    /// A link resolves to an object of a class the field does not accept.
    KindMismatch {
        /// Name of the field.
        field: &'static str,
        /// Class the field accepts.
        expected: &'static str,
        /// Class of the resolved object.
        found: &'static str,
    },
    /// A string in the symbol block is not valid UTF-8.
    InvalidUtf8 {
        /// Decoder message.
        detail: String,
    },
    /// The stream is structurally inconsistent in some other way.
    Corrupt {
        /// Human-readable description of the inconsistency.
        detail: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"HDMG\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::Truncated { detail } => write!(f, "truncated stream: {detail}"),
            Self::UnknownTypeTag { tag } => write!(f, "unknown type tag {tag}"),
            Self::TypeOrderMismatch { expected, found } => {
                write!(f, "record block out of order: expected tag {expected}, found {found}")
            }
            Self::IndexOutOfRange { tag, index, count } => {
                write!(
                    f,
                    "link index {index} out of range for tag {tag} ({count} records)"
                )
            }
            Self::KindMismatch {
                field,
                expected,
                found,
            } => {
                write!(f, "field '{field}' expects {expected}, found {found}")
            }
            Self::InvalidUtf8 { detail } => write!(f, "invalid UTF-8 symbol: {detail}"),
            Self::Corrupt { detail } => write!(f, "corrupt stream: {detail}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated {
                detail: e.to_string(),
            }
        } else {
            Self::Io(e)
        }
    }
}
