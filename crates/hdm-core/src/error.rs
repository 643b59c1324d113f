//! Semantic error kinds reported through the serializer's error callback.
//!
//! These never abort an operation. Format errors, which do, live with the
//! persistence engine.

use std::fmt;

/// Kind of a localized model defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A node of the wrong class was attached to a typed field.
    WrongObjectType,
    /// A pattern assignment names a key that does not exist.
    UndefinedPatternKey,
    /// A pattern assignment names a field the target does not have.
    UnmatchedFieldInPatternAssign,
    /// An expression form downstream tools do not support.
    UnsupportedExpr,
    /// A statement form downstream tools do not support.
    UnsupportedStmt,
    /// A type specification downstream tools do not support.
    UnsupportedTypespec,
    /// A construct outside the synthesizable subset.
    NonSynthesizable,
    /// A link whose target is no longer resident.
    DanglingReference,
}

impl ErrorKind {
    /// Stable numeric code, as printed by the default handler.
    pub fn code(self) -> u32 {
        match self {
            Self::WrongObjectType => 703,
            Self::UndefinedPatternKey => 712,
            Self::UnmatchedFieldInPatternAssign => 713,
            Self::UnsupportedExpr => 720,
            Self::UnsupportedStmt => 721,
            Self::UnsupportedTypespec => 722,
            Self::NonSynthesizable => 730,
            Self::DanglingReference => 740,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::WrongObjectType => "wrong object type",
            Self::UndefinedPatternKey => "undefined pattern key",
            Self::UnmatchedFieldInPatternAssign => "unmatched field in pattern assign",
            Self::UnsupportedExpr => "unsupported expression",
            Self::UnsupportedStmt => "unsupported statement",
            Self::UnsupportedTypespec => "unsupported typespec",
            Self::NonSynthesizable => "non-synthesizable construct",
            Self::DanglingReference => "dangling reference",
        };
        write!(f, "[{}] {text}", self.code())
    }
}
