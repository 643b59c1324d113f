//! Strongly-typed identifiers, node references and source spans.

use std::fmt;

use crate::symbol::SymbolId;

/// Session-unique identity of an arena-resident object.
///
/// Allocated from a monotonic counter owned by the serializer session.
/// Two live objects never share an `ObjectId`, even when they live in
/// different arenas. Identities are not persisted: a restored graph gets
/// fresh ids, while the on-disk form uses dense per-type indices.
/// `ObjectId(0)` is never handed out and marks an unallocated record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Position of a concrete type in the fixed catalogue order.
///
/// Tags start at 1; `TypeTag(0)` is reserved as the null sentinel in the
/// binary format. The catalogue order is also the Save/Restore block order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(pub u16);

impl TypeTag {
    /// The null sentinel tag.
    pub const NULL: TypeTag = TypeTag(0);

    /// Whether this is the null sentinel.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for TypeTag {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// A link to an object in some arena: its catalogue tag plus identity.
///
/// This is the raw edge stored in every reference field. It is `Copy` and
/// carries no lifetime; resolving it against a serializer may fail if the
/// target has since been erased, swept or purged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    /// Catalogue tag of the target's concrete type.
    pub tag: TypeTag,
    /// Identity of the target within the session.
    pub id: ObjectId,
}

impl NodeRef {
    /// Create a reference from its parts.
    pub fn new(tag: TypeTag, id: ObjectId) -> Self {
        Self { tag, id }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.tag, self.id)
    }
}

/// Source location metadata attached to every node.
///
/// Lines and columns are 1-based; zero means "unknown".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Interned file name.
    pub file: SymbolId,
    /// First line.
    pub line: u32,
    /// First column.
    pub column: u32,
    /// Last line.
    pub end_line: u32,
    /// Last column.
    pub end_column: u32,
}

impl Span {
    /// A span covering a single position in `file`.
    pub fn at(file: SymbolId, line: u32, column: u32) -> Self {
        Self {
            file,
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_tag_is_zero() {
        assert!(TypeTag::NULL.is_null());
        assert!(!TypeTag(1).is_null());
    }

    #[test]
    fn node_ref_display() {
        let r = NodeRef::new(TypeTag(3), ObjectId(17));
        assert_eq!(r.to_string(), "#3:17");
    }

    #[test]
    fn span_at_collapses_end() {
        let s = Span::at(SymbolId(4), 10, 2);
        assert_eq!(s.end_line, 10);
        assert_eq!(s.end_column, 2);
        assert_eq!(s.file, SymbolId(4));
    }
}
