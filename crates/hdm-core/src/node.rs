//! The [`Record`] contract every arena-resident value fulfils.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::field::{
    FieldDesc, FieldKind, FieldList, FieldListMut, FieldMut, FieldRef, LinkDesc, Ownership,
};
use crate::id::{NodeRef, ObjectId, Span};
use crate::rtti::{ClassId, ClassSet, Identity};

/// State shared by every record: identity, parent back-reference, source
/// span and an opaque client slot.
///
/// The parent and span are persisted as the first six fields of every
/// record. The id and client data are session-local and never persisted.
#[derive(Clone, Default)]
pub struct NodeHeader {
    /// Session-unique identity, assigned by the owning arena.
    pub id: ObjectId,
    /// Non-owning back-reference to the enclosing node.
    pub parent: Option<NodeRef>,
    /// Source location.
    pub span: Span,
    /// Opaque data attached by client code. Shared, not deep-copied, by clone.
    pub client_data: Option<Rc<dyn Any>>,
}

impl NodeHeader {
    /// Descriptor of the parent back-reference.
    pub const PARENT: FieldDesc = FieldDesc {
        name: "parent",
        kind: FieldKind::Link(LinkDesc {
            ownership: Ownership::Parent,
            class: None,
            class_name: "any",
        }),
        structural: false,
    };
    /// Descriptor of the file symbol.
    pub const FILE: FieldDesc = Self::meta("file", FieldKind::Symbol);
    /// Descriptor of the first line.
    pub const LINE: FieldDesc = Self::meta("line", FieldKind::UInt);
    /// Descriptor of the first column.
    pub const COLUMN: FieldDesc = Self::meta("column", FieldKind::UInt);
    /// Descriptor of the last line.
    pub const END_LINE: FieldDesc = Self::meta("end_line", FieldKind::UInt);
    /// Descriptor of the last column.
    pub const END_COLUMN: FieldDesc = Self::meta("end_column", FieldKind::UInt);

    /// Number of persisted header fields.
    pub const FIELD_COUNT: usize = 6;

    const fn meta(name: &'static str, kind: FieldKind) -> FieldDesc {
        FieldDesc {
            name,
            kind,
            structural: false,
        }
    }

    /// Append borrowed views of the persisted header fields.
    pub fn push_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        out.push(FieldRef::Link(self.parent));
        out.push(FieldRef::Symbol(self.span.file));
        out.push(FieldRef::UInt(self.span.line));
        out.push(FieldRef::UInt(self.span.column));
        out.push(FieldRef::UInt(self.span.end_line));
        out.push(FieldRef::UInt(self.span.end_column));
    }

    /// Append mutable views of the persisted header fields.
    pub fn push_fields_mut<'a>(&'a mut self, out: &mut FieldListMut<'a>) {
        let span = &mut self.span;
        out.push(FieldMut::Link(&mut self.parent));
        out.push(FieldMut::Symbol(&mut span.file));
        out.push(FieldMut::UInt(&mut span.line));
        out.push(FieldMut::UInt(&mut span.column));
        out.push(FieldMut::UInt(&mut span.end_line));
        out.push(FieldMut::UInt(&mut span.end_column));
    }
}

impl fmt::Debug for NodeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHeader")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("span", &self.span)
            .field("client_data", &self.client_data.is_some())
            .finish()
    }
}

/// Object-safe view of an arena-resident record.
///
/// `descriptors`, `fields` and `fields_mut` describe the same persisted
/// layout in the same order, header fields first. Generic machinery
/// (persistence, collection, clone, compare) only ever goes through this
/// trait.
pub trait Record: 'static {
    /// Class name of the concrete type.
    fn class_name(&self) -> &'static str;

    /// Class id of the concrete type.
    fn class_id(&self) -> ClassId;

    /// The concrete type and all of its ancestors.
    fn ancestry(&self) -> &'static ClassSet;

    /// Persisted field layout.
    fn descriptors(&self) -> &'static [FieldDesc];

    /// Borrowed field values, parallel to [`descriptors`](Record::descriptors).
    fn fields(&self) -> FieldList<'_>;

    /// Mutable field values, parallel to [`descriptors`](Record::descriptors).
    fn fields_mut(&mut self) -> FieldListMut<'_>;

    /// Shared header.
    fn header(&self) -> &NodeHeader;

    /// Shared header, mutably.
    fn header_mut(&mut self) -> &mut NodeHeader;

    /// Identity of this record.
    fn id(&self) -> ObjectId {
        self.header().id
    }

    /// Dynamic class test through the most-derived ancestry.
    fn is_a(&self, class: ClassId) -> bool {
        self.ancestry().contains(class)
    }
}

/// A concrete record type that can live in an arena.
///
/// The associated constants expose the same data as [`Record::descriptors`]
/// and [`Record::ancestry`] without needing an instance.
pub trait Schema: Record + Identity + Default + Clone {
    /// Persisted field layout, header fields first.
    const LAYOUT: &'static [FieldDesc];
    /// `Self::ANCESTRY`, with a `'static` address.
    const CLASSES: &'static ClassSet;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolId;

    #[test]
    fn header_views_line_up_with_descriptors() {
        let mut header = NodeHeader {
            span: Span::at(SymbolId(3), 7, 1),
            ..NodeHeader::default()
        };
        let descriptors = [
            NodeHeader::PARENT,
            NodeHeader::FILE,
            NodeHeader::LINE,
            NodeHeader::COLUMN,
            NodeHeader::END_LINE,
            NodeHeader::END_COLUMN,
        ];

        let mut views = FieldList::new();
        header.push_fields(&mut views);
        assert_eq!(views.len(), NodeHeader::FIELD_COUNT);
        assert_eq!(views.len(), descriptors.len());
        assert_eq!(views[1], FieldRef::Symbol(SymbolId(3)));
        assert_eq!(views[2], FieldRef::UInt(7));
        drop(views);

        let mut muts = FieldListMut::new();
        header.push_fields_mut(&mut muts);
        if let FieldMut::UInt(line) = &mut muts[2] {
            **line = 9;
        }
        drop(muts);
        assert_eq!(header.span.line, 9);
        assert!(descriptors.iter().all(|d| !d.structural));
    }
}
