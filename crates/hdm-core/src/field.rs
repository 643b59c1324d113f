//! The per-field schema model.
//!
//! A record describes its persisted layout as a static slice of
//! [`FieldDesc`] and exposes matching borrowed views ([`FieldRef`] /
//! [`FieldMut`]) in the same order. Save, Restore, garbage collection,
//! deep clone and compare are all written against this model, so none of
//! them needs to know any concrete record type.

use smallvec::SmallVec;

use crate::id::NodeRef;
use crate::rtti::ClassId;
use crate::symbol::SymbolId;

/// How a reference field relates to its target's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The holder owns the target: deep clone recurses into it and garbage
    /// collection keeps it alive.
    Owning,
    /// A resolved binding to some other node. Never extends a lifetime.
    Peer,
    /// The back-reference to the enclosing node.
    Parent,
}

/// Target constraint and ownership of a link or sequence field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkDesc {
    /// Lifetime relation to the target.
    pub ownership: Ownership,
    /// Class every target must belong to, or `None` for unconstrained.
    pub class: Option<ClassId>,
    /// Name of the target class, for diagnostics.
    pub class_name: &'static str,
}

impl LinkDesc {
    /// Whether a target with the given ancestry satisfies this link.
    pub fn accepts(&self, ancestry: &crate::rtti::ClassSet) -> bool {
        match self.class {
            Some(class) => ancestry.contains(class),
            None => true,
        }
    }
}

/// Storage kind of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// `bool`, one byte on disk.
    Bool,
    /// `i64`.
    Int,
    /// `u32`.
    UInt,
    /// Interned string.
    Symbol,
    /// Optional single reference.
    Link(LinkDesc),
    /// Ordered sequence of references.
    Refs(LinkDesc),
}

impl FieldKind {
    /// Short name used in format errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Symbol => "symbol",
            Self::Link(_) => "link",
            Self::Refs(_) => "refs",
        }
    }

    /// Link metadata, for link and sequence fields.
    pub fn link(&self) -> Option<&LinkDesc> {
        match self {
            Self::Link(link) | Self::Refs(link) => Some(link),
            _ => None,
        }
    }
}

/// Static description of one persisted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDesc {
    /// Field name.
    pub name: &'static str,
    /// Storage kind.
    pub kind: FieldKind,
    /// Whether the field takes part in structural comparison. Header
    /// fields (parent, source span) do not.
    pub structural: bool,
}

impl FieldDesc {
    /// A structural scalar or symbol field.
    pub const fn scalar(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            structural: true,
        }
    }

    /// A structural single-link field.
    pub const fn link(
        name: &'static str,
        ownership: Ownership,
        class: ClassId,
        class_name: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Link(LinkDesc {
                ownership,
                class: Some(class),
                class_name,
            }),
            structural: true,
        }
    }

    /// A structural sequence field.
    pub const fn refs(
        name: &'static str,
        ownership: Ownership,
        class: ClassId,
        class_name: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Refs(LinkDesc {
                ownership,
                class: Some(class),
                class_name,
            }),
            structural: true,
        }
    }

    /// Ownership of a link or sequence field, `None` for scalars.
    pub fn ownership(&self) -> Option<Ownership> {
        self.kind.link().map(|l| l.ownership)
    }

    /// Whether this field owns its target(s).
    pub fn is_owning(&self) -> bool {
        self.ownership() == Some(Ownership::Owning)
    }
}

/// Borrowed view of one field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRef<'a> {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u32),
    /// Interned string.
    Symbol(SymbolId),
    /// Optional reference.
    Link(Option<NodeRef>),
    /// Reference sequence.
    Refs(&'a [NodeRef]),
}

impl FieldRef<'_> {
    /// Every reference held by this field, empty for scalars.
    pub fn targets(&self) -> &[NodeRef] {
        match self {
            Self::Link(Some(r)) => std::slice::from_ref(r),
            Self::Refs(refs) => refs,
            _ => &[],
        }
    }
}

/// Mutable view of one field value.
#[derive(Debug)]
pub enum FieldMut<'a> {
    /// Boolean value.
    Bool(&'a mut bool),
    /// Signed integer value.
    Int(&'a mut i64),
    /// Unsigned integer value.
    UInt(&'a mut u32),
    /// Interned string.
    Symbol(&'a mut SymbolId),
    /// Optional reference.
    Link(&'a mut Option<NodeRef>),
    /// Reference sequence.
    Refs(&'a mut Vec<NodeRef>),
}

/// Field views in declaration order. Inline for typical record widths.
pub type FieldList<'a> = SmallVec<[FieldRef<'a>; 16]>;

/// Mutable field views in declaration order.
pub type FieldListMut<'a> = SmallVec<[FieldMut<'a>; 16]>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ObjectId, TypeTag};
    use crate::rtti::ClassSet;

    #[test]
    fn targets_of_scalars_are_empty() {
        assert!(FieldRef::Int(3).targets().is_empty());
        assert!(FieldRef::Link(None).targets().is_empty());
    }

    #[test]
    fn targets_of_links() {
        let a = NodeRef::new(TypeTag(1), ObjectId(1));
        let b = NodeRef::new(TypeTag(2), ObjectId(2));
        assert_eq!(FieldRef::Link(Some(a)).targets(), &[a]);
        let seq = [a, b];
        assert_eq!(FieldRef::Refs(&seq).targets(), &[a, b]);
    }

    #[test]
    fn link_desc_checks_class() {
        let wanted = ClassId::derive("module", &[]);
        let desc = FieldDesc::link("module", Ownership::Peer, wanted, "module");
        let link = desc.kind.link().copied();
        let Some(link) = link else {
            panic!("link field has no link metadata");
        };
        assert!(link.accepts(&ClassSet::root(wanted)));
        assert!(!link.accepts(&ClassSet::root(ClassId::derive("net", &[]))));
        assert!(!desc.is_owning());
    }
}
