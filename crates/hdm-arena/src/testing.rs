//! Hand-written records for unit tests.

use hdm_core::{
    ClassId, ClassSet, FieldDesc, FieldKind, FieldList, FieldListMut, FieldMut, FieldRef, Identity,
    NodeHeader, Ownership, Record, Schema,
};

#[derive(Clone, Debug, Default)]
pub(crate) struct Probe {
    pub header: NodeHeader,
    pub value: i64,
    pub peers: Vec<hdm_core::NodeRef>,
}

impl Identity for Probe {
    const NAME: &'static str = "probe";
    const CLASS_ID: ClassId = ClassId::derive("probe", &[]);
    const ANCESTRY: ClassSet = ClassSet::root(Self::CLASS_ID);
}

impl Schema for Probe {
    const LAYOUT: &'static [FieldDesc] = &[
        NodeHeader::PARENT,
        NodeHeader::FILE,
        NodeHeader::LINE,
        NodeHeader::COLUMN,
        NodeHeader::END_LINE,
        NodeHeader::END_COLUMN,
        FieldDesc::scalar("value", FieldKind::Int),
        FieldDesc::refs("peers", Ownership::Peer, Probe::CLASS_ID, "probe"),
    ];
    const CLASSES: &'static ClassSet = &Probe::ANCESTRY;
}

impl Record for Probe {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn class_id(&self) -> ClassId {
        Self::CLASS_ID
    }

    fn ancestry(&self) -> &'static ClassSet {
        Self::CLASSES
    }

    fn descriptors(&self) -> &'static [FieldDesc] {
        Self::LAYOUT
    }

    fn fields(&self) -> FieldList<'_> {
        let mut out = FieldList::new();
        self.header.push_fields(&mut out);
        out.push(FieldRef::Int(self.value));
        out.push(FieldRef::Refs(&self.peers));
        out
    }

    fn fields_mut(&mut self) -> FieldListMut<'_> {
        let mut out = FieldListMut::new();
        self.header.push_fields_mut(&mut out);
        out.push(FieldMut::Int(&mut self.value));
        out.push(FieldMut::Refs(&mut self.peers));
        out
    }

    fn header(&self) -> &NodeHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut NodeHeader {
        &mut self.header
    }
}
