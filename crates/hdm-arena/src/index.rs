//! The identity → dense index map built by Save.

use indexmap::IndexMap;

use hdm_core::{NodeRef, ObjectId, TypeTag};

/// Global map from live identity to `(tag, 1-based dense index)`.
///
/// Spans every arena in the catalogue. Filled by
/// [`Arena::assign_indices`](crate::Arena::assign_indices), consumed when
/// links are encoded.
#[derive(Clone, Debug, Default)]
pub struct IndexTable {
    entries: IndexMap<ObjectId, (TypeTag, u32)>,
}

impl IndexTable {
    /// Record the dense index of `id`.
    pub fn insert(&mut self, id: ObjectId, tag: TypeTag, index: u32) {
        self.entries.insert(id, (tag, index));
    }

    /// Tag and dense index of `id`, if indexed.
    pub fn get(&self, id: ObjectId) -> Option<(TypeTag, u32)> {
        self.entries.get(&id).copied()
    }

    /// Dense index of a link target.
    ///
    /// `None` if the target is not resident or its tag disagrees with the
    /// arena it was indexed in (a stale reference).
    pub fn encode(&self, target: NodeRef) -> Option<u32> {
        match self.entries.get(&target.id) {
            Some(&(tag, index)) if tag == target.tag => Some(index),
            _ => None,
        }
    }

    /// Number of indexed identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_checks_tag() {
        let mut table = IndexTable::default();
        table.insert(ObjectId(5), TypeTag(2), 1);
        assert_eq!(table.encode(NodeRef::new(TypeTag(2), ObjectId(5))), Some(1));
        assert_eq!(table.encode(NodeRef::new(TypeTag(3), ObjectId(5))), None);
        assert_eq!(table.encode(NodeRef::new(TypeTag(2), ObjectId(6))), None);
    }
}
