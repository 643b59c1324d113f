//! Object-safe view of an arena, independent of its record type.

use std::collections::HashSet;

use hdm_core::{ClassSet, FieldDesc, ObjectId, Record, Schema, TypeTag};

use crate::arena::Arena;
use crate::index::IndexTable;

/// Type-erased arena operations.
///
/// Everything the persistence engine, the collector and clone/compare need
/// from an arena, expressed over `dyn Record`.
pub trait ErasedArena {
    /// Catalogue tag of the stored type.
    fn tag(&self) -> TypeTag;

    /// Class name of the stored type.
    fn type_name(&self) -> &'static str;

    /// Ancestry of the stored type.
    fn ancestry(&self) -> &'static ClassSet;

    /// Persisted layout of the stored type.
    fn layout(&self) -> &'static [FieldDesc];

    /// Number of live instances.
    fn len(&self) -> usize;

    /// Whether the arena is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is resident.
    fn contains(&self, id: ObjectId) -> bool;

    /// Live identities in insertion order.
    fn ids(&self) -> Vec<ObjectId>;

    /// Look up an instance.
    fn record(&self, id: ObjectId) -> Option<&dyn Record>;

    /// Look up an instance, mutably.
    fn record_mut(&mut self, id: ObjectId) -> Option<&mut dyn Record>;

    /// Instance at 0-based insertion position.
    fn record_at(&self, position: usize) -> Option<&dyn Record>;

    /// Allocate a default-initialised instance.
    fn make_record(&mut self, id: ObjectId) -> &mut dyn Record;

    /// Copy `src` under `new_id`. `None` if `src` is not resident.
    fn duplicate(&mut self, src: ObjectId, new_id: ObjectId) -> Option<&mut dyn Record>;

    /// Remove one instance; whether it was present.
    fn erase(&mut self, id: ObjectId) -> bool;

    /// Destroy instances absent from `reachable`; number destroyed.
    fn sweep(&mut self, reachable: &HashSet<ObjectId>) -> usize;

    /// Assign dense indices into `table`; number assigned.
    fn assign_indices(&self, table: &mut IndexTable) -> usize;

    /// Destroy every instance.
    fn purge(&mut self);

    /// Live instances in insertion order.
    fn records(&self) -> Box<dyn Iterator<Item = &dyn Record> + '_>;
}

impl<T: Schema> ErasedArena for Arena<T> {
    fn tag(&self) -> TypeTag {
        Arena::tag(self)
    }

    fn type_name(&self) -> &'static str {
        T::NAME
    }

    fn ancestry(&self) -> &'static ClassSet {
        T::CLASSES
    }

    fn layout(&self) -> &'static [FieldDesc] {
        T::LAYOUT
    }

    fn len(&self) -> usize {
        Arena::len(self)
    }

    fn contains(&self, id: ObjectId) -> bool {
        Arena::contains(self, id)
    }

    fn ids(&self) -> Vec<ObjectId> {
        self.iter().map(|r| r.id()).collect()
    }

    fn record(&self, id: ObjectId) -> Option<&dyn Record> {
        self.get(id).map(|r| r as &dyn Record)
    }

    fn record_mut(&mut self, id: ObjectId) -> Option<&mut dyn Record> {
        self.get_mut(id).map(|r| r as &mut dyn Record)
    }

    fn record_at(&self, position: usize) -> Option<&dyn Record> {
        self.get_index(position).map(|r| r as &dyn Record)
    }

    fn make_record(&mut self, id: ObjectId) -> &mut dyn Record {
        self.make(id)
    }

    fn duplicate(&mut self, src: ObjectId, new_id: ObjectId) -> Option<&mut dyn Record> {
        Arena::duplicate(self, src, new_id).map(|r| r as &mut dyn Record)
    }

    fn erase(&mut self, id: ObjectId) -> bool {
        Arena::erase(self, id)
    }

    fn sweep(&mut self, reachable: &HashSet<ObjectId>) -> usize {
        Arena::sweep(self, reachable)
    }

    fn assign_indices(&self, table: &mut IndexTable) -> usize {
        Arena::assign_indices(self, table)
    }

    fn purge(&mut self) {
        Arena::purge(self)
    }

    fn records(&self) -> Box<dyn Iterator<Item = &dyn Record> + '_> {
        Box::new(self.iter().map(|r| r as &dyn Record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use hdm_core::{FieldMut, FieldRef};

    #[test]
    fn erased_view_exposes_fields() {
        let mut arena: Arena<Probe> = Arena::new(TypeTag(4));
        let erased: &mut dyn ErasedArena = &mut arena;
        let record = erased.make_record(ObjectId(1));
        for field in record.fields_mut() {
            if let FieldMut::Int(v) = field {
                *v = 11;
            }
        }
        assert_eq!(erased.type_name(), "probe");
        assert_eq!(erased.layout().len(), 8);
        let record = erased.record(ObjectId(1)).unwrap();
        assert_eq!(record.fields()[6], FieldRef::Int(11));
        assert_eq!(erased.ids(), vec![ObjectId(1)]);
        assert_eq!(erased.records().count(), 1);
    }
}
