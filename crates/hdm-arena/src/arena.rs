//! Typed arena holding every live instance of one concrete record type.

use std::collections::HashSet;

use indexmap::IndexMap;

use hdm_core::{NodeRef, ObjectId, Record, Schema, TypeTag};

use crate::index::IndexTable;

/// Owner of every live `T`.
///
/// Instances are kept in insertion order. Removal shifts later entries down
/// so the relative order of survivors never changes; two calls to
/// [`assign_indices`](Arena::assign_indices) on an unmodified arena always
/// produce the same indices.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    tag: TypeTag,
    objects: IndexMap<ObjectId, T>,
}

impl<T: Schema> Arena<T> {
    /// Create an empty arena for catalogue position `tag`.
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            objects: IndexMap::new(),
        }
    }

    /// Catalogue tag of `T`.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Allocate a default-initialised `T` under identity `id`.
    ///
    /// The caller guarantees `id` is fresh; the session's id counter is the
    /// only allocator.
    pub fn make(&mut self, id: ObjectId) -> &mut T {
        let mut value = T::default();
        value.header_mut().id = id;
        let (index, previous) = self.objects.insert_full(id, value);
        debug_assert!(previous.is_none(), "object id {id} allocated twice");
        &mut self.objects[index]
    }

    /// Insert a copy of `src` under identity `new_id`.
    ///
    /// Every field (links included) is copied verbatim; the parent is left
    /// for the caller to rebind. Returns `None` if `src` is not resident.
    pub fn duplicate(&mut self, src: ObjectId, new_id: ObjectId) -> Option<&mut T> {
        let mut value = self.objects.get(&src)?.clone();
        value.header_mut().id = new_id;
        let (index, _) = self.objects.insert_full(new_id, value);
        Some(&mut self.objects[index])
    }

    /// Remove one instance. Linear in the arena size; preserves the order
    /// of the remaining instances.
    pub fn erase(&mut self, id: ObjectId) -> bool {
        self.objects.shift_remove(&id).is_some()
    }

    /// Destroy every instance whose id is not in `reachable`. Returns the
    /// number destroyed.
    pub fn sweep(&mut self, reachable: &HashSet<ObjectId>) -> usize {
        let before = self.objects.len();
        self.objects.retain(|id, _| reachable.contains(id));
        before - self.objects.len()
    }

    /// Write a dense 1-based index for every instance, in insertion order,
    /// into `table`. Returns the number of instances indexed.
    pub fn assign_indices(&self, table: &mut IndexTable) -> usize {
        for (position, id) in self.objects.keys().enumerate() {
            table.insert(*id, self.tag, position as u32 + 1);
        }
        self.objects.len()
    }

    /// Destroy every instance.
    pub fn purge(&mut self) {
        self.objects.clear();
    }

    /// Look up an instance by identity.
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.objects.get(&id)
    }

    /// Look up an instance by identity, mutably.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects.get_mut(&id)
    }

    /// Instance at 0-based insertion position `position`.
    pub fn get_index(&self, position: usize) -> Option<&T> {
        self.objects.get_index(position).map(|(_, v)| v)
    }

    /// Whether `id` is resident.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Live instances in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.objects.values()
    }

    /// References to every live instance, in insertion order.
    pub fn refs(&self) -> impl Iterator<Item = NodeRef> + '_ {
        let tag = self.tag;
        self.objects.keys().map(move |id| NodeRef::new(tag, *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Probe;
    use proptest::prelude::*;

    fn arena_with(ids: &[u64]) -> Arena<Probe> {
        let mut arena = Arena::new(TypeTag(1));
        for &id in ids {
            arena.make(ObjectId(id));
        }
        arena
    }

    #[test]
    fn make_sets_identity() {
        let mut arena: Arena<Probe> = Arena::new(TypeTag(1));
        let probe = arena.make(ObjectId(7));
        probe.value = 3;
        assert_eq!(probe.id(), ObjectId(7));
        assert_eq!(arena.get(ObjectId(7)).unwrap().value, 3);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn erase_reports_presence_and_keeps_order() {
        let mut arena = arena_with(&[1, 2, 3, 4]);
        assert!(arena.erase(ObjectId(2)));
        assert!(!arena.erase(ObjectId(2)));
        let ids: Vec<u64> = arena.iter().map(|p| p.id().0).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn sweep_keeps_only_reachable() {
        let mut arena = arena_with(&[1, 2, 3, 4, 5]);
        let reachable: HashSet<ObjectId> = [ObjectId(2), ObjectId(5)].into_iter().collect();
        assert_eq!(arena.sweep(&reachable), 3);
        let ids: Vec<u64> = arena.iter().map(|p| p.id().0).collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[test]
    fn indices_are_one_based_in_insertion_order() {
        let arena = arena_with(&[10, 4, 7]);
        let mut table = IndexTable::default();
        assert_eq!(arena.assign_indices(&mut table), 3);
        assert_eq!(table.get(ObjectId(10)), Some((TypeTag(1), 1)));
        assert_eq!(table.get(ObjectId(4)), Some((TypeTag(1), 2)));
        assert_eq!(table.get(ObjectId(7)), Some((TypeTag(1), 3)));
    }

    #[test]
    fn duplicate_copies_fields_under_new_id() {
        let mut arena: Arena<Probe> = Arena::new(TypeTag(1));
        arena.make(ObjectId(1)).value = 42;
        let copy = arena.duplicate(ObjectId(1), ObjectId(2)).unwrap();
        assert_eq!(copy.value, 42);
        assert_eq!(copy.id(), ObjectId(2));
        assert!(arena.duplicate(ObjectId(9), ObjectId(3)).is_none());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn purge_empties() {
        let mut arena = arena_with(&[1, 2]);
        arena.purge();
        assert!(arena.is_empty());
        assert!(!arena.contains(ObjectId(1)));
    }

    proptest! {
        #[test]
        fn assign_indices_is_repeatable(
            ids in proptest::collection::hash_set(1u64..10_000, 0..64),
            erase in proptest::collection::vec(1u64..10_000, 0..16),
        ) {
            let ids: Vec<u64> = ids.into_iter().collect();
            let mut arena = arena_with(&ids);
            for id in erase {
                arena.erase(ObjectId(id));
            }
            let mut first = IndexTable::default();
            let mut second = IndexTable::default();
            arena.assign_indices(&mut first);
            arena.assign_indices(&mut second);
            prop_assert_eq!(first.len(), arena.len());
            for probe in arena.iter() {
                prop_assert_eq!(first.get(probe.id()), second.get(probe.id()));
            }
        }
    }
}
