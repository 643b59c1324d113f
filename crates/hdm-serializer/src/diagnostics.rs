//! Inspection helpers: per-type counts and object enumeration.

use indexmap::IndexMap;

use hdm_arena::ArenaSet;
use hdm_core::{NodeRef, TypeTag};

use crate::serializer::Serializer;

impl<S: ArenaSet> Serializer<S> {
    /// Live object count per type name, in catalogue order. Types with no
    /// live objects are included with a count of zero.
    pub fn object_stats(&self) -> IndexMap<&'static str, usize> {
        self.arenas
            .arenas()
            .map(|arena| (arena.type_name(), arena.len()))
            .collect()
    }

    /// Total number of live objects across every arena.
    pub fn live_count(&self) -> usize {
        self.arenas.live_count()
    }

    /// Number of live objects of the type stored under `tag`.
    pub fn count(&self, tag: TypeTag) -> usize {
        self.arena_of(tag).map_or(0, |arena| arena.len())
    }

    /// Every live object, grouped by type in catalogue order and by
    /// creation order within a type.
    pub fn all_objects(&self) -> Vec<NodeRef> {
        let mut out = Vec::with_capacity(self.live_count());
        for arena in self.arenas.arenas() {
            let tag = arena.tag();
            out.extend(arena.ids().into_iter().map(|id| NodeRef::new(tag, id)));
        }
        out
    }

    /// Type name registered for `tag`.
    pub fn type_name(&self, tag: TypeTag) -> Option<&'static str> {
        self.arenas.type_name(tag)
    }

    /// One line per non-empty type, `name: count`, for logs and debugging.
    pub fn stats_report(&self) -> String {
        self.object_stats()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| format!("{name}: {count}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::Serializer;
    use hdm_core::TypeTag;
    use hdm_model::{Arenas, Design, Module};

    #[test]
    fn stats_cover_every_type() {
        let mut ser = Serializer::<Arenas>::new();
        ser.make::<Design>();
        ser.make::<Module>();
        ser.make::<Module>();
        let stats = ser.object_stats();
        assert_eq!(stats.len(), 20);
        assert_eq!(stats["design"], 1);
        assert_eq!(stats["module"], 2);
        assert_eq!(stats["net"], 0);
        assert_eq!(stats.get_index(0).map(|(k, _)| *k), Some("design"));
        assert_eq!(ser.stats_report(), "design: 1\nmodule: 2\n");
    }

    #[test]
    fn all_objects_groups_by_type() {
        let mut ser = Serializer::<Arenas>::new();
        let m1 = ser.make::<Module>().raw();
        let d = ser.make::<Design>().raw();
        let m2 = ser.make::<Module>().raw();
        assert_eq!(ser.all_objects(), vec![d, m1, m2]);
        assert_eq!(ser.live_count(), 3);
        assert_eq!(ser.count(TypeTag(2)), 2);
        assert_eq!(ser.type_name(TypeTag(2)), Some("module"));
        assert_eq!(ser.type_name(TypeTag(99)), None);
    }
}
