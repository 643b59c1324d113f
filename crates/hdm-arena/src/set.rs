//! The catalogue of arenas: one per concrete type, in declared order.

use hdm_core::{ClassSet, Schema, TypeTag};

use crate::arena::Arena;
use crate::erased::ErasedArena;

/// A fixed catalogue of arenas.
///
/// `TAGS` lists every concrete type's tag in declared order; that order is
/// the Save/Restore block order. Implementations are generated by the model
/// crate's `catalogue!` declaration.
pub trait ArenaSet: Default + 'static {
    /// Every tag in declared order.
    const TAGS: &'static [TypeTag];

    /// The arena for `tag`, if it belongs to this catalogue.
    fn arena(&self, tag: TypeTag) -> Option<&dyn ErasedArena>;

    /// The arena for `tag`, mutably.
    fn arena_mut(&mut self, tag: TypeTag) -> Option<&mut dyn ErasedArena>;

    /// Every arena in declared order.
    fn arenas(&self) -> impl Iterator<Item = &dyn ErasedArena> + '_ {
        Self::TAGS.iter().filter_map(move |tag| self.arena(*tag))
    }

    /// Apply `f` to every arena in declared order.
    fn for_each_mut(&mut self, mut f: impl FnMut(&mut dyn ErasedArena)) {
        for tag in Self::TAGS {
            if let Some(arena) = self.arena_mut(*tag) {
                f(arena);
            }
        }
    }

    /// Class name of the type stored under `tag`.
    fn type_name(&self, tag: TypeTag) -> Option<&'static str> {
        self.arena(tag).map(|a| a.type_name())
    }

    /// Ancestry of the type stored under `tag`.
    fn ancestry(&self, tag: TypeTag) -> Option<&'static ClassSet> {
        self.arena(tag).map(|a| a.ancestry())
    }

    /// Total live instances across the catalogue.
    fn live_count(&self) -> usize {
        self.arenas().map(|a| a.len()).sum()
    }

    /// Destroy every instance in every arena.
    fn purge_all(&mut self) {
        self.for_each_mut(|arena| arena.purge());
    }
}

/// Typed access to the arena holding `Self` inside catalogue `S`.
pub trait Stored<S: ArenaSet>: Schema {
    /// Catalogue tag of `Self`.
    const TAG: TypeTag;

    /// The arena for `Self`.
    fn arena(set: &S) -> &Arena<Self>;

    /// The arena for `Self`, mutably.
    fn arena_mut(set: &mut S) -> &mut Arena<Self>;
}
