//! Compile-time class identities and safe casting.
//!
//! Every class in the catalogue (abstract or concrete) has a [`ClassId`]
//! computed at compile time from its name and the ids of its declared bases,
//! and a [`ClassSet`] listing itself plus every ancestor. Multiple and
//! diamond composition are supported: a class with two bases gets the union
//! of both ancestries, deduplicated.
//!
//! A cast to class `U` succeeds iff the object's ancestry contains
//! `U::CLASS_ID`. The check scans at most [`MAX_DEPTH`] ids and never
//! depends on the size of the catalogue.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::id::{NodeRef, ObjectId, TypeTag};

const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Maximum number of classes in one ancestry (the class itself included).
pub const MAX_DEPTH: usize = 16;

/// Compile-time identity of a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Derive an id from the class name and its direct bases.
    ///
    /// FNV-1a over `"/" + name`, seeded with the XOR of the base ids (or the
    /// FNV offset basis for a root class), so equal names under different
    /// bases still get distinct ids.
    pub const fn derive(name: &str, bases: &[ClassId]) -> ClassId {
        let mut hash = if bases.is_empty() { FNV_OFFSET } else { 0 };
        let mut b = 0;
        while b < bases.len() {
            hash ^= bases[b].0;
            b += 1;
        }
        hash = (hash ^ b'/' as u32).wrapping_mul(FNV_PRIME);
        let bytes = name.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            hash = (hash ^ bytes[i] as u32).wrapping_mul(FNV_PRIME);
            i += 1;
        }
        ClassId(hash)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// A class plus all of its ancestors, most-derived first.
///
/// Built in `const` context by [`ClassSet::root`] and [`ClassSet::compose`].
#[derive(Clone, Copy)]
pub struct ClassSet {
    ids: [ClassId; MAX_DEPTH],
    len: usize,
}

impl ClassSet {
    /// Ancestry of a class without bases.
    pub const fn root(id: ClassId) -> Self {
        let mut ids = [ClassId(0); MAX_DEPTH];
        ids[0] = id;
        Self { ids, len: 1 }
    }

    /// Ancestry of `own` derived from every set in `bases`.
    ///
    /// Ids reachable through more than one base appear once.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if the union exceeds
    /// [`MAX_DEPTH`] classes.
    pub const fn compose(own: ClassId, bases: &[&ClassSet]) -> Self {
        let mut set = Self::root(own);
        let mut b = 0;
        while b < bases.len() {
            let base = bases[b];
            let mut i = 0;
            while i < base.len {
                set = set.with(base.ids[i]);
                i += 1;
            }
            b += 1;
        }
        set
    }

    const fn with(mut self, id: ClassId) -> Self {
        if self.contains(id) {
            return self;
        }
        assert!(self.len < MAX_DEPTH, "class ancestry exceeds MAX_DEPTH");
        self.ids[self.len] = id;
        self.len += 1;
        self
    }

    /// Whether `id` is this class or one of its ancestors.
    pub const fn contains(&self, id: ClassId) -> bool {
        let mut i = 0;
        while i < self.len {
            if self.ids[i].0 == id.0 {
                return true;
            }
            i += 1;
        }
        false
    }

    /// The most-derived class of this ancestry.
    pub const fn most_derived(&self) -> ClassId {
        self.ids[0]
    }

    /// Number of classes in the ancestry.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; every set contains at least its own class.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The ids, most-derived first.
    pub fn as_slice(&self) -> &[ClassId] {
        &self.ids[..self.len]
    }

    /// Iterate over the ids, most-derived first.
    pub fn iter(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.as_slice().iter().copied()
    }
}

impl PartialEq for ClassSet {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ClassSet {}

impl fmt::Debug for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Static identity of a class in the catalogue.
///
/// Implemented for concrete records and for the uninhabited marker types
/// standing in for abstract classes.
pub trait Identity: 'static {
    /// Class name as it appears in diagnostics.
    const NAME: &'static str;
    /// Identity of this class.
    const CLASS_ID: ClassId;
    /// This class and every ancestor.
    const ANCESTRY: ClassSet;
}

/// Whether a class with ancestry `set` may be viewed as `U`.
pub fn is_a<U: Identity>(set: &ClassSet) -> bool {
    set.contains(U::CLASS_ID)
}

/// A [`NodeRef`] statically known to point at a `T`.
///
/// `T` may be a concrete record or an abstract class. A `Typed` is only as
/// valid as the graph it was taken from: it does not keep its target alive.
pub struct Typed<T: ?Sized> {
    raw: NodeRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Typed<T> {
    /// Wrap a raw reference that the caller has already checked is a `T`.
    pub fn from_raw(raw: NodeRef) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// The untyped reference.
    pub fn raw(self) -> NodeRef {
        self.raw
    }

    /// Identity of the target.
    pub fn id(self) -> ObjectId {
        self.raw.id
    }

    /// Catalogue tag of the target's concrete type.
    pub fn tag(self) -> TypeTag {
        self.raw.tag
    }
}

impl<T: Identity> Typed<T> {
    /// View as an ancestor class. Rejected at compile time if `U` is not an
    /// ancestor of `T`.
    pub fn upcast<U: Identity>(self) -> Typed<U> {
        const {
            assert!(
                T::ANCESTRY.contains(U::CLASS_ID),
                "upcast target is not an ancestor"
            )
        };
        Typed::from_raw(self.raw)
    }
}

impl<T: ?Sized> Clone for Typed<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Typed<T> {}

impl<T: ?Sized> PartialEq for Typed<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: ?Sized> Eq for Typed<T> {}

impl<T: ?Sized> Hash for Typed<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Typed").field(&self.raw).finish()
    }
}

impl<T: ?Sized> From<Typed<T>> for NodeRef {
    fn from(t: Typed<T>) -> NodeRef {
        t.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    enum Base {}
    enum Left {}
    enum Right {}
    enum Diamond {}
    enum Other {}

    impl Identity for Base {
        const NAME: &'static str = "base";
        const CLASS_ID: ClassId = ClassId::derive("base", &[]);
        const ANCESTRY: ClassSet = ClassSet::root(Self::CLASS_ID);
    }
    impl Identity for Left {
        const NAME: &'static str = "left";
        const CLASS_ID: ClassId = ClassId::derive("left", &[Base::CLASS_ID]);
        const ANCESTRY: ClassSet = ClassSet::compose(Self::CLASS_ID, &[&Base::ANCESTRY]);
    }
    impl Identity for Right {
        const NAME: &'static str = "right";
        const CLASS_ID: ClassId = ClassId::derive("right", &[Base::CLASS_ID]);
        const ANCESTRY: ClassSet = ClassSet::compose(Self::CLASS_ID, &[&Base::ANCESTRY]);
    }
    impl Identity for Diamond {
        const NAME: &'static str = "diamond";
        const CLASS_ID: ClassId = ClassId::derive("diamond", &[Left::CLASS_ID, Right::CLASS_ID]);
        const ANCESTRY: ClassSet =
            ClassSet::compose(Self::CLASS_ID, &[&Left::ANCESTRY, &Right::ANCESTRY]);
    }
    impl Identity for Other {
        const NAME: &'static str = "other";
        const CLASS_ID: ClassId = ClassId::derive("other", &[]);
        const ANCESTRY: ClassSet = ClassSet::root(Self::CLASS_ID);
    }

    #[test]
    fn diamond_ancestry_is_deduplicated() {
        let set = Diamond::ANCESTRY;
        assert_eq!(set.len(), 4);
        assert_eq!(set.most_derived(), Diamond::CLASS_ID);
        assert!(is_a::<Left>(&set));
        assert!(is_a::<Right>(&set));
        assert!(is_a::<Base>(&set));
        assert!(!is_a::<Other>(&set));
    }

    #[test]
    fn bases_change_the_id() {
        assert_ne!(
            ClassId::derive("x", &[]),
            ClassId::derive("x", &[Base::CLASS_ID])
        );
    }

    #[test]
    fn upcast_keeps_the_reference() {
        let raw = NodeRef::new(TypeTag(2), ObjectId(9));
        let d: Typed<Diamond> = Typed::from_raw(raw);
        let b: Typed<Base> = d.upcast::<Left>().upcast::<Base>();
        assert_eq!(b.raw(), raw);
    }

    proptest! {
        #[test]
        fn derive_is_deterministic(name in "[a-z_]{1,24}") {
            prop_assert_eq!(ClassId::derive(&name, &[]), ClassId::derive(&name, &[]));
        }

        #[test]
        fn compose_contains_every_input(own in any::<u32>(), a in any::<u32>(), b in any::<u32>()) {
            let sa = ClassSet::root(ClassId(a));
            let sb = ClassSet::root(ClassId(b));
            let set = ClassSet::compose(ClassId(own), &[&sa, &sb]);
            prop_assert!(set.contains(ClassId(own)));
            prop_assert!(set.contains(ClassId(a)));
            prop_assert!(set.contains(ClassId(b)));
            prop_assert!(set.len() <= 3);
        }
    }
}
