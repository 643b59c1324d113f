//! Declarative schema generator.
//!
//! `abstract_class!` declares an uninhabited marker carrying a class
//! identity. `record!` declares a concrete node: the struct, its
//! [`Identity`](hdm_core::Identity), [`Schema`](hdm_core::Schema) and
//! [`Record`](hdm_core::Record) impls, and typed getters for link fields.
//! `sequence!` declares an owning container type. `catalogue!` ties the
//! concrete types to tags and generates the arena set.
//!
//! Field kinds accepted by `record!`:
//!
//! | kind         | Rust type         | persisted as          |
//! |--------------|-------------------|-----------------------|
//! | `symbol`     | `SymbolId`        | symbol id             |
//! | `bool`       | `bool`            | byte                  |
//! | `int`        | `i64`             | 8 bytes               |
//! | `uint`       | `u32`             | 4 bytes               |
//! | `owns T`     | `Option<NodeRef>` | owning link           |
//! | `peer T`     | `Option<NodeRef>` | non-owning link       |
//! | `peers T`    | `Vec<NodeRef>`    | non-owning sequence   |

macro_rules! field_ty {
    (symbol) => { hdm_core::SymbolId };
    (bool) => { bool };
    (int) => { i64 };
    (uint) => { u32 };
    (owns $t:ident) => { Option<hdm_core::NodeRef> };
    (peer $t:ident) => { Option<hdm_core::NodeRef> };
    (peers $t:ident) => { Vec<hdm_core::NodeRef> };
}

macro_rules! field_desc {
    ($f:ident; symbol) => {
        hdm_core::FieldDesc::scalar(stringify!($f), hdm_core::FieldKind::Symbol)
    };
    ($f:ident; bool) => {
        hdm_core::FieldDesc::scalar(stringify!($f), hdm_core::FieldKind::Bool)
    };
    ($f:ident; int) => {
        hdm_core::FieldDesc::scalar(stringify!($f), hdm_core::FieldKind::Int)
    };
    ($f:ident; uint) => {
        hdm_core::FieldDesc::scalar(stringify!($f), hdm_core::FieldKind::UInt)
    };
    ($f:ident; owns $t:ident) => {
        hdm_core::FieldDesc::link(
            stringify!($f),
            hdm_core::Ownership::Owning,
            <$t as hdm_core::Identity>::CLASS_ID,
            <$t as hdm_core::Identity>::NAME,
        )
    };
    ($f:ident; peer $t:ident) => {
        hdm_core::FieldDesc::link(
            stringify!($f),
            hdm_core::Ownership::Peer,
            <$t as hdm_core::Identity>::CLASS_ID,
            <$t as hdm_core::Identity>::NAME,
        )
    };
    ($f:ident; peers $t:ident) => {
        hdm_core::FieldDesc::refs(
            stringify!($f),
            hdm_core::Ownership::Peer,
            <$t as hdm_core::Identity>::CLASS_ID,
            <$t as hdm_core::Identity>::NAME,
        )
    };
}

macro_rules! field_ref {
    ($v:expr; symbol) => { hdm_core::FieldRef::Symbol($v) };
    ($v:expr; bool) => { hdm_core::FieldRef::Bool($v) };
    ($v:expr; int) => { hdm_core::FieldRef::Int($v) };
    ($v:expr; uint) => { hdm_core::FieldRef::UInt($v) };
    ($v:expr; owns $t:ident) => { hdm_core::FieldRef::Link($v) };
    ($v:expr; peer $t:ident) => { hdm_core::FieldRef::Link($v) };
    ($v:expr; peers $t:ident) => { hdm_core::FieldRef::Refs(&$v) };
}

macro_rules! field_mut {
    ($v:expr; symbol) => { hdm_core::FieldMut::Symbol(&mut $v) };
    ($v:expr; bool) => { hdm_core::FieldMut::Bool(&mut $v) };
    ($v:expr; int) => { hdm_core::FieldMut::Int(&mut $v) };
    ($v:expr; uint) => { hdm_core::FieldMut::UInt(&mut $v) };
    ($v:expr; owns $t:ident) => { hdm_core::FieldMut::Link(&mut $v) };
    ($v:expr; peer $t:ident) => { hdm_core::FieldMut::Link(&mut $v) };
    ($v:expr; peers $t:ident) => { hdm_core::FieldMut::Refs(&mut $v) };
}

macro_rules! link_getter {
    ($(#[$m:meta])* $f:ident: owns $t:ident) => {
        $(#[$m])*
        pub fn $f(&self) -> Option<hdm_core::Typed<$t>> {
            self.$f.map(hdm_core::Typed::from_raw)
        }
    };
    ($(#[$m:meta])* $f:ident: peer $t:ident) => {
        $(#[$m])*
        pub fn $f(&self) -> Option<hdm_core::Typed<$t>> {
            self.$f.map(hdm_core::Typed::from_raw)
        }
    };
    ($(#[$m:meta])* $f:ident: peers $t:ident) => {
        $(#[$m])*
        pub fn $f(&self) -> impl Iterator<Item = hdm_core::Typed<$t>> + '_ {
            self.$f.iter().copied().map(hdm_core::Typed::from_raw)
        }
    };
    ($(#[$m:meta])* $f:ident: $k:ident) => {};
}

macro_rules! identity {
    ($name:ident, $label:literal, [$($base:ident),*]) => {
        impl hdm_core::Identity for $name {
            const NAME: &'static str = $label;
            const CLASS_ID: hdm_core::ClassId =
                hdm_core::ClassId::derive($label, &[$(<$base as hdm_core::Identity>::CLASS_ID),*]);
            const ANCESTRY: hdm_core::ClassSet = hdm_core::ClassSet::compose(
                <$name as hdm_core::Identity>::CLASS_ID,
                &[$(&<$base as hdm_core::Identity>::ANCESTRY),*],
            );
        }
    };
}

/// Declare abstract classes as uninhabited markers.
macro_rules! abstract_class {
    ($(
        $(#[$meta:meta])*
        pub enum $name:ident: $label:literal $(extends [$($base:ident),*])?;
    )*) => {$(
        $(#[$meta])*
        #[derive(Debug)]
        pub enum $name {}

        identity!($name, $label, [$($($base),*)?]);
    )*};
}

macro_rules! record_impl {
    ($name:ident { $($fname:ident: $kind:ident $($target:ident)?),* }) => {
        impl hdm_core::Schema for $name {
            const LAYOUT: &'static [hdm_core::FieldDesc] = &[
                hdm_core::NodeHeader::PARENT,
                hdm_core::NodeHeader::FILE,
                hdm_core::NodeHeader::LINE,
                hdm_core::NodeHeader::COLUMN,
                hdm_core::NodeHeader::END_LINE,
                hdm_core::NodeHeader::END_COLUMN,
                $(field_desc!($fname; $kind $($target)?),)*
            ];
            const CLASSES: &'static hdm_core::ClassSet =
                &<$name as hdm_core::Identity>::ANCESTRY;
        }

        impl hdm_core::Record for $name {
            fn class_name(&self) -> &'static str {
                <$name as hdm_core::Identity>::NAME
            }

            fn class_id(&self) -> hdm_core::ClassId {
                <$name as hdm_core::Identity>::CLASS_ID
            }

            fn ancestry(&self) -> &'static hdm_core::ClassSet {
                <$name as hdm_core::Schema>::CLASSES
            }

            fn descriptors(&self) -> &'static [hdm_core::FieldDesc] {
                <$name as hdm_core::Schema>::LAYOUT
            }

            fn fields(&self) -> hdm_core::FieldList<'_> {
                let mut out = hdm_core::FieldList::new();
                self.header.push_fields(&mut out);
                $(out.push(field_ref!(self.$fname; $kind $($target)?));)*
                out
            }

            fn fields_mut(&mut self) -> hdm_core::FieldListMut<'_> {
                let mut out = hdm_core::FieldListMut::new();
                self.header.push_fields_mut(&mut out);
                $(out.push(field_mut!(self.$fname; $kind $($target)?));)*
                out
            }

            fn header(&self) -> &hdm_core::NodeHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut hdm_core::NodeHeader {
                &mut self.header
            }
        }
    };
}

/// Declare concrete node types.
macro_rules! record {
    ($(
        $(#[$meta:meta])*
        pub struct $name:ident: $label:literal extends [$($base:ident),*] {
            $(
                $(#[$fmeta:meta])*
                $fname:ident: $kind:ident $($target:ident)?
            ),* $(,)?
        }
    )*) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $name {
            /// Identity, parent and source span.
            pub header: hdm_core::NodeHeader,
            $(
                $(#[$fmeta])*
                pub $fname: field_ty!($kind $($target)?),
            )*
        }

        impl $name {
            $(link_getter! { $(#[$fmeta])* $fname: $kind $($target)? })*
        }

        identity!($name, $label, [$($base),*]);
        record_impl!($name { $($fname: $kind $($target)?),* });
    )*};
}

/// Declare owning container types.
macro_rules! sequence {
    ($(
        $(#[$meta:meta])*
        pub struct $name:ident: $label:literal of $elem:ident;
    )*) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $name {
            /// Identity and parent. The span is unused.
            pub header: hdm_core::NodeHeader,
            /// Element references, in order.
            pub items: Vec<hdm_core::NodeRef>,
        }

        impl $name {
            /// Typed view of the elements.
            pub fn iter(&self) -> impl Iterator<Item = hdm_core::Typed<$elem>> + '_ {
                self.items.iter().copied().map(hdm_core::Typed::from_raw)
            }

            /// Element at `index`.
            pub fn get(&self, index: usize) -> Option<hdm_core::Typed<$elem>> {
                self.items.get(index).copied().map(hdm_core::Typed::from_raw)
            }

            /// Number of elements.
            pub fn len(&self) -> usize {
                self.items.len()
            }

            /// Whether the sequence is empty.
            pub fn is_empty(&self) -> bool {
                self.items.is_empty()
            }
        }

        identity!($name, $label, []);

        impl hdm_core::Schema for $name {
            const LAYOUT: &'static [hdm_core::FieldDesc] = &[
                hdm_core::NodeHeader::PARENT,
                hdm_core::NodeHeader::FILE,
                hdm_core::NodeHeader::LINE,
                hdm_core::NodeHeader::COLUMN,
                hdm_core::NodeHeader::END_LINE,
                hdm_core::NodeHeader::END_COLUMN,
                hdm_core::FieldDesc::refs(
                    "items",
                    hdm_core::Ownership::Owning,
                    <$elem as hdm_core::Identity>::CLASS_ID,
                    <$elem as hdm_core::Identity>::NAME,
                ),
            ];
            const CLASSES: &'static hdm_core::ClassSet =
                &<$name as hdm_core::Identity>::ANCESTRY;
        }

        impl hdm_core::Record for $name {
            fn class_name(&self) -> &'static str {
                <$name as hdm_core::Identity>::NAME
            }

            fn class_id(&self) -> hdm_core::ClassId {
                <$name as hdm_core::Identity>::CLASS_ID
            }

            fn ancestry(&self) -> &'static hdm_core::ClassSet {
                <$name as hdm_core::Schema>::CLASSES
            }

            fn descriptors(&self) -> &'static [hdm_core::FieldDesc] {
                <$name as hdm_core::Schema>::LAYOUT
            }

            fn fields(&self) -> hdm_core::FieldList<'_> {
                let mut out = hdm_core::FieldList::new();
                self.header.push_fields(&mut out);
                out.push(hdm_core::FieldRef::Refs(&self.items));
                out
            }

            fn fields_mut(&mut self) -> hdm_core::FieldListMut<'_> {
                let mut out = hdm_core::FieldListMut::new();
                self.header.push_fields_mut(&mut out);
                out.push(hdm_core::FieldMut::Refs(&mut self.items));
                out
            }

            fn header(&self) -> &hdm_core::NodeHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut hdm_core::NodeHeader {
                &mut self.header
            }
        }
    )*};
}

/// Assign tags to concrete types and generate the arena set.
macro_rules! catalogue {
    (
        $(#[$meta:meta])*
        pub struct $set:ident {
            $($tag:literal => $field:ident: $ty:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $set {
            $(
                #[doc = concat!("Every live `", stringify!($ty), "`.")]
                pub $field: hdm_arena::Arena<$ty>,
            )*
        }

        impl Default for $set {
            fn default() -> Self {
                Self {
                    $($field: hdm_arena::Arena::new(hdm_core::TypeTag($tag)),)*
                }
            }
        }

        impl hdm_arena::ArenaSet for $set {
            const TAGS: &'static [hdm_core::TypeTag] = &[$(hdm_core::TypeTag($tag)),*];

            fn arena(&self, tag: hdm_core::TypeTag) -> Option<&dyn hdm_arena::ErasedArena> {
                match tag.0 {
                    $($tag => Some(&self.$field as &dyn hdm_arena::ErasedArena),)*
                    _ => None,
                }
            }

            fn arena_mut(
                &mut self,
                tag: hdm_core::TypeTag,
            ) -> Option<&mut dyn hdm_arena::ErasedArena> {
                match tag.0 {
                    $($tag => Some(&mut self.$field as &mut dyn hdm_arena::ErasedArena),)*
                    _ => None,
                }
            }
        }

        $(
            impl hdm_arena::Stored<$set> for $ty {
                const TAG: hdm_core::TypeTag = hdm_core::TypeTag($tag);

                fn arena(set: &$set) -> &hdm_arena::Arena<Self> {
                    &set.$field
                }

                fn arena_mut(set: &mut $set) -> &mut hdm_arena::Arena<Self> {
                    &mut set.$field
                }
            }
        )*
    };
}
