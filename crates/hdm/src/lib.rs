//! hdm: an arena-backed object graph for elaborated hardware designs.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all hdm sub-crates. For most users, adding `hdm` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use hdm::prelude::*;
//!
//! let mut ser = Serializer::new();
//! let design = ser.make::<Design>();
//! let top = ser.make::<Module>();
//! let name = ser.make_name("top");
//! ser.get_mut(top).unwrap().name = name;
//! assert!(ser.push(design.raw(), "all_modules", top.raw()));
//! let root = ser.wrap(design);
//!
//! let bytes = ser.save_to_vec().unwrap();
//! let mut copy = Serializer::new();
//! let roots = copy.restore_from_slice(&bytes).unwrap();
//!
//! let mut ctx = CompareContext::new();
//! let order = ser.compare(root.target(), &copy, roots[0].target(), &mut ctx);
//! assert_eq!(order, std::cmp::Ordering::Equal);
//! assert_eq!(copy.object_stats()["module"], 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hdm-core` | IDs, symbols, class identity, field model |
//! | [`arena`] | `hdm-arena` | Per-type arenas and the type-erased arena view |
//! | [`model`] | `hdm-model` | The node catalogue |
//! | [`serializer`] | `hdm-serializer` | Save/restore, GC, clone, compare |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`hdm-core`).
pub use hdm_core as types;

/// Per-type arena storage (`hdm-arena`).
pub use hdm_arena as arena;

/// Node types, abstract classes and sequences (`hdm-model`).
///
/// [`model::Arenas`] is the catalogue every session stores its objects in.
pub use hdm_model as model;

/// Persistence and graph operations (`hdm-serializer`).
pub use hdm_serializer as serializer;

/// A serializer over the full node catalogue.
pub type Serializer = hdm_serializer::Serializer<hdm_model::Arenas>;

/// Common imports for typical hdm usage.
///
/// ```rust
/// use hdm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Serializer;

    // Core types and traits
    pub use hdm_core::{
        ErrorKind, Identity, NodeRef, ObjectId, Record, Span, SymbolId, SymbolTable, TypeTag,
        Typed,
    };

    // Node catalogue
    pub use hdm_model::{
        Always, Arenas, Assignment, Begin, Constant, DelayControl, Design, Initial, Module, Net,
        Operation, Package, Port, RefObj,
    };

    // Abstract classes
    pub use hdm_model::{Any, AtomicStmt, Expr, Instance, Process, Scope, SimpleExpr, Stmt};

    // Persistence and graph operations
    pub use hdm_serializer::{
        CloneContext, CompareContext, FormatError, Handle, PeerPolicy, SerializerConfig,
    };
}
