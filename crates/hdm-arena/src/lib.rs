//! Per-type object arenas for the hdm object graph.
//!
//! Every concrete record type gets exactly one [`Arena`]. The arena owns all
//! live instances of that type, keyed by [`ObjectId`](hdm_core::ObjectId)
//! and kept in insertion order, which is what makes dense-index assignment
//! (and therefore Save output) deterministic.
//!
//! # Architecture
//!
//! ```text
//! ArenaSet (catalogue, one field per concrete type)
//! ├── Arena<Design>   ─┐
//! ├── Arena<Module>    ├─ each viewable as &dyn ErasedArena
//! ├── Arena<ModuleVec> ┘
//! └── ...
//! IndexTable (ObjectId → (TypeTag, dense index)), filled by assign_indices
//! ```
//!
//! Typed access goes through [`Stored`]; generic machinery (persistence,
//! collection, clone, compare) goes through [`ErasedArena`] and never names
//! a concrete type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod erased;
pub mod index;
pub mod set;

#[cfg(test)]
mod testing;

pub use arena::Arena;
pub use erased::ErasedArena;
pub use index::IndexTable;
pub use set::{ArenaSet, Stored};
