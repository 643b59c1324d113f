//! Core types and traits for the hdm hardware design object graph.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace:
//!
//! - [`id`]: object identities, catalogue type tags and node references
//! - [`symbol`]: the interning [`SymbolTable`]
//! - [`rtti`]: compile-time class identities and safe casting
//! - [`field`]: the per-field schema model (owning vs. non-owning links)
//! - [`node`]: the [`Record`] contract every arena-resident value fulfils
//! - [`error`]: semantic error kinds reported through error callbacks

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod node;
pub mod rtti;
pub mod symbol;

pub use error::ErrorKind;
pub use field::{
    FieldDesc, FieldKind, FieldList, FieldListMut, FieldMut, FieldRef, LinkDesc, Ownership,
};
pub use id::{NodeRef, ObjectId, Span, TypeTag};
pub use node::{NodeHeader, Record, Schema};
pub use rtti::{is_a, ClassId, ClassSet, Identity, Typed};
pub use symbol::{SymbolId, SymbolTable, BAD_SYMBOL};
