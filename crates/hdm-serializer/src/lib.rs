//! Persistence engine for the hdm object graph.
//!
//! A [`Serializer`] owns one catalogue of arenas, the session's symbol
//! table, the registry of external handles and the error callback. On top
//! of that it implements Save, Restore, garbage collection, deep clone and
//! structural compare, all written against the type-erased record model
//! so they work for any catalogue.
//!
//! # Architecture
//!
//! - [`Serializer`]: construction, validated linking, handles, diagnostics
//! - [`save`](Serializer::save) / [`restore`](Serializer::restore): the
//!   binary format below, over files or any `Write`/`Read`
//! - [`collect_garbage`](Serializer::collect_garbage): mark through owning
//!   edges from the handle roots, sweep every arena
//! - [`deep_clone`](Serializer::deep_clone) and
//!   [`compare`](Serializer::compare): structural operations driven by each
//!   field's ownership
//!
//! # Format
//!
//! ```text
//! [MAGIC "HDMG"] [VERSION u8] [BLOCK COUNT u32]
//! per tag, in catalogue order:
//!   [TAG u16] [COUNT u32] [record fields × COUNT]
//! [SYMBOL COUNT u32] [len-prefixed UTF-8 × SYMBOL COUNT]
//! [ROOT COUNT u32] [(TAG u16, INDEX u32) × ROOT COUNT]
//! ```
//!
//! Field encodings: bool as one byte, int as i64, uint and symbol ids as
//! u32, a link as `(tag u16, index u32)` with `(0, 0)` for null, a sequence
//! as a u32 count followed by links. Indices are 1-based positions within
//! the target's arena. All integers are little-endian.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clone;
pub mod codec;
pub mod compare;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gc;
pub mod handle;
pub mod restore;
pub mod save;
pub mod serializer;

pub use clone::{CloneContext, PeerPolicy};
pub use compare::{CompareContext, Mismatch};
pub use config::{ConfigError, SerializerConfig};
pub use error::FormatError;
pub use handle::{Handle, HandleId};
pub use serializer::{default_error_handler, ErrorHandler, Serializer};

/// Magic bytes at the start of every saved graph.
pub const MAGIC: [u8; 4] = *b"HDMG";

/// Current binary format version.
///
/// History:
/// - v1: initial layout
pub const FORMAT_VERSION: u8 = 1;
