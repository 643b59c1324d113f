//! Node schemas and arena catalogue for the hdm object graph.
//!
//! The catalogue is fixed at compile time. Abstract classes ([`Any`],
//! [`Scope`], [`Instance`], [`Expr`], [`SimpleExpr`], [`Stmt`],
//! [`AtomicStmt`], [`Process`]) exist only as class identities; concrete
//! records and owning sequences live in the per-type arenas of [`Arenas`].
//!
//! ```text
//! Any
//! ├── Scope ── Instance ──┬── Module
//! │        \              └── Package
//! │         \
//! │          Begin (also AtomicStmt)
//! ├── Expr ─┬── SimpleExpr ─┬── Net
//! │         │               └── RefObj
//! │         ├── Constant
//! │         └── Operation
//! ├── Stmt ── AtomicStmt ─┬── Assignment
//! │                       ├── DelayControl
//! │                       └── Begin
//! ├── Process ─┬── Initial
//! │            └── Always
//! ├── Design
//! └── Port
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

pub mod catalogue;
pub mod classes;
pub mod nodes;
pub mod sequences;

pub use catalogue::Arenas;
pub use classes::{Any, AtomicStmt, Expr, Instance, Process, Scope, SimpleExpr, Stmt};
pub use nodes::{
    Always, Assignment, Begin, Constant, DelayControl, Design, Initial, Module, Net, Operation,
    Package, Port, RefObj,
};
pub use sequences::{ExprVec, ModuleVec, NetVec, PackageVec, PortVec, ProcessVec, StmtVec};
