//! Owning sequences. Each is an arena-resident record whose single
//! persisted field is its ordered element list; the elements themselves
//! live in their own arenas.

use crate::classes::{Expr, Process, Stmt};
use crate::nodes::{Module, Net, Package, Port};

sequence! {
    /// Owned module instances.
    pub struct ModuleVec: "module_vec" of Module;

    /// Owned packages.
    pub struct PackageVec: "package_vec" of Package;

    /// Owned ports.
    pub struct PortVec: "port_vec" of Port;

    /// Owned nets.
    pub struct NetVec: "net_vec" of Net;

    /// Owned processes.
    pub struct ProcessVec: "process_vec" of Process;

    /// Owned statements.
    pub struct StmtVec: "stmt_vec" of Stmt;

    /// Owned expressions.
    pub struct ExprVec: "expr_vec" of Expr;
}
