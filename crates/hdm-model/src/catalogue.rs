//! Tag assignment and the generated arena set.
//!
//! Tags are part of the binary format: appending a type is compatible,
//! reordering is not.

use crate::nodes::{
    Always, Assignment, Begin, Constant, DelayControl, Design, Initial, Module, Net, Operation,
    Package, Port, RefObj,
};
use crate::sequences::{ExprVec, ModuleVec, NetVec, PackageVec, PortVec, ProcessVec, StmtVec};

catalogue! {
    /// One arena per concrete type, in Save/Restore block order.
    pub struct Arenas {
        1 => design: Design,
        2 => module: Module,
        3 => package: Package,
        4 => port: Port,
        5 => net: Net,
        6 => initial: Initial,
        7 => always: Always,
        8 => begin: Begin,
        9 => assignment: Assignment,
        10 => delay_control: DelayControl,
        11 => ref_obj: RefObj,
        12 => constant: Constant,
        13 => operation: Operation,
        14 => module_vec: ModuleVec,
        15 => package_vec: PackageVec,
        16 => port_vec: PortVec,
        17 => net_vec: NetVec,
        18 => process_vec: ProcessVec,
        19 => stmt_vec: StmtVec,
        20 => expr_vec: ExprVec,
    }
}
