//! Concrete node records.

use crate::classes::{Any, AtomicStmt, Expr, Instance, Process, Scope, SimpleExpr, Stmt};
use crate::sequences::{ExprVec, ModuleVec, NetVec, PackageVec, PortVec, ProcessVec, StmtVec};

record! {
    /// Root of an elaborated design.
    pub struct Design: "design" extends [Any] {
        /// Design name.
        name: symbol,
        /// Every module definition and top-level instance.
        all_modules: owns ModuleVec,
        /// Top-level instances, a view into the elaborated tree.
        top_modules: peers Module,
        /// Every package.
        all_packages: owns PackageVec,
    }

    /// A module instance.
    pub struct Module: "module" extends [Instance] {
        /// Instance name.
        name: symbol,
        /// Name of the instantiated definition.
        def_name: symbol,
        /// Hierarchical path.
        full_name: symbol,
        /// Whether this instance is a root of the hierarchy.
        top_module: bool,
        /// Default decay time; negative when unset.
        def_decay_time: int,
        /// Child instances.
        modules: owns ModuleVec,
        /// Ports.
        ports: owns PortVec,
        /// Nets declared in this scope.
        nets: owns NetVec,
        /// Initial and always blocks.
        processes: owns ProcessVec,
        /// The enclosing instance.
        instance: peer Instance,
        /// The enclosing module, if any.
        module: peer Module,
    }

    /// A package.
    pub struct Package: "package" extends [Instance] {
        /// Package name.
        name: symbol,
        /// Definition name.
        def_name: symbol,
        /// Whether the package is instantiated at the top.
        top: bool,
        /// Nets declared in the package.
        nets: owns NetVec,
    }

    /// A module port.
    pub struct Port: "port" extends [Any] {
        /// Port name.
        name: symbol,
        /// One of [`Port::INPUT`], [`Port::OUTPUT`], [`Port::INOUT`].
        direction: uint,
        /// Expression connected inside the module.
        low_conn: peer Expr,
        /// Expression connected at the instantiation site.
        high_conn: owns Expr,
    }

    /// A net.
    pub struct Net: "net" extends [SimpleExpr] {
        /// Net name.
        name: symbol,
        /// Hierarchical path.
        full_name: symbol,
        /// Net kind (wire, reg, logic...).
        net_type: uint,
        /// Whether the net is signed.
        signed: bool,
    }

    /// An `initial` block.
    pub struct Initial: "initial" extends [Process] {
        /// Body.
        stmt: owns Stmt,
    }

    /// An `always` block.
    pub struct Always: "always" extends [Process] {
        /// Always kind (always, always_comb, always_ff...).
        always_type: uint,
        /// Body.
        stmt: owns Stmt,
    }

    /// A named or unnamed `begin`/`end` block. Both a scope and a statement.
    pub struct Begin: "begin" extends [Scope, AtomicStmt] {
        /// Block label; the bad symbol when unnamed.
        name: symbol,
        /// Statements in order.
        stmts: owns StmtVec,
    }

    /// A procedural or continuous assignment.
    pub struct Assignment: "assignment" extends [AtomicStmt] {
        /// Operator (plain, compound...).
        op_type: uint,
        /// Blocking (`=`) rather than non-blocking (`<=`).
        blocking: bool,
        /// Target.
        lhs: owns Expr,
        /// Value.
        rhs: owns Expr,
    }

    /// A `#delay stmt`.
    pub struct DelayControl: "delay_control" extends [AtomicStmt] {
        /// Delay text.
        delay: symbol,
        /// Delayed statement.
        stmt: owns Stmt,
    }

    /// A name reference, bound to its declaration.
    pub struct RefObj: "ref_obj" extends [SimpleExpr] {
        /// Referenced name.
        name: symbol,
        /// Hierarchical path.
        full_name: symbol,
        /// The object the name resolved to.
        actual: peer Any,
    }

    /// A literal value.
    pub struct Constant: "constant" extends [Expr] {
        /// Literal text, e.g. `UINT:1`.
        value: symbol,
        /// Width in bits; -1 when unsized.
        size: int,
        /// Literal encoding.
        const_type: uint,
    }

    /// An operator applied to operands.
    pub struct Operation: "operation" extends [Expr] {
        /// Operator code.
        op_type: uint,
        /// Operands in order.
        operands: owns ExprVec,
    }
}

impl Port {
    /// Input direction.
    pub const INPUT: u32 = 1;
    /// Output direction.
    pub const OUTPUT: u32 = 2;
    /// Bidirectional.
    pub const INOUT: u32 = 3;
}
