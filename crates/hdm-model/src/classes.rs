//! Abstract classes. Never instantiated; used as cast targets and as the
//! declared class of link fields.

abstract_class! {
    /// Root of every node class.
    pub enum Any: "any";

    /// A node introducing a naming scope.
    pub enum Scope: "scope" extends [Any];

    /// An instantiated design unit.
    pub enum Instance: "instance" extends [Scope];

    /// Any expression.
    pub enum Expr: "expr" extends [Any];

    /// An expression with no operands.
    pub enum SimpleExpr: "simple_expr" extends [Expr];

    /// Any statement.
    pub enum Stmt: "stmt" extends [Any];

    /// A statement that executes as a unit.
    pub enum AtomicStmt: "atomic_stmt" extends [Stmt];

    /// A procedural block.
    pub enum Process: "process" extends [Any];
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdm_core::{is_a, Identity};

    #[test]
    fn abstract_chain() {
        assert!(is_a::<Any>(&Instance::ANCESTRY));
        assert!(is_a::<Scope>(&Instance::ANCESTRY));
        assert!(!is_a::<Expr>(&Instance::ANCESTRY));
        assert_eq!(SimpleExpr::ANCESTRY.len(), 3);
    }

    #[test]
    fn class_ids_are_distinct() {
        let ids = [
            Any::CLASS_ID,
            Scope::CLASS_ID,
            Instance::CLASS_ID,
            Expr::CLASS_ID,
            SimpleExpr::CLASS_ID,
            Stmt::CLASS_ID,
            AtomicStmt::CLASS_ID,
            Process::CLASS_ID,
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
