//! External handles: non-owning, revocable references used by traversal
//! layers outside the ownership model.
//!
//! The serializer keeps a registry of live handles. Their targets are the
//! garbage-collection roots and the persisted root list. A handle never
//! keeps its target alive on its own once it has been released, and a
//! handle held across a purge (or across a collection that swept its
//! target) is dangling; resolving it simply fails.

use std::fmt;

use hdm_core::{NodeRef, ObjectId, TypeTag};

/// Registry key of a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// A loan on a node, plus an iteration cursor for external scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handle {
    id: HandleId,
    target: NodeRef,
    cursor: usize,
}

impl Handle {
    pub(crate) fn new(id: HandleId, target: NodeRef) -> Self {
        Self {
            id,
            target,
            cursor: 0,
        }
    }

    /// Registry key.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// The wrapped node.
    pub fn target(&self) -> NodeRef {
        self.target
    }

    /// Tag of the wrapped node.
    pub fn tag(&self) -> TypeTag {
        self.target.tag
    }

    /// Identity of the wrapped node.
    pub fn object(&self) -> ObjectId {
        self.target.id
    }

    /// Current iteration position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Return the current position and move to the next.
    pub fn advance(&mut self) -> usize {
        let at = self.cursor;
        self.cursor += 1;
        at
    }

    /// Rewind iteration.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
