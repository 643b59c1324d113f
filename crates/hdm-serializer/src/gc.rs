//! Mark-and-sweep collection across every arena.
//!
//! Roots are the targets of registered handles. Marking follows owning
//! fields only: a peer or parent link never keeps its target alive. The
//! sweep runs each arena's filter with the reachable set.

use std::collections::HashSet;

use tracing::debug;

use hdm_arena::ArenaSet;
use hdm_core::{NodeRef, ObjectId};

use crate::serializer::Serializer;

impl<S: ArenaSet> Serializer<S> {
    /// Arm or disarm [`collect_garbage`](Self::collect_garbage).
    pub fn set_gc_enabled(&mut self, enabled: bool) {
        self.config.gc_enabled = enabled;
    }

    /// Whether collection is armed.
    pub fn gc_enabled(&self) -> bool {
        self.config.gc_enabled
    }

    /// Destroy every object not reachable from a root handle through owning
    /// links. Returns the number destroyed; always 0 while collection is
    /// disarmed.
    ///
    /// Handles whose target is swept are left dangling.
    pub fn collect_garbage(&mut self) -> usize {
        if !self.config.gc_enabled {
            return 0;
        }
        let reachable = self.mark();
        let mut swept = 0;
        self.arenas.for_each_mut(|arena| swept += arena.sweep(&reachable));
        debug!(reachable = reachable.len(), swept, "garbage collected");
        swept
    }

    /// Ids reachable from the root handles through owning links.
    pub fn reachable(&self) -> HashSet<ObjectId> {
        self.mark()
    }

    fn mark(&self) -> HashSet<ObjectId> {
        let mut reachable = HashSet::new();
        let mut worklist: Vec<NodeRef> = self.handles.values().copied().collect();
        while let Some(node) = worklist.pop() {
            let Some(record) = self.node(node) else {
                continue;
            };
            if !reachable.insert(node.id) {
                continue;
            }
            let fields = record.fields();
            for (desc, value) in record.descriptors().iter().zip(fields.iter()) {
                if desc.is_owning() {
                    worklist.extend_from_slice(value.targets());
                }
            }
        }
        reachable
    }
}
