//! Deep clone through owning links.
//!
//! Every object reachable from the source through owning fields is
//! duplicated into its own arena, so the clone owns its subtree exclusively.
//! Peer links are either rebound to the corresponding clone or left on the
//! original graph, as chosen by the [`PeerPolicy`].

use std::collections::HashMap;

use hdm_arena::ArenaSet;
use hdm_core::{FieldKind, FieldMut, NodeRef, ObjectId, Ownership};

use crate::serializer::Serializer;

/// What to do with peer links that point into the cloned subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PeerPolicy {
    /// Redirect them to the clone of their target.
    #[default]
    Rebind,
    /// Keep them pointing at the original objects.
    KeepOriginal,
}

/// State of one clone operation: the policy and the original-to-clone map.
#[derive(Debug, Default)]
pub struct CloneContext {
    policy: PeerPolicy,
    map: HashMap<ObjectId, NodeRef>,
    created: Vec<NodeRef>,
}

impl CloneContext {
    /// A fresh context using `policy`.
    pub fn new(policy: PeerPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The peer policy.
    pub fn policy(&self) -> PeerPolicy {
        self.policy
    }

    /// The clone made for `original`, if any.
    pub fn clone_of(&self, original: NodeRef) -> Option<NodeRef> {
        self.map.get(&original.id).copied()
    }

    /// Every clone made so far, in creation order.
    pub fn created(&self) -> &[NodeRef] {
        &self.created
    }

    /// Number of objects cloned.
    pub fn len(&self) -> usize {
        self.created.len()
    }

    /// Whether nothing has been cloned.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

impl<S: ArenaSet> Serializer<S> {
    /// Clone `src` and its owned subtree, attaching the clone under
    /// `new_parent`. Returns `None` if `src` is not resident.
    ///
    /// Scalars and symbols are copied; the client-data slot is shared.
    /// Owned children whose target is no longer resident are dropped.
    pub fn deep_clone(
        &mut self,
        src: NodeRef,
        new_parent: Option<NodeRef>,
        ctx: &mut CloneContext,
    ) -> Option<NodeRef> {
        let root = self.clone_owned(src, new_parent, ctx)?;
        if ctx.policy == PeerPolicy::Rebind {
            self.rebind_peers(ctx);
        }
        Some(root)
    }

    fn clone_owned(
        &mut self,
        src: NodeRef,
        parent: Option<NodeRef>,
        ctx: &mut CloneContext,
    ) -> Option<NodeRef> {
        if let Some(done) = ctx.clone_of(src) {
            return Some(done);
        }
        if !self.contains(src) {
            return None;
        }
        let new_id = self.allocate_id();
        let record = self.arenas.arena_mut(src.tag)?.duplicate(src.id, new_id)?;
        record.header_mut().parent = parent;
        let owned: Vec<(usize, Vec<NodeRef>)> = record
            .descriptors()
            .iter()
            .zip(record.fields())
            .enumerate()
            .filter(|(_, (desc, _))| desc.is_owning())
            .map(|(slot, (_, value))| (slot, value.targets().to_vec()))
            .collect();

        let clone = NodeRef::new(src.tag, new_id);
        ctx.map.insert(src.id, clone);
        ctx.created.push(clone);

        for (slot, targets) in owned {
            let mut cloned = Vec::with_capacity(targets.len());
            for target in targets {
                let child_parent = self
                    .node(target)
                    .and_then(|child| child.header().parent)
                    .and_then(|original| ctx.clone_of(original))
                    .unwrap_or(clone);
                if let Some(child) = self.clone_owned(target, Some(child_parent), ctx) {
                    cloned.push(child);
                }
            }
            let Some(record) = self.node_mut(clone) else {
                continue;
            };
            match record.fields_mut().into_iter().nth(slot) {
                Some(FieldMut::Link(value)) => *value = cloned.first().copied(),
                Some(FieldMut::Refs(items)) => *items = cloned,
                _ => {}
            };
        }
        Some(clone)
    }

    fn rebind_peers(&mut self, ctx: &CloneContext) {
        for clone in &ctx.created {
            let Some(record) = self.node_mut(*clone) else {
                continue;
            };
            let descriptors = record.descriptors();
            for (desc, value) in descriptors.iter().zip(record.fields_mut()) {
                let peer = matches!(
                    desc.kind,
                    FieldKind::Link(link) | FieldKind::Refs(link)
                        if link.ownership == Ownership::Peer
                );
                if !peer {
                    continue;
                }
                match value {
                    FieldMut::Link(Some(target)) => {
                        if let Some(mapped) = ctx.clone_of(*target) {
                            *target = mapped;
                        }
                    }
                    FieldMut::Refs(items) => {
                        for target in items.iter_mut() {
                            if let Some(mapped) = ctx.clone_of(*target) {
                                *target = mapped;
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdm_model::{Arenas, Assignment, Constant, Module, ModuleVec, RefObj};

    fn module_tree(ser: &mut Serializer<Arenas>) -> (NodeRef, NodeRef, NodeRef) {
        let top = ser.make::<Module>().raw();
        let a = ser.make::<Module>().raw();
        let b = ser.make::<Module>().raw();
        ser.push(top, "modules", a);
        ser.push(top, "modules", b);
        let name = ser.make_name("top");
        ser.downcast_mut::<Module>(top).unwrap().name = name;
        (top, a, b)
    }

    #[test]
    fn clone_duplicates_owned_subtree() {
        let mut ser = Serializer::<Arenas>::new();
        let (top, a, _) = module_tree(&mut ser);
        let mut ctx = CloneContext::default();
        let copy = ser.deep_clone(top, None, &mut ctx).unwrap();

        assert_ne!(copy, top);
        assert_eq!(ctx.len(), 4);
        assert_eq!(ser.object_stats()["module"], 6);
        assert_eq!(ser.object_stats()["module_vec"], 2);

        let copied = ser.downcast::<Module>(copy).unwrap();
        assert_eq!(ser.name(copied.name), "top");
        let seq = copied.modules.unwrap();
        let items = &ser.downcast::<ModuleVec>(seq).unwrap().items;
        assert_eq!(items.len(), 2);
        assert_ne!(items[0], a);
        assert_eq!(Some(items[0]), ctx.clone_of(a));
        assert_eq!(ser.node(items[0]).unwrap().header().parent, Some(copy));
        assert_eq!(ser.node(seq).unwrap().header().parent, Some(copy));
    }

    #[test]
    fn new_parent_is_attached() {
        let mut ser = Serializer::<Arenas>::new();
        let assign = ser.make::<Assignment>().raw();
        let value = ser.make::<Constant>().raw();
        let holder = ser.make::<Assignment>().raw();
        ser.set_link(assign, "rhs", Some(value));
        let mut ctx = CloneContext::default();
        let copy = ser.deep_clone(value, Some(holder), &mut ctx).unwrap();
        assert_eq!(ser.node(copy).unwrap().header().parent, Some(holder));
    }

    #[test]
    fn peer_policy_controls_rebinding() {
        let mut ser = Serializer::<Arenas>::new();
        let assign = ser.make::<Assignment>().raw();
        let lhs = ser.make::<RefObj>().raw();
        let rhs = ser.make::<Constant>().raw();
        ser.set_link(assign, "lhs", Some(lhs));
        ser.set_link(assign, "rhs", Some(rhs));
        ser.set_link(lhs, "actual", Some(rhs));

        let mut rebind = CloneContext::new(PeerPolicy::Rebind);
        let copy = ser.deep_clone(assign, None, &mut rebind).unwrap();
        let new_lhs = ser.downcast::<Assignment>(copy).unwrap().lhs.unwrap();
        let actual = ser.downcast::<RefObj>(new_lhs).unwrap().actual;
        assert_eq!(actual, rebind.clone_of(rhs));

        let mut keep = CloneContext::new(PeerPolicy::KeepOriginal);
        let copy = ser.deep_clone(assign, None, &mut keep).unwrap();
        let new_lhs = ser.downcast::<Assignment>(copy).unwrap().lhs.unwrap();
        assert_eq!(ser.downcast::<RefObj>(new_lhs).unwrap().actual, Some(rhs));
    }

    #[test]
    fn missing_source_clones_nothing() {
        let mut ser = Serializer::<Arenas>::new();
        let gone = ser.make::<Module>().raw();
        ser.erase(gone);
        let mut ctx = CloneContext::default();
        assert!(ser.deep_clone(gone, None, &mut ctx).is_none());
        assert!(ctx.is_empty());
    }
}
