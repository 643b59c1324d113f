//! Structural comparison of two object graphs.
//!
//! Two nodes are equal when they have the same concrete type and every
//! structural field is equal: scalars by value, symbols by text, linked
//! nodes recursively. The parent link and the source span are not
//! structural. Identities and arena positions never matter, so graphs from
//! different sessions compare equal.
//!
//! Peer links are followed like owned ones. Each (left, right) pair is
//! compared at most once per context, which bounds the walk on cyclic
//! graphs.

use std::cmp::Ordering;
use std::collections::HashSet;

use hdm_arena::ArenaSet;
use hdm_core::{FieldRef, NodeRef, ObjectId};

use crate::serializer::Serializer;

/// The first pair of nodes found to differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// Node on the left-hand side.
    pub lhs: NodeRef,
    /// Node on the right-hand side.
    pub rhs: NodeRef,
    /// Field at which they diverged; `None` when the nodes differ in type
    /// or residency.
    pub field: Option<&'static str>,
}

/// State of one comparison.
#[derive(Debug, Default)]
pub struct CompareContext {
    visited: HashSet<(ObjectId, ObjectId)>,
    mismatch: Option<Mismatch>,
}

impl CompareContext {
    /// A fresh context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The innermost mismatch found, if any.
    pub fn mismatch(&self) -> Option<Mismatch> {
        self.mismatch
    }

    fn record(&mut self, lhs: NodeRef, rhs: NodeRef, field: Option<&'static str>) {
        if self.mismatch.is_none() {
            self.mismatch = Some(Mismatch { lhs, rhs, field });
        }
    }
}

impl<S: ArenaSet> Serializer<S> {
    /// Compare `lhs` in this session with `rhs` in `other`.
    ///
    /// Returns [`Ordering::Equal`] when the graphs reachable through
    /// structural fields are equal. Otherwise the ordering of the first
    /// differing value decides, and the pair is recorded in `ctx`.
    pub fn compare(
        &self,
        lhs: NodeRef,
        other: &Serializer<S>,
        rhs: NodeRef,
        ctx: &mut CompareContext,
    ) -> Ordering {
        if !ctx.visited.insert((lhs.id, rhs.id)) {
            return Ordering::Equal;
        }
        let (left, right) = match (self.node(lhs), other.node(rhs)) {
            (Some(left), Some(right)) => (left, right),
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => {
                ctx.record(lhs, rhs, None);
                return Ordering::Less;
            }
            (Some(_), None) => {
                ctx.record(lhs, rhs, None);
                return Ordering::Greater;
            }
        };
        let by_type = lhs.tag.cmp(&rhs.tag);
        if by_type != Ordering::Equal {
            ctx.record(lhs, rhs, None);
            return by_type;
        }

        let left_fields = left.fields();
        let right_fields = right.fields();
        for ((desc, a), b) in left
            .descriptors()
            .iter()
            .zip(left_fields.iter())
            .zip(right_fields.iter())
        {
            if !desc.structural {
                continue;
            }
            let order = match (a, b) {
                (FieldRef::Bool(a), FieldRef::Bool(b)) => a.cmp(b),
                (FieldRef::Int(a), FieldRef::Int(b)) => a.cmp(b),
                (FieldRef::UInt(a), FieldRef::UInt(b)) => a.cmp(b),
                (FieldRef::Symbol(a), FieldRef::Symbol(b)) => {
                    self.symbols.name(*a).cmp(other.symbols.name(*b))
                }
                (FieldRef::Link(a), FieldRef::Link(b)) => match (a, b) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (Some(a), Some(b)) => self.compare(*a, other, *b, ctx),
                },
                (FieldRef::Refs(a), FieldRef::Refs(b)) => {
                    a.len().cmp(&b.len()).then_with(|| {
                        a.iter()
                            .zip(b.iter())
                            .map(|(a, b)| self.compare(*a, other, *b, ctx))
                            .find(|order| order.is_ne())
                            .unwrap_or(Ordering::Equal)
                    })
                }
                _ => Ordering::Equal,
            };
            if order.is_ne() {
                ctx.record(lhs, rhs, Some(desc.name));
                return order;
            }
        }
        Ordering::Equal
    }

    /// Compare two nodes of this session.
    pub fn compare_within(&self, lhs: NodeRef, rhs: NodeRef, ctx: &mut CompareContext) -> Ordering {
        self.compare(lhs, self, rhs, ctx)
    }
}
