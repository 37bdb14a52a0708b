//! Composite behavior nodes.
//!
//! Composite nodes own an ordered list of children and decide which of them
//! run. This module provides the fixed selection policies: [`Sequence`]
//! (AND logic), [`Selector`] (OR logic) and [`RandomSelector`] (pick one).
//!
//! [`Sequence`]: CompositePolicy::Sequence
//! [`Selector`]: CompositePolicy::Selector
//! [`RandomSelector`]: CompositePolicy::RandomSelector

use rand::Rng;

use crate::arena::Arena;
use crate::{NodeId, NodeKind, Scope, Status};

/// Child-selection policy of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum CompositePolicy {
    /// Executes children in order until one fails.
    ///
    /// # Semantics
    ///
    /// - If a child returns `Failure`, the sequence **stops immediately** and returns `Failure`
    /// - If a child returns `Running`, the sequence returns `Running` and resumes at that child
    /// - If a child returns `Success`, the sequence **continues** to the next child
    /// - If all children return `Success` (or there are none), the sequence returns `Success`
    Sequence,

    /// Executes children in order until one succeeds.
    ///
    /// # Semantics
    ///
    /// - If a child returns `Success`, the selector **stops immediately** and returns `Success`
    /// - If a child returns `Running`, the selector returns `Running` and resumes at that child
    /// - If a child returns `Failure`, the selector **continues** to the next child
    /// - If all children return `Failure` (or there are none), the selector returns `Failure`
    Selector,

    /// Commits to one uniformly chosen child per run.
    ///
    /// The child index is drawn from the tree's random source when the run
    /// starts and kept until the run ends or is aborted. Every tick of the
    /// run is delegated to that child verbatim. With no children the node
    /// fails.
    RandomSelector,
}

impl CompositePolicy {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A node with an ordered list of owned children.
#[derive(Debug, Clone)]
pub struct Composite {
    policy: CompositePolicy,
    pub(crate) children: Vec<NodeId>,
    /// Child the current run is at (sequence/selector) or committed to (random).
    cursor: usize,
}

impl Composite {
    pub fn new(policy: CompositePolicy) -> Self {
        Self {
            policy,
            children: Vec::new(),
            cursor: 0,
        }
    }

    pub fn policy(&self) -> CompositePolicy {
        self.policy
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Child the current run delegates to, if any.
    pub fn current(&self) -> Option<NodeId> {
        self.children.get(self.cursor).copied()
    }

    pub(crate) fn fresh_copy(&self) -> Self {
        Self {
            policy: self.policy,
            children: self.children.clone(),
            cursor: 0,
        }
    }

    pub(crate) fn on_start<C: ?Sized, B>(&mut self, scope: &mut Scope<'_, C, B>) {
        self.cursor = match self.policy {
            CompositePolicy::RandomSelector if !self.children.is_empty() => {
                scope.rng().gen_range(0..self.children.len())
            }
            _ => 0,
        };
    }
}

impl<C: ?Sized, B> Arena<C, B> {
    pub(crate) fn update_composite(&mut self, id: NodeId, scope: &mut Scope<'_, C, B>) -> Status {
        let Some((policy, current)) = self.composite_mut(id).map(|c| (c.policy, c.current())) else {
            return Status::Failure;
        };

        match policy {
            CompositePolicy::Sequence => self.run_in_order(id, Status::Success, scope),
            CompositePolicy::Selector => self.run_in_order(id, Status::Failure, scope),
            CompositePolicy::RandomSelector => match current {
                Some(child) => self.tick(child, scope),
                None => Status::Failure,
            },
        }
    }

    /// Ticks children from the cursor on while they return `keep_going`.
    ///
    /// Any other status ends the tick; running children are resumed on the
    /// next tick because the cursor stays on them.
    fn run_in_order(
        &mut self,
        id: NodeId,
        keep_going: Status,
        scope: &mut Scope<'_, C, B>,
    ) -> Status {
        loop {
            let Some(child) = self.composite_mut(id).map(|c| c.current()) else {
                return Status::Failure;
            };
            let Some(child) = child else {
                return keep_going;
            };

            let status = self.tick(child, scope);
            if status != keep_going {
                return status;
            }

            if let Some(composite) = self.composite_mut(id) {
                composite.cursor += 1;
            }
        }
    }

    fn composite_mut(&mut self, id: NodeId) -> Option<&mut Composite> {
        match self.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Composite(composite)) => Some(composite),
            _ => None,
        }
    }
}
