//! Node storage and the per-node state machine.
//!
//! Nodes live in a flat arena and refer to their children by [`NodeId`].
//! Removed nodes leave an empty slot behind so ids stay stable while a tree
//! is being edited; instancing compacts the arena again.

use crate::node::MAX_NODES;
use crate::{Node, NodeId, NodeKind, Scope, Status};

pub(crate) struct Arena<C: ?Sized, B> {
    slots: Vec<Option<Node<C, B>>>,
}

impl<C: ?Sized, B> Arena<C, B> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Stores `node` in a new slot.
    ///
    /// A full arena drops the node and hands out an id that never resolves,
    /// so the parent fails when it ticks it. Authoring checks
    /// [`is_full`](Self::is_full) first and reports an error instead.
    pub(crate) fn insert(&mut self, node: Node<C, B>) -> NodeId {
        self.push(Some(node))
    }

    /// Reserves an id that resolves to no node.
    fn insert_vacant(&mut self) -> NodeId {
        self.push(None)
    }

    fn push(&mut self, slot: Option<Node<C, B>>) -> NodeId {
        match NodeId::from_index(self.slots.len()) {
            Some(id) => {
                self.slots.push(slot);
                id
            }
            None => {
                tracing::error!("node arena is full ({} slots), dropping node", MAX_NODES);
                NodeId::UNADDRESSABLE
            }
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.slots.len() >= MAX_NODES
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node<C, B>> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<C, B>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<C, B>> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => node.kind.children(),
            None => &[],
        }
    }

    /// Depth-first walk from `id`, parents before children, children in
    /// tick order. Vacant ids are skipped.
    pub(crate) fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut visited = Vec::new();
        let mut open = vec![id];
        while let Some(next) = open.pop() {
            let Some(node) = self.get(next) else {
                continue;
            };
            visited.push(next);
            open.extend(node.kind.children().iter().rev());
        }
        visited
    }

    /// Whether `ancestor` lies on the parent chain of `id`.
    pub(crate) fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.get(id).and_then(Node::parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.get(parent).and_then(Node::parent);
        }
        false
    }

    /// Deep-copies the subtree under `id` into `into`, remapping child ids
    /// to the slots allocated there. Dangling child ids stay dangling.
    pub(crate) fn clone_subtree(&self, id: NodeId, into: &mut Arena<C, B>) -> NodeId {
        let Some(node) = self.get(id) else {
            return into.insert_vacant();
        };

        let copy = into.insert(node.fresh_copy());
        let children: Vec<NodeId> = node
            .kind
            .children()
            .iter()
            .map(|&child| {
                let mapped = self.clone_subtree(child, into);
                if let Some(child) = into.get_mut(mapped) {
                    child.parent = Some(copy);
                }
                mapped
            })
            .collect();

        if let Some(copy) = into.get_mut(copy) {
            copy.kind.replace_children(children);
        }
        copy
    }

    /// Ticks one node through the state machine.
    ///
    /// 1. Start the node if it is not started yet.
    /// 2. Update it.
    /// 3. Stop it if the update returned a terminal status.
    pub(crate) fn tick(&mut self, id: NodeId, scope: &mut Scope<'_, C, B>) -> Status {
        let Some(started) = self.get(id).map(Node::is_started) else {
            tracing::warn!("node {} does not exist, reporting failure", id);
            return Status::Failure;
        };

        if !started {
            self.start(id, scope);
            self.set_started(id, true);
        }

        let status = self.update(id, scope);

        if status.is_terminal() {
            self.stop(id, scope);
            self.set_started(id, false);
        }

        if let Some(node) = self.get_mut(id) {
            node.result = Some(status);
            tracing::trace!("{} {} -> {}", node.kind.name(), id, status);
        }
        status
    }

    /// Stops `id` and every started node below it, without updating them.
    ///
    /// Nodes that are not started are left untouched.
    pub(crate) fn abort(&mut self, id: NodeId, scope: &mut Scope<'_, C, B>) {
        if !self.get(id).is_some_and(Node::is_started) {
            return;
        }

        self.stop(id, scope);
        if let Some(node) = self.get_mut(id) {
            node.started = false;
            node.result = None;
            tracing::trace!("{} {} aborted", node.kind.name(), id);
        }

        for child in self.children(id).to_vec() {
            self.abort(child, scope);
        }
    }

    /// Ticks the single child of a root or decorator.
    pub(crate) fn tick_child(
        &mut self,
        parent: NodeId,
        child: Option<NodeId>,
        scope: &mut Scope<'_, C, B>,
    ) -> Status {
        match child {
            Some(child) => self.tick(child, scope),
            None => {
                tracing::warn!("node {} has no child, reporting failure", parent);
                Status::Failure
            }
        }
    }

    fn set_started(&mut self, id: NodeId, started: bool) {
        if let Some(node) = self.get_mut(id) {
            node.started = started;
        }
    }

    fn start(&mut self, id: NodeId, scope: &mut Scope<'_, C, B>) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        match &mut node.kind {
            NodeKind::Root { .. } => {}
            NodeKind::Composite(composite) => composite.on_start(scope),
            NodeKind::Decorator(decorator) => decorator.on_start(scope),
            NodeKind::Action(action) => action.on_start(scope),
        }
    }

    fn update(&mut self, id: NodeId, scope: &mut Scope<'_, C, B>) -> Status {
        let Some(node) = self.get_mut(id) else {
            return Status::Failure;
        };
        match &mut node.kind {
            NodeKind::Action(action) => action.on_update(scope),
            NodeKind::Root { child } => {
                let child = *child;
                self.tick_child(id, child, scope)
            }
            NodeKind::Composite(_) => self.update_composite(id, scope),
            NodeKind::Decorator(_) => self.update_decorator(id, scope),
        }
    }

    fn stop(&mut self, id: NodeId, scope: &mut Scope<'_, C, B>) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        match &mut node.kind {
            NodeKind::Root { .. } | NodeKind::Composite(_) => {}
            NodeKind::Decorator(decorator) => decorator.on_stop(),
            NodeKind::Action(action) => action.on_stop(scope),
        }
    }
}
