//! The owning tree object.
//!
//! A [`BehaviorTree`] is authored once as a template, then instantiated per
//! host entity. Each instance owns an independent copy of the node graph and
//! its own blackboard, is bound to one host context, and is ticked once per
//! host update.
//!
//! ```text
//! template ──instantiate()──▶ instance ──bind(ctx)──▶ update() × N ──▶ Success/Failure
//!                                                        ▲                   │
//!                                                        └── reset_state() ◀─┘
//! ```

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::arena::Arena;
use crate::error::{Result, TreeError};
use crate::{Blackboard, Clock, Node, NodeId, NodeKind, Scope, Status, SystemClock};

/// Root-owning behavior tree bound to a context of type `C`.
pub struct BehaviorTree<C: ?Sized, B = Blackboard> {
    arena: Arena<C, B>,
    root: NodeId,
    blackboard: B,
    context: Option<Arc<C>>,
    clock: Arc<dyn Clock>,
    seed: Option<u64>,
    rng: StdRng,
    /// Latched result of the root; `None` until the first tick after a reset.
    state: Option<Status>,
}

impl<C: ?Sized, B: Default> BehaviorTree<C, B> {
    /// Creates an empty template holding only the root node.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(Node::new(NodeKind::Root { child: None }));
        Self::from_parts(arena, root, Arc::new(SystemClock::new()), None)
    }

    fn from_parts(arena: Arena<C, B>, root: NodeId, clock: Arc<dyn Clock>, seed: Option<u64>) -> Self {
        Self {
            arena,
            root,
            blackboard: B::default(),
            context: None,
            clock,
            seed,
            rng: StdRng::seed_from_u64(seed.unwrap_or_default()),
            state: None,
        }
    }

    /// Creates an independent instance of this tree.
    ///
    /// Every node reachable from the root is deep-copied into a fresh arena
    /// with clean run state. The instance gets a new blackboard and is not
    /// bound; clock and seed configuration are carried over. Nodes that are
    /// not attached to the root are left behind.
    pub fn instantiate(&self) -> Self {
        let mut arena = Arena::new();
        let root = self.arena.clone_subtree(self.root, &mut arena);
        tracing::debug!("instantiated behavior tree with {} nodes", arena.len());
        Self::from_parts(arena, root, Arc::clone(&self.clock), self.seed)
    }
}

impl<C: ?Sized, B: Default> Default for BehaviorTree<C, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, B> BehaviorTree<C, B> {
    /// Uses `clock` for every timer in the tree and its future instances.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Seeds the random source at bind time instead of drawing from entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the bind-time seed; `None` draws from entropy.
    ///
    /// The random source is seeded by [`bind`](Self::bind), so a bound tree
    /// rejects the change.
    pub fn set_seed(&mut self, seed: Option<u64>) -> Result<()> {
        self.ensure_unbound()?;
        self.seed = seed;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Host driving
    // ------------------------------------------------------------------------

    /// Binds the tree to its host context.
    ///
    /// Seeds the random source and notifies every attached node exactly once
    /// through [`Action::on_bind`](crate::Action::on_bind). Must happen
    /// before the first [`update`](Self::update).
    pub fn bind(&mut self, context: Arc<C>) -> Result<()> {
        if self.context.is_some() {
            return Err(TreeError::AlreadyBound);
        }

        self.rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let nodes = self.arena.descendants(self.root);
        for &id in &nodes {
            if let Some(NodeKind::Action(action)) = self.arena.get_mut(id).map(|node| &mut node.kind) {
                action.on_bind(&context);
            }
        }

        self.context = Some(context);
        tracing::debug!("behavior tree bound ({} nodes)", nodes.len());
        Ok(())
    }

    /// Ticks the tree once.
    ///
    /// While the tree is fresh or running, the root is ticked and its result
    /// becomes the tree state. Once the tree has finished, the cached result
    /// is returned without ticking any node until [`reset_state`] is called.
    ///
    /// [`reset_state`]: Self::reset_state
    pub fn update(&mut self) -> Result<Status> {
        let Some(context) = self.context.as_deref() else {
            return Err(TreeError::Unbound);
        };
        if let Some(state) = self.state
            && state.is_terminal()
        {
            return Ok(state);
        }

        let mut scope = Scope::new(&mut self.blackboard, context, self.clock.as_ref(), &mut self.rng);
        let status = self.arena.tick(self.root, &mut scope);

        if self.state != Some(status) {
            tracing::debug!("behavior tree state {:?} -> {}", self.state, status);
        }
        self.state = Some(status);
        Ok(status)
    }

    /// Stops every started node, from the root down, without updating them.
    ///
    /// The tree state is left as is. An unbound tree has nothing started.
    pub fn abort(&mut self) {
        let Some(context) = self.context.as_deref() else {
            return;
        };

        let mut scope = Scope::new(&mut self.blackboard, context, self.clock.as_ref(), &mut self.rng);
        self.arena.abort(self.root, &mut scope);
        tracing::debug!("behavior tree aborted");
    }

    /// Clears a finished tree so the next update starts a fresh run.
    ///
    /// Returns `false` and logs a warning when the tree has not finished;
    /// a running tree is never cancelled by a reset.
    pub fn reset_state(&mut self) -> bool {
        if !self.is_finished() {
            tracing::warn!(
                "cannot reset a behavior tree whose state is not finished (state: {:?})",
                self.state
            );
            return false;
        }
        self.state = None;
        true
    }

    /// Latched tree state, `None` before the first tick of a run.
    pub fn state(&self) -> Option<Status> {
        self.state
    }

    /// Whether the tree has reached `Success` or `Failure`.
    pub fn is_finished(&self) -> bool {
        self.state.is_some_and(Status::is_terminal)
    }

    pub fn is_bound(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&Arc<C>> {
        self.context.as_ref()
    }

    pub fn blackboard(&self) -> &B {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut B {
        &mut self.blackboard
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ------------------------------------------------------------------------
    // Read-only state queries
    // ------------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<C, B>> {
        self.arena.get(id)
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|node| node.kind.name())
    }

    pub fn node_result(&self, id: NodeId) -> Option<Status> {
        self.arena.get(id).and_then(Node::result)
    }

    pub fn is_node_started(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(Node::is_started)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena.children(id)
    }

    /// `id` and everything below it, depth-first, parents first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.arena.descendants(id)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    // ------------------------------------------------------------------------
    // Authoring
    // ------------------------------------------------------------------------

    /// Adds a detached node. Attach it with [`add_child`](Self::add_child) or
    /// [`set_child`](Self::set_child).
    pub fn add_node(&mut self, kind: NodeKind<C, B>) -> Result<NodeId> {
        self.ensure_unbound()?;
        if matches!(kind, NodeKind::Root { .. }) {
            return Err(TreeError::RootNode);
        }
        if self.arena.is_full() {
            return Err(TreeError::TooManyNodes);
        }
        Ok(self.arena.insert(Node::new(kind)))
    }

    /// Destroys a node. It is detached from its parent and its children
    /// become detached nodes.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.ensure_unbound()?;
        if id == self.root {
            return Err(TreeError::RootNode);
        }
        let node = self.arena.get(id).ok_or(TreeError::UnknownNode(id))?;

        if let Some(parent) = node.parent {
            self.detach(parent, id);
        }
        for child in self.arena.children(id).to_vec() {
            if let Some(child) = self.arena.get_mut(child) {
                child.parent = None;
            }
        }
        self.arena.remove(id);
        Ok(())
    }

    /// Appends `child` to a composite.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_unbound()?;
        self.validate_attach(parent, child)?;

        match self.arena.get_mut(parent).map(|node| &mut node.kind) {
            Some(NodeKind::Composite(composite)) => composite.children.push(child),
            _ => return Err(TreeError::NotComposite(parent)),
        }
        self.set_parent(child, Some(parent));
        Ok(())
    }

    /// Detaches `child` from a composite.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_unbound()?;

        match self.arena.get_mut(parent).map(|node| &mut node.kind) {
            Some(NodeKind::Composite(composite)) => {
                let Some(index) = composite.children.iter().position(|&c| c == child) else {
                    return Err(TreeError::NotAChild { parent, child });
                };
                composite.children.remove(index);
            }
            Some(_) => return Err(TreeError::NotComposite(parent)),
            None => return Err(TreeError::UnknownNode(parent)),
        }
        self.set_parent(child, None);
        Ok(())
    }

    /// Sets or clears the child of the root or of a decorator. A previous
    /// child becomes a detached node.
    pub fn set_child(&mut self, parent: NodeId, child: Option<NodeId>) -> Result<()> {
        self.ensure_unbound()?;
        if let Some(child) = child {
            self.validate_attach(parent, child)?;
        }

        let previous = match self.arena.get_mut(parent).map(|node| &mut node.kind) {
            Some(NodeKind::Root { child: slot }) => std::mem::replace(slot, child),
            Some(NodeKind::Decorator(decorator)) => std::mem::replace(&mut decorator.child, child),
            Some(_) => return Err(TreeError::NotParent(parent)),
            None => return Err(TreeError::UnknownNode(parent)),
        };

        if let Some(previous) = previous {
            self.set_parent(previous, None);
        }
        if let Some(child) = child {
            self.set_parent(child, Some(parent));
        }
        Ok(())
    }

    /// Orders a composite's children by their horizontal layout position.
    pub fn sort_children(&mut self, parent: NodeId) -> Result<()> {
        self.ensure_unbound()?;

        let Some(NodeKind::Composite(composite)) = self.arena.get(parent).map(|node| &node.kind) else {
            return Err(self.missing_or(parent, TreeError::NotComposite(parent)));
        };
        let mut children = composite.children.clone();
        children.sort_by(|&a, &b| {
            let x = |id| self.arena.get(id).map_or(0.0, |node| node.meta.position[0]);
            x(a).total_cmp(&x(b))
        });

        if let Some(NodeKind::Composite(composite)) = self.arena.get_mut(parent).map(|node| &mut node.kind) {
            composite.children = children;
        }
        Ok(())
    }

    /// Layout position used by editors and by [`sort_children`](Self::sort_children).
    pub fn set_position(&mut self, id: NodeId, position: [f32; 2]) -> Result<()> {
        let node = self.arena.get_mut(id).ok_or(TreeError::UnknownNode(id))?;
        node.meta.position = position;
        Ok(())
    }

    pub fn set_description(&mut self, id: NodeId, description: impl Into<String>) -> Result<()> {
        let node = self.arena.get_mut(id).ok_or(TreeError::UnknownNode(id))?;
        node.meta.description = description.into();
        Ok(())
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena<C, B> {
        &mut self.arena
    }

    fn ensure_unbound(&self) -> Result<()> {
        if self.is_bound() {
            return Err(TreeError::Bound);
        }
        Ok(())
    }

    fn validate_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.arena.get(parent).ok_or(TreeError::UnknownNode(parent))?;
        let node = self.arena.get(child).ok_or(TreeError::UnknownNode(child))?;

        if child == self.root {
            return Err(TreeError::RootNode);
        }
        if node.parent.is_some() {
            return Err(TreeError::AlreadyParented(child));
        }
        if child == parent || self.arena.is_ancestor(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }
        Ok(())
    }

    fn missing_or(&self, id: NodeId, error: TreeError) -> TreeError {
        if self.arena.get(id).is_none() {
            TreeError::UnknownNode(id)
        } else {
            error
        }
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.parent = parent;
        }
    }

    /// Removes the edge `parent -> child`, whatever kind the parent is.
    fn detach(&mut self, parent: NodeId, child: NodeId) {
        match self.arena.get_mut(parent).map(|node| &mut node.kind) {
            Some(NodeKind::Composite(composite)) => composite.children.retain(|&c| c != child),
            Some(NodeKind::Root { child: slot }) if *slot == Some(child) => *slot = None,
            Some(NodeKind::Decorator(decorator)) if decorator.child == Some(child) => {
                decorator.child = None
            }
            _ => {}
        }
    }
}
