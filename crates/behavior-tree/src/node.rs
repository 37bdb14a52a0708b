//! Node identity, kinds and per-node run bookkeeping.

use std::fmt;

use crate::{Action, Composite, CompositePolicy, Decorator, DecoratorPolicy, Status};

/// Number of node slots a single tree can address, removed nodes included.
pub const MAX_NODES: usize = u32::MAX as usize;

/// Index of a node inside the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Lies outside every arena, so it never resolves to a node.
    pub(crate) const UNADDRESSABLE: NodeId = NodeId(u32::MAX);

    /// Id of the slot at `index`, or `None` once `index` reaches [`MAX_NODES`].
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .filter(|&raw| raw < u32::MAX)
            .map(NodeId)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Authoring data kept for editors and visualizers. Never read by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMeta {
    pub description: String,
    /// Layout position; `position[0]` orders composite children.
    pub position: [f32; 2],
}

/// The closed set of node kinds.
///
/// Structural behavior (root, composites, decorators) is compiled into the
/// engine. Leaves are the open extension point through [`Action`].
pub enum NodeKind<C: ?Sized, B> {
    /// Pass-through entry point. Exactly one per tree.
    Root { child: Option<NodeId> },
    Composite(Composite),
    Decorator(Decorator<C, B>),
    Action(Box<dyn Action<C, B>>),
}

impl<C: ?Sized, B> NodeKind<C, B> {
    pub fn action(action: impl Action<C, B> + 'static) -> Self {
        NodeKind::Action(Box::new(action))
    }

    pub fn composite(policy: CompositePolicy) -> Self {
        NodeKind::Composite(Composite::new(policy))
    }

    pub fn decorator(policy: DecoratorPolicy<C, B>) -> Self {
        NodeKind::Decorator(Decorator::new(policy))
    }

    pub fn name(&self) -> &str {
        match self {
            NodeKind::Root { .. } => "Root",
            NodeKind::Composite(composite) => composite.policy().name(),
            NodeKind::Decorator(decorator) => decorator.policy().name(),
            NodeKind::Action(action) => action.name(),
        }
    }

    /// Child ids in tick order.
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Root { child } => child.as_slice(),
            NodeKind::Composite(composite) => composite.children(),
            NodeKind::Decorator(decorator) => decorator.child.as_slice(),
            NodeKind::Action(_) => &[],
        }
    }

    pub(crate) fn replace_children(&mut self, ids: Vec<NodeId>) {
        match self {
            NodeKind::Root { child } => *child = ids.first().copied(),
            NodeKind::Composite(composite) => composite.children = ids,
            NodeKind::Decorator(decorator) => decorator.child = ids.first().copied(),
            NodeKind::Action(_) => {}
        }
    }

    /// Copy of the configuration with per-run state cleared.
    fn fresh_copy(&self) -> Self {
        match self {
            NodeKind::Root { child } => NodeKind::Root { child: *child },
            NodeKind::Composite(composite) => NodeKind::Composite(composite.fresh_copy()),
            NodeKind::Decorator(decorator) => NodeKind::Decorator(decorator.fresh_copy()),
            NodeKind::Action(action) => NodeKind::Action(action.clone()),
        }
    }
}

/// One slot of the tree: a kind plus the state machine bookkeeping.
pub struct Node<C: ?Sized, B> {
    pub(crate) kind: NodeKind<C, B>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) result: Option<Status>,
    pub(crate) started: bool,
    pub(crate) meta: NodeMeta,
}

impl<C: ?Sized, B> Node<C, B> {
    pub(crate) fn new(kind: NodeKind<C, B>) -> Self {
        Self {
            kind,
            parent: None,
            result: None,
            started: false,
            meta: NodeMeta::default(),
        }
    }

    pub fn kind(&self) -> &NodeKind<C, B> {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Last computed outcome, `None` if the node has not run since it was
    /// created or aborted.
    pub fn result(&self) -> Option<Status> {
        self.result
    }

    /// Whether `on_start` has fired without a matching `on_stop`.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    /// Independent copy for a new tree instance. Child ids still refer to the
    /// source arena and must be remapped by the caller.
    pub(crate) fn fresh_copy(&self) -> Self {
        Self {
            kind: self.kind.fresh_copy(),
            parent: None,
            result: None,
            started: false,
            meta: self.meta.clone(),
        }
    }
}
