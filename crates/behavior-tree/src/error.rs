//! Error types raised by tree authoring and driving operations.

use thiserror::Error;

use crate::NodeId;

/// Errors surfaced by [`BehaviorTree`](crate::BehaviorTree) operations.
///
/// Run-time problems inside the node graph (a decorator without a child, a
/// dangling child id) are not errors: the offending node reports
/// [`Status::Failure`](crate::Status::Failure) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("tree must be bound to a context before it is ticked")]
    Unbound,

    #[error("tree is already bound to a context")]
    AlreadyBound,

    #[error("tree structure cannot change once the tree is bound")]
    Bound,

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not a composite")]
    NotComposite(NodeId),

    #[error("node {0} cannot hold a single child")]
    NotParent(NodeId),

    #[error("the root node cannot be created, removed or attached as a child")]
    RootNode,

    #[error("node {0} already has a parent")]
    AlreadyParented(NodeId),

    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("tree already holds the maximum of {} node slots", crate::node::MAX_NODES)]
    TooManyNodes,
}

pub type Result<T> = std::result::Result<T, TreeError>;
