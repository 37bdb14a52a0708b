//! Builder utilities for ergonomic behavior tree construction.
//!
//! This module provides helper functions to reduce boilerplate when building
//! behavior trees. Instead of adding nodes and edges one at a time, you can
//! describe a template as nested [`Blueprint`]s and plant it with
//! [`BehaviorTree::from_blueprint`]:
//!
//! ```rust,ignore
//! use behavior_tree::builder::*;
//!
//! let template = BehaviorTree::from_blueprint(repeat(sequence(vec![
//!     action(RandomPosition::default()),
//!     action(MoveToPosition::default()),
//!     action(Wait::new(Duration::from_secs(1))),
//! ])));
//! ```

use std::time::Duration;

use crate::arena::Arena;
use crate::{
    Action, BehaviorTree, CompositePolicy, DecoratorPolicy, Gate, Node, NodeId, NodeKind, Scope,
};

/// Nested description of a subtree, planted into an arena in one go.
pub enum Blueprint<C: ?Sized, B> {
    Composite(CompositePolicy, Vec<Blueprint<C, B>>),
    Decorator(DecoratorPolicy<C, B>, Option<Box<Blueprint<C, B>>>),
    Action(Box<dyn Action<C, B>>),
}

impl<C: ?Sized, B: Default> BehaviorTree<C, B> {
    /// Creates a template whose root runs `blueprint`.
    pub fn from_blueprint(blueprint: Blueprint<C, B>) -> Self {
        let mut tree = Self::new();
        let root = tree.root();
        let child = plant(tree.arena_mut(), blueprint, root);
        if let Some(NodeKind::Root { child: slot }) = tree.arena_mut().get_mut(root).map(|node| &mut node.kind) {
            *slot = Some(child);
        }
        tree
    }
}

fn plant<C: ?Sized, B>(arena: &mut Arena<C, B>, blueprint: Blueprint<C, B>, parent: NodeId) -> NodeId {
    let (kind, children) = match blueprint {
        Blueprint::Composite(policy, children) => (NodeKind::composite(policy), children),
        Blueprint::Decorator(policy, child) => (
            NodeKind::decorator(policy),
            child.map(|child| vec![*child]).unwrap_or_default(),
        ),
        Blueprint::Action(action) => (NodeKind::Action(action), Vec::new()),
    };

    let mut node = Node::new(kind);
    node.parent = Some(parent);
    let id = arena.insert(node);

    let ids = children
        .into_iter()
        .map(|child| plant(arena, child, id))
        .collect();
    if let Some(node) = arena.get_mut(id) {
        node.kind.replace_children(ids);
    }
    id
}

/// Creates a leaf node.
#[inline]
pub fn action<C: ?Sized, B>(action: impl Action<C, B> + 'static) -> Blueprint<C, B> {
    Blueprint::Action(Box::new(action))
}

/// Creates a sequence node.
#[inline]
pub fn sequence<C: ?Sized, B>(children: Vec<Blueprint<C, B>>) -> Blueprint<C, B> {
    Blueprint::Composite(CompositePolicy::Sequence, children)
}

/// Creates a selector node.
#[inline]
pub fn selector<C: ?Sized, B>(children: Vec<Blueprint<C, B>>) -> Blueprint<C, B> {
    Blueprint::Composite(CompositePolicy::Selector, children)
}

/// Creates a random selector node.
#[inline]
pub fn random_selector<C: ?Sized, B>(children: Vec<Blueprint<C, B>>) -> Blueprint<C, B> {
    Blueprint::Composite(CompositePolicy::RandomSelector, children)
}

/// Creates an inverter node.
#[inline]
pub fn inverter<C: ?Sized, B>(child: Blueprint<C, B>) -> Blueprint<C, B> {
    decorate(DecoratorPolicy::Inverter, child)
}

/// Creates a succeed node.
#[inline]
pub fn succeed<C: ?Sized, B>(child: Blueprint<C, B>) -> Blueprint<C, B> {
    decorate(DecoratorPolicy::Succeed, child)
}

/// Creates a force-failure node.
#[inline]
pub fn force_failure<C: ?Sized, B>(child: Blueprint<C, B>) -> Blueprint<C, B> {
    decorate(DecoratorPolicy::ForceFailure, child)
}

/// Creates a repeat node that restarts on success and stops on failure.
#[inline]
pub fn repeat<C: ?Sized, B>(child: Blueprint<C, B>) -> Blueprint<C, B> {
    decorate(DecoratorPolicy::repeat(), child)
}

/// Creates a repeat node with explicit restart flags.
#[inline]
pub fn repeat_with<C: ?Sized, B>(
    restart_on_success: bool,
    restart_on_failure: bool,
    child: Blueprint<C, B>,
) -> Blueprint<C, B> {
    decorate(
        DecoratorPolicy::Repeat {
            restart_on_success,
            restart_on_failure,
        },
        child,
    )
}

/// Creates a timeout node.
#[inline]
pub fn timeout<C: ?Sized, B>(duration: Duration, child: Blueprint<C, B>) -> Blueprint<C, B> {
    decorate(DecoratorPolicy::timeout(duration), child)
}

/// Creates a conditional gate around `child`.
pub fn conditional<C, B, F>(
    predicate: F,
    reevaluate_while_running: bool,
    child: Blueprint<C, B>,
) -> Blueprint<C, B>
where
    C: ?Sized,
    F: Fn(&Scope<'_, C, B>) -> bool + Clone + Send + Sync + 'static,
{
    let gate = Gate::new(predicate).reevaluate_while_running(reevaluate_while_running);
    decorate(DecoratorPolicy::Conditional(gate), child)
}

/// Creates a childless conditional gate, which acts as a condition leaf.
pub fn condition<C, B, F>(predicate: F) -> Blueprint<C, B>
where
    C: ?Sized,
    F: Fn(&Scope<'_, C, B>) -> bool + Clone + Send + Sync + 'static,
{
    Blueprint::Decorator(DecoratorPolicy::conditional(predicate), None)
}

fn decorate<C: ?Sized, B>(policy: DecoratorPolicy<C, B>, child: Blueprint<C, B>) -> Blueprint<C, B> {
    Blueprint::Decorator(policy, Some(Box::new(child)))
}
