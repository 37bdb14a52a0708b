//! Frame-driven behavior tree engine.
//!
//! This library ticks a hierarchy of decision and action nodes once per host
//! update, reporting `Running`, `Success` or `Failure` for every tick.
//!
//! - **Tri-state results**: long-running work reports `Running` and is resumed
//!   on the next tick; suspension is plain data, not a paused call stack
//! - **Paired lifecycle hooks**: `on_start`/`on_stop` fire exactly once per run
//! - **Template instancing**: a tree is authored once and instantiated per
//!   host entity without sharing run state or blackboards
//! - **Deterministic**: time comes from a [`Clock`] and randomness from a
//!   seedable per-instance source
//!
//! # Architecture
//!
//! - [`BehaviorTree`]: Owns the node arena, the blackboard and the context
//! - [`Status`]: Running, Success or Failure
//! - [`NodeKind`]: Root, composite, decorator or leaf
//! - Composite policies: [`CompositePolicy`]
//! - Decorator policies: [`DecoratorPolicy`]
//! - Leaf extension point: [`Action`]

mod arena;
pub mod behavior;
pub mod blackboard;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod error;
pub mod node;
pub mod scope;
pub mod status;
pub mod tree;

// Re-export core types for ergonomic API
pub use behavior::{Action, ActionClone, Predicate, PredicateClone};
pub use blackboard::{Blackboard, BlackboardValue};
pub use builder::Blueprint;
pub use composite::{Composite, CompositePolicy};
pub use decorator::{Decorator, DecoratorPolicy, Gate, Timeout};
pub use error::{Result, TreeError};
pub use node::{MAX_NODES, Node, NodeId, NodeKind, NodeMeta};
pub use scope::{Clock, ManualClock, Scope, SystemClock};
pub use status::Status;
pub use tree::BehaviorTree;
