//! Host-side runtime for behavior trees.
//!
//! This crate connects the engine in `behavior_tree` to the entities it
//! drives. A [`Runner`] owns one tree instance per host entity and ticks it
//! once per frame; the [`AgentHost`] trait is the capability surface stock
//! leaves use to move an entity around.
//!
//! Modules are organized by responsibility:
//! - [`runner`] hosts the per-entity driver and its update modes
//! - [`config`] reads runner settings from the environment
//! - [`context`] defines host capabilities and the kinematic [`Agent`]
//! - [`nodes`] provides the stock leaf behaviors
pub mod config;
pub mod context;
pub mod error;
pub mod nodes;
pub mod runner;

pub use config::{RunnerConfig, UpdateMode};
pub use context::{Agent, AgentHost, BreakSignal, Steering};
pub use error::{Result, RuntimeError};
pub use nodes::{
    Breakpoint, Log, MOVE_TO_POSITION, MoveToPosition, RandomFailure, RandomPosition, Wait,
};
pub use runner::Runner;
