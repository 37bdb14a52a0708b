//! Stock leaf behaviors.
//!
//! - [`basic`]: logging, waiting, random outcomes and debug breaks; usable
//!   with any context
//! - [`movement`]: picking and reaching positions on an [`AgentHost`](crate::AgentHost)
pub mod basic;
pub mod movement;

pub use basic::{Breakpoint, Log, RandomFailure, Wait};
pub use movement::{MOVE_TO_POSITION, MoveToPosition, RandomPosition};
