//! Per-entity tree driver.
//!
//! A [`Runner`] turns a shared template into a private instance bound to one
//! host entity, then advances it from the host's frame loop.

use std::sync::Arc;

use behavior_tree::{BehaviorTree, Blackboard, Status};

use crate::config::{RunnerConfig, UpdateMode};
use crate::context::BreakSignal;
use crate::error::Result;

/// Drives one tree instance on behalf of one host entity.
pub struct Runner<C: ?Sized, B = Blackboard> {
    tree: BehaviorTree<C, B>,
    config: RunnerConfig,
    paused: bool,
    last: Option<Status>,
}

impl<C: BreakSignal + ?Sized, B: Default> Runner<C, B> {
    /// Instantiates `template` and binds the instance to `context`.
    pub fn new(template: &BehaviorTree<C, B>, context: Arc<C>, config: RunnerConfig) -> Result<Self> {
        let mut tree = template.instantiate();
        if config.seed.is_some() {
            tree.set_seed(config.seed)?;
        }
        tree.bind(context)?;

        tracing::debug!(
            "runner started: mode={}, auto_reset={}, nodes={}",
            config.update_mode,
            config.auto_reset,
            tree.node_count()
        );

        Ok(Self {
            tree,
            config,
            paused: false,
            last: None,
        })
    }

    /// Per-frame hook of the host loop.
    ///
    /// Ticks the tree in [`UpdateMode::Auto`] unless a breakpoint paused the
    /// runner. Returns `None` when no tick happened.
    pub fn frame(&mut self) -> Result<Option<Status>> {
        if self.config.update_mode != UpdateMode::Auto || self.paused {
            return Ok(None);
        }
        self.tick().map(Some)
    }

    /// Ticks the tree once, regardless of update mode and pause state.
    ///
    /// With `auto_reset` a tree that finished on an earlier tick is reset
    /// first, so every call past the first outcome starts a new run.
    pub fn tick(&mut self) -> Result<Status> {
        if self.config.auto_reset && self.tree.is_finished() {
            self.tree.reset_state();
        }

        let status = self.tree.update()?;
        self.last = Some(status);

        if self.tree.context().is_some_and(|context| context.take_break()) {
            tracing::info!("breakpoint hit, runner paused");
            self.paused = true;
        }
        Ok(status)
    }

    /// Lifts a breakpoint pause.
    pub fn resume(&mut self) {
        if self.paused {
            tracing::info!("runner resumed");
        }
        self.paused = false;
    }
}

impl<C: ?Sized, B> Runner<C, B> {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.config.update_mode
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Status of the most recent tick, `None` before the first one.
    pub fn last_status(&self) -> Option<Status> {
        self.last
    }

    pub fn tree(&self) -> &BehaviorTree<C, B> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut BehaviorTree<C, B> {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use behavior_tree::builder::{action, sequence};

    use super::*;
    use crate::context::Agent;
    use crate::nodes::{Breakpoint, Log};

    fn template() -> BehaviorTree<Agent> {
        BehaviorTree::from_blueprint(sequence(vec![action(Log::new("hello")), action(Breakpoint)]))
    }

    #[test]
    fn manual_runner_ignores_frames() {
        let config = RunnerConfig {
            update_mode: UpdateMode::Manual,
            ..RunnerConfig::default()
        };
        let mut runner = Runner::new(&template(), Arc::new(Agent::new("a", [0.0; 3])), config).unwrap();

        assert_eq!(runner.frame().unwrap(), None);
        assert_eq!(runner.last_status(), None);
        assert_eq!(runner.tick().unwrap(), Status::Success);
        assert_eq!(runner.last_status(), Some(Status::Success));
    }

    #[test]
    fn breakpoint_pauses_auto_ticking_until_resumed() {
        let mut runner =
            Runner::new(&template(), Arc::new(Agent::new("a", [0.0; 3])), RunnerConfig::default())
                .unwrap();

        assert_eq!(runner.frame().unwrap(), Some(Status::Success));
        assert!(runner.is_paused());
        assert_eq!(runner.frame().unwrap(), None);

        runner.resume();
        assert_eq!(runner.frame().unwrap(), Some(Status::Success));
    }

    #[test]
    fn finished_tree_stays_latched_without_auto_reset() {
        let config = RunnerConfig {
            auto_reset: false,
            ..RunnerConfig::default()
        };
        let template: BehaviorTree<Agent> = BehaviorTree::from_blueprint(action(Log::new("once")));
        let mut runner = Runner::new(&template, Arc::new(Agent::new("a", [0.0; 3])), config).unwrap();

        assert_eq!(runner.frame().unwrap(), Some(Status::Success));
        assert_eq!(runner.frame().unwrap(), Some(Status::Success));
        assert!(runner.tree().is_finished());
        assert_eq!(runner.tree().state(), Some(Status::Success));
    }
}
