//! Headless patrol simulation.
//!
//! One patrol template is authored up front. Every agent gets its own runner,
//! which instantiates the template, and a shared [`ManualClock`] advances
//! all of them frame by frame.

use std::sync::Arc;

use anyhow::Result;
use behavior_tree::builder::{Blueprint, action, repeat, selector, sequence, timeout};
use behavior_tree::{BehaviorTree, Blackboard, ManualClock, Status};
use bt_runtime::{
    Agent, Breakpoint, Log, MoveToPosition, RandomFailure, RandomPosition, Runner, RunnerConfig,
    UpdateMode, Wait,
};

use crate::config::SimConfig;

/// Builds the patrol template:
///
/// ```text
/// Repeat
/// └── Sequence
///     ├── (Breakpoint)
///     ├── RandomPosition
///     ├── Timeout(leg) ── MoveToPosition
///     └── Selector
///         ├── Sequence
///         │   ├── RandomFailure
///         │   └── Wait
///         └── Log
/// ```
pub fn patrol_template(config: &SimConfig, clock: &ManualClock) -> BehaviorTree<Agent> {
    let mut leg: Vec<Blueprint<Agent, Blackboard>> = Vec::new();
    if config.breakpoints {
        leg.push(action(Breakpoint));
    }
    leg.push(action(RandomPosition::square(config.extent)));
    leg.push(timeout(config.leg_timeout(), action(MoveToPosition::default())));
    leg.push(selector(vec![
        sequence(vec![
            action(RandomFailure::new(config.failure_chance)),
            action(Wait::new(config.wait_duration())),
        ]),
        action(Log::new("skipping rest")),
    ]));

    BehaviorTree::from_blueprint(repeat(sequence(leg))).with_clock(Arc::new(clock.clone()))
}

/// Final state of one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReport {
    pub name: String,
    pub position: [f64; 3],
    pub last_status: Option<Status>,
    pub ticks: u64,
    pub breaks: u64,
}

/// Outcome of a whole simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub frames: u64,
    pub agents: Vec<AgentReport>,
}

struct Slot {
    agent: Arc<Agent>,
    runner: Runner<Agent>,
    ticks: u64,
    breaks: u64,
}

pub struct Simulation {
    config: SimConfig,
    clock: ManualClock,
    slots: Vec<Slot>,
    frame: u64,
}

impl Simulation {
    pub fn new(config: SimConfig, runner_config: RunnerConfig) -> Result<Self> {
        config.validate()?;

        let clock = ManualClock::new();
        let template = patrol_template(&config, &clock);
        let runner_config = RunnerConfig {
            update_mode: config.update_mode.unwrap_or(runner_config.update_mode),
            seed: config.seed.or(runner_config.seed),
            ..runner_config
        };

        let slots = (0..config.agents)
            .map(|i| -> Result<Slot> {
                let agent = Arc::new(
                    Agent::new(format!("agent-{i}"), [0.0; 3]).with_extent(config.extent),
                );
                let runner = Runner::new(
                    &template,
                    Arc::clone(&agent),
                    runner_config.for_instance(i as u64),
                )?;
                Ok(Slot {
                    agent,
                    runner,
                    ticks: 0,
                    breaks: 0,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "simulation ready: agents={}, frames={}, mode={}",
            config.agents,
            config.frames,
            runner_config.update_mode
        );

        Ok(Self {
            config,
            clock,
            slots,
            frame: 0,
        })
    }

    /// Advances every agent and runner by one frame.
    pub fn step(&mut self) -> Result<()> {
        let dt = self.config.frame_duration();
        self.clock.advance(dt);
        self.frame += 1;

        let manual_tick = self.frame % self.config.tick_interval == 0;
        for slot in &mut self.slots {
            slot.agent.step(dt.as_secs_f64());

            // Headless runs have no debugger to stop in.
            if slot.runner.is_paused() {
                tracing::info!("{} resuming after breakpoint", slot.agent.name());
                slot.runner.resume();
            }

            let status = match slot.runner.update_mode() {
                UpdateMode::Auto => slot.runner.frame()?,
                UpdateMode::Manual if manual_tick => Some(slot.runner.tick()?),
                UpdateMode::Manual => None,
            };
            if status.is_some() {
                slot.ticks += 1;
            }
            if slot.runner.is_paused() {
                slot.breaks += 1;
            }
        }
        Ok(())
    }

    /// Runs all configured frames.
    pub fn run(&mut self) -> Result<Summary> {
        while self.frame < self.config.frames {
            self.step()?;
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            frames: self.frame,
            agents: self
                .slots
                .iter()
                .map(|slot| AgentReport {
                    name: slot.agent.name().to_string(),
                    position: slot.agent.position(),
                    last_status: slot.runner.last_status(),
                    ticks: slot.ticks,
                    breaks: slot.breaks,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig {
            agents: 2,
            frames: 200,
            seed: Some(21),
            ..SimConfig::default()
        }
    }

    #[test]
    fn patrol_keeps_running_and_moves_agents() {
        let mut sim = Simulation::new(config(), RunnerConfig::default()).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(summary.frames, 200);
        assert_eq!(summary.agents.len(), 2);
        for report in &summary.agents {
            assert_eq!(report.ticks, 200);
            assert_eq!(report.last_status, Some(Status::Running));
            assert_ne!(report.position, [0.0; 3]);
            assert!(report.position[0].abs() <= 10.0 && report.position[2].abs() <= 10.0);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let first = Simulation::new(config(), RunnerConfig::default()).unwrap().run().unwrap();
        let second = Simulation::new(config(), RunnerConfig::default()).unwrap().run().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn manual_mode_ticks_on_the_interval() {
        let runner_config = RunnerConfig {
            update_mode: UpdateMode::Manual,
            ..RunnerConfig::default()
        };
        let mut sim = Simulation::new(
            SimConfig {
                frames: 20,
                tick_interval: 5,
                ..config()
            },
            runner_config,
        )
        .unwrap();

        let summary = sim.run().unwrap();
        assert!(summary.agents.iter().all(|report| report.ticks == 4));
    }

    #[test]
    fn config_file_mode_beats_the_environment() {
        let mut sim = Simulation::new(
            SimConfig {
                frames: 12,
                tick_interval: 3,
                update_mode: Some(UpdateMode::Manual),
                ..config()
            },
            RunnerConfig::default(),
        )
        .unwrap();

        let summary = sim.run().unwrap();
        assert!(summary.agents.iter().all(|report| report.ticks == 4));
    }

    #[test]
    fn breakpoints_pause_and_resume() {
        let mut sim = Simulation::new(
            SimConfig {
                frames: 10,
                breakpoints: true,
                ..config()
            },
            RunnerConfig::default(),
        )
        .unwrap();

        sim.step().unwrap();
        let summary = sim.summary();
        assert!(summary.agents.iter().all(|report| report.breaks == 1));

        // Resumed at the start of the next frame, which still ticks.
        sim.step().unwrap();
        let summary = sim.summary();
        assert!(summary.agents.iter().all(|report| report.ticks == 2));
    }
}
