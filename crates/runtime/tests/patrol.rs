use std::sync::Arc;
use std::time::Duration;

use behavior_tree::builder::{action, repeat, sequence, timeout};
use behavior_tree::{BehaviorTree, ManualClock, Status};
use bt_runtime::{
    Agent, MOVE_TO_POSITION, MoveToPosition, RandomPosition, Runner, RunnerConfig, Wait,
};

const FRAME: Duration = Duration::from_millis(50);

fn patrol(clock: &ManualClock) -> BehaviorTree<Agent> {
    BehaviorTree::from_blueprint(repeat(sequence(vec![
        action(RandomPosition::square(8.0)),
        timeout(Duration::from_secs(10), action(MoveToPosition::default())),
        action(Wait::new(Duration::from_millis(200))),
    ])))
    .with_clock(Arc::new(clock.clone()))
}

/// Multi-Agent Patrol Scenario
///
/// Several agents share one patrol template:
/// 1. Each runner instantiates and binds its own copy
/// 2. Agents pick independent destinations from their own seeds
/// 3. The simulated clock drives both `Wait` and `Timeout`
/// 4. Agents keep patrolling; the template never runs
#[test]
fn agents_patrol_independently_from_one_template() {
    let clock = ManualClock::new();
    let template = patrol(&clock);
    let config = RunnerConfig {
        seed: Some(1),
        ..RunnerConfig::default()
    };

    let agents: Vec<Arc<Agent>> = (0..3)
        .map(|i| Arc::new(Agent::new(format!("agent-{i}"), [0.0; 3]).with_extent(10.0)))
        .collect();
    let mut runners: Vec<Runner<Agent>> = agents
        .iter()
        .enumerate()
        .map(|(i, agent)| Runner::new(&template, Arc::clone(agent), config.for_instance(i as u64)))
        .collect::<Result<_, _>>()
        .unwrap();

    let first_targets: Vec<Option<[f64; 3]>> = runners
        .iter_mut()
        .map(|runner| {
            runner.frame().unwrap();
            runner.tree().blackboard().get_vec3(MOVE_TO_POSITION)
        })
        .collect();
    assert!(first_targets.iter().all(Option::is_some));
    assert_ne!(first_targets[0], first_targets[1]);
    assert_ne!(first_targets[1], first_targets[2]);

    for _ in 0..400 {
        clock.advance(FRAME);
        for (runner, agent) in runners.iter_mut().zip(&agents) {
            agent.step(FRAME.as_secs_f64());
            // The repeat never lets the patrol finish.
            assert_eq!(runner.frame().unwrap(), Some(Status::Running));
        }
    }

    for agent in &agents {
        let [x, _, z] = agent.position();
        assert!(x.abs() <= 8.0 && z.abs() <= 8.0);
        assert_ne!(agent.position(), [0.0; 3]);
    }
    assert!(!template.is_bound());
    assert!(template.blackboard().is_empty());
}

#[test]
fn unreachable_target_fails_the_patrol_leg() {
    let clock = ManualClock::new();
    let template: BehaviorTree<Agent> = BehaviorTree::from_blueprint(sequence(vec![
        action(RandomPosition::new([20.0, 20.0], [30.0, 30.0])),
        action(MoveToPosition::default()),
    ]))
    .with_clock(Arc::new(clock.clone()));
    let agent = Arc::new(Agent::new("walled-in", [0.0; 3]).with_extent(10.0));
    let config = RunnerConfig {
        auto_reset: false,
        seed: Some(3),
        ..RunnerConfig::default()
    };
    let mut runner = Runner::new(&template, agent, config).unwrap();

    assert_eq!(runner.frame().unwrap(), Some(Status::Failure));
    assert_eq!(runner.frame().unwrap(), Some(Status::Failure));
}
