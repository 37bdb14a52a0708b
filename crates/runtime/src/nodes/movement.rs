//! Leaves that pick positions and steer an [`AgentHost`] to them.
//!
//! The two leaves talk through the blackboard: [`RandomPosition`] writes the
//! target under [`MOVE_TO_POSITION`], [`MoveToPosition`] reads it when its run
//! starts.

use behavior_tree::{Action, Blackboard, Scope, Status};
use rand::Rng;
use rand::rngs::StdRng;

use crate::context::{AgentHost, Steering};

/// Blackboard key holding the position `MoveToPosition` heads for.
pub const MOVE_TO_POSITION: &str = "move_to_position";

/// Writes a random `[x, 0, z]` inside a rectangle to the blackboard, then
/// succeeds.
#[derive(Debug, Clone)]
pub struct RandomPosition {
    /// Lower corner on the XZ plane.
    pub min: [f64; 2],
    /// Upper corner on the XZ plane.
    pub max: [f64; 2],
}

impl RandomPosition {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// Square of half-width `extent` centered on the origin.
    pub fn square(extent: f64) -> Self {
        Self::new([-extent, -extent], [extent, extent])
    }
}

impl Default for RandomPosition {
    fn default() -> Self {
        Self::square(10.0)
    }
}

impl<C: ?Sized> Action<C, Blackboard> for RandomPosition {
    fn on_update(&mut self, scope: &mut Scope<'_, C, Blackboard>) -> Status {
        let x = sample(scope.rng(), self.min[0], self.max[0]);
        let z = sample(scope.rng(), self.min[1], self.max[1]);
        scope.blackboard_mut().set(MOVE_TO_POSITION, [x, 0.0, z]);
        Status::Success
    }
}

/// Uniform draw in `lo..hi`; an empty range yields `lo`.
fn sample(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if lo < hi { rng.gen_range(lo..hi) } else { lo }
}

/// Steers the agent to the position stored under [`MOVE_TO_POSITION`].
///
/// Fails when no target is stored or the host has no path to it, succeeds
/// once the remaining distance drops below `tolerance`, and keeps running
/// otherwise.
#[derive(Debug, Clone)]
pub struct MoveToPosition {
    pub steering: Steering,
    pub tolerance: f64,
    has_target: bool,
}

impl MoveToPosition {
    pub fn new(steering: Steering, tolerance: f64) -> Self {
        Self {
            steering,
            tolerance,
            has_target: false,
        }
    }
}

impl Default for MoveToPosition {
    fn default() -> Self {
        Self::new(Steering::default(), 1.0)
    }
}

impl<C: AgentHost + ?Sized> Action<C, Blackboard> for MoveToPosition {
    fn on_start(&mut self, scope: &mut Scope<'_, C, Blackboard>) {
        let target = scope.blackboard().get_vec3(MOVE_TO_POSITION);
        self.has_target = target.is_some();
        match target {
            Some(target) => scope.context().set_destination(target, self.steering),
            None => tracing::warn!("no {} on the blackboard", MOVE_TO_POSITION),
        }
    }

    fn on_update(&mut self, scope: &mut Scope<'_, C, Blackboard>) -> Status {
        if !self.has_target {
            return Status::Failure;
        }
        match scope.context().remaining_distance() {
            None => Status::Failure,
            Some(remaining) if remaining < self.tolerance => Status::Success,
            Some(_) => Status::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use behavior_tree::BehaviorTree;
    use behavior_tree::builder::{action, sequence};

    use super::*;
    use crate::context::Agent;

    fn bound(tree: BehaviorTree<Agent>, agent: &Arc<Agent>) -> BehaviorTree<Agent> {
        let mut tree = tree.with_seed(11);
        tree.bind(Arc::clone(agent)).unwrap();
        tree
    }

    #[test]
    fn random_position_stays_inside_its_rectangle() {
        let agent = Arc::new(Agent::new("scout", [0.0; 3]));
        let mut tree = bound(
            BehaviorTree::from_blueprint(action(RandomPosition::new([1.0, -4.0], [2.0, -3.0]))),
            &agent,
        );

        for _ in 0..50 {
            assert_eq!(tree.update().unwrap(), Status::Success);
            let [x, y, z] = tree.blackboard().get_vec3(MOVE_TO_POSITION).unwrap();
            assert!((1.0..2.0).contains(&x));
            assert_eq!(y, 0.0);
            assert!((-4.0..-3.0).contains(&z));
            assert!(tree.reset_state());
        }
    }

    #[test]
    fn degenerate_rectangle_yields_its_corner() {
        let agent = Arc::new(Agent::new("scout", [0.0; 3]));
        let mut tree = bound(
            BehaviorTree::from_blueprint(action(RandomPosition::new([3.0, 3.0], [3.0, 1.0]))),
            &agent,
        );

        tree.update().unwrap();
        assert_eq!(tree.blackboard().get_vec3(MOVE_TO_POSITION), Some([3.0, 0.0, 3.0]));
    }

    #[test]
    fn move_without_target_fails() {
        let agent = Arc::new(Agent::new("scout", [0.0; 3]));
        let mut tree = bound(BehaviorTree::from_blueprint(action(MoveToPosition::default())), &agent);

        assert_eq!(tree.update().unwrap(), Status::Failure);
        assert_eq!(agent.destination(), None);
    }

    #[test]
    fn move_to_unreachable_target_fails() {
        let agent = Arc::new(Agent::new("scout", [0.0; 3]).with_extent(5.0));
        let mut tree = bound(BehaviorTree::from_blueprint(action(MoveToPosition::default())), &agent);
        tree.blackboard_mut().set(MOVE_TO_POSITION, [9.0, 0.0, 0.0]);

        assert_eq!(tree.update().unwrap(), Status::Failure);
    }

    #[test]
    fn move_runs_until_within_tolerance() {
        let agent = Arc::new(Agent::new("scout", [0.0; 3]));
        let mut tree = bound(
            BehaviorTree::from_blueprint(sequence(vec![
                action(RandomPosition::new([4.0, 0.0], [4.0, 0.0])),
                action(MoveToPosition::default()),
            ])),
            &agent,
        );

        assert_eq!(tree.update().unwrap(), Status::Running);
        assert_eq!(agent.destination(), Some([4.0, 0.0, 0.0]));

        let mut frames = 0;
        while tree.update().unwrap().is_running() {
            agent.step(0.1);
            frames += 1;
            assert!(frames < 100, "agent never arrived");
        }
        assert_eq!(tree.state(), Some(Status::Success));
        assert!(agent.remaining_distance().unwrap() < 1.0);
    }
}
