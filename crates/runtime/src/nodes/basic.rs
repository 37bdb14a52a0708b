//! Context-independent leaves.

use std::time::Duration;

use behavior_tree::{Action, Scope, Status};
use rand::Rng;

use crate::context::BreakSignal;

/// Logs a message and succeeds.
#[derive(Debug, Clone)]
pub struct Log {
    message: String,
}

impl Log {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<C: ?Sized, B> Action<C, B> for Log {
    fn on_update(&mut self, _scope: &mut Scope<'_, C, B>) -> Status {
        tracing::info!("{}", self.message);
        Status::Success
    }
}

/// Keeps running until `duration` has passed since the run started.
#[derive(Debug, Clone)]
pub struct Wait {
    duration: Duration,
    started_at: Duration,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for Wait {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl<C: ?Sized, B> Action<C, B> for Wait {
    fn on_start(&mut self, scope: &mut Scope<'_, C, B>) {
        self.started_at = scope.now();
    }

    fn on_update(&mut self, scope: &mut Scope<'_, C, B>) -> Status {
        if scope.now().saturating_sub(self.started_at) > self.duration {
            Status::Success
        } else {
            Status::Running
        }
    }
}

/// Draws a uniform value in `[0, 1)` and fails when it exceeds
/// `chance_of_failure`.
#[derive(Debug, Clone)]
pub struct RandomFailure {
    chance_of_failure: f64,
}

impl RandomFailure {
    /// `chance_of_failure` is clamped to `[0, 1]`.
    pub fn new(chance_of_failure: f64) -> Self {
        Self {
            chance_of_failure: chance_of_failure.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomFailure {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl<C: ?Sized, B> Action<C, B> for RandomFailure {
    fn on_update(&mut self, scope: &mut Scope<'_, C, B>) -> Status {
        let value: f64 = scope.rng().gen_range(0.0..1.0);
        if value > self.chance_of_failure {
            Status::Failure
        } else {
            Status::Success
        }
    }
}

/// Asks the host to pause when started, then succeeds.
#[derive(Debug, Clone, Default)]
pub struct Breakpoint;

impl<C: BreakSignal + ?Sized, B> Action<C, B> for Breakpoint {
    fn on_start(&mut self, scope: &mut Scope<'_, C, B>) {
        tracing::info!("triggering breakpoint");
        scope.context().request_break();
    }

    fn on_update(&mut self, _scope: &mut Scope<'_, C, B>) -> Status {
        Status::Success
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use behavior_tree::builder::{action, sequence};
    use behavior_tree::{BehaviorTree, Blackboard, ManualClock};

    use super::*;

    #[derive(Default)]
    struct Host {
        paused: AtomicBool,
    }

    impl BreakSignal for Host {
        fn request_break(&self) {
            self.paused.store(true, Ordering::SeqCst);
        }

        fn take_break(&self) -> bool {
            self.paused.swap(false, Ordering::SeqCst)
        }
    }

    fn bound(tree: BehaviorTree<Host, Blackboard>) -> (BehaviorTree<Host, Blackboard>, Arc<Host>) {
        let host = Arc::new(Host::default());
        let mut tree = tree.with_seed(5);
        tree.bind(Arc::clone(&host)).unwrap();
        (tree, host)
    }

    #[test]
    fn wait_succeeds_strictly_after_its_duration() {
        let clock = ManualClock::new();
        let (mut tree, _) = bound(
            BehaviorTree::from_blueprint(action(Wait::new(Duration::from_secs(1))))
                .with_clock(Arc::new(clock.clone())),
        );

        assert_eq!(tree.update().unwrap(), Status::Running);
        clock.set(Duration::from_secs(1));
        assert_eq!(tree.update().unwrap(), Status::Running);
        clock.set(Duration::from_millis(1001));
        assert_eq!(tree.update().unwrap(), Status::Success);
    }

    #[test]
    fn random_failure_extremes() {
        let (mut never, _) = bound(BehaviorTree::from_blueprint(action(RandomFailure::new(1.0))));
        let (mut always, _) = bound(BehaviorTree::from_blueprint(action(RandomFailure::new(-3.0))));

        for _ in 0..20 {
            assert_eq!(never.update().unwrap(), Status::Success);
            assert!(never.reset_state());
        }
        for _ in 0..20 {
            assert_eq!(always.update().unwrap(), Status::Failure);
            assert!(always.reset_state());
        }
    }

    #[test]
    fn breakpoint_requests_a_break_and_succeeds() {
        let (mut tree, host) = bound(BehaviorTree::from_blueprint(sequence(vec![
            action(Log::new("before break")),
            action(Breakpoint),
        ])));

        assert_eq!(tree.update().unwrap(), Status::Success);
        assert!(host.take_break());
    }
}
