//! Decorator behavior nodes.
//!
//! Decorators wrap a single child and transform its result or gate its
//! execution. The root node is the identity decorator and lives in
//! [`NodeKind::Root`](crate::NodeKind::Root); everything else is a
//! [`DecoratorPolicy`].

use std::time::Duration;

use crate::arena::Arena;
use crate::{NodeId, NodeKind, Predicate, Scope, Status};

/// Result-transformation or gating policy of a decorator node.
pub enum DecoratorPolicy<C: ?Sized, B> {
    /// Inverts the result of its child.
    ///
    /// - `Success` becomes `Failure`
    /// - `Failure` becomes `Success`
    /// - `Running` stays `Running`
    ///
    /// This is analogous to a logical NOT (!) operation.
    Inverter,

    /// Turns a child `Failure` into `Success`.
    ///
    /// Useful for optional behaviors that shouldn't cause a sequence to fail.
    Succeed,

    /// Turns a child `Success` into `Failure`.
    ForceFailure,

    /// Restarts the child when it ends with an outcome whose flag is set.
    ///
    /// A restarted outcome is reported as `Running`, and the child gets a
    /// fresh `on_start` on the next tick. Outcomes whose flag is clear pass
    /// through and end the repeat.
    Repeat {
        restart_on_success: bool,
        restart_on_failure: bool,
    },

    /// Fails once the run has lasted longer than a fixed duration.
    Timeout(Timeout),

    /// Runs the child only while a predicate allows it.
    Conditional(Gate<C, B>),
}

impl<C: ?Sized, B> DecoratorPolicy<C, B> {
    /// Repeat on success, stop on failure.
    pub fn repeat() -> Self {
        DecoratorPolicy::Repeat {
            restart_on_success: true,
            restart_on_failure: false,
        }
    }

    pub fn timeout(duration: Duration) -> Self {
        DecoratorPolicy::Timeout(Timeout::new(duration))
    }

    pub fn conditional(predicate: impl Predicate<C, B> + 'static) -> Self {
        DecoratorPolicy::Conditional(Gate::new(predicate))
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecoratorPolicy::Inverter => "Inverter",
            DecoratorPolicy::Succeed => "Succeed",
            DecoratorPolicy::ForceFailure => "Failure",
            DecoratorPolicy::Repeat { .. } => "Repeat",
            DecoratorPolicy::Timeout(_) => "Timeout",
            DecoratorPolicy::Conditional(_) => "Conditional",
        }
    }

    fn fresh_copy(&self) -> Self {
        match self {
            DecoratorPolicy::Inverter => DecoratorPolicy::Inverter,
            DecoratorPolicy::Succeed => DecoratorPolicy::Succeed,
            DecoratorPolicy::ForceFailure => DecoratorPolicy::ForceFailure,
            DecoratorPolicy::Repeat {
                restart_on_success,
                restart_on_failure,
            } => DecoratorPolicy::Repeat {
                restart_on_success: *restart_on_success,
                restart_on_failure: *restart_on_failure,
            },
            DecoratorPolicy::Timeout(timeout) => DecoratorPolicy::Timeout(Timeout::new(timeout.duration)),
            DecoratorPolicy::Conditional(gate) => DecoratorPolicy::Conditional(gate.fresh_copy()),
        }
    }
}

/// Timer state of a [`DecoratorPolicy::Timeout`].
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    duration: Duration,
    started_at: Duration,
}

impl Timeout {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) > self.duration
    }
}

/// Predicate gate of a [`DecoratorPolicy::Conditional`].
///
/// Without a child the gate is a plain condition: `Success` when the
/// predicate holds, `Failure` otherwise.
pub struct Gate<C: ?Sized, B> {
    predicate: Box<dyn Predicate<C, B>>,
    /// Check the predicate again while the child is still running instead of
    /// ticking it through to completion.
    reevaluate_while_running: bool,
    child_running: bool,
}

impl<C: ?Sized, B> Gate<C, B> {
    pub fn new(predicate: impl Predicate<C, B> + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            reevaluate_while_running: false,
            child_running: false,
        }
    }

    pub fn reevaluate_while_running(mut self, reevaluate: bool) -> Self {
        self.reevaluate_while_running = reevaluate;
        self
    }

    fn can_update(&self, scope: &Scope<'_, C, B>) -> bool {
        (self.child_running && !self.reevaluate_while_running) || self.predicate.is_updatable(scope)
    }

    fn fresh_copy(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            reevaluate_while_running: self.reevaluate_while_running,
            child_running: false,
        }
    }
}

/// A node with exactly one owned child.
///
/// The child is optional only while a tree is being authored; ticking a
/// decorator without a child fails.
pub struct Decorator<C: ?Sized, B> {
    policy: DecoratorPolicy<C, B>,
    pub(crate) child: Option<NodeId>,
}

impl<C: ?Sized, B> Decorator<C, B> {
    pub fn new(policy: DecoratorPolicy<C, B>) -> Self {
        Self {
            policy,
            child: None,
        }
    }

    pub fn policy(&self) -> &DecoratorPolicy<C, B> {
        &self.policy
    }

    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    pub(crate) fn fresh_copy(&self) -> Self {
        Self {
            policy: self.policy.fresh_copy(),
            child: self.child,
        }
    }

    pub(crate) fn on_start(&mut self, scope: &mut Scope<'_, C, B>) {
        if let DecoratorPolicy::Timeout(timeout) = &mut self.policy {
            timeout.started_at = scope.now();
        }
    }

    pub(crate) fn on_stop(&mut self) {
        if let DecoratorPolicy::Conditional(gate) = &mut self.policy {
            gate.child_running = false;
        }
    }
}

impl<C: ?Sized, B> Arena<C, B> {
    pub(crate) fn update_decorator(&mut self, id: NodeId, scope: &mut Scope<'_, C, B>) -> Status {
        let Some(decorator) = self.decorator(id) else {
            return Status::Failure;
        };
        let child = decorator.child;

        match &decorator.policy {
            DecoratorPolicy::Inverter => self.tick_child(id, child, scope).invert(),
            DecoratorPolicy::Succeed => match self.tick_child(id, child, scope) {
                Status::Failure => Status::Success,
                status => status,
            },
            DecoratorPolicy::ForceFailure => match self.tick_child(id, child, scope) {
                Status::Success => Status::Failure,
                status => status,
            },
            DecoratorPolicy::Repeat {
                restart_on_success,
                restart_on_failure,
            } => {
                let (on_success, on_failure) = (*restart_on_success, *restart_on_failure);
                match self.tick_child(id, child, scope) {
                    Status::Success if on_success => Status::Running,
                    Status::Failure if on_failure => Status::Running,
                    status => status,
                }
            }
            DecoratorPolicy::Timeout(timeout) => {
                if timeout.expired(scope.now()) {
                    if let Some(child) = child {
                        self.abort(child, scope);
                    }
                    return Status::Failure;
                }
                self.tick_child(id, child, scope)
            }
            DecoratorPolicy::Conditional(gate) => {
                let open = gate.can_update(scope);
                let Some(child) = child else {
                    return if open { Status::Success } else { Status::Failure };
                };
                if !open {
                    self.abort(child, scope);
                    return Status::Failure;
                }

                let status = self.tick(child, scope);
                if let Some(gate) = self.gate_mut(id) {
                    gate.child_running = status.is_running();
                }
                status
            }
        }
    }

    fn decorator(&self, id: NodeId) -> Option<&Decorator<C, B>> {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Decorator(decorator)) => Some(decorator),
            _ => None,
        }
    }

    fn gate_mut(&mut self, id: NodeId) -> Option<&mut Gate<C, B>> {
        match self.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Decorator(Decorator {
                policy: DecoratorPolicy::Conditional(gate),
                ..
            })) => Some(gate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::builder::{
        action, condition, conditional, force_failure, inverter, repeat_with, succeed, timeout,
    };
    use crate::{Action, BehaviorTree, Blackboard, ManualClock, Scope, Status};

    struct TestContext;

    /// Plays back a script of statuses, one per update, and counts updates.
    #[derive(Clone)]
    struct Script {
        statuses: Vec<Status>,
        updates: Arc<AtomicUsize>,
    }

    impl Script {
        fn new(statuses: Vec<Status>) -> (Self, Arc<AtomicUsize>) {
            let updates = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    statuses,
                    updates: Arc::clone(&updates),
                },
                updates,
            )
        }
    }

    impl Action<TestContext, Blackboard> for Script {
        fn on_update(&mut self, _scope: &mut Scope<'_, TestContext, Blackboard>) -> Status {
            let n = self.updates.fetch_add(1, Ordering::SeqCst);
            self.statuses[n.min(self.statuses.len() - 1)]
        }
    }

    fn bound(tree: BehaviorTree<TestContext>) -> BehaviorTree<TestContext> {
        let mut tree = tree;
        tree.bind(Arc::new(TestContext)).unwrap();
        tree
    }

    fn single(status: Status) -> Script {
        Script::new(vec![status]).0
    }

    #[test]
    fn inverter_inverts_every_status() {
        for (child, expected) in [
            (Status::Success, Status::Failure),
            (Status::Failure, Status::Success),
            (Status::Running, Status::Running),
        ] {
            let mut tree = bound(BehaviorTree::from_blueprint(inverter(action(single(child)))));
            assert_eq!(tree.update().unwrap(), expected);
        }
    }

    #[test]
    fn succeed_and_force_failure() {
        let mut tree = bound(BehaviorTree::from_blueprint(succeed(action(single(Status::Failure)))));
        assert_eq!(tree.update().unwrap(), Status::Success);

        let mut tree = bound(BehaviorTree::from_blueprint(succeed(action(single(Status::Running)))));
        assert_eq!(tree.update().unwrap(), Status::Running);

        let mut tree =
            bound(BehaviorTree::from_blueprint(force_failure(action(single(Status::Success)))));
        assert_eq!(tree.update().unwrap(), Status::Failure);

        let mut tree =
            bound(BehaviorTree::from_blueprint(force_failure(action(single(Status::Failure)))));
        assert_eq!(tree.update().unwrap(), Status::Failure);
    }

    #[test]
    fn repeat_restarts_on_success_only_by_default() {
        let (script, updates) =
            Script::new(vec![Status::Success, Status::Success, Status::Failure]);
        let mut tree =
            bound(BehaviorTree::from_blueprint(repeat_with(true, false, action(script))));

        assert_eq!(tree.update().unwrap(), Status::Running);
        assert_eq!(tree.update().unwrap(), Status::Running);
        assert_eq!(tree.update().unwrap(), Status::Failure);
        assert_eq!(updates.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn repeat_can_restart_on_failure() {
        let (script, _) = Script::new(vec![Status::Failure, Status::Failure, Status::Success]);
        let mut tree =
            bound(BehaviorTree::from_blueprint(repeat_with(false, true, action(script))));

        assert_eq!(tree.update().unwrap(), Status::Running);
        assert_eq!(tree.update().unwrap(), Status::Running);
        assert_eq!(tree.update().unwrap(), Status::Success);
    }

    #[test]
    fn timeout_fails_without_ticking_child_once_expired() {
        let clock = ManualClock::new();
        let (script, updates) = Script::new(vec![Status::Running]);
        let mut tree = BehaviorTree::from_blueprint(timeout(Duration::from_secs(1), action(script)))
            .with_clock(Arc::new(clock.clone()));
        tree.bind(Arc::new(TestContext)).unwrap();

        assert_eq!(tree.update().unwrap(), Status::Running);
        clock.set(Duration::from_millis(500));
        assert_eq!(tree.update().unwrap(), Status::Running);
        clock.set(Duration::from_millis(1500));
        assert_eq!(tree.update().unwrap(), Status::Failure);

        assert_eq!(updates.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn condition_without_child_reports_predicate() {
        let mut yes = bound(BehaviorTree::from_blueprint(condition(|_: &Scope<'_, TestContext, Blackboard>| true)));
        let mut no = bound(BehaviorTree::from_blueprint(condition(|_: &Scope<'_, TestContext, Blackboard>| false)));

        assert_eq!(yes.update().unwrap(), Status::Success);
        assert_eq!(no.update().unwrap(), Status::Failure);
    }

    #[test]
    fn closed_gate_fails_without_ticking_child() {
        let (script, updates) = Script::new(vec![Status::Success]);
        let mut tree = bound(BehaviorTree::from_blueprint(conditional(
            |scope: &Scope<'_, TestContext, Blackboard>| {
                scope.blackboard().get_bool("open").unwrap_or(false)
            },
            false,
            action(script),
        )));

        assert_eq!(tree.update().unwrap(), Status::Failure);
        assert_eq!(updates.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn running_child_is_ticked_through_unless_reevaluated() {
        for (reevaluate, expected) in [(false, Status::Success), (true, Status::Failure)] {
            let (script, _) = Script::new(vec![Status::Running, Status::Success]);
            let mut tree = bound(BehaviorTree::from_blueprint(conditional(
                |scope: &Scope<'_, TestContext, Blackboard>| {
                    scope.blackboard().get_bool("open").unwrap_or(false)
                },
                reevaluate,
                action(script),
            )));

            tree.blackboard_mut().set("open", true);
            assert_eq!(tree.update().unwrap(), Status::Running);

            tree.blackboard_mut().set("open", false);
            assert_eq!(tree.update().unwrap(), expected);

            // The child never stays started behind a closed gate.
            let child = tree.descendants(tree.root())[2];
            assert!(!tree.is_node_started(child));
        }
    }
}
