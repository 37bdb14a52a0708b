//! Leaf extension points.
//!
//! This module defines the [`Action`] trait, the only open-ended node family
//! of the engine, and the [`Predicate`] trait used by conditional gates.
//! Both are generic over a context type `C` and a blackboard type `B`,
//! allowing leaves to reach host capabilities and shared scratch data.

use std::fmt;

use crate::{Scope, Status};

/// A leaf behavior that can be ticked as part of a tree.
///
/// Only [`on_update`](Action::on_update) is required. The engine guarantees
/// that `on_start` and `on_stop` are strictly paired: `on_stop` fires exactly
/// once after every `on_start`, either when `on_update` returns a terminal
/// status or when the running node is aborted.
pub trait Action<C: ?Sized, B>: ActionClone<C, B> + Send + Sync {
    /// Display name used by logs and state queries.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// Called once when the owning tree instance is bound to its context.
    fn on_bind(&mut self, _context: &C) {}

    /// Called before the first update of a run.
    fn on_start(&mut self, _scope: &mut Scope<'_, C, B>) {}

    /// Evaluate this behavior for the current tick.
    ///
    /// # Returns
    ///
    /// - `Status::Running` if the behavior needs more ticks
    /// - `Status::Success` if the behavior succeeded
    /// - `Status::Failure` if the behavior failed
    fn on_update(&mut self, scope: &mut Scope<'_, C, B>) -> Status;

    /// Called once when a run ends, by completion or by abort.
    fn on_stop(&mut self, _scope: &mut Scope<'_, C, B>) {}
}

/// Object-safe cloning for boxed actions.
///
/// Implemented for every `Action` that is `Clone`, so concrete leaves only
/// need `#[derive(Clone)]` to be instantiable.
pub trait ActionClone<C: ?Sized, B> {
    fn box_clone(&self) -> Box<dyn Action<C, B>>;
}

impl<C: ?Sized, B, T> ActionClone<C, B> for T
where
    T: Action<C, B> + Clone + 'static,
{
    fn box_clone(&self) -> Box<dyn Action<C, B>> {
        Box::new(self.clone())
    }
}

impl<C: ?Sized, B> Clone for Box<dyn Action<C, B>> {
    fn clone(&self) -> Self {
        ActionClone::box_clone(self.as_ref())
    }
}

impl<C: ?Sized, B> fmt::Debug for dyn Action<C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.name()).finish()
    }
}

/// Decides whether a conditional gate lets its child run this tick.
pub trait Predicate<C: ?Sized, B>: PredicateClone<C, B> + Send + Sync {
    fn is_updatable(&self, scope: &Scope<'_, C, B>) -> bool;
}

/// Object-safe cloning for boxed predicates.
pub trait PredicateClone<C: ?Sized, B> {
    fn box_clone(&self) -> Box<dyn Predicate<C, B>>;
}

impl<C: ?Sized, B, T> PredicateClone<C, B> for T
where
    T: Predicate<C, B> + Clone + 'static,
{
    fn box_clone(&self) -> Box<dyn Predicate<C, B>> {
        Box::new(self.clone())
    }
}

impl<C: ?Sized, B> Clone for Box<dyn Predicate<C, B>> {
    fn clone(&self) -> Self {
        PredicateClone::box_clone(self.as_ref())
    }
}

/// Closures are predicates.
impl<C: ?Sized, B, F> Predicate<C, B> for F
where
    F: Fn(&Scope<'_, C, B>) -> bool + Clone + Send + Sync + 'static,
{
    #[inline]
    fn is_updatable(&self, scope: &Scope<'_, C, B>) -> bool {
        self(scope)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
