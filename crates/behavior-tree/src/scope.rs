//! Per-tick view of the shared resources of one tree instance.
//!
//! Nodes never hold a reference back to their tree. During a tick the tree
//! lends its blackboard, context, clock and random source to the node being
//! evaluated through a [`Scope`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;

/// Source of the current time for timers such as `Timeout` or `Wait`.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Monotonic wall clock measured from its creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock.
///
/// Clones share the same time, so a simulation can hand one copy to every
/// tree instance and advance them all at once.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `delta`, stopping at the largest
    /// representable time.
    pub fn advance(&self, delta: Duration) {
        let delta = saturating_nanos(delta);
        // The closure never returns `None`, so the update cannot fail.
        let _ = self
            .nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |nanos| {
                Some(nanos.saturating_add(delta))
            });
    }

    /// Jumps the clock to an absolute time.
    pub fn set(&self, now: Duration) {
        self.nanos.store(saturating_nanos(now), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Shared resources lent to a node while it is ticked.
///
/// Every node of one tree instance sees the same blackboard and context.
/// Only one tick is ever in flight for an instance, so the blackboard is
/// handed out mutably without locking.
pub struct Scope<'a, C: ?Sized, B> {
    blackboard: &'a mut B,
    context: &'a C,
    clock: &'a dyn Clock,
    rng: &'a mut StdRng,
}

impl<'a, C: ?Sized, B> Scope<'a, C, B> {
    pub fn new(
        blackboard: &'a mut B,
        context: &'a C,
        clock: &'a dyn Clock,
        rng: &'a mut StdRng,
    ) -> Self {
        Self {
            blackboard,
            context,
            clock,
            rng,
        }
    }

    /// Read access to the instance blackboard.
    #[inline]
    pub fn blackboard(&self) -> &B {
        &*self.blackboard
    }

    /// Write access to the instance blackboard.
    #[inline]
    pub fn blackboard_mut(&mut self) -> &mut B {
        &mut *self.blackboard
    }

    /// The host-entity context the tree was bound to.
    #[inline]
    pub fn context(&self) -> &C {
        self.context
    }

    /// Current time reported by the tree's clock.
    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Pseudo-random source of this tree instance.
    #[inline]
    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }
}
