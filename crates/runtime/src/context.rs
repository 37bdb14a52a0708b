//! Host capabilities that leaf behaviors act through.
//!
//! A tree instance is bound to one host entity. The entity is exposed to
//! leaves as a shared context; everything a leaf may do to the entity goes
//! through the traits below, which keeps the engine independent of any
//! particular physics or navigation system.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Debug-pause requests raised by leaves and honored by the host driver.
pub trait BreakSignal: Send + Sync {
    /// Asks the host to pause after the current tick.
    fn request_break(&self);

    /// Returns whether a break was requested since the last call, clearing
    /// the request.
    fn take_break(&self) -> bool;
}

/// Movement parameters applied when a destination is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Maximum speed in units per second.
    pub speed: f64,
    /// Distance at which the agent stops short of its destination.
    pub stopping_distance: f64,
    /// Maximum change of velocity in units per second squared.
    pub acceleration: f64,
}

impl Default for Steering {
    fn default() -> Self {
        Self {
            speed: 5.0,
            stopping_distance: 0.1,
            acceleration: 40.0,
        }
    }
}

/// A host entity that can be steered toward a destination.
pub trait AgentHost: BreakSignal {
    /// Starts moving toward `target` with the given steering parameters.
    fn set_destination(&self, target: [f64; 3], steering: Steering);

    /// Distance left to the destination, or `None` when no valid path to it
    /// exists.
    fn remaining_distance(&self) -> Option<f64>;
}

/// Kinematic point agent moving on the XZ plane.
///
/// The agent is shared between the tree that steers it and the host loop
/// that advances it with [`step`](Agent::step), so its state sits behind a
/// mutex.
#[derive(Debug)]
pub struct Agent {
    name: String,
    /// Half-width of the square area the agent can navigate, centered on the
    /// origin. Destinations outside of it have no valid path.
    extent: f64,
    motion: Mutex<Motion>,
    break_requested: AtomicBool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Motion {
    position: [f64; 3],
    velocity: [f64; 3],
    destination: Option<[f64; 3]>,
    steering: Steering,
}

impl Agent {
    pub fn new(name: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            extent: f64::INFINITY,
            motion: Mutex::new(Motion {
                position,
                ..Motion::default()
            }),
            break_requested: AtomicBool::new(false),
        }
    }

    /// Restricts navigation to `[-extent, extent]` on both axes.
    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> [f64; 3] {
        self.motion().position
    }

    pub fn destination(&self) -> Option<[f64; 3]> {
        self.motion().destination
    }

    /// Advances the agent by `dt` seconds.
    ///
    /// The velocity turns toward the destination at no more than the
    /// steering acceleration and is clamped to the steering speed. Inside
    /// the stopping distance the agent halts.
    pub fn step(&self, dt: f64) {
        let mut motion = self.motion();
        let Some(destination) = motion.destination else {
            return;
        };
        if !self.reachable(destination) {
            motion.velocity = [0.0; 3];
            return;
        }

        let offset = sub(destination, motion.position);
        let distance = length(offset);
        if distance <= motion.steering.stopping_distance {
            motion.velocity = [0.0; 3];
            return;
        }

        let Steering {
            speed,
            acceleration,
            ..
        } = motion.steering;
        let desired = scale(offset, speed / distance);
        let change = sub(desired, motion.velocity);
        let change_len = length(change);
        let max_change = acceleration * dt;
        let change = if change_len > max_change && change_len > 0.0 {
            scale(change, max_change / change_len)
        } else {
            change
        };

        let mut velocity = add(motion.velocity, change);
        let velocity_len = length(velocity);
        if velocity_len > speed {
            velocity = scale(velocity, speed / velocity_len);
        }

        let travel = scale(velocity, dt);
        // Never overshoot the destination within one step.
        motion.position = if length(travel) >= distance {
            velocity = [0.0; 3];
            destination
        } else {
            add(motion.position, travel)
        };
        motion.velocity = velocity;
    }

    fn reachable(&self, target: [f64; 3]) -> bool {
        target[0].abs() <= self.extent && target[2].abs() <= self.extent
    }

    fn motion(&self) -> MutexGuard<'_, Motion> {
        self.motion.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BreakSignal for Agent {
    fn request_break(&self) {
        self.break_requested.store(true, Ordering::SeqCst);
    }

    fn take_break(&self) -> bool {
        self.break_requested.swap(false, Ordering::SeqCst)
    }
}

impl AgentHost for Agent {
    fn set_destination(&self, target: [f64; 3], steering: Steering) {
        let mut motion = self.motion();
        motion.destination = Some(target);
        motion.steering = steering;
        tracing::debug!(
            "{} heading to ({:.2}, {:.2}, {:.2})",
            self.name,
            target[0],
            target[1],
            target[2]
        );
    }

    fn remaining_distance(&self) -> Option<f64> {
        let motion = self.motion();
        match motion.destination {
            Some(destination) if !self.reachable(destination) => None,
            Some(destination) => Some(length(sub(destination, motion.position))),
            None => Some(0.0),
        }
    }
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(v: [f64; 3], factor: f64) -> [f64; 3] {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

fn length(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
