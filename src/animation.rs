//! Tick-driven tweens.
//!
//! A tween is an explicit state machine: start time, duration, easing, and an
//! update payload. The owner advances every live tween by calling
//! [`AnimationScheduler::tick`] with the current time from a [`Clock`]. Nothing
//! here waits on real frame timing, so tests drive time with a [`ManualClock`].
//!
//! Tweens are independent. Starting a tween that writes the same property as an
//! in-flight one does not supersede it: both keep writing on every tick until
//! each reaches its own end, and the last writer in a tick wins. Rapid repeated
//! triggers therefore jitter. Callers that need exclusivity must arrange it.

#[cfg(test)]
#[path = "animation_test.rs"]
mod animation_test;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

// =============================================================
// Easing
// =============================================================

/// Easing curve mapping normalized time `[0, 1]` to progress `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    Smoothstep,
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

// =============================================================
// Clocks
// =============================================================

/// Source of the current time in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: f64) -> Self {
        Self { now: Rc::new(Cell::new(start_ms)) }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

// =============================================================
// Tweens
// =============================================================

/// Per-tick behavior of a tween against some owner context `C`.
pub trait TweenUpdate<C> {
    /// Apply eased progress in `[0, 1]`.
    fn update(&mut self, ctx: &mut C, progress: f64);

    /// Called once, right after the final `update(ctx, 1.0)`.
    fn done(&mut self, _ctx: &mut C) {}
}

#[derive(Debug, Clone)]
pub struct Tween<U> {
    /// Sequence number, for tracing.
    pub id: u64,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
    pub update: U,
}

impl<U> Tween<U> {
    /// Elapsed time normalized to `[0, 1]`. Zero-length tweens are already complete.
    #[must_use]
    pub fn normalized(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Owns a set of concurrently running tweens of one payload type.
#[derive(Debug, Clone)]
pub struct AnimationScheduler<U> {
    tweens: Vec<Tween<U>>,
    next_id: u64,
}

impl<U> Default for AnimationScheduler<U> {
    fn default() -> Self {
        Self { tweens: Vec::new(), next_id: 0 }
    }
}

impl<U> AnimationScheduler<U> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tween starting at `now_ms`. It first updates on the next tick.
    pub fn start(&mut self, now_ms: f64, duration_ms: f64, easing: Easing, update: U) {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.tweens.push(Tween { id, start_ms: now_ms, duration_ms: duration_ms.max(0.0), easing, update });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advance every tween in start order; finished tweens run `done` and are dropped.
    ///
    /// Returns the number of tweens that were advanced.
    pub fn tick<C>(&mut self, now_ms: f64, ctx: &mut C) -> usize
    where
        U: TweenUpdate<C>,
    {
        let advanced = self.tweens.len();
        self.tweens.retain_mut(|tween| {
            let t = tween.normalized(now_ms);
            tween.update.update(ctx, tween.easing.apply(t));
            if t >= 1.0 {
                tween.update.done(ctx);
                tracing::trace!(tween = tween.id, "tween finished");
                false
            } else {
                true
            }
        });
        advanced
    }
}
