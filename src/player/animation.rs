// SPDX-License-Identifier: MPL-2.0
//! Bar width animation.
//!
//! The control bar widths (played, buffered, volume) are springs chasing a
//! target fraction. The host drives them from its animation frame callback;
//! a [`FrameLoop`] tracks whether a frame is wanted so a cancelled loop never
//! touches the springs again.

use crate::config::{SPRING_FRICTION, SPRING_PRECISION, SPRING_TENSION};
use std::time::{Duration, Instant};

/// Integration step. Large frame gaps are split into steps of this size.
const STEP_SECS: f64 = 0.001;

/// Longest gap integrated in one frame; longer stalls snap forward.
const MAX_FRAME_SECS: f64 = 0.1;

/// Damped spring parameters, unit mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub tension: f64,
    pub friction: f64,
}

impl Spring {
    /// Quick settle with no visible overshoot.
    pub const STIFF: Self = Self {
        tension: SPRING_TENSION,
        friction: SPRING_FRICTION,
    };
}

impl Default for Spring {
    fn default() -> Self {
        Self::STIFF
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringValue {
    spring: Spring,
    value: f64,
    target: f64,
    velocity: f64,
}

impl SpringValue {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            spring: Spring::STIFF,
            value,
            target: value,
            velocity: 0.0,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Starts animating toward `target`. Non-finite targets are ignored.
    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Moves to `value` without animating.
    pub fn jump(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value;
            self.target = value;
            self.velocity = 0.0;
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < SPRING_PRECISION && self.velocity.abs() < SPRING_PRECISION
    }

    /// Integrates the spring over `dt`.
    pub fn step(&mut self, dt: Duration) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }
        let mut remaining = dt.as_secs_f64().min(MAX_FRAME_SECS);
        while remaining > 0.0 {
            let h = remaining.min(STEP_SECS);
            let force = -self.spring.tension * (self.value - self.target);
            let damping = -self.spring.friction * self.velocity;
            self.velocity += (force + damping) * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }
}

/// Animation frame request state for one loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameLoop {
    active: bool,
    last_frame: Option<Instant>,
}

impl FrameLoop {
    pub fn request(&mut self) {
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
        self.last_frame = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Consumes a frame. Returns the time since the previous frame, or
    /// `None` when the loop is not running.
    pub fn frame(&mut self, now: Instant) -> Option<Duration> {
        if !self.active {
            return None;
        }
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        Some(dt)
    }
}

/// Animated widths of the control bar, as fractions of their track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarAnimations {
    pub progress: SpringValue,
    pub buffer: SpringValue,
    pub volume: SpringValue,
}

impl BarAnimations {
    /// Widths start at their targets so the first paint is exact.
    #[must_use]
    pub fn new(progress: f64, buffer: f64, volume: f64) -> Self {
        Self {
            progress: SpringValue::new(progress),
            buffer: SpringValue::new(buffer),
            volume: SpringValue::new(volume),
        }
    }

    pub fn step(&mut self, dt: Duration) {
        self.progress.step(dt);
        self.buffer.step(dt);
        self.volume.step(dt);
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.progress.is_settled() && self.buffer.is_settled() && self.volume.is_settled()
    }
}

impl Default for BarAnimations {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}
