//! The reveal transition: the backdrop fades in over `duration` after an
//! initial `delay`, with `power2.inOut` easing.
//!
//! `Tween` is clock-free: the runtime feeds it `Instant`s through `tick`,
//! which is also how tests drive it.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::sync::{Direction, Timeline};

#[derive(Debug, Clone)]
pub struct Tween {
    duration: Duration,
    delay: Duration,
    /// Linear progress in `0.0..=1.0`.
    progress: f32,
    direction: Direction,
    running: bool,
    started: bool,
    delay_left: Duration,
    last_tick: Option<Instant>,
}

impl Tween {
    pub fn new(duration: Duration, delay: Duration) -> Self {
        Self {
            duration,
            delay,
            progress: 0.0,
            direction: Direction::Forward,
            running: false,
            started: false,
            delay_left: Duration::ZERO,
            last_tick: None,
        }
    }

    /// Eased opacity of the backdrop.
    pub fn opacity(&self) -> f32 {
        ease_power2_in_out(self.progress)
    }

    /// Play towards the end. The delay only applies to the very first run;
    /// use `restart` to replay it.
    pub fn play_forward(&mut self) {
        self.delay_left = if self.started {
            Duration::ZERO
        } else {
            self.delay
        };
        self.started = true;
        self.direction = Direction::Forward;
        self.running = true;
    }

    /// Play back towards the start from wherever the tween is.
    pub fn reverse(&mut self) {
        self.delay_left = Duration::ZERO;
        self.direction = Direction::Reverse;
        self.running = true;
    }

    /// Jump to the start and play forward again, delay included.
    pub fn restart(&mut self) {
        self.progress = 0.0;
        self.started = true;
        self.delay_left = self.delay;
        self.direction = Direction::Forward;
        self.running = true;
    }

    /// Advance to `now`. Returns the direction of a run that completed
    /// during this tick.
    pub fn tick(&mut self, now: Instant) -> Option<Direction> {
        let mut dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);

        if !self.running {
            return None;
        }

        if !self.delay_left.is_zero() {
            if dt < self.delay_left {
                self.delay_left -= dt;
                return None;
            }
            dt -= self.delay_left;
            self.delay_left = Duration::ZERO;
        }

        let step = if self.duration.is_zero() {
            1.0
        } else {
            dt.as_secs_f32() / self.duration.as_secs_f32()
        };

        let done = match self.direction {
            Direction::Forward => {
                self.progress = (self.progress + step).min(1.0);
                self.progress >= 1.0
            }
            Direction::Reverse => {
                self.progress = (self.progress - step).max(0.0);
                self.progress <= 0.0
            }
        };

        if done {
            self.running = false;
            Some(self.direction)
        } else {
            None
        }
    }
}

/// `power2.inOut`: quadratic ease-in for the first half, ease-out after.
pub fn ease_power2_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

pub type TweenHandle = Arc<Mutex<Tween>>;

/// `Timeline` over a tween shared with the runtime (which ticks it) and the
/// UI (which reads its opacity).
pub struct SharedTimeline {
    tween: TweenHandle,
}

impl SharedTimeline {
    pub fn new(tween: TweenHandle) -> Self {
        Self { tween }
    }
}

impl Timeline for SharedTimeline {
    fn play_forward(&mut self) {
        if let Ok(mut t) = self.tween.lock() {
            t.play_forward();
        }
    }

    fn reverse(&mut self) {
        if let Ok(mut t) = self.tween.lock() {
            t.reverse();
        }
    }

    fn restart(&mut self) {
        if let Ok(mut t) = self.tween.lock() {
            t.restart();
        }
    }
}
