//! Spawn cadence
//!
//! Timers accumulate simulation steps rather than reading the wall clock, so
//! spawn rates do not drift with frame rate and replays are deterministic.

use serde::{Deserialize, Serialize};

use crate::ms_to_steps;

/// Fires once every `interval` steps, carrying any overshoot into the next cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTimer {
    interval: f32,
    elapsed: f32,
}

impl SpawnTimer {
    pub fn from_millis(interval_ms: f32) -> Self {
        Self {
            interval: ms_to_steps(interval_ms),
            elapsed: 0.0,
        }
    }

    /// Accumulate `step` and return how many spawns are due
    pub fn advance(&mut self, step: f32) -> u32 {
        self.elapsed += step.max(0.0);
        let mut due = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            due += 1;
        }
        due
    }

    /// Restart the cycle ("last spawn was now")
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// What a phase-locked spawner wants spawned this step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnDue {
    pub obstacles: u32,
    pub pickups: u32,
}

/// Obstacle timer with one pickup locked to the midpoint of every cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseLockedSpawner {
    timer: SpawnTimer,
    /// Whether this cycle's pickup has already been released
    pickup_released: bool,
}

impl PhaseLockedSpawner {
    pub fn from_millis(interval_ms: f32) -> Self {
        Self {
            timer: SpawnTimer::from_millis(interval_ms),
            pickup_released: false,
        }
    }

    pub fn advance(&mut self, step: f32) -> SpawnDue {
        let mut due = SpawnDue::default();
        let interval = self.timer.interval;
        let half = interval / 2.0;

        self.timer.elapsed += step.max(0.0);
        loop {
            if !self.pickup_released && self.timer.elapsed >= half {
                self.pickup_released = true;
                due.pickups += 1;
            }
            if self.timer.elapsed >= interval {
                self.timer.elapsed -= interval;
                self.pickup_released = false;
                due.obstacles += 1;
                continue;
            }
            break;
        }
        due
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.pickup_released = false;
    }
}
