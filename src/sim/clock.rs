//! Frame clock
//!
//! Turns animation-frame timestamps into dimensionless simulation steps,
//! where 1.0 is one 60 Hz reference frame.

use crate::consts::{MAX_FRAME_MS, REFERENCE_FRAME_MS};

/// Converts wall-clock frame timestamps into clamped simulation steps
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    /// Timestamp (ms) of the previous frame; `None` until the first tick
    last_timestamp: Option<f64>,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now_ms` and return the step to simulate.
    ///
    /// The first call only records a baseline and returns 0. Backwards or
    /// non-finite timestamps yield 0; gaps longer than `MAX_FRAME_MS` are
    /// treated as exactly `MAX_FRAME_MS`.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            return 0.0;
        }

        let Some(last) = self.last_timestamp.replace(now_ms) else {
            return 0.0;
        };

        let delta = (now_ms - last).clamp(0.0, MAX_FRAME_MS);
        (delta / REFERENCE_FRAME_MS) as f32
    }

    /// Forget the baseline so the next tick is a zero step (resume after pause)
    pub fn resume(&mut self) {
        self.last_timestamp = None;
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }
}
