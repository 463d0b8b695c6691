//! Input collection
//!
//! Browser events arrive between frames; `InputState` folds them into intents
//! and hands the simulation one `TickInput` per frame.

use crate::sim::{Steer, TickInput};

/// Minimum horizontal travel (px) for a touch to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 30.0;
/// Device tilt (degrees) that maps to a full paddle deflection
pub const FULL_TILT_DEGREES: f32 = 30.0;

/// Input intents accumulated since the last snapshot
#[derive(Debug, Clone, Default)]
pub struct InputState {
    jump: bool,
    move_left: u32,
    move_right: u32,
    steer_left: bool,
    steer_right: bool,
    /// Most recent steering source; persists across frames
    steer: Option<Steer>,
    swipe_start_x: Option<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press by `KeyboardEvent.code`; returns whether it was used
    pub fn key_down(&mut self, code: &str) -> bool {
        match code {
            "Space" => self.jump = true,
            "KeyA" | "ArrowLeft" => self.move_left += 1,
            "KeyD" | "ArrowRight" => self.move_right += 1,
            "KeyX" => {
                self.steer_left = true;
                self.sync_keys();
            }
            "KeyV" => {
                self.steer_right = true;
                self.sync_keys();
            }
            _ => return false,
        }
        true
    }

    pub fn key_up(&mut self, code: &str) {
        match code {
            "KeyX" => self.steer_left = false,
            "KeyV" => self.steer_right = false,
            _ => return,
        }
        if matches!(self.steer, Some(Steer::Keys { .. })) {
            self.sync_keys();
        }
    }

    fn sync_keys(&mut self) {
        self.steer = Some(Steer::Keys {
            left: self.steer_left,
            right: self.steer_right,
        });
    }

    /// Left half of the screen jumps, right half starts a swipe
    pub fn touch_start(&mut self, x: f32, viewport_width: f32) {
        if x < viewport_width / 2.0 {
            self.jump = true;
        } else {
            self.swipe_start_x = Some(x);
        }
    }

    /// Finish a right-half swipe; returns whether it changed lanes
    pub fn touch_end(&mut self, x: f32, viewport_width: f32) -> bool {
        let Some(start) = self.swipe_start_x.take() else {
            return false;
        };
        if x < viewport_width / 2.0 {
            return false;
        }
        let dx = x - start;
        if dx.abs() <= SWIPE_THRESHOLD {
            return false;
        }
        if dx > 0.0 {
            self.move_right += 1;
        } else {
            self.move_left += 1;
        }
        true
    }

    /// Record a device tilt reading (degrees); zero or NaN readings are ignored
    pub fn tilt(&mut self, degrees: f32) {
        if degrees == 0.0 || !degrees.is_finite() {
            return;
        }
        self.steer = Some(Steer::Tilt((degrees / FULL_TILT_DEGREES).clamp(-1.0, 1.0)));
    }

    /// Intents for the coming frame; one-shot intents are consumed
    pub fn take_snapshot(&mut self) -> TickInput {
        let snapshot = TickInput {
            jump: self.jump,
            move_left: self.move_left,
            move_right: self.move_right,
            steer: self.steer,
        };
        self.jump = false;
        self.move_left = 0;
        self.move_right = 0;
        snapshot
    }

    /// Drop everything (new run)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Pick the tilt axis for the current screen orientation (degrees)
///
/// Landscape swaps the axes: `beta` is lateral at 90, negated at -90/270.
pub fn lateral_tilt(beta: f32, gamma: f32, screen_angle: i32) -> f32 {
    match screen_angle {
        90 => beta,
        -90 | 270 => -beta,
        _ => gamma,
    }
}
