//! Dual Arcade - concurrent arcade mini-games sharing one score
//!
//! Core modules:
//! - `sim`: Deterministic simulation (sub-games, spawners, collisions, session)
//! - `scheduler`: Frame driver (clock -> tick -> render -> persist)
//! - `renderer`: Draw-list building and the Canvas2D painter
//! - `platform`: Browser input wiring and per-frame input snapshots
//! - `persistence`: Key-value storage (LocalStorage on web, memory elsewhere)
//! - `highscores` / `leaderboard`: Score bookkeeping outside the simulation
//! - `config`: Data-driven game balance

pub mod config;
pub mod error;
pub mod highscores;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod sim;

pub use config::GameConfig;
pub use highscores::HighScoreStore;
pub use scheduler::FrameScheduler;

/// Game configuration constants
pub mod consts {
    /// Duration of one reference frame (60 Hz), the unit of a simulation step
    pub const REFERENCE_FRAME_MS: f64 = 16.67;
    /// Longest wall-clock gap a single frame may simulate (tab backgrounding)
    pub const MAX_FRAME_MS: f64 = 100.0;
    /// Largest step a single frame can produce
    pub const MAX_STEP: f32 = (MAX_FRAME_MS / REFERENCE_FRAME_MS) as f32;

    /// Runner lanes, indexed 0 (left) to LANE_COUNT - 1 (right)
    pub const LANE_COUNT: u8 = 3;
    /// Runner snaps onto its lane once this close
    pub const SNAP_EPSILON: f32 = 1.0;

    /// Ignore restart requests this soon after game over
    pub const RESTART_DEBOUNCE_MS: f64 = 1000.0;

    /// Storage key for the persisted best combined score
    pub const HIGH_SCORE_KEY: &str = "dualChallengeHighScore";
}

/// Convert a millisecond interval into simulation steps
#[inline]
pub fn ms_to_steps(ms: f32) -> f32 {
    ms / consts::REFERENCE_FRAME_MS as f32
}

/// Exponential easing toward `target`; `rate * step` is clamped to 1 so a
/// long frame never overshoots.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, step: f32) -> f32 {
    let t = (rate * step).clamp(0.0, 1.0);
    current + (target - current) * t
}
