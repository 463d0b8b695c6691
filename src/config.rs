//! Game balance configuration
//!
//! Immutable input to the simulation: built once (defaults or JSON) and handed
//! to the session at construction. Every field has a default, so a JSON file
//! only needs the values it wants to change.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Flyer sub-game (side-scrolling columns with a gap)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerConfig {
    pub playfield_width: f32,
    pub playfield_height: f32,
    /// Height of the ground strip at the bottom of the playfield
    pub ground_height: f32,
    pub x: f32,
    pub start_y: f32,
    pub radius: f32,
    pub gravity: f32,
    /// Velocity set by a jump (negative = up)
    pub jump_impulse: f32,
    /// Upper velocity bound (terminal fall speed in y-down coordinates)
    pub max_velocity: f32,
    pub column_speed: f32,
    pub column_spawn_interval_ms: f32,
    pub column_width: f32,
    pub gap_size: f32,
    pub min_gap_offset: f32,
    pub max_gap_offset: f32,
    /// Inward tolerance on the flyer's hitbox
    pub collision_padding: f32,
    pub points_per_column: u64,
}

impl Default for FlyerConfig {
    fn default() -> Self {
        Self {
            playfield_width: 600.0,
            playfield_height: 800.0,
            ground_height: 100.0,
            x: 150.0,
            start_y: 300.0,
            radius: 22.0,
            gravity: 0.4,
            jump_impulse: -9.0,
            max_velocity: 12.0,
            column_speed: 3.0,
            column_spawn_interval_ms: 1800.0,
            column_width: 80.0,
            gap_size: 200.0,
            min_gap_offset: 100.0,
            max_gap_offset: 400.0,
            collision_padding: 4.0,
            points_per_column: 3,
        }
    }
}

impl FlyerConfig {
    /// Top of the ground strip; touching it is fatal
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.playfield_height - self.ground_height
    }
}

/// Three-lane runner sub-game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub lane_width: f32,
    pub player_y: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Fraction of the remaining lane distance covered per step
    pub lane_damping: f32,
    pub obstacle_speed: f32,
    pub obstacle_spawn_interval_ms: f32,
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub pickup_speed: f32,
    pub pickup_size: f32,
    /// Margin shaved off obstacle hit tests
    pub forgiveness: f32,
    pub points_per_dodge: u64,
    pub points_per_pickup: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            playfield_width: 600.0,
            playfield_height: 800.0,
            lane_width: 150.0,
            player_y: 550.0,
            player_width: 50.0,
            player_height: 70.0,
            lane_damping: 0.3,
            obstacle_speed: 8.0,
            obstacle_spawn_interval_ms: 1200.0,
            obstacle_width: 60.0,
            obstacle_height: 80.0,
            pickup_speed: 8.0,
            pickup_size: 30.0,
            forgiveness: 10.0,
            points_per_dodge: 1,
            points_per_pickup: 1,
        }
    }
}

/// Ball-and-paddle sub-game (court in the x/depth plane, centered on 0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub court_width: f32,
    /// Depth of the court; the player defends +depth/2, the AI -depth/2
    pub court_height: f32,
    pub paddle_width: f32,
    pub paddle_depth: f32,
    pub ball_radius: f32,
    /// Initial depth-axis speed per step
    pub initial_ball_speed: f32,
    pub paddle_bounce_speed_multiplier: f32,
    /// Width of the random x-velocity range at serve
    pub serve_spread: f32,
    /// Extra x-velocity per unit of hit offset from paddle center
    pub deflection: f32,
    pub player_easing: f32,
    pub ai_easing: f32,
    /// AI paddle never tracks beyond +/- this x
    pub ai_range: f32,
    /// Target movement per step while a steering key is held
    pub key_step: f32,
    pub points_per_return: u64,
    pub points_per_goal: u64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            court_width: 10.0,
            court_height: 20.0,
            paddle_width: 3.0,
            paddle_depth: 0.5,
            ball_radius: 0.3,
            initial_ball_speed: 0.15,
            paddle_bounce_speed_multiplier: 1.05,
            serve_spread: 0.2,
            deflection: 0.1,
            player_easing: 0.2,
            ai_easing: 0.08,
            ai_range: 4.0,
            key_step: 0.4,
            points_per_return: 5,
            points_per_goal: 5,
        }
    }
}

impl BallConfig {
    /// How far the player paddle center may travel from the court center
    #[inline]
    pub fn paddle_half_range(&self) -> f32 {
        (self.court_width - self.paddle_width) / 2.0
    }
}

/// Complete, immutable game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub flyer: FlyerConfig,
    pub runner: RunnerConfig,
    pub ball: BallConfig,
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.flyer;
        let r = &self.runner;
        let b = &self.ball;

        let positive = [
            ("flyer.playfield_width", f.playfield_width),
            ("flyer.playfield_height", f.playfield_height),
            ("flyer.radius", f.radius),
            ("flyer.column_width", f.column_width),
            ("flyer.gap_size", f.gap_size),
            ("flyer.column_spawn_interval_ms", f.column_spawn_interval_ms),
            ("runner.playfield_width", r.playfield_width),
            ("runner.playfield_height", r.playfield_height),
            ("runner.lane_width", r.lane_width),
            ("runner.player_width", r.player_width),
            ("runner.player_height", r.player_height),
            ("runner.lane_damping", r.lane_damping),
            ("runner.obstacle_spawn_interval_ms", r.obstacle_spawn_interval_ms),
            ("runner.obstacle_width", r.obstacle_width),
            ("runner.obstacle_height", r.obstacle_height),
            ("runner.pickup_size", r.pickup_size),
            ("ball.court_width", b.court_width),
            ("ball.court_height", b.court_height),
            ("ball.paddle_width", b.paddle_width),
            ("ball.paddle_depth", b.paddle_depth),
            ("ball.ball_radius", b.ball_radius),
            ("ball.initial_ball_speed", b.initial_ball_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be > 0, got {value}")));
            }
        }

        if f.min_gap_offset > f.max_gap_offset {
            return Err(ConfigError::Invalid(format!(
                "flyer.min_gap_offset ({}) exceeds max_gap_offset ({})",
                f.min_gap_offset, f.max_gap_offset
            )));
        }
        if f.ground_height < 0.0 || f.ground_height >= f.playfield_height {
            return Err(ConfigError::Invalid(format!(
                "flyer.ground_height {} outside playfield",
                f.ground_height
            )));
        }
        if b.paddle_bounce_speed_multiplier <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "ball.paddle_bounce_speed_multiplier must be > 1, got {}",
                b.paddle_bounce_speed_multiplier
            )));
        }
        if b.paddle_width >= b.court_width {
            return Err(ConfigError::Invalid("ball.paddle_width must be narrower than the court".into()));
        }
        Ok(())
    }
}
