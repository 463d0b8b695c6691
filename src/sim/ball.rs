//! Ball-and-paddle sub-game
//!
//! Top-down court centered on the origin. `x` is lateral, `y` is depth: the
//! player defends `+court_height / 2`, the AI defends `-court_height / 2`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::reflect_velocity;
use super::state::{GameEvent, SubGameReport};
use crate::approach;
use crate::config::BallConfig;
use crate::error::SimError;

pub const BALL_FAILURE: &str = "Missed the ball in Pong!";

/// Gap left between a paddle face and the ball after a hit
const PUSH_OUT: f32 = 0.1;

/// Player steering source; the most recent one wins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Steer {
    /// Device tilt normalized to [-1, 1]
    Tilt(f32),
    /// Held steering keys
    Keys { left: bool, right: bool },
}

impl Default for Steer {
    fn default() -> Self {
        Steer::Keys {
            left: false,
            right: false,
        }
    }
}

/// Reflect the depth axis, deflect by hit offset, and speed up.
///
/// `offset` is the hit position relative to the paddle center, in [-1, 1].
/// The result is rescaled to `|velocity| * multiplier`.
pub fn paddle_bounce(velocity: Vec2, offset: f32, deflection: f32, multiplier: f32) -> Vec2 {
    let speed = velocity.length();
    let normal = Vec2::new(0.0, -velocity.y.signum());
    let mut bounced = reflect_velocity(velocity, normal);
    bounced.x += offset.clamp(-1.0, 1.0) * deflection;
    bounced.normalize_or_zero() * speed * multiplier
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Player,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallGame {
    pub config: BallConfig,
    pub pos: Vec2,
    pub vel: Vec2,
    pub player_x: f32,
    pub player_target_x: f32,
    pub ai_x: f32,
    pub steering: Steer,
    pub active: bool,
    /// Paddle bounces since the last reset
    pub returns: u32,
}

impl BallGame {
    pub fn new(config: BallConfig) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::new(0.0, -config.initial_ball_speed),
            player_x: 0.0,
            player_target_x: 0.0,
            ai_x: 0.0,
            steering: Steer::default(),
            active: false,
            returns: 0,
            config,
        }
    }

    /// Depth of the player paddle's center line
    #[inline]
    pub fn player_z(&self) -> f32 {
        self.config.court_height / 2.0 - 1.0
    }

    #[inline]
    pub fn ai_z(&self) -> f32 {
        -self.config.court_height / 2.0 + 1.0
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Re-center ball and paddles and serve
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.player_x = 0.0;
        self.player_target_x = 0.0;
        self.ai_x = 0.0;
        self.steering = Steer::default();
        self.returns = 0;
        self.serve(rng);
    }

    /// Ball back to center heading at the AI, with a random lateral drift
    pub fn serve<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pos = Vec2::ZERO;
        let drift = (rng.random::<f32>() - 0.5) * self.config.serve_spread;
        self.vel = Vec2::new(drift, -self.config.initial_ball_speed);
    }

    fn steer(&mut self, step: f32) {
        let half_range = self.config.paddle_half_range();
        self.player_target_x = match self.steering {
            Steer::Tilt(tilt) => tilt.clamp(-1.0, 1.0) * half_range,
            Steer::Keys { left, right } => {
                let mut target = self.player_target_x;
                if left {
                    target -= self.config.key_step * step;
                }
                if right {
                    target += self.config.key_step * step;
                }
                target
            }
        }
        .clamp(-half_range, half_range);
    }

    fn paddle_hit(&self, side: Side) -> bool {
        let (paddle_x, paddle_z, toward) = match side {
            Side::Player => (self.player_x, self.player_z(), self.vel.y > 0.0),
            Side::Ai => (self.ai_x, self.ai_z(), self.vel.y < 0.0),
        };
        let c = &self.config;
        toward
            && (self.pos.x - paddle_x).abs() < c.paddle_width / 2.0 + c.ball_radius
            && (self.pos.y - paddle_z).abs() < c.paddle_depth / 2.0 + c.ball_radius
    }

    fn bounce_off(&mut self, side: Side) {
        let c = self.config;
        let (paddle_x, paddle_z, away) = match side {
            Side::Player => (self.player_x, self.player_z(), -1.0),
            Side::Ai => (self.ai_x, self.ai_z(), 1.0),
        };
        let offset = (self.pos.x - paddle_x) / (c.paddle_width / 2.0);
        self.vel = paddle_bounce(self.vel, offset, c.deflection, c.paddle_bounce_speed_multiplier);
        self.pos.y = paddle_z + away * (c.paddle_depth / 2.0 + c.ball_radius + PUSH_OUT);
        self.returns += 1;
    }

    /// Advance one frame. No-op while inactive.
    pub fn update<R: Rng + ?Sized>(&mut self, step: f32, steer: Option<Steer>, rng: &mut R) -> SubGameReport {
        let mut report = SubGameReport::default();
        if !self.active {
            return report;
        }
        let c = self.config;

        match steer {
            // Keep the previous steering rather than aim the paddle at NaN
            Some(Steer::Tilt(tilt)) if !tilt.is_finite() => {
                log::warn!("ignoring non-finite tilt {tilt}");
            }
            Some(steer) => self.steering = steer,
            None => {}
        }
        self.steer(step);

        self.player_x = approach(self.player_x, self.player_target_x, c.player_easing, step);
        let ai_target = self.pos.x.clamp(-c.ai_range, c.ai_range);
        self.ai_x = approach(self.ai_x, ai_target, c.ai_easing, step);

        self.pos += self.vel * step;

        let half_width = c.court_width / 2.0;
        if self.pos.x.abs() + c.ball_radius > half_width {
            let side = self.pos.x.signum();
            if self.vel.x * side > 0.0 {
                self.vel = reflect_velocity(self.vel, Vec2::new(-side, 0.0));
            }
            self.pos.x = side * (half_width - c.ball_radius);
        }

        if self.paddle_hit(Side::Player) {
            self.bounce_off(Side::Player);
            report.points += c.points_per_return;
            report.events.push(GameEvent::BallReturned);
        } else if self.paddle_hit(Side::Ai) {
            self.bounce_off(Side::Ai);
        }

        let half_depth = c.court_height / 2.0;
        if self.pos.y > half_depth {
            report.failure = Some(BALL_FAILURE.to_string());
        } else if self.pos.y < -half_depth {
            report.points += c.points_per_goal;
            report.events.push(GameEvent::BallScored);
            self.serve(rng);
        }

        report
    }

    pub fn sanitize(&mut self) -> Result<(), SimError> {
        let mut result = Ok(());

        if !self.pos.is_finite() || !self.vel.is_finite() {
            let field = if self.pos.is_finite() { "vel" } else { "pos" };
            self.pos = Vec2::ZERO;
            self.vel = Vec2::new(0.0, -self.config.initial_ball_speed);
            result = Err(SimError::NonFinite { entity: "ball", field });
        }

        for x in [&mut self.player_x, &mut self.player_target_x, &mut self.ai_x] {
            if !x.is_finite() {
                *x = 0.0;
                if result.is_ok() {
                    result = Err(SimError::NonFinite { entity: "paddle", field: "x" });
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn active_game() -> BallGame {
        let mut game = BallGame::new(BallConfig::default());
        game.start();
        game
    }

    #[test]
    fn test_inactive_is_noop() {
        let mut game = BallGame::new(BallConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let report = game.update(1.0, None, &mut rng);
        assert_eq!(game.pos, Vec2::ZERO);
        assert_eq!(report, SubGameReport::default());
    }

    #[test]
    fn test_side_wall_bounce() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(2);
        game.pos = Vec2::new(4.8, 0.0);
        game.vel = Vec2::new(0.3, 0.0);
        game.update(1.0, None, &mut rng);
        assert!((game.vel.x + 0.3).abs() < 1e-6);
        assert!((game.pos.x - 4.7).abs() < 1e-6);
    }

    #[test]
    fn test_player_return_scores_and_speeds_up() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(3);
        game.pos = Vec2::new(0.0, 8.5);
        game.vel = Vec2::new(0.0, 0.15);

        let report = game.update(1.0, None, &mut rng);
        assert_eq!(report.points, 5);
        assert_eq!(report.events, vec![GameEvent::BallReturned]);
        assert!(game.vel.y < 0.0);
        assert!((game.vel.length() - 0.15 * 1.05).abs() < 1e-6);
        assert!((game.pos.y - 8.35).abs() < 1e-5);
        assert_eq!(game.returns, 1);
    }

    #[test]
    fn test_player_miss_is_failure() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(4);
        game.pos = Vec2::new(4.0, 9.95);
        game.vel = Vec2::new(0.0, 0.15);
        let report = game.update(1.0, None, &mut rng);
        assert_eq!(report.failure.as_deref(), Some(BALL_FAILURE));
    }

    #[test]
    fn test_ai_miss_scores_and_serves() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(5);
        game.pos = Vec2::new(4.0, -9.95);
        game.vel = Vec2::new(0.0, -0.15);
        let report = game.update(1.0, None, &mut rng);
        assert_eq!(report.points, 5);
        assert!(report.failure.is_none());
        assert_eq!(game.pos, Vec2::ZERO);
        assert_eq!(game.vel.y, -0.15);
        assert!(game.vel.x.abs() <= 0.1);
    }

    #[test]
    fn test_ai_return_does_not_score() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(6);
        game.pos = Vec2::new(0.0, -8.5);
        game.vel = Vec2::new(0.0, -0.15);
        let report = game.update(1.0, None, &mut rng);
        assert_eq!(report.points, 0);
        assert!(game.vel.y > 0.0);
    }

    #[test]
    fn test_tilt_maps_to_half_range() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(7);
        game.update(10.0, Some(Steer::Tilt(2.0)), &mut rng);
        assert_eq!(game.player_target_x, 3.5);
        assert_eq!(game.player_x, 3.5);
    }

    #[test]
    fn test_non_finite_tilt_keeps_previous_steering() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(9);
        game.update(10.0, Some(Steer::Tilt(0.0)), &mut rng);
        game.pos = Vec2::new(0.0, 8.5);
        game.vel = Vec2::new(0.0, 0.15);

        let report = game.update(1.0, Some(Steer::Tilt(f32::NAN)), &mut rng);
        assert_eq!(game.steering, Steer::Tilt(0.0));
        assert_eq!(game.player_x, 0.0);
        assert_eq!(report.events, vec![GameEvent::BallReturned]);

        for _ in 0..20 {
            let report = game.update(1.0, Some(Steer::Tilt(f32::INFINITY)), &mut rng);
            assert!(report.failure.is_none());
        }
        assert!(game.player_x.is_finite());
    }

    #[test]
    fn test_held_keys_persist_and_clamp() {
        let mut game = active_game();
        let mut rng = Pcg32::seed_from_u64(8);
        game.update(1.0, Some(Steer::Keys { left: true, right: false }), &mut rng);
        assert!((game.player_target_x + 0.4).abs() < 1e-6);
        // No new steering input: keys are still held
        for _ in 0..20 {
            game.update(1.0, None, &mut rng);
        }
        assert_eq!(game.player_target_x, -3.5);
    }

    #[test]
    fn test_serve_spread() {
        let mut game = BallGame::new(BallConfig::default());
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..100 {
            game.serve(&mut rng);
            assert!(game.vel.x.abs() <= 0.1);
            assert_eq!(game.vel.y, -0.15);
        }
    }

    #[test]
    fn test_sanitize_resets_ball() {
        let mut game = active_game();
        game.vel = Vec2::new(f32::NAN, 0.1);
        assert_eq!(
            game.sanitize(),
            Err(SimError::NonFinite { entity: "ball", field: "vel" })
        );
        assert_eq!(game.pos, Vec2::ZERO);
        assert!(game.vel.is_finite());
    }

    proptest! {
        #[test]
        fn prop_bounce_strictly_speeds_up(
            vx in -1.0f32..1.0,
            vz in prop_oneof![-1.0f32..-0.05, 0.05f32..1.0],
            offset in -1.5f32..1.5,
        ) {
            let velocity = Vec2::new(vx, vz);
            let bounced = paddle_bounce(velocity, offset, 0.1, 1.05);
            prop_assert!(bounced.length() > velocity.length());
            prop_assert!(bounced.y.signum() == -vz.signum());
        }
    }
}
