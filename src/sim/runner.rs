//! Three-lane runner sub-game
//!
//! The runner stays at a fixed screen height and slides between lanes while
//! obstacles and pickups fall toward it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::spawn::PhaseLockedSpawner;
use super::state::{GameEvent, SubGameReport};
use crate::approach;
use crate::config::RunnerConfig;
use crate::consts::{LANE_COUNT, SNAP_EPSILON};
use crate::error::SimError;

pub const RUNNER_FAILURE: &str = "Crashed in the runner game!";

/// Left edge of an entity of `entity_width` centered in `lane`
pub fn lane_x(lane: u8, entity_width: f32, config: &RunnerConfig) -> f32 {
    let start = (config.playfield_width - config.lane_width * LANE_COUNT as f32) / 2.0;
    start + lane as f32 * config.lane_width + config.lane_width / 2.0 - entity_width / 2.0
}

/// The lane-switching player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    pub current_lane: u8,
    pub target_lane: u8,
    /// Left edge, eased toward the target lane
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub animation_phase: f32,
}

impl Runner {
    pub fn new(config: &RunnerConfig) -> Self {
        let lane = LANE_COUNT / 2;
        Self {
            current_lane: lane,
            target_lane: lane,
            x: lane_x(lane, config.player_width, config),
            y: config.player_y,
            width: config.player_width,
            height: config.player_height,
            animation_phase: 0.0,
        }
    }

    pub fn move_left(&mut self) {
        if self.target_lane > 0 {
            self.target_lane -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.target_lane < LANE_COUNT - 1 {
            self.target_lane += 1;
        }
    }

    pub fn update(&mut self, step: f32, config: &RunnerConfig) {
        let target_x = lane_x(self.target_lane, self.width, config);
        self.x = approach(self.x, target_x, config.lane_damping, step);

        if (target_x - self.x).abs() < SNAP_EPSILON {
            self.x = target_x;
            self.current_lane = self.target_lane;
        }

        self.animation_phase += 0.2 * step;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_corner(self.x, self.y, self.width, self.height)
    }

    /// Center-distance test with the forgiveness margin shaved off
    pub fn hits(&self, obstacles: &[LaneObstacle], config: &RunnerConfig) -> bool {
        let margin = config.forgiveness;
        let center = self.x + self.width / 2.0;
        let reach = (self.width + config.obstacle_width) / 2.0 - margin;

        obstacles.iter().any(|o| {
            let o_center = lane_x(o.lane, config.obstacle_width, config) + config.obstacle_width / 2.0;
            o.y + config.obstacle_height > self.y + margin
                && o.y < self.y + self.height
                && (center - o_center).abs() < reach
        })
    }

    pub fn reset(&mut self, config: &RunnerConfig) {
        *self = Self::new(config);
    }
}

/// Visual variant of a lane obstacle; all kinds share one hitbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Train,
    Barrier,
    Sign,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Train, ObstacleKind::Barrier, ObstacleKind::Sign];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneObstacle {
    pub lane: u8,
    /// Top edge; grows as the obstacle falls
    pub y: f32,
    pub kind: ObstacleKind,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub lane: u8,
    pub y: f32,
    pub spin: f32,
    pub collected: bool,
}

impl Pickup {
    pub fn aabb(&self, config: &RunnerConfig) -> Aabb {
        let size = config.pickup_size;
        Aabb::from_corner(lane_x(self.lane, size, config), self.y, size, size)
    }
}

/// Runner, falling entities, and the phase-locked spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerGame {
    pub config: RunnerConfig,
    pub runner: Runner,
    pub obstacles: Vec<LaneObstacle>,
    pub pickups: Vec<Pickup>,
    spawner: PhaseLockedSpawner,
}

impl RunnerGame {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            runner: Runner::new(&config),
            obstacles: Vec::new(),
            pickups: Vec::new(),
            spawner: PhaseLockedSpawner::from_millis(config.obstacle_spawn_interval_ms),
            config,
        }
    }

    pub fn move_left(&mut self) {
        self.runner.move_left();
    }

    pub fn move_right(&mut self) {
        self.runner.move_right();
    }

    pub fn reset(&mut self) {
        self.runner.reset(&self.config);
        self.obstacles.clear();
        self.pickups.clear();
        self.spawner.reset();
    }

    pub fn spawn_obstacle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.obstacles.push(LaneObstacle {
            lane: rng.random_range(0..LANE_COUNT),
            y: -self.config.obstacle_height,
            kind: ObstacleKind::random(rng),
            passed: false,
        });
    }

    pub fn spawn_pickup<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pickups.push(Pickup {
            lane: rng.random_range(0..LANE_COUNT),
            y: -self.config.pickup_size,
            spin: 0.0,
            collected: false,
        });
    }

    pub fn update<R: Rng + ?Sized>(&mut self, step: f32, rng: &mut R) -> SubGameReport {
        let mut report = SubGameReport::default();
        let config = self.config;

        self.runner.update(step, &config);

        let due = self.spawner.advance(step);
        for _ in 0..due.obstacles {
            self.spawn_obstacle(rng);
        }
        for _ in 0..due.pickups {
            self.spawn_pickup(rng);
        }

        let dodge_line = self.runner.y + self.runner.height;
        for obstacle in &mut self.obstacles {
            obstacle.y += config.obstacle_speed * step;
            if !obstacle.passed && obstacle.y > dodge_line {
                obstacle.passed = true;
                report.points += config.points_per_dodge;
                report.events.push(GameEvent::ObstacleDodged);
            }
        }

        let runner_box = self.runner.aabb();
        for pickup in &mut self.pickups {
            pickup.y += config.pickup_speed * step;
            pickup.spin += 0.1 * step;
            if !pickup.collected && pickup.aabb(&config).overlaps(&runner_box) {
                pickup.collected = true;
                report.points += config.points_per_pickup;
                report.events.push(GameEvent::PickupCollected);
            }
        }

        let floor = config.playfield_height;
        self.obstacles.retain(|o| o.y <= floor);
        self.pickups.retain(|p| !p.collected && p.y <= floor);

        if self.runner.hits(&self.obstacles, &config) {
            report.failure = Some(RUNNER_FAILURE.to_string());
        }

        report
    }

    pub fn sanitize(&mut self) -> Result<(), SimError> {
        let mut result = Ok(());

        if !self.runner.x.is_finite() {
            self.runner.x = lane_x(self.runner.target_lane, self.runner.width, &self.config);
            self.runner.current_lane = self.runner.target_lane;
            result = Err(SimError::NonFinite { entity: "runner", field: "x" });
        }

        let before = self.obstacles.len() + self.pickups.len();
        self.obstacles.retain(|o| o.y.is_finite());
        self.pickups.retain(|p| p.y.is_finite());
        if result.is_ok() && self.obstacles.len() + self.pickups.len() != before {
            result = Err(SimError::NonFinite { entity: "lane entity", field: "y" });
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

    fn config() -> RunnerConfig {
        RunnerConfig::default()
    }

    fn obstacle(lane: u8, y: f32) -> LaneObstacle {
        LaneObstacle {
            lane,
            y,
            kind: ObstacleKind::Train,
            passed: false,
        }
    }

    #[test]
    fn test_lane_positions() {
        let config = config();
        assert_eq!(lane_x(0, 50.0, &config), 125.0);
        assert_eq!(lane_x(1, 50.0, &config), 275.0);
        assert_eq!(lane_x(2, 50.0, &config), 425.0);
    }

    #[test]
    fn test_move_left_snaps_exactly() {
        let config = config();
        let mut runner = Runner::new(&config);
        assert_eq!(runner.current_lane, 1);

        runner.move_left();
        for _ in 0..100 {
            runner.update(1.0, &config);
        }
        assert_eq!(runner.current_lane, 0);
        assert_eq!(runner.x, lane_x(0, config.player_width, &config));
    }

    #[test]
    fn test_easing_does_not_overshoot_on_long_step() {
        let config = config();
        let mut runner = Runner::new(&config);
        runner.move_right();
        runner.update(6.0, &config);
        assert_eq!(runner.x, lane_x(2, config.player_width, &config));
        assert_eq!(runner.current_lane, 2);
    }

    #[test]
    fn test_boundary_moves_are_ignored() {
        let config = config();
        let mut runner = Runner::new(&config);
        runner.move_left();
        runner.move_left();
        runner.move_left();
        assert_eq!(runner.target_lane, 0);
        for _ in 0..5 {
            runner.move_right();
        }
        assert_eq!(runner.target_lane, LANE_COUNT - 1);
    }

    #[test]
    fn test_hit_in_same_lane() {
        let config = config();
        let runner = Runner::new(&config);
        assert!(runner.hits(&[obstacle(1, 500.0)], &config));
        assert!(!runner.hits(&[obstacle(0, 500.0)], &config));
    }

    #[test]
    fn test_forgiveness_margin() {
        let config = config();
        let runner = Runner::new(&config);
        // Bottom edge exactly at player top + forgiveness does not count
        assert!(!runner.hits(&[obstacle(1, 480.0)], &config));
        assert!(runner.hits(&[obstacle(1, 481.0)], &config));
        // Already below the player
        assert!(!runner.hits(&[obstacle(1, 620.0)], &config));
    }

    #[test]
    fn test_dodge_scores_once() {
        let mut game = RunnerGame::new(config());
        let mut rng = Pcg32::seed_from_u64(11);
        game.obstacles.push(obstacle(0, 615.0));

        let mut points = 0;
        for _ in 0..3 {
            points += game.update(1.0, &mut rng).points;
        }
        assert_eq!(points, 1);
        assert!(game.obstacles[0].passed);
    }

    #[test]
    fn test_pickup_collected_once_and_removed() {
        let mut game = RunnerGame::new(config());
        let mut rng = Pcg32::seed_from_u64(12);
        game.pickups.push(Pickup {
            lane: 1,
            y: 550.0,
            spin: 0.0,
            collected: false,
        });

        let report = game.update(1.0, &mut rng);
        assert_eq!(report.points, 1);
        assert_eq!(report.events, vec![GameEvent::PickupCollected]);
        assert!(game.pickups.is_empty());
        assert_eq!(game.update(1.0, &mut rng).points, 0);
    }

    #[test]
    fn test_pickup_in_other_lane_is_not_collected() {
        let mut game = RunnerGame::new(config());
        let mut rng = Pcg32::seed_from_u64(13);
        game.pickups.push(Pickup {
            lane: 2,
            y: 550.0,
            spin: 0.0,
            collected: false,
        });
        assert_eq!(game.update(1.0, &mut rng).points, 0);
        assert_eq!(game.pickups.len(), 1);
    }

    #[test]
    fn test_off_screen_entities_pruned() {
        let mut game = RunnerGame::new(config());
        let mut rng = Pcg32::seed_from_u64(14);
        game.obstacles.push(obstacle(0, 795.0));
        game.pickups.push(Pickup {
            lane: 0,
            y: 795.0,
            spin: 0.0,
            collected: false,
        });
        game.update(1.0, &mut rng);
        assert!(game.obstacles.is_empty());
        assert!(game.pickups.is_empty());
    }

    #[test]
    fn test_pickup_leads_obstacle_by_half_cycle() {
        // 1200 ms is ~72 steps: pickup on step 36, obstacle on step 72
        let mut game = RunnerGame::new(config());
        let mut rng = Pcg32::seed_from_u64(15);
        for _ in 0..35 {
            game.update(1.0, &mut rng);
        }
        assert!(game.pickups.is_empty());

        game.update(1.0, &mut rng);
        assert_eq!(game.pickups.len(), 1);
        assert!(game.obstacles.is_empty());

        for _ in 36..72 {
            game.update(1.0, &mut rng);
        }
        assert_eq!(game.obstacles.len(), 1);
        assert_eq!(game.pickups.len(), 1);
    }

    #[test]
    fn test_collision_reports_failure() {
        let mut game = RunnerGame::new(config());
        let mut rng = Pcg32::seed_from_u64(16);
        game.obstacles.push(obstacle(1, 500.0));
        let report = game.update(1.0, &mut rng);
        assert_eq!(report.failure.as_deref(), Some(RUNNER_FAILURE));
    }

    #[test]
    fn test_sanitize_snaps_runner_back_to_lane() {
        let config = config();
        let mut game = RunnerGame::new(config);
        game.runner.x = f32::NAN;
        game.obstacles.push(obstacle(0, f32::INFINITY));
        assert_eq!(
            game.sanitize(),
            Err(SimError::NonFinite { entity: "runner", field: "x" })
        );
        assert_eq!(game.runner.x, lane_x(1, config.player_width, &config));
        assert!(game.obstacles.is_empty());
    }

    proptest! {
        #[test]
        fn prop_lanes_stay_in_bounds(moves in prop::collection::vec((any::<bool>(), 0.0f32..6.0), 0..200)) {
            let config = RunnerConfig::default();
            let mut runner = Runner::new(&config);
            for (left, step) in moves {
                if left {
                    runner.move_left();
                } else {
                    runner.move_right();
                }
                runner.update(step, &config);
                prop_assert!(runner.target_lane < LANE_COUNT);
                prop_assert!(runner.current_lane < LANE_COUNT);
                prop_assert!(runner.x >= lane_x(0, config.player_width, &config));
                prop_assert!(runner.x <= lane_x(LANE_COUNT - 1, config.player_width, &config));
            }
        }
    }
}
