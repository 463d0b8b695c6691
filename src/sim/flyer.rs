//! Flyer sub-game
//!
//! A gravity-bound flyer at a fixed x, steered only by jump impulses, threading
//! the gaps of columns that scroll in from the right.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{circle_outside_gap, spans_overlap};
use super::spawn::SpawnTimer;
use super::state::{GameEvent, SubGameReport};
use crate::config::FlyerConfig;
use crate::error::SimError;

pub const FLYER_FAILURE: &str = "Crashed in the flyer game!";

/// The player's flyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flyer {
    pub x: f32,
    pub y: f32,
    pub velocity: f32,
    /// Display-only tilt in degrees, derived from velocity
    pub rotation: f32,
    pub radius: f32,
}

impl Flyer {
    pub fn new(config: &FlyerConfig) -> Self {
        Self {
            x: config.x,
            y: config.start_y,
            velocity: 0.0,
            rotation: 0.0,
            radius: config.radius,
        }
    }

    /// Crisp upward kick; replaces the current velocity
    pub fn jump(&mut self, impulse: f32) {
        self.velocity = impulse;
    }

    /// Integrate gravity for `step` reference frames
    pub fn update(&mut self, step: f32, config: &FlyerConfig) {
        self.velocity += config.gravity * step;
        self.velocity = self.velocity.min(config.max_velocity);
        self.y += self.velocity * step;

        self.rotation = (self.velocity * 3.0).clamp(-25.0, 90.0);

        // Ceiling stops the flyer, it does not kill it
        if self.y - self.radius < 0.0 {
            self.y = self.radius;
            self.velocity = 0.0;
        }
    }

    /// Ground contact, or any horizontally overlapping column whose gap the
    /// flyer does not fit inside
    pub fn hits(&self, columns: &[Column], floor_y: f32, padding: f32) -> bool {
        if self.y + self.radius > floor_y {
            return true;
        }

        let left = self.x - self.radius + padding;
        let right = self.x + self.radius - padding;
        columns.iter().any(|column| {
            spans_overlap(left, right, column.x, column.trailing_edge())
                && circle_outside_gap(self.y, self.radius, padding, column.gap_top, column.gap_bottom())
        })
    }

    pub fn reset(&mut self, config: &FlyerConfig) {
        *self = Self::new(config);
    }
}

/// An obstacle column with a passable gap window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Leading (left) edge
    pub x: f32,
    /// Bottom of the top segment, i.e. where the gap starts
    pub gap_top: f32,
    pub width: f32,
    pub gap: f32,
    /// Set once when the flyer has passed the trailing edge
    pub scored: bool,
}

impl Column {
    pub fn new(x: f32, gap_top: f32, width: f32, gap: f32) -> Self {
        Self {
            x,
            gap_top,
            width,
            gap,
            scored: false,
        }
    }

    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_top + self.gap
    }

    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    pub fn update(&mut self, step: f32, speed: f32) {
        self.x -= speed * step;
    }

    pub fn is_off_screen(&self) -> bool {
        self.trailing_edge() < 0.0
    }
}

/// Flyer, its columns, and the column spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlyerGame {
    pub config: FlyerConfig,
    pub flyer: Flyer,
    /// Oldest first
    pub columns: Vec<Column>,
    spawner: SpawnTimer,
}

impl FlyerGame {
    pub fn new(config: FlyerConfig) -> Self {
        Self {
            flyer: Flyer::new(&config),
            columns: Vec::new(),
            spawner: SpawnTimer::from_millis(config.column_spawn_interval_ms),
            config,
        }
    }

    pub fn jump(&mut self) {
        self.flyer.jump(self.config.jump_impulse);
    }

    pub fn reset(&mut self) {
        self.flyer.reset(&self.config);
        self.columns.clear();
        self.spawner.reset();
    }

    /// Spawn a column at the right edge with a random gap offset
    pub fn spawn_column<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let c = &self.config;
        let gap_top = rng.random_range(c.min_gap_offset..=c.max_gap_offset);
        self.columns
            .push(Column::new(c.playfield_width, gap_top, c.column_width, c.gap_size));
    }

    /// Advance one frame: physics, spawning, scrolling/scoring/pruning, then
    /// the failure check against the columns that remain
    pub fn update<R: Rng + ?Sized>(&mut self, step: f32, rng: &mut R) -> SubGameReport {
        let mut report = SubGameReport::default();

        self.flyer.update(step, &self.config);

        for _ in 0..self.spawner.advance(step) {
            self.spawn_column(rng);
        }

        let flyer_x = self.flyer.x;
        for column in &mut self.columns {
            column.update(step, self.config.column_speed);

            if !column.scored && flyer_x > column.trailing_edge() {
                column.scored = true;
                report.points += self.config.points_per_column;
                report.events.push(GameEvent::ColumnPassed);
            }
        }
        self.columns.retain(|c| !c.is_off_screen());

        if self
            .flyer
            .hits(&self.columns, self.config.floor_y(), self.config.collision_padding)
        {
            report.failure = Some(FLYER_FAILURE.to_string());
        }

        report
    }

    /// Repair non-finite state; reports the first problem found
    pub fn sanitize(&mut self) -> Result<(), SimError> {
        let mut result = Ok(());

        if !self.flyer.y.is_finite() || !self.flyer.velocity.is_finite() {
            let field = if self.flyer.y.is_finite() { "velocity" } else { "y" };
            self.flyer.reset(&self.config);
            result = Err(SimError::NonFinite { entity: "flyer", field });
        }

        for column in &mut self.columns {
            if !column.x.is_finite() || !column.gap_top.is_finite() {
                column.x = self.config.playfield_width;
                if !column.gap_top.is_finite() {
                    column.gap_top = self.config.min_gap_offset;
                }
                if result.is_ok() {
                    result = Err(SimError::NonFinite { entity: "column", field: "x" });
                }
            }
        }

        result
    }
}
