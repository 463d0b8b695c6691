//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Step-scaled updates only (time enters as a normalized step)
//! - Seeded RNG only
//! - Fixed sub-game order within a tick
//! - No rendering or platform dependencies

pub mod ball;
pub mod clock;
pub mod collision;
pub mod flyer;
pub mod runner;
pub mod spawn;
pub mod state;
pub mod tick;

pub use ball::{BallGame, Steer};
pub use clock::SimulationClock;
pub use collision::{Aabb, reflect_velocity};
pub use flyer::{Column, Flyer, FlyerGame};
pub use runner::{LaneObstacle, ObstacleKind, Pickup, Runner, RunnerGame};
pub use spawn::{PhaseLockedSpawner, SpawnTimer};
pub use state::{GameEvent, GamePhase, Mode, ScoreBoard, Session, SubGameReport};
pub use tick::{TickInput, tick};
