//! Session state and shared simulation types
//!
//! The session owns all three sub-games, the combined score bookkeeping and
//! the seeded RNG. Nothing in here reads the clock or touches the platform.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::BallGame;
use super::flyer::FlyerGame;
use super::runner::RunnerGame;
use crate::config::GameConfig;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a mode to be picked
    #[default]
    NotStarted,
    Playing,
    /// Terminal until `restart()`
    GameOver,
}

/// Which sub-games take part in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Flyer and runner only
    Easy,
    /// Flyer, runner and ball game
    #[default]
    Hard,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Easy => "easy",
            Mode::Hard => "hard",
        }
    }

    pub fn includes_ball(self) -> bool {
        self == Mode::Hard
    }
}

/// Per-sub-game score counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub flyer: u64,
    pub runner: u64,
    pub ball: u64,
}

impl ScoreBoard {
    /// Combined score; the ball game only counts in hard mode
    pub fn total(&self, mode: Mode) -> u64 {
        let ball = if mode.includes_ball() { self.ball } else { 0 };
        self.flyer + self.runner + ball
    }
}

/// Things that happened during the last tick (for presentation/logging)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ColumnPassed,
    ObstacleDodged,
    PickupCollected,
    BallReturned,
    /// Ball got past the AI paddle
    BallScored,
    Failed { cause: String },
    HighScore { score: u64 },
}

/// What a sub-game produced in one update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubGameReport {
    pub points: u64,
    pub events: Vec<GameEvent>,
    /// Failure message, if the sub-game ended the run this frame
    pub failure: Option<String>,
}

/// A complete play session
#[derive(Debug, Clone)]
pub struct Session {
    pub config: GameConfig,
    pub seed: u64,
    pub phase: GamePhase,
    pub mode: Mode,
    pub scores: ScoreBoard,
    pub high_score: u64,
    pub death_cause: Option<String>,
    /// Frame timestamp (ms) of the transition to game over
    pub game_over_at: Option<f64>,
    pub flyer: FlyerGame,
    pub runner: RunnerGame,
    pub ball: BallGame,
    pub rng: Pcg32,
    /// Events of the most recent tick
    pub events: Vec<GameEvent>,
}

impl Session {
    pub fn new(config: GameConfig, seed: u64, high_score: u64) -> Self {
        Self {
            flyer: FlyerGame::new(config.flyer),
            runner: RunnerGame::new(config.runner),
            ball: BallGame::new(config.ball),
            config,
            seed,
            phase: GamePhase::NotStarted,
            mode: Mode::default(),
            scores: ScoreBoard::default(),
            high_score,
            death_cause: None,
            game_over_at: None,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Begin the first run. Ignored (with a warning) outside `NotStarted`.
    pub fn start(&mut self, mode: Mode) {
        if self.phase != GamePhase::NotStarted {
            log::warn!("start({}) ignored in {:?}", mode.as_str(), self.phase);
            return;
        }
        self.mode = mode;
        self.begin_run();
        log::info!("Session started in {} mode (seed {})", mode.as_str(), self.seed);
    }

    /// Fresh run in the same mode, keeping the high score. Only valid after
    /// game over.
    pub fn restart(&mut self) {
        if self.phase != GamePhase::GameOver {
            log::warn!("restart ignored in {:?}", self.phase);
            return;
        }
        self.begin_run();
        log::info!("Session restarted in {} mode", self.mode.as_str());
    }

    fn begin_run(&mut self) {
        self.flyer.reset();
        self.runner.reset();
        self.ball.reset(&mut self.rng);
        if self.mode.includes_ball() {
            self.ball.start();
        } else {
            self.ball.stop();
        }

        self.scores = ScoreBoard::default();
        self.death_cause = None;
        self.game_over_at = None;
        self.events.clear();
        self.phase = GamePhase::Playing;
    }

    pub fn combined_score(&self) -> u64 {
        self.scores.total(self.mode)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Raise the high score if the combined score beat it; returns whether it moved
    pub fn record_high_score(&mut self) -> bool {
        let combined = self.combined_score();
        if combined > self.high_score {
            self.high_score = combined;
            self.events.push(GameEvent::HighScore { score: combined });
            true
        } else {
            false
        }
    }

    /// The only way the high score goes down
    pub fn reset_high_score(&mut self) {
        log::info!("High score reset (was {})", self.high_score);
        self.high_score = 0;
    }
}
