//! Frame scheduler
//!
//! One `run_frame` per animation frame: clock, tick, render, then persist the
//! high score if it moved. Nothing in a frame can stop the next one.

use crate::config::GameConfig;
use crate::consts::RESTART_DEBOUNCE_MS;
use crate::highscores::HighScoreStore;
use crate::persistence::KeyValueStore;
use crate::renderer::Renderer;
use crate::sim::{GamePhase, Mode, Session, SimulationClock, TickInput, tick};

pub struct FrameScheduler<R, S> {
    session: Session,
    clock: SimulationClock,
    renderer: R,
    high_scores: HighScoreStore<S>,
    /// Last value written to the store
    persisted_high_score: u64,
    /// Most recent render fault, shown to the player
    diagnostic: Option<String>,
}

impl<R: Renderer, S: KeyValueStore> FrameScheduler<R, S> {
    /// Build a session seeded with `seed`, starting from the stored high score
    pub fn new(config: GameConfig, seed: u64, renderer: R, high_scores: HighScoreStore<S>) -> Self {
        let high_score = high_scores.load();
        Self {
            session: Session::new(config, seed, high_score),
            clock: SimulationClock::new(),
            renderer,
            high_scores,
            persisted_high_score: high_score,
            diagnostic: None,
        }
    }

    pub fn run_frame(&mut self, timestamp: f64, input: &TickInput) {
        let step = self.clock.tick(timestamp);

        let was_playing = self.session.is_playing();
        tick(&mut self.session, input, step);
        if was_playing && self.session.phase == GamePhase::GameOver {
            self.session.game_over_at = Some(timestamp);
        }

        if let Err(err) = self.renderer.render(&self.session) {
            log::error!("Render error: {err}");
            self.diagnostic = Some(err.to_string());
        }

        self.persist_high_score();
    }

    fn persist_high_score(&mut self) {
        let high_score = self.session.high_score;
        if high_score == self.persisted_high_score {
            return;
        }
        // Recorded even on failure so a broken store is not retried every frame
        self.persisted_high_score = high_score;
        if let Err(err) = self.high_scores.save(high_score) {
            log::warn!("Could not save high score {high_score}: {err}");
        }
    }

    pub fn start(&mut self, mode: Mode) {
        self.session.start(mode);
    }

    /// Restart after game over, unless the request comes too soon after it
    pub fn request_restart(&mut self, now_ms: f64) -> bool {
        if self.session.phase != GamePhase::GameOver {
            return false;
        }
        if let Some(at) = self.session.game_over_at {
            if now_ms - at < RESTART_DEBOUNCE_MS {
                log::debug!("Restart ignored {:.0} ms after game over", now_ms - at);
                return false;
            }
        }
        self.session.restart();
        true
    }

    pub fn reset_high_score(&mut self) {
        self.session.reset_high_score();
        self.persisted_high_score = 0;
        if let Err(err) = self.high_scores.reset() {
            log::warn!("Could not reset stored high score: {err}");
        }
    }

    /// Drop the clock baseline (tab was hidden); the next frame is a zero step
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}
