//! Per-frame simulation tick
//!
//! Applies the frame's input, advances every active sub-game in a fixed
//! order, merges their reports and resolves game over.

use super::ball::Steer;
use super::state::{GameEvent, GamePhase, Session, SubGameReport};
use crate::consts::MAX_STEP;
use crate::error::SimError;

/// Input intents gathered for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Flyer jump requested
    pub jump: bool,
    /// Lane changes requested since the last frame
    pub move_left: u32,
    pub move_right: u32,
    /// Latest ball steering input, if it changed
    pub steer: Option<Steer>,
}

/// Advance the session by `step` reference frames
pub fn tick(session: &mut Session, input: &TickInput, step: f32) {
    session.events.clear();
    if session.phase != GamePhase::Playing {
        return;
    }

    let step = if step.is_finite() { step.clamp(0.0, MAX_STEP) } else { 0.0 };

    if input.jump {
        session.flyer.jump();
    }
    for _ in 0..input.move_left {
        session.runner.move_left();
    }
    for _ in 0..input.move_right {
        session.runner.move_right();
    }

    // Every active sub-game runs even after an earlier one failed; the first
    // failure wins the death cause.
    let mut failure = None;

    let report = session.flyer.update(step, &mut session.rng);
    log_repair(session.flyer.sanitize());
    merge(report, &mut session.scores.flyer, &mut failure, &mut session.events);

    let report = session.runner.update(step, &mut session.rng);
    log_repair(session.runner.sanitize());
    merge(report, &mut session.scores.runner, &mut failure, &mut session.events);

    if session.ball.active {
        let report = session.ball.update(step, input.steer, &mut session.rng);
        log_repair(session.ball.sanitize());
        merge(report, &mut session.scores.ball, &mut failure, &mut session.events);
    }

    session.record_high_score();

    if let Some(cause) = failure {
        log::info!("Game over: {} (score {})", cause, session.combined_score());
        session.ball.stop();
        session.phase = GamePhase::GameOver;
        session.events.push(GameEvent::Failed { cause: cause.clone() });
        session.death_cause = Some(cause);
    }
}

fn merge(report: SubGameReport, score: &mut u64, failure: &mut Option<String>, events: &mut Vec<GameEvent>) {
    *score += report.points;
    events.extend(report.events);
    if failure.is_none() {
        *failure = report.failure;
    }
}

fn log_repair(result: Result<(), SimError>) {
    if let Err(err) = result {
        log::warn!("{err}, entity reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::flyer::FLYER_FAILURE;
    use crate::sim::runner::{LaneObstacle, ObstacleKind, RUNNER_FAILURE};
    use crate::sim::state::{Mode, ScoreBoard};
    use proptest::prelude::*;

    fn playing(mode: Mode) -> Session {
        let mut session = Session::new(GameConfig::default(), 12345, 0);
        session.start(mode);
        session
    }

    fn put_flyer_on_ground(session: &mut Session) {
        session.flyer.flyer.y = session.config.flyer.floor_y() - 10.0;
        session.flyer.flyer.velocity = 5.0;
    }

    #[test]
    fn test_tick_noop_unless_playing() {
        let mut session = Session::new(GameConfig::default(), 1, 0);
        let y = session.flyer.flyer.y;
        tick(&mut session, &TickInput { jump: true, ..Default::default() }, 1.0);
        assert_eq!(session.phase, GamePhase::NotStarted);
        assert_eq!(session.flyer.flyer.y, y);
    }

    #[test]
    fn test_ground_collision_ends_run_and_restart_recovers() {
        let mut session = playing(Mode::Hard);
        session.scores.flyer = 9;
        put_flyer_on_ground(&mut session);

        tick(&mut session, &TickInput::default(), 1.0);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.death_cause.as_deref(), Some(FLYER_FAILURE));
        assert!(!session.ball.active);
        assert_eq!(session.high_score, 9);
        assert!(session.events.contains(&GameEvent::Failed { cause: FLYER_FAILURE.into() }));

        // Frozen until restart
        let flyer_y = session.flyer.flyer.y;
        tick(&mut session, &TickInput::default(), 1.0);
        assert_eq!(session.flyer.flyer.y, flyer_y);

        session.restart();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.scores, ScoreBoard::default());
        assert_eq!(session.high_score, 9);
        assert!(session.ball.active);
    }

    #[test]
    fn test_later_sub_games_still_score_in_failing_frame() {
        let mut session = playing(Mode::Easy);
        put_flyer_on_ground(&mut session);
        session.runner.obstacles.push(LaneObstacle {
            lane: 0,
            y: 615.0,
            kind: ObstacleKind::Barrier,
            passed: false,
        });

        tick(&mut session, &TickInput::default(), 1.0);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.scores.runner, 1);
        assert_eq!(session.high_score, 1);
    }

    #[test]
    fn test_first_failure_wins() {
        let mut session = playing(Mode::Easy);
        put_flyer_on_ground(&mut session);
        session.runner.obstacles.push(LaneObstacle {
            lane: 1,
            y: 500.0,
            kind: ObstacleKind::Train,
            passed: false,
        });
        tick(&mut session, &TickInput::default(), 1.0);
        assert_eq!(session.death_cause.as_deref(), Some(FLYER_FAILURE));

        let mut session = playing(Mode::Easy);
        session.runner.obstacles.push(LaneObstacle {
            lane: 1,
            y: 500.0,
            kind: ObstacleKind::Sign,
            passed: false,
        });
        tick(&mut session, &TickInput::default(), 1.0);
        assert_eq!(session.death_cause.as_deref(), Some(RUNNER_FAILURE));
    }

    #[test]
    fn test_easy_mode_never_touches_ball() {
        let mut session = playing(Mode::Easy);
        for _ in 0..30 {
            tick(&mut session, &TickInput { jump: true, ..Default::default() }, 1.0);
        }
        assert_eq!(session.ball.pos, glam::Vec2::ZERO);
        session.scores.ball = 50;
        assert_eq!(session.combined_score(), session.scores.flyer + session.scores.runner);
    }

    #[test]
    fn test_lane_input_is_applied() {
        let mut session = playing(Mode::Easy);
        let input = TickInput {
            move_left: 2,
            ..Default::default()
        };
        tick(&mut session, &input, 1.0);
        assert_eq!(session.runner.runner.target_lane, 0);
    }

    #[test]
    fn test_non_finite_state_is_repaired() {
        let mut session = playing(Mode::Hard);
        session.ball.pos = glam::Vec2::new(f32::NAN, 0.0);
        tick(&mut session, &TickInput::default(), 1.0);
        assert!(session.is_playing());
        assert!(session.ball.pos.is_finite());
    }

    #[test]
    fn test_non_finite_step_is_zero() {
        let mut session = playing(Mode::Easy);
        let y = session.flyer.flyer.y;
        tick(&mut session, &TickInput::default(), f32::NAN);
        assert_eq!(session.flyer.flyer.y, y);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(Mode::Hard);
        let mut b = playing(Mode::Hard);
        for frame in 0..400 {
            let input = TickInput {
                jump: frame % 20 == 0,
                move_left: u32::from(frame % 50 == 0),
                move_right: u32::from(frame % 70 == 0),
                steer: Some(Steer::Tilt(((frame as f32) * 0.05).sin())),
            };
            tick(&mut a, &input, 1.0);
            tick(&mut b, &input, 1.0);
        }
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.flyer.columns.len(), b.flyer.columns.len());
        for (ca, cb) in a.flyer.columns.iter().zip(&b.flyer.columns) {
            assert_eq!(ca.gap_top, cb.gap_top);
        }
        assert_eq!(a.ball.pos, b.ball.pos);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_high_score_is_monotonic(seed in any::<u64>(), jumps in prop::collection::vec(any::<bool>(), 50..400)) {
            let mut session = Session::new(GameConfig::default(), seed, 0);
            session.start(Mode::Hard);
            let mut best = 0;
            for jump in jumps {
                tick(&mut session, &TickInput { jump, ..Default::default() }, 1.0);
                prop_assert!(session.high_score >= best);
                prop_assert!(session.high_score >= session.combined_score());
                best = session.high_score;
                if session.phase == GamePhase::GameOver {
                    session.restart();
                }
            }
        }
    }
}
