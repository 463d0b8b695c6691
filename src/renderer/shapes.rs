//! Draw-list generation
//!
//! Turns a session into flat lists of rectangles and circles per surface, in
//! each surface's own coordinates. Painters only map and fill.

use glam::Vec2;

use crate::consts::LANE_COUNT;
use crate::sim::collision::Aabb;
use crate::sim::runner::lane_x;
use crate::sim::{GamePhase, ObstacleKind, Session};

pub type Color = [f32; 4];

const SKY: Color = [0.44, 0.77, 0.81, 1.0];
const GROUND: Color = [0.87, 0.85, 0.58, 1.0];
const COLUMN: Color = [0.45, 0.75, 0.18, 1.0];
const FLYER: Color = [0.98, 0.82, 0.2, 1.0];
const TRACK: Color = [0.2, 0.2, 0.24, 1.0];
const LANE_MARK: Color = [1.0, 1.0, 1.0, 0.25];
const RUNNER: Color = [0.23, 0.51, 0.96, 1.0];
const COIN: Color = [1.0, 0.84, 0.0, 1.0];
const COURT: Color = [0.1, 0.35, 0.2, 1.0];
const PADDLE_PLAYER: Color = [0.3, 0.8, 1.0, 1.0];
const PADDLE_AI: Color = [1.0, 0.35, 0.35, 1.0];
const GAME_OVER_SHADE: Color = [0.0, 0.0, 0.0, 0.5];

/// Canvas a shape belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Flyer,
    Runner,
    Court,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Rect { min: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub surface: Surface,
    pub kind: ShapeKind,
    pub color: Color,
}

/// Shapes in paint order
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub shapes: Vec<Shape>,
}

impl DrawList {
    fn rect(&mut self, surface: Surface, min: Vec2, size: Vec2, color: Color) {
        self.shapes.push(Shape {
            surface,
            kind: ShapeKind::Rect { min, size },
            color,
        });
    }

    fn circle(&mut self, surface: Surface, center: Vec2, radius: f32, color: Color) {
        self.shapes.push(Shape {
            surface,
            kind: ShapeKind::Circle { center, radius },
            color,
        });
    }

    pub fn on(&self, surface: Surface) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(move |s| s.surface == surface)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Visual palette of lane obstacles
pub fn obstacle_color(kind: ObstacleKind) -> Color {
    match kind {
        ObstacleKind::Train => [0.86, 0.15, 0.15, 1.0],
        ObstacleKind::Barrier => [0.98, 0.45, 0.09, 1.0],
        ObstacleKind::Sign => [0.92, 0.7, 0.03, 1.0],
    }
}

/// Ball color by how much it has sped up (1.0 = serve speed, 2.0+ = red)
fn speed_color(ratio: f32) -> Color {
    let t = (ratio - 1.0).clamp(0.0, 1.0);
    let (r, g, b) = if t < 0.5 {
        // White to yellow
        let u = t / 0.5;
        (1.0, 1.0, 1.0 - 0.8 * u)
    } else {
        // Yellow to red
        let u = (t - 0.5) / 0.5;
        (1.0, 1.0 - 0.7 * u, 0.2)
    };
    [r, g, b, 1.0]
}

/// Coordinate space of a surface
pub fn surface_bounds(surface: Surface, session: &Session) -> Aabb {
    let config = &session.config;
    match surface {
        Surface::Flyer => Aabb::from_corner(0.0, 0.0, config.flyer.playfield_width, config.flyer.playfield_height),
        Surface::Runner => Aabb::from_corner(0.0, 0.0, config.runner.playfield_width, config.runner.playfield_height),
        Surface::Court => {
            let half = Vec2::new(config.ball.court_width, config.ball.court_height) / 2.0;
            Aabb { min: -half, max: half }
        }
    }
}

/// Surfaces used by the session's mode
pub fn active_surfaces(session: &Session) -> &'static [Surface] {
    if session.mode.includes_ball() {
        &[Surface::Flyer, Surface::Runner, Surface::Court]
    } else {
        &[Surface::Flyer, Surface::Runner]
    }
}

pub fn build_draw_list(session: &Session) -> DrawList {
    let mut list = DrawList::default();
    flyer_shapes(session, &mut list);
    runner_shapes(session, &mut list);
    if session.mode.includes_ball() {
        court_shapes(session, &mut list);
    }

    if session.phase == GamePhase::GameOver {
        for &surface in active_surfaces(session) {
            let bounds = surface_bounds(surface, session);
            list.rect(surface, bounds.min, bounds.max - bounds.min, GAME_OVER_SHADE);
        }
    }
    list
}

fn flyer_shapes(session: &Session, list: &mut DrawList) {
    let game = &session.flyer;
    let c = &game.config;
    let s = Surface::Flyer;

    list.rect(s, Vec2::ZERO, Vec2::new(c.playfield_width, c.playfield_height), SKY);

    let floor = c.floor_y();
    for column in &game.columns {
        list.rect(s, Vec2::new(column.x, 0.0), Vec2::new(column.width, column.gap_top), COLUMN);
        let bottom = column.gap_bottom();
        list.rect(
            s,
            Vec2::new(column.x, bottom),
            Vec2::new(column.width, (floor - bottom).max(0.0)),
            COLUMN,
        );
    }

    list.rect(s, Vec2::new(0.0, floor), Vec2::new(c.playfield_width, c.ground_height), GROUND);

    let flyer = &game.flyer;
    list.circle(s, Vec2::new(flyer.x, flyer.y), flyer.radius, FLYER);
}

fn runner_shapes(session: &Session, list: &mut DrawList) {
    let game = &session.runner;
    let c = &game.config;
    let s = Surface::Runner;

    list.rect(s, Vec2::ZERO, Vec2::new(c.playfield_width, c.playfield_height), TRACK);

    // Dividers between lanes
    let start = lane_x(0, c.lane_width, c);
    for lane in 1..LANE_COUNT {
        let x = start + lane as f32 * c.lane_width;
        list.rect(s, Vec2::new(x - 1.0, 0.0), Vec2::new(2.0, c.playfield_height), LANE_MARK);
    }

    for obstacle in &game.obstacles {
        let x = lane_x(obstacle.lane, c.obstacle_width, c);
        list.rect(
            s,
            Vec2::new(x, obstacle.y),
            Vec2::new(c.obstacle_width, c.obstacle_height),
            obstacle_color(obstacle.kind),
        );
    }

    for pickup in &game.pickups {
        let center = pickup.aabb(c).center();
        // Spinning coin: squash the radius with the spin phase
        let radius = c.pickup_size / 2.0 * (0.6 + 0.4 * pickup.spin.cos().abs());
        list.circle(s, center, radius, COIN);
    }

    let runner = &game.runner;
    list.rect(s, Vec2::new(runner.x, runner.y), Vec2::new(runner.width, runner.height), RUNNER);
}

fn court_shapes(session: &Session, list: &mut DrawList) {
    let game = &session.ball;
    let c = &game.config;
    let s = Surface::Court;

    let half = Vec2::new(c.court_width, c.court_height) / 2.0;
    list.rect(s, -half, half * 2.0, COURT);

    let paddle = Vec2::new(c.paddle_width, c.paddle_depth);
    list.rect(s, Vec2::new(game.player_x, game.player_z()) - paddle / 2.0, paddle, PADDLE_PLAYER);
    list.rect(s, Vec2::new(game.ai_x, game.ai_z()) - paddle / 2.0, paddle, PADDLE_AI);

    let ratio = game.vel.length() / c.initial_ball_speed;
    list.circle(s, game.pos, c.ball_radius, speed_color(ratio));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::flyer::Column;
    use crate::sim::runner::LaneObstacle;
    use crate::sim::Mode;

    fn session(mode: Mode) -> Session {
        let mut session = Session::new(GameConfig::default(), 5, 0);
        session.start(mode);
        session
    }

    #[test]
    fn test_easy_mode_has_no_court() {
        let list = build_draw_list(&session(Mode::Easy));
        assert_eq!(list.on(Surface::Court).count(), 0);
        assert!(list.on(Surface::Flyer).count() > 0);
        assert!(list.on(Surface::Runner).count() > 0);
    }

    #[test]
    fn test_hard_mode_draws_court() {
        let list = build_draw_list(&session(Mode::Hard));
        // Floor, two paddles, ball
        assert_eq!(list.on(Surface::Court).count(), 4);
    }

    #[test]
    fn test_column_is_two_rects_around_gap() {
        let mut session = session(Mode::Easy);
        session.flyer.columns.push(Column::new(300.0, 150.0, 80.0, 200.0));
        let list = build_draw_list(&session);

        let column_rects: Vec<_> = list
            .on(Surface::Flyer)
            .filter(|s| s.color == COLUMN)
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            column_rects,
            vec![
                ShapeKind::Rect { min: Vec2::new(300.0, 0.0), size: Vec2::new(80.0, 150.0) },
                ShapeKind::Rect { min: Vec2::new(300.0, 350.0), size: Vec2::new(80.0, 350.0) },
            ]
        );
    }

    #[test]
    fn test_obstacles_use_kind_palette() {
        let mut session = session(Mode::Easy);
        session.runner.obstacles.push(LaneObstacle {
            lane: 2,
            y: 10.0,
            kind: ObstacleKind::Sign,
            passed: false,
        });
        let list = build_draw_list(&session);
        let sign = list
            .on(Surface::Runner)
            .find(|s| s.color == obstacle_color(ObstacleKind::Sign))
            .map(|s| s.kind);
        assert_eq!(
            sign,
            Some(ShapeKind::Rect { min: Vec2::new(420.0, 10.0), size: Vec2::new(60.0, 80.0) })
        );
    }

    #[test]
    fn test_game_over_shades_every_surface() {
        let mut session = session(Mode::Hard);
        session.phase = GamePhase::GameOver;
        let list = build_draw_list(&session);
        assert_eq!(list.shapes.iter().filter(|s| s.color == GAME_OVER_SHADE).count(), 3);
    }

    #[test]
    fn test_speed_color_ramps() {
        assert_eq!(speed_color(1.0), [1.0, 1.0, 1.0, 1.0]);
        let fast = speed_color(3.0);
        assert_eq!(fast[0], 1.0);
        assert!((fast[1] - 0.3).abs() < 1e-6);
        assert!((fast[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_court_bounds_are_centered() {
        let session = session(Mode::Hard);
        let bounds = surface_bounds(Surface::Court, &session);
        assert_eq!(bounds.min, Vec2::new(-5.0, -10.0));
        assert_eq!(bounds.max, Vec2::new(5.0, 10.0));
    }
}
