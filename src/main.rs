//! Dual Arcade entry point
//!
//! Web: wires DOM input, buttons and the HUD around a `FrameScheduler` driven
//! by `requestAnimationFrame`. Native: runs a headless autopilot demo.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{DeviceOrientationEvent, Document, HtmlInputElement, KeyboardEvent, TouchEvent};

    use dual_arcade::consts::RESTART_DEBOUNCE_MS;
    use dual_arcade::leaderboard::{Leaderboard, StoredLeaderboard, Timeframe};
    use dual_arcade::persistence::{KeyValueStore, LocalStorageStore, MemoryStore};
    use dual_arcade::platform::input::lateral_tilt;
    use dual_arcade::platform::InputState;
    use dual_arcade::renderer::{CanvasRenderer, Surface};
    use dual_arcade::sim::{GamePhase, Mode};
    use dual_arcade::{FrameScheduler, GameConfig, HighScoreStore};

    type Store = Rc<dyn KeyValueStore>;

    /// Game instance holding all state
    struct Game {
        scheduler: FrameScheduler<CanvasRenderer, Store>,
        input: InputState,
        leaderboard: Rc<Leaderboard<StoredLeaderboard<Store>>>,
        /// Board shown on the game-over screen, switched by its tabs
        board_mode: Mode,
        board_timeframe: Timeframe,
        /// Timestamp of the latest animation frame
        last_frame: f64,
        last_phase: GamePhase,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            self.last_frame = time;
            let input = self.input.take_snapshot();
            self.scheduler.run_frame(time, &input);

            let phase = self.scheduler.session().phase;
            if phase != self.last_phase {
                self.last_phase = phase;
                self.input.clear();
            }
        }

        /// Space/Enter/tap outside of play: start or (debounced) restart
        fn start_or_restart(&mut self, mode: Mode) {
            match self.scheduler.session().phase {
                GamePhase::NotStarted => self.scheduler.start(mode),
                GamePhase::GameOver => {
                    self.scheduler.request_restart(self.last_frame);
                }
                GamePhase::Playing => {}
            }
        }

        fn update_hud(&self, document: &Document) {
            let session = self.scheduler.session();
            let set = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.class_list().toggle_with_force("hidden", !visible);
                }
            };

            set("flyerScore", &session.scores.flyer.to_string());
            set("runnerScore", &session.scores.runner.to_string());
            set("courtScore", &session.scores.ball.to_string());
            set("totalScore", &session.combined_score().to_string());
            set("highScore", &session.high_score.to_string());

            show("startScreen", session.phase == GamePhase::NotStarted);
            show("courtPanel", session.mode.includes_ball());
            show("gameOverScreen", session.phase == GamePhase::GameOver);
            if let Some(cause) = &session.death_cause {
                set("deathCause", cause);
            }

            match self.scheduler.diagnostic() {
                Some(message) => {
                    set("diagnostic", message);
                    show("diagnostic", true);
                }
                None => show("diagnostic", false),
            }
        }
    }

    fn open_store() -> Store {
        match LocalStorageStore::open() {
            Ok(store) => Rc::new(store),
            Err(err) => {
                log::warn!("{err}, scores will not survive a reload");
                Rc::new(MemoryStore::new())
            }
        }
    }

    /// Optional balance overrides from `<script id="gameConfig" type="application/json">`
    fn load_config(document: &Document) -> GameConfig {
        let Some(json) = document.get_element_by_id("gameConfig").and_then(|el| el.text_content()) else {
            return GameConfig::default();
        };
        match GameConfig::from_json(&json) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}, using defaults");
                GameConfig::default()
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger init failed: {err}").into());
        }

        log::info!("Dual Arcade starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let renderer = CanvasRenderer::from_ids(
            &document,
            &[
                (Surface::Flyer, "flyerCanvas"),
                (Surface::Runner, "runnerCanvas"),
                (Surface::Court, "courtCanvas"),
            ],
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let store = open_store();
        let seed = js_sys::Date::now() as u64;
        let scheduler = FrameScheduler::new(
            load_config(&document),
            seed,
            renderer,
            HighScoreStore::new(Rc::clone(&store)),
        );
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            scheduler,
            input: InputState::new(),
            leaderboard: Rc::new(Leaderboard::new(StoredLeaderboard::new(store))),
            board_mode: Mode::Hard,
            board_timeframe: Timeframe::Weekly,
            last_frame: 0.0,
            last_phase: GamePhase::NotStarted,
        }));

        setup_keyboard(game.clone())?;
        setup_touch(game.clone())?;
        setup_tilt(game.clone())?;
        setup_buttons(&document, game.clone());
        setup_auto_resume(&document, game.clone())?;

        request_animation_frame(game);
        log::info!("Dual Arcade running!");
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let focused_input = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.active_element())
                    .is_some_and(|el| el.tag_name() == "INPUT");
                if focused_input {
                    return;
                }

                let mut g = game.borrow_mut();
                let code = event.code();
                if !g.scheduler.session().is_playing() {
                    if code == "Space" || code == "Enter" {
                        event.prevent_default();
                        g.start_or_restart(Mode::Hard);
                    }
                    return;
                }
                if g.input.key_down(&code) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn touch_target_is_control(event: &TouchEvent) -> bool {
        event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .is_some_and(|el| matches!(el.tag_name().as_str(), "BUTTON" | "INPUT"))
    }

    fn setup_touch(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let width = move || {
            web_sys::window()
                .and_then(|w| w.inner_width().ok())
                .and_then(|w| w.as_f64())
                .unwrap_or(0.0) as f32
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if touch_target_is_control(&event) {
                    return;
                }
                let mut g = game.borrow_mut();
                if !g.scheduler.session().is_playing() {
                    event.prevent_default();
                    g.start_or_restart(Mode::Hard);
                    return;
                }
                if let Some(touch) = event.changed_touches().get(0) {
                    event.prevent_default();
                    g.input.touch_start(touch.client_x() as f32, width());
                }
            });
            let options = web_sys::AddEventListenerOptions::new();
            options.set_passive(false);
            document.add_event_listener_with_callback_and_add_event_listener_options(
                "touchstart",
                closure.as_ref().unchecked_ref(),
                &options,
            )?;
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if touch_target_is_control(&event) {
                    return;
                }
                let mut g = game.borrow_mut();
                if !g.scheduler.session().is_playing() {
                    return;
                }
                if let Some(touch) = event.changed_touches().get(0) {
                    if g.input.touch_end(touch.client_x() as f32, width()) {
                        event.prevent_default();
                    }
                }
            });
            document.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_tilt(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
            let angle = web_sys::window()
                .and_then(|w| w.screen().ok())
                .and_then(|s| s.orientation().angle().ok())
                .unwrap_or(0) as i32;
            let degrees = lateral_tilt(
                event.beta().unwrap_or(0.0) as f32,
                event.gamma().unwrap_or(0.0) as f32,
                angle,
            );
            let mut g = game.borrow_mut();
            if g.scheduler.session().is_playing() {
                g.input.tilt(degrees);
            }
        });
        window.add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Button #{id} not found");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            event.stop_propagation();
            handler();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for (id, mode) in [("startHard", Mode::Hard), ("startEasy", Mode::Easy)] {
            let game = game.clone();
            on_click(document, id, move || game.borrow_mut().scheduler.start(mode));
        }

        {
            let game = game.clone();
            on_click(document, "restartButton", move || {
                let mut g = game.borrow_mut();
                let now = g.last_frame;
                if !g.scheduler.request_restart(now) {
                    log::info!("Restart needs {RESTART_DEBOUNCE_MS} ms after game over");
                }
            });
        }

        {
            let game = game.clone();
            on_click(document, "resetHighScore", move || {
                game.borrow_mut().scheduler.reset_high_score();
            });
        }

        {
            let game = game.clone();
            on_click(document, "submitScoreButton", move || {
                let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                    return;
                };
                let name = document
                    .get_element_by_id("playerNameInput")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();

                let mut g = game.borrow_mut();
                let session = g.scheduler.session();
                if session.phase != GamePhase::GameOver {
                    return;
                }
                let score = session.combined_score();
                let mode = session.mode;
                g.board_mode = mode;
                let timeframe = g.board_timeframe;
                let leaderboard = Rc::clone(&g.leaderboard);
                drop(g);

                wasm_bindgen_futures::spawn_local(async move {
                    let now = js_sys::Date::now();
                    let status = leaderboard.submit_score(&name, score, mode, now).await;
                    if let Some(el) = document.get_element_by_id("submitStatus") {
                        el.set_text_content(Some(&status));
                    }
                    show_leaderboard(&document, &leaderboard, mode, timeframe, now).await;
                });
            });
        }

        for (id, timeframe) in [("tabWeekly", Timeframe::Weekly), ("tabAllTime", Timeframe::AllTime)] {
            let game = game.clone();
            on_click(document, id, move || {
                game.borrow_mut().board_timeframe = timeframe;
                refresh_leaderboard(&game);
            });
        }
        for (id, mode) in [("tabHard", Mode::Hard), ("tabEasy", Mode::Easy)] {
            let game = game.clone();
            on_click(document, id, move || {
                game.borrow_mut().board_mode = mode;
                refresh_leaderboard(&game);
            });
        }
    }

    /// Re-fetch the board for the selected tabs and mark them active
    fn refresh_leaderboard(game: &Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let (mode, timeframe, leaderboard) = {
            let g = game.borrow();
            (g.board_mode, g.board_timeframe, Rc::clone(&g.leaderboard))
        };

        for (id, active) in [
            ("tabWeekly", timeframe == Timeframe::Weekly),
            ("tabAllTime", timeframe == Timeframe::AllTime),
            ("tabHard", mode == Mode::Hard),
            ("tabEasy", mode == Mode::Easy),
        ] {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("active", active);
            }
        }

        wasm_bindgen_futures::spawn_local(async move {
            show_leaderboard(&document, &leaderboard, mode, timeframe, js_sys::Date::now()).await;
        });
    }

    async fn show_leaderboard(
        document: &Document,
        leaderboard: &Leaderboard<StoredLeaderboard<Store>>,
        mode: Mode,
        timeframe: Timeframe,
        now: f64,
    ) {
        let Some(list) = document.get_element_by_id("leaderboardList") else {
            return;
        };
        let text = match leaderboard.top_scores(mode, timeframe, now).await {
            Ok(entries) if entries.is_empty() => "No scores yet in this category!".to_string(),
            Ok(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, e)| format!("{}. {} - {}", i + 1, e.name, e.score))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => {
                log::error!("Error fetching scores: {err}");
                "Error loading scores".to_string()
            }
        };
        list.set_text_content(Some(&text));
    }

    fn setup_auto_resume(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Visible {
                game.borrow_mut().scheduler.resume();
                log::info!("Tab visible again, clock re-based");
            }
        });
        document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use dual_arcade::consts::REFERENCE_FRAME_MS;
    use dual_arcade::persistence::MemoryStore;
    use dual_arcade::renderer::HeadlessRenderer;
    use dual_arcade::sim::{GameEvent, GamePhase, Mode, Session, Steer, TickInput};
    use dual_arcade::{FrameScheduler, GameConfig, HighScoreStore};

    /// Runs the autopilot gets before the demo stops
    const RUNS: u32 = 3;
    /// Frame budget per run (about five minutes at 60 Hz)
    const MAX_FRAMES: u32 = 18_000;

    /// Naive player: keeps the flyer near the next gap, steps out of lanes
    /// with incoming obstacles, and tilts toward the ball
    fn autopilot(session: &Session) -> TickInput {
        let flyer = &session.flyer.flyer;
        let target_y = session
            .flyer
            .columns
            .iter()
            .find(|c| c.trailing_edge() > flyer.x - flyer.radius)
            .map(|c| c.gap_top + c.gap * 0.6)
            .unwrap_or(session.config.flyer.playfield_height * 0.45);
        let jump = flyer.y > target_y && flyer.velocity >= 0.0;

        let runner = &session.runner.runner;
        let danger = |lane: u8| {
            session
                .runner
                .obstacles
                .iter()
                .any(|o| o.lane == lane && o.y > runner.y - 300.0 && o.y < runner.y + runner.height)
        };
        let (mut move_left, mut move_right) = (0, 0);
        if danger(runner.target_lane) {
            let lane = runner.target_lane;
            if lane > 0 && !danger(lane - 1) {
                move_left = 1;
            } else if !danger(lane + 1) {
                move_right = 1;
            }
        }

        let half_range = session.config.ball.paddle_half_range();
        let tilt = (session.ball.pos.x / half_range).clamp(-1.0, 1.0);

        TickInput {
            jump,
            move_left,
            move_right,
            steer: Some(Steer::Tilt(tilt)),
        }
    }

    pub fn run(config: GameConfig, seed: u64) {
        let mut scheduler = FrameScheduler::new(
            config,
            seed,
            HeadlessRenderer::default(),
            HighScoreStore::new(MemoryStore::new()),
        );
        scheduler.start(Mode::Hard);

        let mut now = 0.0;
        for run in 1..=RUNS {
            let mut frames = 0;
            while scheduler.session().phase == GamePhase::Playing && frames < MAX_FRAMES {
                now += REFERENCE_FRAME_MS;
                let input = autopilot(scheduler.session());
                scheduler.run_frame(now, &input);
                frames += 1;

                for event in &scheduler.session().events {
                    if let GameEvent::HighScore { score } = event {
                        log::debug!("New high score {score}");
                    }
                }
            }

            let session = scheduler.session();
            log::info!(
                "Run {run}: {} after {frames} frames, scores {:?}, total {}, best {}",
                session.death_cause.as_deref().unwrap_or("survived"),
                session.scores,
                session.combined_score(),
                session.high_score,
            );

            if session.phase == GamePhase::GameOver {
                now += 1000.0;
                scheduler.request_restart(now);
            } else {
                break;
            }
        }
        log::info!(
            "Demo finished: {} frames rendered, best score {}",
            scheduler.renderer().frames,
            scheduler.session().high_score
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use dual_arcade::GameConfig;

    env_logger::init();
    log::info!("Dual Arcade (native) starting...");
    log::info!("Native mode runs a headless autopilot - run with `trunk serve` for the web version");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| GameConfig::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(config) => config,
                Err(err) => {
                    log::error!("Could not load config {path}: {err}");
                    return std::process::ExitCode::FAILURE;
                }
            }
        }
        None => GameConfig::default(),
    };

    let seed = std::env::args().nth(2).and_then(|s| s.parse().ok()).unwrap_or(2024);
    demo::run(config, seed);
    std::process::ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
