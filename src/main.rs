//! Pose Catch entry point
//!
//! Web: wires the session controller to the canvas, HUD, animation frames,
//! the 1 Hz countdown and the JavaScript pose model.
//! Native: runs a headless autopilot session and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlButtonElement, HtmlCanvasElement};

    use pose_catch::consts::*;
    use pose_catch::label::Prediction;
    use pose_catch::sim::{GameEvent, autopilot};
    use pose_catch::{
        EndReason, PredictionStabilizer, RenderSnapshot, SessionController, SessionObserver,
        Settings,
    };

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Pending browser callbacks for the running session
    #[derive(Default)]
    struct Timers {
        frame_id: Option<i32>,
        interval_id: Option<i32>,
        countdown: Option<Closure<dyn FnMut()>>,
    }

    impl Timers {
        /// Cancel both schedules so no late callback reaches the controller
        fn cancel(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Some(id) = self.frame_id.take() {
                let _ = window.cancel_animation_frame(id);
            }
            if let Some(id) = self.interval_id.take() {
                window.clear_interval_with_handle(id);
            }
            // The countdown closure may be the caller; it is dropped on next start
        }
    }

    /// Game instance holding all state
    struct Game {
        controller: SessionController,
        stabilizer: PredictionStabilizer,
        ctx: CanvasRenderingContext2d,
        timers: Rc<RefCell<Timers>>,
        /// Demo mode - autopilot moves the catcher
        idle_mode: bool,
    }

    /// Mirrors session state into the DOM
    struct Hud {
        timers: Rc<RefCell<Timers>>,
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_disabled(id: &str, disabled: bool) {
        if let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            btn.set_disabled(disabled);
        }
    }

    impl SessionObserver for Hud {
        fn on_score_changed(&mut self, score: i64, level: u32) {
            set_text("score", &score.to_string());
            set_text("level", &level.to_string());
        }

        fn on_time_changed(&mut self, seconds_remaining: u32) {
            set_text("time", &seconds_remaining.to_string());
        }

        fn on_session_ended(&mut self, final_score: i64, _final_level: u32, reason: EndReason) {
            self.timers.borrow_mut().cancel();
            let headline = match reason {
                EndReason::Hazard => "폭탄을 받았습니다! 게임 오버!",
                EndReason::TimedOut => "시간 종료! 게임 오버!",
                EndReason::Stopped => "게임 중지",
            };
            set_text("message", &format!("{headline} 최종 점수: {final_score}"));
            set_disabled("gameStartBtn", false);
        }

        fn on_game_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::Caught { points, .. } => set_text("message", &format!("+{points}")),
                GameEvent::LevelUp { level } => set_text("message", &format!("레벨 {level}!")),
                _ => {}
            }
        }
    }

    impl Game {
        fn render(&self) {
            draw(&self.ctx, &self.controller.snapshot());
        }

        fn apply_label(&mut self, label: &str) {
            if !self.idle_mode {
                self.controller.on_label(label);
            }
        }
    }

    fn draw(ctx: &CanvasRenderingContext2d, snap: &RenderSnapshot) {
        let (w, h) = (snap.field.width as f64, snap.field.height as f64);
        ctx.clear_rect(0.0, 0.0, w, h);

        // Lane dividers
        ctx.set_stroke_style_str("#eee");
        ctx.begin_path();
        let band = w / 3.0;
        ctx.move_to(band, 0.0);
        ctx.line_to(band, h);
        ctx.move_to(band * 2.0, 0.0);
        ctx.line_to(band * 2.0, h);
        ctx.stroke();

        // Catcher
        let (cx, cy) = (snap.catcher_pos.x as f64, snap.catcher_pos.y as f64);
        ctx.set_fill_style_str("blue");
        ctx.begin_path();
        let _ = ctx.arc(cx, cy, CATCHER_RADIUS as f64, 0.0, std::f64::consts::TAU);
        ctx.fill();
        ctx.set_fill_style_str("white");
        ctx.set_font("12px Arial");
        ctx.set_text_align("center");
        let _ = ctx.fill_text("Basket", cx, cy + 4.0);

        for item in &snap.items {
            ctx.set_fill_style_str(&item.color);
            ctx.begin_path();
            let _ = ctx.arc(
                item.pos.x as f64,
                item.pos.y as f64,
                ITEM_RADIUS as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }
    }

    fn with_game(f: impl FnOnce(&mut Game)) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                f(&mut game.borrow_mut());
            }
        });
    }

    /// Called by the pose pipeline with one frame of class probabilities
    /// (JSON array of `{ className, probability }`).
    #[wasm_bindgen]
    pub fn push_predictions(json: &str) {
        let predictions: Vec<Prediction> = match serde_json::from_str(json) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Bad prediction frame: {e}");
                return;
            }
        };
        with_game(|g| {
            let label = g.stabilizer.stabilize(&predictions).map(str::to_owned);
            if let Some(label) = label {
                g.apply_label(&label);
            }
        });
    }

    /// Called with an already-stabilized label
    #[wasm_bindgen]
    pub fn push_label(label: &str) {
        with_game(|g| g.apply_label(label));
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pose Catch starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = Settings::load();
        let stabilizer =
            PredictionStabilizer::new(settings.label_threshold, settings.smoothing_frames);
        let timers = Rc::new(RefCell::new(Timers::default()));
        let hud = Hud {
            timers: timers.clone(),
        };

        let seed = js_sys::Date::now() as u64;
        let mut controller = match SessionController::new(settings, seed, vec![Box::new(hud)]) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Settings rejected ({e}), using defaults");
                settings_fallback(seed, timers.clone())
            }
        };
        controller.configure(canvas.width() as f32, canvas.height() as f32);
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            controller,
            stabilizer,
            ctx,
            timers,
            idle_mode: false,
        }));
        game.borrow().render();
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        setup_buttons(game.clone());
        setup_keys(game);

        set_disabled("gameStartBtn", false);
        set_disabled("stopBtn", false);
        log::info!("Pose Catch ready");
    }

    fn settings_fallback(seed: u64, timers: Rc<RefCell<Timers>>) -> SessionController {
        SessionController::new(Settings::default(), seed, vec![Box::new(Hud { timers })])
            .expect("default settings are valid")
    }

    fn start_session(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if let Err(e) = g.controller.start() {
                log::error!("Cannot start: {e}");
                return;
            }
            g.stabilizer.reset();
        }
        set_disabled("gameStartBtn", true);
        set_text("message", "");

        let window = web_sys::window().expect("no window");
        let timers = game.borrow().timers.clone();
        let countdown = {
            let game = game.clone();
            Closure::<dyn FnMut()>::new(move || {
                game.borrow_mut().controller.countdown();
            })
        };
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            countdown.as_ref().unchecked_ref(),
            1000,
        ) {
            Ok(id) => {
                let mut t = timers.borrow_mut();
                t.interval_id = Some(id);
                t.countdown = Some(countdown);
            }
            Err(e) => log::error!("setInterval failed: {:?}", e),
        }

        request_animation_frame(game);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let timers = game.borrow().timers.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            timers.borrow_mut().frame_id = Some(id);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let active = {
            let mut g = game.borrow_mut();
            g.timers.borrow_mut().frame_id = None;

            if g.idle_mode {
                if let Some(lane) = autopilot::suggest_lane(g.controller.state()) {
                    g.controller.set_catcher_lane(lane);
                }
            }
            g.controller.frame(time);
            g.render();
            g.controller.is_active()
        };

        if active {
            request_animation_frame(game);
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("gameStartBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                start_session(game.clone());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("stopBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.controller.stop();
                g.render();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keys(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                "ArrowLeft" => g.apply_label("LEFT"),
                "ArrowDown" | "ArrowUp" => g.apply_label("CENTER"),
                "ArrowRight" => g.apply_label("RIGHT"),
                "i" | "I" => {
                    g.idle_mode = !g.idle_mode;
                    log::info!("Idle mode: {}", g.idle_mode);
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pose_catch::consts::*;
    use pose_catch::sim::{GameEvent, autopilot};
    use pose_catch::{EndReason, SessionController, SessionObserver, Settings};

    struct LogObserver;

    impl SessionObserver for LogObserver {
        fn on_score_changed(&mut self, score: i64, level: u32) {
            log::info!("score {score} (level {level})");
        }

        fn on_game_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::LevelUp { level } => log::info!("level up -> {level}"),
                GameEvent::HazardCaught { id } => log::info!("caught hazard #{id}"),
                _ => log::trace!("{event:?}"),
            }
        }

        fn on_session_ended(&mut self, final_score: i64, final_level: u32, reason: EndReason) {
            println!(
                "Session over ({}): score {final_score}, level {final_level}",
                reason.as_str()
            );
        }
    }

    env_logger::init();
    log::info!("Pose Catch (native) starting...");
    log::info!("Native mode runs a headless autopilot session - use the wasm build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);
    let mut controller =
        match SessionController::new(Settings::load(), seed, vec![Box::new(LogObserver)]) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        };
    controller.configure(FIELD_WIDTH, FIELD_HEIGHT);
    if let Err(e) = controller.start() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    // 60 frames per simulated second, one countdown per second
    let mut frame = 0u64;
    while controller.is_active() {
        if let Some(lane) = autopilot::suggest_lane(controller.state()) {
            controller.set_catcher_lane(lane);
        }
        controller.frame(frame as f64 * SIM_DT_MS);
        frame += 1;
        if frame % 60 == 0 {
            controller.countdown();
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
