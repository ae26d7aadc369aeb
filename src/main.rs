//! Flappy Dragon entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use flappy_dragon::audio::AudioManager;
    use flappy_dragon::consts::*;
    use flappy_dragon::highscores::format_date;
    use flappy_dragon::renderer::RenderState;
    use flappy_dragon::sim::{GameEvent, GamePhase};
    use flappy_dragon::{HighScores, Session, Settings, Tuning};

    /// LocalStorage key for an optional tuning override
    const TUNING_KEY: &str = "flappy_dragon_tuning";

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        last_phase: GamePhase,
        /// Rank of the score just recorded, for the game over panel
        last_rank: Option<usize>,
        focused: bool,
    }

    impl Game {
        fn new(mut session: Session, settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            settings.apply_to(&mut audio);
            session.set_idle_mode(settings.attract_mode);

            Self {
                session,
                render_state: None,
                audio,
                settings,
                highscores: HighScores::new(),
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                last_phase: GamePhase::Starting,
                last_rank: None,
                focused: true,
            }
        }

        /// A real tap ends the attract demo and unlocks audio
        fn tap(&mut self) {
            self.audio.resume();
            if self.settings.attract_mode && self.session.idle_mode() {
                self.session.reset(js_sys::Date::now() as u64);
                self.session.set_idle_mode(false);
                log::info!("Attract mode ended");
                return;
            }
            self.session.tap();
        }

        fn set_focused(&mut self, focused: bool) {
            self.focused = focused;
            self.audio.set_muted(self.settings.should_mute(focused));
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.set_muted(self.settings.should_mute(self.focused));
            log::info!("Muted: {}", self.settings.muted);
        }

        /// Run simulation ticks and react to what happened
        fn update(&mut self, dt: f32, time: f64) {
            self.session.advance(dt);

            for event in self.session.drain_events() {
                self.audio.handle_event(&event);
                if let GameEvent::GameOverShown { score } = event {
                    self.record_score(score);
                }
            }

            // The autopilot never taps past game over
            if self.session.idle_mode() && self.session.state.phase == GamePhase::Finished {
                self.session.tap();
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            let phase = self.session.state.phase;
            if phase != self.last_phase {
                if phase == GamePhase::Starting {
                    self.last_rank = None;
                }
                self.last_phase = phase;
            }
        }

        fn record_score(&mut self, score: u32) {
            // Demo runs don't count
            if self.session.idle_mode() {
                return;
            }
            self.last_rank = self.highscores.add_score(score, js_sys::Date::now());
            if let Some(rank) = self.last_rank {
                log::info!("New high score #{rank}: {score}");
            }
            update_leaderboard(&self.highscores);
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.session.state.scene) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = &self.session.state;

            // Score label text comes straight from the scene
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                let text = state
                    .scene
                    .label_text(state.handles.score_label)
                    .unwrap_or_default();
                if el.text_content().as_deref() != Some(text.as_str()) {
                    el.set_text_content(Some(&text));
                }
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("demo-badge") {
                let class = if self.session.idle_mode() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                let label = state
                    .handles
                    .game_over_label
                    .and_then(|label| state.scene.label_text(label));
                match label {
                    Some(text) if state.phase == GamePhase::Finished => {
                        let _ = el.set_attribute("class", "");
                        if let Some(title) = document.get_element_by_id("game-over-title") {
                            title.set_text_content(Some(&text));
                        }
                        if let Some(score_el) = document.get_element_by_id("final-score") {
                            score_el.set_text_content(Some(&state.score.to_string()));
                        }
                        if let Some(rank_el) = document.get_element_by_id("final-rank") {
                            let rank = self
                                .last_rank
                                .map(|rank| format!("New high score #{rank}!"))
                                .unwrap_or_default();
                            rank_el.set_text_content(Some(&rank));
                        }
                    }
                    _ => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }
        }
    }

    /// Rebuild the leaderboard list
    fn update_leaderboard(highscores: &HighScores) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(list) = document.get_element_by_id("leaderboard") else {
            return;
        };

        let rows: String = highscores
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "<li><span class=\"rank\">{}</span><span class=\"score\">{}</span><span class=\"date\">{}</span></li>",
                    i + 1,
                    entry.score,
                    format_date(entry.timestamp)
                )
            })
            .collect();
        list.set_inner_html(&rows);
    }

    /// Tuning override from LocalStorage, defaults when absent or invalid
    fn load_tuning() -> Tuning {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|storage| storage.get_item(TUNING_KEY).ok().flatten());

        let Some(json) = stored else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning override from LocalStorage");
                tuning
            }
            Err(e) => {
                log::error!("Ignoring stored tuning: {e}");
                Tuning::default()
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Flappy Dragon starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"canvas\"> element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let tuning = load_tuning();
        let scene_size = tuning.scene_size();
        let session = match Session::with_tuning(tuning, seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Tuning rejected, using defaults: {e}");
                Session::new(seed)
            }
        };
        let game = Rc::new(RefCell::new(Game::new(session, Settings::default())));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {e}");
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {e}");
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, scene_size).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Renderer unavailable: {e}"),
        }

        update_leaderboard(&game.borrow().highscores);

        setup_input_handlers(&canvas, game.clone());
        setup_restart_button(game.clone());
        setup_focus_handlers(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Flappy Dragon running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().tap();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().tap();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "ArrowUp" => {
                        event.prevent_default();
                        g.tap();
                    }
                    "i" | "I" => {
                        let idle = !g.session.idle_mode();
                        g.session.set_idle_mode(idle);
                        log::info!("Idle mode: {}", idle);
                    }
                    "m" | "M" => g.toggle_mute(),
                    "f" | "F" => g.settings.show_fps = !g.settings.show_fps,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.state.phase == GamePhase::Finished {
                    g.tap();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (name, focused) in [("focus", true), ("blur", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().set_focused(focused);
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    env_logger::init();
    log::info!("Flappy Dragon (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - run with `trunk serve` for the web version");

    match native::run_demo() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use flappy_dragon::audio::AudioManager;
    use flappy_dragon::sim::{GameEvent, GamePhase};
    use flappy_dragon::{HighScores, Session, Tuning, TuningError};

    /// Frame delta of the simulated display
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Demo length when `FLAPPY_DEMO_SECS` is unset
    const DEFAULT_DEMO_SECS: f32 = 60.0;

    fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    /// Play autopilot sessions back to back and print the leaderboard
    pub fn run_demo() -> Result<(), TuningError> {
        let tuning = match std::env::var_os("FLAPPY_TUNING") {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };

        let seed = env_or("FLAPPY_SEED", now_ms() as u64);
        let seconds = env_or("FLAPPY_DEMO_SECS", DEFAULT_DEMO_SECS);
        let mut session = Session::with_tuning(tuning, seed)?;
        session.set_idle_mode(true);
        log::info!("Demo seed {seed}, {seconds} s");

        let mut audio = AudioManager::new();
        let mut highscores = HighScores::new();
        let mut elapsed = 0.0;

        while elapsed < seconds {
            session.advance(FRAME_DT);
            elapsed += FRAME_DT;

            for event in session.drain_events() {
                audio.handle_event(&event);
                match event {
                    GameEvent::Scored { score } => log::info!("Score {score}"),
                    GameEvent::GameOverShown { score } => {
                        if let Some(rank) = highscores.add_score(score, now_ms()) {
                            log::info!(
                                "Session {} finished with {score} (rank {rank})",
                                session.state.session
                            );
                        }
                    }
                    _ => {}
                }
            }

            // The autopilot only flies; restart it once the label is up
            if session.state.phase == GamePhase::Finished {
                session.tap();
            }
        }

        println!("\nFlappy Dragon demo: {} session(s)", session.state.session);
        if highscores.is_empty() {
            println!("No scores recorded");
        }
        for (i, entry) in highscores.entries.iter().enumerate() {
            println!("{:>2}. {}", i + 1, entry.score);
        }
        Ok(())
    }
}
