//! Bow Runner entry point
//!
//! In the browser this wires the keyboard, the frame loop, localStorage and
//! the DOM HUD. Natively it plays the demo level headless with scripted input
//! and records the result in a JSON ranking file.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent};

    use bow_runner::platform::HeldButtons;
    use bow_runner::platform::storage::LocalStorage;
    use bow_runner::sim::{GameEvent, LoseReason, RunStatus, WinPhase};
    use bow_runner::{GameConfig, Session, format_time};

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorage>,
        input: HeldButtons,
        /// The name prompt is open; keys go to the text field
        naming: bool,
        last_loss: Option<LoseReason>,
    }

    impl Game {
        fn new() -> Self {
            let store = LocalStorage::new();
            let config = GameConfig::load(&store);
            Self {
                session: Session::demo(config, store),
                input: HeldButtons::new(),
                naming: false,
                last_loss: None,
            }
        }

        /// Run one frame and react to what happened
        fn update(&mut self, time: f64) {
            let events = self.session.frame(time, &mut self.input);
            for event in events {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::NameRequested => {
                    self.naming = true;
                    self.input.clear();
                    show_name_prompt(true);
                }
                GameEvent::RankingChanged { .. } => {
                    self.naming = false;
                    show_name_prompt(false);
                }
                GameEvent::RunReset => {
                    self.last_loss = None;
                }
                GameEvent::Lost { reason } => {
                    self.last_loss = Some(reason);
                }
                _ => {}
            }
        }

        /// Name typed into the prompt
        fn submit_name(&mut self, name: &str) {
            if self.session.submit_name(Some(name)) {
                self.naming = false;
                show_name_prompt(false);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let sim = self.session.simulation();
            let hud = sim.hud();

            set_text(document, "#hud-lives .hud-value", &hud.lives.to_string());
            set_text(document, "#hud-time .hud-value", &format!("{:.0}", hud.time_left.ceil()));
            set_text(document, "#hud-score .hud-value", &hud.score.to_string());

            let message = match sim.run.status {
                RunStatus::Menu => "Press Enter to start".to_string(),
                RunStatus::Playing => String::new(),
                RunStatus::Win(WinPhase::WaitingForName { .. }) => {
                    format!("You made it in {}! Enter your name", format_time(sim.elapsed()))
                }
                RunStatus::Win(WinPhase::Recorded { rank }) => match rank {
                    Some(r) => format!("You win! #{} - press R to play again", r),
                    None => "You win! Press R to play again".to_string(),
                },
                RunStatus::Lose => match self.last_loss {
                    Some(LoseReason::TimeUp) => "Time up! Press R to retry".to_string(),
                    _ => "Out of lives! Press R to retry".to_string(),
                },
            };
            set_text(document, "#status", &message);

            let best = match sim.ranking.best() {
                Some(e) => format!("{} {} ({} bows)", e.name, format_time(e.time), e.pickups),
                None => "-".to_string(),
            };
            set_text(document, "#hud-best .hud-value", &best);

            let ranking = &sim.ranking;
            let lines: Vec<String> = if ranking.is_empty() {
                vec!["No runs yet".to_string()]
            } else {
                ranking
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| format!("{}. {}", i + 1, e.display()))
                    .collect()
            };
            set_text(document, "#top3", &lines.join("\n"));
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn name_input(document: &Document) -> Option<HtmlInputElement> {
        document
            .get_element_by_id("name-input")?
            .dyn_into::<HtmlInputElement>()
            .ok()
    }

    fn show_name_prompt(visible: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("name-prompt") {
            let _ = if visible {
                el.class_list().remove_1("hidden")
            } else {
                el.class_list().add_1("hidden")
            };
        }
        if let Some(input) = name_input(&document) {
            if visible {
                input.set_value("");
                let _ = input.focus();
            } else {
                let _ = input.blur();
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Bow Runner starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let game = Rc::new(RefCell::new(Game::new()));

        setup_keyboard(&window, game.clone())?;
        setup_name_prompt(&document, game.clone())?;
        setup_auto_pause(&document, game.clone())?;

        // Start game loop
        request_animation_frame(game);

        log::info!("Bow Runner running!");
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if g.naming || event.repeat() {
                    return;
                }
                if g.input.key_down(&event.code()) {
                    // Keep Space and the arrows from scrolling the page
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

    fn setup_name_prompt(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let Some(input) = name_input(document) else {
            log::warn!("No #name-input element, wins will use the default name");
            return Ok(());
        };

        let field = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.code() == "Enter" || event.code() == "NumpadEnter" {
                event.prevent_default();
                event.stop_propagation();
                game.borrow_mut().submit_name(&field.value());
            }
        });
        input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                // Keys released while hidden never report keyup
                g.input.clear();
                g.session.pause_clock();
                log::info!("Page hidden, frame clock paused");
            }
        });
        document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
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
            g.update(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;

    use bow_runner::platform::Autopilot;
    use bow_runner::platform::storage::FileStore;
    use bow_runner::sim::{GameEvent, RunStatus, WinPhase};
    use bow_runner::{GameConfig, Session, Variant, format_time};

    /// Fixed frame time for headless runs
    const DT: f32 = 1.0 / 60.0;

    #[derive(Parser)]
    #[command(name = "bow-runner")]
    #[command(about = "Play the Bow Runner demo level headless with scripted input")]
    struct Args {
        /// Settings JSON file (stored settings or defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Game variant: classic, arcade or timetrial
        #[arg(long)]
        variant: Option<String>,
        /// Directory holding the ranking file
        #[arg(long, default_value = "bow-runner-data")]
        data_dir: PathBuf,
        /// Name recorded when the run reaches the goal
        #[arg(long, default_value = "Autopilot")]
        name: String,
        /// Frames between jump presses
        #[arg(long, default_value_t = 45)]
        jump_every: u64,
        /// Frames between dash presses
        #[arg(long, default_value_t = 150)]
        dash_every: u64,
    }

    fn load_config(args: &Args, store: &FileStore) -> Result<GameConfig, String> {
        let mut config = match &args.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
                GameConfig::from_json(&json)
                    .map_err(|e| format!("Invalid settings in {}: {e}", path.display()))?
            }
            None => GameConfig::load(store),
        };

        if let Some(name) = &args.variant {
            let variant = Variant::from_str(name)
                .ok_or_else(|| format!("Unknown variant '{name}' (expected classic, arcade or timetrial)"))?;
            config.apply_variant(variant);
        }
        Ok(config)
    }

    pub fn run() -> ExitCode {
        let args = Args::parse();
        let store = FileStore::new(&args.data_dir);

        let config = match load_config(&args, &store) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        };

        log::info!(
            "Bow Runner (native) starting, {} variant",
            config.variant.as_str()
        );

        // A little past the time limit; every run ends before this
        let max_frames = ((config.run.time_limit + 1.0) / DT).ceil() as u64;
        let mut session = Session::demo(config, store);
        let mut pilot = Autopilot::new(args.jump_every, args.dash_every);

        while pilot.frame() < max_frames {
            pilot.advance();
            for event in session.step(DT, &mut pilot) {
                match event {
                    GameEvent::LifeLost { cause, lives } => {
                        println!("Lost a life ({:?}), {} left", cause, lives);
                    }
                    GameEvent::Won { time, pickups } => {
                        println!("Reached the goal in {} with {} bows", format_time(time), pickups);
                    }
                    GameEvent::NameRequested => {
                        session.submit_name(Some(&args.name));
                    }
                    GameEvent::Lost { reason } => {
                        println!("Run lost: {:?}", reason);
                    }
                    _ => {}
                }
            }

            let status = session.simulation().run.status;
            if matches!(status, RunStatus::Lose | RunStatus::Win(WinPhase::Recorded { .. })) {
                break;
            }
        }

        let sim = session.simulation();
        match sim.run.status {
            RunStatus::Win(WinPhase::Recorded { rank: Some(rank) }) => {
                println!("{} placed #{}", args.name, rank);
            }
            RunStatus::Win(_) => println!("{} did not make the ranking", args.name),
            RunStatus::Lose => {}
            RunStatus::Menu | RunStatus::Playing => {
                println!("Run still going after {} frames", pilot.frame());
            }
        }
        println!(
            "Bows {}/{}, lives {}, time {}",
            sim.run.score,
            sim.world.pickups.len(),
            sim.run.lives,
            format_time(sim.elapsed())
        );

        println!();
        println!("=== TOP {} ===", sim.ranking.capacity);
        if sim.ranking.is_empty() {
            println!("No runs yet");
        }
        for (i, entry) in sim.ranking.entries.iter().enumerate() {
            println!("{}. {}", i + 1, entry.display());
        }
        println!("(stored in {})", args.data_dir.display());

        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
