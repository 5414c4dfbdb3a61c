//! Rooftop Cat entry point
//!
//! The browser build attaches to `#canvas` and runs the frame loop. The
//! native build plays headless runs with the autopilot and logs the outcome.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;

    use rooftop_cat::platform::web::Host;

    thread_local! {
        static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger init failed: {e}").into());
        }
        log::info!("Rooftop Cat starting...");

        match Host::start("canvas") {
            Ok(host) => HOST.with(|h| *h.borrow_mut() = Some(host)),
            Err(e) => log::error!("Failed to start: {e:?}"),
        }
    }

    pub fn stop() {
        // Dropping the host tears down the loop and listeners
        HOST.with(|h| h.borrow_mut().take());
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Stop the game and release the page (used when the canvas is unmounted)
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop() {
    wasm_game::stop();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use rooftop_cat::Game;
    use rooftop_cat::persistence::MemoryStorage;
    use rooftop_cat::renderer::{Renderer, TraceRenderer};
    use rooftop_cat::sim::{GameEvent, SimRng, Viewport, autopilot};
    use rooftop_cat::tuning::Tuning;

    /// Simulated frame length (60 Hz)
    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Headless autopilot runs
    #[derive(Parser, Debug)]
    #[command(name = "rooftop-cat")]
    #[command(about = "Play headless Rooftop Cat runs with the autopilot and log the outcome")]
    pub struct Options {
        /// Text seed (same hashing as the web `?seed=` parameter); random if omitted
        pub seed: Option<String>,
        /// Simulated seconds
        #[arg(long, default_value_t = 60.0, value_parser = parse_seconds)]
        pub seconds: f32,
        /// JSON file overriding balance values
        #[arg(long)]
        pub tuning: Option<PathBuf>,
        /// Print the final world state as JSON
        #[arg(long)]
        pub dump: bool,
    }

    fn parse_seconds(s: &str) -> Result<f32, String> {
        s.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("expected a positive number of seconds, got {s:?}"))
    }

    fn load_tuning(path: &Path) -> Result<Tuning, String> {
        let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        Tuning::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
    }

    pub fn run(opts: Options) -> Result<(), String> {
        let tuning = match opts.tuning.as_deref() {
            Some(path) => load_tuning(path)?,
            None => Tuning::default(),
        };
        let rng = match &opts.seed {
            Some(seed) => SimRng::from_seed_str(seed),
            None => SimRng::from_entropy(),
        };
        log::info!("Seed: {:?}, {}s simulated", opts.seed, opts.seconds);

        let mut game = Game::new(Viewport::default(), tuning, rng, Box::new(MemoryStorage::new()));
        let mut renderer = TraceRenderer::new(60);
        let frames = (opts.seconds / FRAME_DT).ceil() as u64;
        let mut deaths = 0u32;
        let mut retry = false;

        for _ in 0..frames {
            if retry {
                game.start_or_jump();
                retry = false;
            }
            for intent in autopilot(game.world()) {
                game.push(intent);
            }
            for event in game.frame(FRAME_DT) {
                if let GameEvent::Died { cause, score } = event {
                    deaths += 1;
                    log::info!("Run {deaths} ended: {cause:?} at {score}");
                    retry = true;
                }
            }
            renderer.draw(game.world());
        }

        if let Some(last) = renderer.last() {
            log::info!("Final frame: {last}");
        }
        log::info!("Best {} over {} deaths in {} frames", game.best_score(), deaths, renderer.frames());

        if opts.dump {
            let json = serde_json::to_string_pretty(game.world()).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = Options::try_parse_from(["rooftop-cat"]).unwrap();
            assert_eq!(opts.seed, None);
            assert_eq!(opts.seconds, 60.0);
            assert_eq!(opts.tuning, None);
            assert!(!opts.dump);
        }

        #[test]
        fn test_all_options() {
            let opts = Options::try_parse_from([
                "rooftop-cat",
                "alley",
                "--seconds",
                "12.5",
                "--tuning",
                "easy.json",
                "--dump",
            ])
            .unwrap();
            assert_eq!(opts.seed.as_deref(), Some("alley"));
            assert_eq!(opts.seconds, 12.5);
            assert_eq!(opts.tuning, Some(PathBuf::from("easy.json")));
            assert!(opts.dump);
        }

        #[test]
        fn test_rejects_bad_seconds() {
            for bad in ["0", "-3", "NaN", "soon"] {
                assert!(Options::try_parse_from(["rooftop-cat", "--seconds", bad]).is_err());
            }
        }

        #[test]
        fn test_rejects_unknown_flag() {
            assert!(Options::try_parse_from(["rooftop-cat", "--turbo"]).is_err());
        }

        #[test]
        fn test_missing_tuning_file_is_an_error() {
            let err = load_tuning(Path::new("/nonexistent/rooftop-tuning.json")).unwrap_err();
            assert!(err.contains("rooftop-tuning.json"));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let opts = headless::Options::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rooftop Cat (native, headless) starting...");

    if let Err(msg) = headless::run(opts) {
        log::error!("{msg}");
        std::process::exit(1);
    }
}
