//! Game session
//!
//! Ties the simulation to its collaborators: queued input, preferences and
//! the persisted best score. Hosts (browser loop, native runner, tests) talk
//! to this type only.

use crate::highscores::BestScore;
use crate::persistence::{Storage, keys, write_or_warn};
use crate::settings::{CycleMode, Settings, WeatherMode};
use crate::sim::{GameEvent, InputQueue, Intent, RunStatus, SimRng, Viewport, World, tick};
use crate::tuning::Tuning;

/// One player session, spanning any number of runs
pub struct Game {
    world: World,
    queue: InputQueue,
    settings: Settings,
    best: BestScore,
    storage: Box<dyn Storage>,
}

impl Game {
    /// Build a session, restoring preferences and best score from `storage`
    pub fn new(viewport: Viewport, tuning: Tuning, rng: SimRng, storage: Box<dyn Storage>) -> Self {
        let settings = Settings::load(&*storage);
        let best = BestScore::load(&*storage);
        let mut world = World::new(viewport, tuning, rng, best.value());
        world.reduced_motion = settings.reduced_motion;
        world.set_hint_done(settings.hint_done);
        Self {
            world,
            queue: InputQueue::new(),
            settings,
            best,
            storage,
        }
    }

    /// Session seeded from a text seed (`?seed=` on the web)
    pub fn from_seed_str(seed: &str, viewport: Viewport, storage: Box<dyn Storage>) -> Self {
        log::info!("Seed: {seed:?}");
        Self::new(viewport, Tuning::default(), SimRng::from_seed_str(seed), storage)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn best_score(&self) -> u64 {
        self.best.value()
    }

    pub fn status(&self) -> RunStatus {
        self.world.status
    }

    /// Queue a raw intent for the next frame
    pub fn push(&mut self, intent: Intent) {
        self.queue.push(intent);
    }

    // === Input contract ===

    pub fn start_or_jump(&mut self) {
        self.push(Intent::StartOrJump);
    }

    pub fn set_duck_held(&mut self, held: bool) {
        self.push(Intent::SetDuckHeld(held));
    }

    pub fn set_jump_held(&mut self, held: bool) {
        self.push(Intent::SetJumpHeld(held));
    }

    pub fn toggle_pause(&mut self) {
        self.push(Intent::TogglePause);
    }

    pub fn focus_lost(&mut self) {
        self.push(Intent::FocusLost);
    }

    pub fn restart(&mut self, keep_score: bool) {
        self.push(Intent::Restart { keep_score });
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.push(Intent::Resize { width, height });
    }

    /// Camera zoom applies immediately; it is not a gameplay input
    pub fn set_zoom(&mut self, zoom: f32) {
        self.world.set_zoom(zoom);
    }

    // === Preferences ===

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.settings.reduced_motion = on;
        self.settings.save(&mut *self.storage);
        self.push(Intent::SetReducedMotion(on));
    }

    pub fn toggle_reduced_motion(&mut self) {
        self.set_reduced_motion(!self.settings.reduced_motion);
    }

    pub fn cycle_next(&mut self) -> CycleMode {
        let mode = self.settings.cycle_next();
        self.settings.save(&mut *self.storage);
        mode
    }

    pub fn weather_next(&mut self) -> WeatherMode {
        let mode = self.settings.weather_next();
        self.settings.save(&mut *self.storage);
        mode
    }

    /// Run one frame: apply queued input, step the world, react to events.
    /// Returns the frame's events for audio/UI.
    pub fn frame(&mut self, dt: f32) -> Vec<GameEvent> {
        let intents = self.queue.drain();
        tick(&mut self.world, &intents, dt);
        let events = self.world.drain_events();
        for event in &events {
            self.handle(event);
        }
        events
    }

    fn handle(&mut self, event: &GameEvent) {
        self.best.handle(event);
        match event {
            GameEvent::FirstJump if !self.settings.hint_done => {
                self.settings.hint_done = true;
                write_or_warn(&mut *self.storage, keys::HINT_DONE, "1");
            }
            GameEvent::Died { .. } | GameEvent::StatusChanged { to: RunStatus::Paused, .. } => {
                self.best.save(&mut *self.storage);
            }
            _ => {}
        }
    }

    /// Flush anything not yet persisted (page hide, process exit)
    pub fn flush(&mut self) {
        self.best.save(&mut *self.storage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::sim::DeathCause;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Storage that the test can inspect after handing it to the game
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<HashMap<String, String>>>);

    impl Storage for Shared {
        fn get(&self, key: &str) -> Result<Option<String>, crate::persistence::StorageError> {
            Ok(self.0.borrow().get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), crate::persistence::StorageError> {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    impl Shared {
        fn value(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key).cloned()
        }
    }

    fn game_with(storage: Shared) -> Game {
        Game::new(Viewport::default(), Tuning::default(), SimRng::from_seed(5), Box::new(storage))
    }

    #[test]
    fn test_restores_preferences_and_best() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::BEST, "250").unwrap();
        storage.set(keys::REDUCED_MOTION, "1").unwrap();
        storage.set(keys::HINT_DONE, "1").unwrap();
        let game = Game::new(Viewport::default(), Tuning::default(), SimRng::from_seed(1), Box::new(storage));
        assert_eq!(game.best_score(), 250);
        assert_eq!(game.world().best_score, 250);
        assert!(game.world().reduced_motion);
        assert_eq!(game.world().hint_alpha, 0.0);
    }

    #[test]
    fn test_start_runs_and_persists_hint() {
        let storage = Shared::default();
        let mut game = game_with(storage.clone());
        game.start_or_jump();
        let events = game.frame(0.016);
        assert_eq!(game.status(), RunStatus::Playing);
        assert!(events.contains(&GameEvent::FirstJump));
        assert_eq!(storage.value(keys::HINT_DONE).as_deref(), Some("1"));
        assert!(game.world().player.vy < 0.0);
    }

    #[test]
    fn test_best_saved_on_death() {
        let storage = Shared::default();
        let mut game = game_with(storage.clone());
        game.start_or_jump();
        game.frame(0.016);
        game.world.score = 42.7;
        game.frame(0.0);
        assert_eq!(game.best_score(), 42);
        assert_eq!(storage.value(keys::BEST), None);

        game.world.kill(DeathCause::Obstacle);
        game.frame(0.016);
        assert_eq!(storage.value(keys::BEST).as_deref(), Some("42"));
    }

    #[test]
    fn test_pause_and_resume_via_methods() {
        let mut game = game_with(Shared::default());
        game.start_or_jump();
        game.frame(0.016);
        game.focus_lost();
        game.frame(0.016);
        assert_eq!(game.status(), RunStatus::Paused);
        let score = game.world().score;
        game.frame(0.016);
        assert_eq!(game.world().score, score);
        game.set_duck_held(true);
        game.frame(0.016);
        assert_eq!(game.status(), RunStatus::Playing);
        assert!(!game.world().input.duck_held);
    }

    #[test]
    fn test_restart_returns_to_ready() {
        let mut game = game_with(Shared::default());
        game.start_or_jump();
        for _ in 0..30 {
            game.frame(0.016);
        }
        game.restart(false);
        game.frame(0.016);
        assert_eq!(game.status(), RunStatus::Ready);
        assert_eq!(game.world().score, 0.0);
        assert!(game.world().obstacles.is_empty());
    }

    #[test]
    fn test_preferences_written_through() {
        let storage = Shared::default();
        let mut game = game_with(storage.clone());
        assert_eq!(game.cycle_next(), CycleMode::Night);
        assert_eq!(game.weather_next(), WeatherMode::Rain);
        game.toggle_reduced_motion();
        game.frame(0.016);
        assert!(game.world().reduced_motion);
        assert_eq!(storage.value(keys::CYCLE).as_deref(), Some("night"));
        assert_eq!(storage.value(keys::WEATHER).as_deref(), Some("rain"));
        assert_eq!(storage.value(keys::REDUCED_MOTION).as_deref(), Some("1"));
    }

    #[test]
    fn test_resize_moves_ground() {
        let mut game = game_with(Shared::default());
        game.resize(800.0, 1000.0);
        game.frame(0.0);
        assert_eq!(game.world().ground_y, 660.0);
    }
}
