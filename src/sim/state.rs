//! World state and core simulation types
//!
//! `World` is the single mutable snapshot of a run. The tick is its only
//! writer; renderers read it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::deck::Deck;
use super::obstacle::Obstacle;
use super::rect::Rect;
use super::rng::SimRng;
use crate::consts::*;
use crate::tuning::Tuning;

/// Landing dust particles kept alive at once
pub const MAX_PUFFS: usize = 38;
/// Puffs emitted per landing
pub const PUFFS_PER_LANDING: usize = 3;
/// Camera shake on a fatal hit
pub const SHAKE_AMPLITUDE: f32 = 6.0;
pub const SHAKE_AMPLITUDE_REDUCED: f32 = 3.0;
pub const SHAKE_DURATION: f32 = 0.45;
/// Hit flash length on a fatal hit
pub const HIT_FLASH_DURATION: f32 = 0.28;
/// Tutorial hint fade rate once the first jump happened (alpha/s)
pub const HINT_FADE_RATE: f32 = 0.8;

/// Screen and camera description.
///
/// With `zoom < 1` (small touch screens) the camera pulls back, so the
/// simulated world is wider and reaches further below the deck than the
/// canvas itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960.0, 540.0)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            zoom: 1.0,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = if zoom.is_finite() && zoom > 0.0 { zoom.min(1.0) } else { 1.0 };
        self
    }

    /// Deck surface y
    pub fn ground_y(&self) -> f32 {
        (self.height * GROUND_RATIO).floor()
    }

    /// Width of the simulated world
    pub fn world_width(&self) -> f32 {
        if self.zoom < 1.0 { self.width / self.zoom } else { self.width }
    }

    /// Lowest visible world y
    pub fn world_bottom(&self) -> f32 {
        if self.zoom < 1.0 {
            let gy = self.ground_y();
            gy + (self.height - gy) / self.zoom
        } else {
            self.height
        }
    }

    /// Where new obstacles and gaps are born
    pub fn spawn_edge(&self) -> f32 {
        self.world_width() + SPAWN_OFFSET
    }
}

fn sanitize_extent(v: f32) -> f32 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}

/// The cat. `x` is fixed; the world scrolls past it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    /// Top of the sprite
    pub y: f32,
    /// Vertical velocity (negative = up)
    pub vy: f32,
    pub width: f32,
    pub stand_height: f32,
    pub duck_height: f32,
    pub on_ground: bool,
}

impl Player {
    /// A standing cat on the deck at `ground_y`
    pub fn new(ground_y: f32) -> Self {
        Self {
            x: PLAYER_X,
            y: ground_y - PLAYER_STAND_HEIGHT,
            vy: 0.0,
            width: PLAYER_WIDTH,
            stand_height: PLAYER_STAND_HEIGHT,
            duck_height: PLAYER_DUCK_HEIGHT,
            on_ground: true,
        }
    }

    /// Collision height for the current posture
    #[inline]
    pub fn height(&self, ducking: bool) -> f32 {
        if ducking { self.duck_height } else { self.stand_height }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    /// Forgiving hitbox used for obstacle and rail tests
    pub fn hitbox(&self, ducking: bool) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height(ducking)).inset(HITBOX_INSET)
    }
}

/// Held inputs and jump timers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub duck_held: bool,
    pub jump_held: bool,
    /// Seconds an early jump press is still remembered
    pub jump_buffer: f32,
    /// Seconds a jump is still allowed after leaving the deck
    pub coyote: f32,
    /// Seconds the current ascent has been extended by holding jump
    pub jump_hold: f32,
}

impl InputState {
    /// Forget held keys and pending timers
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Waiting for the first jump
    Ready,
    Playing,
    Paused,
    Dead,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Ready => "ready",
            RunStatus::Playing => "playing",
            RunStatus::Paused => "paused",
            RunStatus::Dead => "dead",
        }
    }
}

/// What ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Obstacle,
    GapWall,
    Fell,
}

/// One-shot notifications for the host (audio, storage, UI)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Landed,
    /// First jump ever; the host persists that the hint was seen
    FirstJump,
    Died { cause: DeathCause, score: u64 },
    NewBest(u64),
    StatusChanged { from: RunStatus, to: RunStatus },
}

/// Landing dust particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puff {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub life: f32,
}

/// Camera shake envelope
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shake {
    pub amplitude: f32,
    pub elapsed: f32,
    pub duration: f32,
}

impl Shake {
    /// Current shake strength, fading linearly to zero
    pub fn strength(&self) -> f32 {
        if self.amplitude <= 0.0 || self.duration <= 0.0 {
            return 0.0;
        }
        self.amplitude * (1.0 - self.elapsed / self.duration).max(0.0)
    }

    fn advance(&mut self, dt: f32) {
        if self.elapsed <= self.duration {
            self.elapsed += dt;
        } else {
            self.amplitude = 0.0;
        }
    }
}

/// Complete run state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub status: RunStatus,
    pub reduced_motion: bool,

    // === Run progress ===
    /// Seconds since the run started
    pub elapsed: f32,
    pub scroll_speed: f32,
    /// Deck surface y, follows the viewport
    pub ground_y: f32,
    /// Never decreases during a run
    pub score: f64,
    /// Best floored score seen this session
    pub best_score: u64,

    // === Entities ===
    pub player: Player,
    pub input: InputState,
    /// Sorted by x
    pub obstacles: Vec<Obstacle>,
    pub deck: Deck,
    /// Seconds until the next spawn attempt
    pub spawn_timer: f32,

    // === Presentation (never read by gameplay rules) ===
    pub shake: Shake,
    pub hit_flash: f32,
    pub puffs: Vec<Puff>,
    pub hint_alpha: f32,
    pub first_jump_done: bool,

    #[serde(skip)]
    events: Vec<GameEvent>,
    #[serde(skip)]
    pub(crate) rng: SimRng,
}

impl World {
    pub fn new(viewport: Viewport, tuning: Tuning, mut rng: SimRng, best_score: u64) -> Self {
        let ground_y = viewport.ground_y();
        let deck = Deck::new(&mut rng);
        Self {
            scroll_speed: tuning.base_speed,
            tuning,
            viewport,
            status: RunStatus::Ready,
            reduced_motion: false,
            elapsed: 0.0,
            ground_y,
            score: 0.0,
            best_score,
            player: Player::new(ground_y),
            input: InputState::default(),
            obstacles: Vec::new(),
            deck,
            spawn_timer: INITIAL_SPAWN_DELAY,
            shake: Shake::default(),
            hit_flash: 0.0,
            puffs: Vec::new(),
            hint_alpha: 1.0,
            first_jump_done: false,
            events: Vec::new(),
            rng,
        }
    }

    /// Default viewport and tuning with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Viewport::default(), Tuning::default(), SimRng::from_seed(seed), 0)
    }

    /// Fresh run state; optionally keep the running score.
    ///
    /// Held keys survive (a held jump from the restart press stays held);
    /// jump timers do not.
    pub fn reset_run(&mut self, keep_score: bool) {
        self.elapsed = 0.0;
        self.scroll_speed = self.tuning.base_speed;
        self.obstacles.clear();
        if !keep_score {
            self.score = 0.0;
        }
        self.shake = Shake::default();
        self.hit_flash = 0.0;
        self.spawn_timer = INITIAL_SPAWN_DELAY;
        self.ground_y = self.viewport.ground_y();
        self.deck = Deck::new(&mut self.rng);
        self.player = Player::new(self.ground_y);
        self.puffs.clear();
        self.input.jump_buffer = 0.0;
        self.input.coyote = 0.0;
        self.input.jump_hold = 0.0;
        log::info!("Run reset (keep_score={keep_score})");
    }

    /// Apply a new screen size and re-anchor everything sitting on the deck
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            zoom: self.viewport.zoom,
        };
        self.sync_ground();
    }

    /// Change the camera zoom (1 = none)
    pub fn set_zoom(&mut self, zoom: f32) {
        self.viewport = self.viewport.with_zoom(zoom);
        self.sync_ground();
    }

    fn sync_ground(&mut self) {
        let new_ground = self.viewport.ground_y();
        let dy = new_ground - self.ground_y;
        if dy == 0.0 {
            return;
        }
        self.ground_y = new_ground;
        if self.player.on_ground {
            self.player.y = new_ground - self.player.height(self.input.duck_held);
            self.player.vy = 0.0;
        }
        for obstacle in &mut self.obstacles {
            obstacle.reanchor(dy);
        }
        log::debug!("Ground moved by {dy} to {new_ground}");
    }

    /// Switch run phase, emitting `StatusChanged` on a real change
    pub fn set_status(&mut self, to: RunStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        log::info!("Run {} -> {}", from.as_str(), to.as_str());
        self.events.push(GameEvent::StatusChanged { from, to });
    }

    /// End the run
    pub fn kill(&mut self, cause: DeathCause) {
        if cause != DeathCause::Fell {
            self.shake = Shake {
                amplitude: if self.reduced_motion {
                    SHAKE_AMPLITUDE_REDUCED
                } else {
                    SHAKE_AMPLITUDE
                },
                elapsed: 0.0,
                duration: SHAKE_DURATION,
            };
            self.hit_flash = HIT_FLASH_DURATION;
        }
        let score = self.display_score();
        log::info!("Cat down ({cause:?}) at {score} points after {:.1}s", self.elapsed);
        self.set_status(RunStatus::Dead);
        self.events.push(GameEvent::Died { cause, score });
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Score as shown and persisted
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Scroll speed mapped to [0, 1] over the tuning's speed range
    pub fn normalized_speed(&self) -> f32 {
        crate::clamp(
            (self.scroll_speed - self.tuning.base_speed) / self.tuning.speed_span(),
            0.0,
            1.0,
        )
    }

    pub fn ducking(&self) -> bool {
        self.input.duck_held
    }

    pub fn player_hitbox(&self) -> Rect {
        self.player.hitbox(self.ducking())
    }

    /// Keep obstacles sorted by x when inserting
    pub fn push_obstacle(&mut self, obstacle: Obstacle) {
        let at = self.obstacles.partition_point(|o| o.x <= obstacle.x);
        self.obstacles.insert(at, obstacle);
    }

    /// Mark the tutorial hint as already seen (restored from storage)
    pub fn set_hint_done(&mut self, done: bool) {
        self.first_jump_done = done;
        self.hint_alpha = if done { 0.0 } else { 1.0 };
    }

    /// Dust under the cat's feet on landing
    pub fn emit_landing_puffs(&mut self, impact_speed: f32) {
        if self.reduced_motion {
            return;
        }
        let intensity = (10.0 + impact_speed.abs() * 0.01).min(18.0);
        let origin = Vec2::new(
            self.player.x + self.player.width * 0.6,
            self.ground_y + DECK_HEIGHT - 6.0,
        );
        for _ in 0..PUFFS_PER_LANDING {
            if self.puffs.len() >= MAX_PUFFS {
                self.puffs.remove(0);
            }
            let angle = -std::f32::consts::FRAC_PI_2 + self.rng.unit() * std::f32::consts::FRAC_PI_2;
            let speed = 30.0 + self.rng.unit() * 60.0 + intensity;
            self.puffs.push(Puff {
                pos: origin + Vec2::new(self.rng.range(-4.0, 4.0), self.rng.range(-1.0, 1.0)),
                vel: Vec2::new(angle.cos() * speed * 0.5, angle.sin() * speed * 0.4),
                radius: 2.0 + self.rng.unit() * 3.0,
                alpha: 0.5,
                life: 0.6 + self.rng.unit() * 0.4,
            });
        }
    }

    /// Advance shake, flash, puffs and the hint fade
    pub fn update_effects(&mut self, dt: f32) {
        for p in &mut self.puffs {
            p.pos += p.vel * dt;
            p.vel.y -= 12.0 * dt;
            p.radius += 14.0 * dt;
            p.alpha -= 1.2 * dt;
            p.life -= dt;
        }
        self.puffs.retain(|p| p.life > 0.0 && p.alpha > 0.0);

        self.shake.advance(dt);
        if self.first_jump_done && self.hint_alpha > 0.0 {
            self.hint_alpha = (self.hint_alpha - dt * HINT_FADE_RATE).max(0.0);
        }
        self.hit_flash = (self.hit_flash - dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::ObstacleKind;

    #[test]
    fn test_viewport_ground_and_zoom() {
        let vp = Viewport::new(800.0, 601.0);
        assert_eq!(vp.ground_y(), 396.0);
        assert_eq!(vp.world_width(), 800.0);
        assert_eq!(vp.world_bottom(), 601.0);
        assert_eq!(vp.spawn_edge(), 840.0);

        let zoomed = Viewport::new(400.0, 800.0).with_zoom(0.5);
        assert_eq!(zoomed.world_width(), 800.0);
        assert_eq!(zoomed.world_bottom(), 528.0 + 272.0 * 2.0);
    }

    #[test]
    fn test_viewport_rejects_bad_input() {
        let vp = Viewport::new(f32::NAN, -10.0).with_zoom(0.0);
        assert_eq!(vp.width, 1.0);
        assert_eq!(vp.height, 1.0);
        assert_eq!(vp.zoom, 1.0);
    }

    #[test]
    fn test_new_world_is_ready() {
        let world = World::with_seed(1);
        assert_eq!(world.status, RunStatus::Ready);
        assert_eq!(world.scroll_speed, world.tuning.base_speed);
        assert_eq!(world.player.y, world.ground_y - PLAYER_STAND_HEIGHT);
        assert!(world.player.on_ground);
        assert_eq!(world.spawn_timer, INITIAL_SPAWN_DELAY);
    }

    #[test]
    fn test_reset_run_keep_score() {
        let mut world = World::with_seed(1);
        world.score = 42.5;
        world.scroll_speed = 900.0;
        world.reset_run(true);
        assert_eq!(world.score, 42.5);
        assert_eq!(world.scroll_speed, world.tuning.base_speed);
        world.reset_run(false);
        assert_eq!(world.score, 0.0);
    }

    #[test]
    fn test_resize_reanchors_grounded_player_and_obstacles() {
        let mut world = World::with_seed(1);
        let gy = world.ground_y;
        world.push_obstacle(Obstacle::new(ObstacleKind::Chimney, 500.0, gy - 50.0, 30.0, 50.0, gy));
        world.resize(960.0, 700.0);
        let new_gy = (700.0f32 * GROUND_RATIO).floor();
        assert_eq!(world.ground_y, new_gy);
        assert_eq!(world.player.y, new_gy - PLAYER_STAND_HEIGHT);
        assert_eq!(world.obstacles[0].y, new_gy - 50.0);
        assert_eq!(world.obstacles[0].base_y, new_gy);
    }

    #[test]
    fn test_resize_leaves_airborne_player() {
        let mut world = World::with_seed(1);
        world.player.on_ground = false;
        world.player.y = 100.0;
        world.player.vy = -300.0;
        world.resize(960.0, 800.0);
        assert_eq!(world.player.y, 100.0);
        assert_eq!(world.player.vy, -300.0);
    }

    #[test]
    fn test_kill_sets_effects_and_events() {
        let mut world = World::with_seed(1);
        world.set_status(RunStatus::Playing);
        world.drain_events();
        world.kill(DeathCause::Obstacle);
        assert_eq!(world.status, RunStatus::Dead);
        assert_eq!(world.shake.amplitude, SHAKE_AMPLITUDE);
        assert_eq!(world.hit_flash, HIT_FLASH_DURATION);
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::Died {
            cause: DeathCause::Obstacle,
            score: 0
        }));
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_reduced_motion_shake_and_no_puffs() {
        let mut world = World::with_seed(1);
        world.reduced_motion = true;
        world.emit_landing_puffs(800.0);
        assert!(world.puffs.is_empty());
        world.kill(DeathCause::GapWall);
        assert_eq!(world.shake.amplitude, SHAKE_AMPLITUDE_REDUCED);
    }

    #[test]
    fn test_puffs_are_capped_and_fade() {
        let mut world = World::with_seed(1);
        for _ in 0..40 {
            world.emit_landing_puffs(600.0);
        }
        assert_eq!(world.puffs.len(), MAX_PUFFS);
        for _ in 0..100 {
            world.update_effects(0.016);
        }
        assert!(world.puffs.is_empty());
    }

    #[test]
    fn test_hint_fades_only_after_first_jump() {
        let mut world = World::with_seed(1);
        world.update_effects(0.5);
        assert_eq!(world.hint_alpha, 1.0);
        world.first_jump_done = true;
        world.update_effects(0.5);
        assert!((world.hint_alpha - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_shake_expires() {
        let mut world = World::with_seed(1);
        world.kill(DeathCause::Obstacle);
        for _ in 0..40 {
            world.update_effects(0.016);
        }
        assert_eq!(world.shake.strength(), 0.0);
        assert_eq!(world.hit_flash, 0.0);
    }

    #[test]
    fn test_push_obstacle_keeps_order() {
        let mut world = World::with_seed(1);
        let gy = world.ground_y;
        for x in [300.0, 100.0, 200.0] {
            world.push_obstacle(Obstacle::new(ObstacleKind::Hvac, x, gy - 20.0, 40.0, 20.0, gy));
        }
        let xs: Vec<f32> = world.obstacles.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![100.0, 200.0, 300.0]);
    }
}
