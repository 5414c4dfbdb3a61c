//! Rooftop Cat - an endless rooftop runner
//!
//! Core modules:
//! - `sim`: Simulation core (jump physics, spawning, deck gaps, collisions, scoring)
//! - `tuning`: Data-driven game balance
//! - `renderer`: Read-only render contract plus debug renderers
//! - `platform`: Browser host (frame loop, input wiring, teardown)
//! - `persistence`: Key-value storage for best score and preferences

pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use highscores::BestScore;
pub use settings::{CycleMode, Settings, WeatherMode};
pub use tuning::Tuning;

/// Layout and timing constants that are not balance knobs
pub mod consts {
    /// Largest frame step the simulation accepts (tab switches, GC pauses)
    pub const MAX_FRAME_DT: f32 = 0.032;

    /// Deck surface sits at this fraction of the viewport height
    pub const GROUND_RATIO: f32 = 0.66;
    /// Deck strip thickness
    pub const DECK_HEIGHT: f32 = 18.0;
    /// Lip between the deck strip and the under-deck wall
    pub const DECK_LIP: f32 = 4.0;

    /// Player defaults - x is fixed, the world scrolls past
    pub const PLAYER_X: f32 = 120.0;
    pub const PLAYER_WIDTH: f32 = 46.0;
    pub const PLAYER_STAND_HEIGHT: f32 = 36.0;
    pub const PLAYER_DUCK_HEIGHT: f32 = 24.0;
    /// Hitbox shrink per side
    pub const HITBOX_INSET: f32 = 2.0;

    /// New entities are born this far past the right edge
    pub const SPAWN_OFFSET: f32 = 40.0;
    /// Entities are culled once fully left of -CULL_MARGIN
    pub const CULL_MARGIN: f32 = 80.0;
    /// Delay before the first spawn attempt of a run
    pub const INITIAL_SPAWN_DELAY: f32 = 0.2;

    /// Inward forgiveness when deciding whether the player is over a gap
    pub const GAP_FORGIVENESS_PAD: f32 = 4.0;
    /// Width of the lethal wall on each side of a gap
    pub const GAP_RAIL_WIDTH: f32 = 6.0;
    /// How far below the world bottom the player may drop before the run ends
    pub const FALL_OUT_MARGIN: f32 = 20.0;

    /// Smallest width/height any obstacle is allowed to have
    pub const MIN_OBSTACLE_DIMENSION: f32 = 1.0;
}

/// Clamp that tolerates `lo > hi` (returns `lo`) instead of panicking
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(v))
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
