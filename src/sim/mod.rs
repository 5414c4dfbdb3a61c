//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform
//! and rendering code:
//! - Variable timestep, clamped per frame
//! - Injected, seedable RNG only
//! - Single writer (the tick); renderers read `&World`

pub mod autopilot;
pub mod collision;
pub mod deck;
pub mod input;
pub mod obstacle;
pub mod physics;
pub mod rect;
pub mod rng;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use collision::{Hit, find_hit};
pub use deck::{Deck, DeckGap, FacadeSpan, FacadeTheme, FacadeTileCache, GapId, TileKey, tile_origins};
pub use input::{InputQueue, Intent};
pub use obstacle::{Obstacle, ObstacleKind};
pub use rect::Rect;
pub use rng::SimRng;
pub use spawn::{SpawnPick, jumpable_gap_range};
pub use state::{DeathCause, GameEvent, Player, RunStatus, Viewport, World};
pub use tick::tick;
