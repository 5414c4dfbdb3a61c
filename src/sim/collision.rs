//! Hitbox tests against obstacle colliders and gap rails
//!
//! Obstacles are checked first, then the lethal walls at the sides of each
//! gap. The first overlap ends the run, so only one hit is ever reported.

use super::deck::Deck;
use super::obstacle::Obstacle;
use super::rect::Rect;
use super::state::DeathCause;

/// A fatal overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub cause: DeathCause,
    /// The collider that was touched
    pub collider: Rect,
}

/// First obstacle collider the hitbox overlaps
pub fn obstacle_hit(hitbox: &Rect, obstacles: &[Obstacle]) -> Option<Hit> {
    obstacles.iter().find_map(|o| {
        o.colliders()
            .into_iter()
            .find(|r| hitbox.overlaps(r))
            .map(|collider| Hit {
                cause: DeathCause::Obstacle,
                collider,
            })
    })
}

/// First gap rail the hitbox overlaps
pub fn rail_hit(hitbox: &Rect, deck: &Deck, ground_y: f32, world_bottom: f32) -> Option<Hit> {
    deck.rails(ground_y, world_bottom)
        .find(|r| hitbox.overlaps(r))
        .map(|collider| Hit {
            cause: DeathCause::GapWall,
            collider,
        })
}

/// Full collision pass for one frame
pub fn find_hit(
    hitbox: &Rect,
    obstacles: &[Obstacle],
    deck: &Deck,
    ground_y: f32,
    world_bottom: f32,
) -> Option<Hit> {
    obstacle_hit(hitbox, obstacles).or_else(|| rail_hit(hitbox, deck, ground_y, world_bottom))
}
