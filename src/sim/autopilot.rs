//! Demo autopilot
//!
//! Produces the intents a simple player would: duck under anything with
//! clearance, jump everything else. Used for the attract screen, the native
//! headless runner and long-run tests. It reads the world, never writes it.

use super::input::Intent;
use super::obstacle::{AntennaStyle, Obstacle, ObstacleKind};
use super::state::{RunStatus, World};

/// Seconds of look-ahead at the current scroll speed
const LOOKAHEAD: f32 = 0.22;

/// Whether a cat should pass under this obstacle rather than over it
pub fn is_duckable(obstacle: &Obstacle) -> bool {
    matches!(
        obstacle.kind,
        ObstacleKind::WaterTowerGate { .. } | ObstacleKind::Wire { .. } | ObstacleKind::Antenna(AntennaStyle::Pylon { .. })
    )
}

/// Intents for this frame
pub fn autopilot(world: &World) -> Vec<Intent> {
    let mut intents = Vec::new();
    match world.status {
        RunStatus::Ready => {
            intents.push(Intent::StartOrJump);
            return intents;
        }
        RunStatus::Paused | RunStatus::Dead => return intents,
        RunStatus::Playing => {}
    }

    let player = &world.player;
    let front = player.x + player.width;
    let lead = world.scroll_speed * LOOKAHEAD;
    let ahead = |x: f32, right: f32| right > player.x && x - front < lead;

    let obstacle = world.obstacles.iter().find(|o| ahead(o.x, o.right()));
    let gap = world.deck.gaps().find(|g| ahead(g.x, g.right()));

    let wants_duck = obstacle.is_some_and(is_duckable);
    let wants_jump = !wants_duck && (gap.is_some() || obstacle.is_some());

    if wants_duck != world.input.duck_held {
        intents.push(Intent::SetDuckHeld(wants_duck));
    }
    if wants_jump && player.on_ground {
        intents.push(Intent::StartOrJump);
        intents.push(Intent::SetJumpHeld(true));
    } else if world.input.jump_held && player.vy >= 0.0 {
        intents.push(Intent::SetJumpHeld(false));
    }
    intents
}
