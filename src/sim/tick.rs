//! Per-frame simulation tick
//!
//! Applies the frame's intents (the run state machine), then advances a
//! playing run in a fixed order: ramp, jump physics, spawn, scroll and cull,
//! collisions, effects, score.

use super::collision;
use super::input::Intent;
use super::physics;
use super::scoring;
use super::spawn;
use super::state::{DeathCause, GameEvent, RunStatus, World};
use crate::consts::{CULL_MARGIN, MAX_FRAME_DT};

/// Clamp a wall-clock frame delta into a step the simulation accepts
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 }
}

/// Advance the world by one frame
pub fn tick(world: &mut World, intents: &[Intent], dt: f32) {
    let dt = clamp_dt(dt);

    for &intent in intents {
        apply_intent(world, intent);
    }

    match world.status {
        RunStatus::Playing => step(world, dt),
        // Shake, flash and dust settle behind the game-over screen
        RunStatus::Dead => world.update_effects(dt),
        RunStatus::Ready | RunStatus::Paused => {}
    }

    let view = world.viewport.world_width();
    world.deck.refresh_facade(view);
}

/// Apply one intent to the run state machine
pub fn apply_intent(world: &mut World, intent: Intent) {
    // Any press resumes a paused run and is swallowed
    if world.status == RunStatus::Paused && intent.is_press() {
        world.input.duck_held = false;
        world.input.jump_held = false;
        world.set_status(RunStatus::Playing);
        return;
    }

    match intent {
        Intent::StartOrJump => start_or_jump(world),
        Intent::Poke => {}
        Intent::SetDuckHeld(held) => world.input.duck_held = held,
        Intent::SetJumpHeld(true) => world.input.jump_held = true,
        Intent::SetJumpHeld(false) => {
            physics::release_jump(&mut world.player, &mut world.input, &world.tuning)
        }
        Intent::TogglePause => {
            if world.status == RunStatus::Playing {
                world.set_status(RunStatus::Paused);
            }
        }
        Intent::FocusLost => {
            if world.status == RunStatus::Playing {
                world.set_status(RunStatus::Paused);
            }
        }
        Intent::Restart { keep_score } => restart(world, keep_score),
        Intent::SetReducedMotion(on) => {
            world.reduced_motion = on;
            if on {
                world.puffs.clear();
            }
        }
        Intent::Resize { width, height } => world.resize(width, height),
    }
}

/// Back to the ready screen with a rebuilt world
pub fn restart(world: &mut World, keep_score: bool) {
    world.input.clear();
    world.reset_run(keep_score);
    world.set_status(RunStatus::Ready);
}

fn start_or_jump(world: &mut World) {
    match world.status {
        RunStatus::Dead => {
            // Retry starts running immediately without a jump
            world.reset_run(false);
            world.set_status(RunStatus::Playing);
            return;
        }
        RunStatus::Ready => world.set_status(RunStatus::Playing),
        RunStatus::Playing | RunStatus::Paused => {}
    }
    physics::press_jump(&mut world.input, &world.tuning);
    if !world.first_jump_done {
        world.first_jump_done = true;
        world.push_event(GameEvent::FirstJump);
    }
}

fn step(world: &mut World, dt: f32) {
    world.elapsed += dt;
    world.scroll_speed = scoring::ramp_speed(world.scroll_speed, &world.tuning, world.reduced_motion, dt);

    let world_bottom = world.viewport.world_bottom();
    let outcome = physics::integrate(
        &mut world.player,
        &mut world.input,
        &world.deck,
        &world.tuning,
        world.ground_y,
        world_bottom,
        dt,
    );
    if let Some(impact) = outcome.landed {
        world.emit_landing_puffs(impact);
        world.push_event(GameEvent::Landed);
    }
    if outcome.fell_out {
        world.kill(DeathCause::Fell);
        return;
    }

    world.spawn_timer -= dt;
    if world.spawn_timer <= 0.0 {
        world.spawn_timer = match spawn::spawn(world) {
            Some(delay) if delay.is_finite() => delay,
            _ => spawn::default_cadence(world),
        };
    }

    let dx = world.scroll_speed * dt;
    for obstacle in &mut world.obstacles {
        obstacle.x -= dx;
    }
    world.obstacles.retain(|o| o.right() >= -CULL_MARGIN);
    world.deck.advance(dx);

    let hitbox = world.player_hitbox();
    if let Some(hit) = collision::find_hit(&hitbox, &world.obstacles, &world.deck, world.ground_y, world_bottom) {
        log::debug!("Hit {:?} at ({:.0}, {:.0})", hit.cause, hit.collider.x, hit.collider.y);
        world.kill(hit.cause);
        return;
    }

    world.update_effects(dt);
    scoring::accrue(world, dt);
}
