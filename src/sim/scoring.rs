//! Difficulty ramp and score accrual

use super::state::{GameEvent, World};
use crate::tuning::Tuning;

/// Speed after `dt` seconds of ramping, capped at the tuning's max
pub fn ramp_speed(speed: f32, tuning: &Tuning, reduced_motion: bool, dt: f32) -> f32 {
    let motion_scale = if reduced_motion { tuning.reduced_motion_ramp } else { 1.0 };
    tuning.max_speed.min(speed + tuning.speed_ramp * motion_scale * dt)
}

/// Score multiplier, rewarding time spent near top speed
pub fn score_multiplier(speed: f32, tuning: &Tuning) -> f32 {
    let n = crate::clamp((speed - tuning.base_speed) / tuning.speed_span(), 0.0, 1.0);
    tuning.score_mult_base + tuning.score_mult_gain * n.powf(tuning.score_mult_exponent)
}

/// Add this frame's points and track the session best
pub fn accrue(world: &mut World, dt: f32) {
    let dt = dt.max(0.0);
    let mult = score_multiplier(world.scroll_speed, &world.tuning);
    world.score += (dt * world.scroll_speed.max(0.0) * world.tuning.score_rate * mult) as f64;

    let floored = world.display_score();
    if floored > world.best_score {
        world.best_score = floored;
        world.push_event(GameEvent::NewBest(floored));
    }
}
