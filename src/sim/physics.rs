//! Variable-height jump physics and deck contact

use super::deck::Deck;
use super::state::{InputState, Player};
use crate::consts::{FALL_OUT_MARGIN, GAP_FORGIVENESS_PAD};
use crate::tuning::Tuning;

/// What happened to the cat during one integration step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    /// Impact speed if the cat touched down this step
    pub landed: Option<f32>,
    /// Dropped below the world through a gap
    pub fell_out: bool,
    /// A buffered jump fired this step
    pub jumped: bool,
}

/// Remember a jump press for the buffer window
pub fn press_jump(input: &mut InputState, tuning: &Tuning) {
    input.jump_buffer = tuning.jump_buffer;
}

/// Jump key released: end the hold and damp a rising cat once
pub fn release_jump(player: &mut Player, input: &mut InputState, tuning: &Tuning) {
    if !input.jump_held {
        return;
    }
    input.jump_held = false;
    if player.vy < 0.0 {
        player.vy *= tuning.release_damping;
    }
}

/// Advance the cat by `dt` seconds
pub fn integrate(
    player: &mut Player,
    input: &mut InputState,
    deck: &Deck,
    tuning: &Tuning,
    ground_y: f32,
    world_bottom: f32,
    dt: f32,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    input.jump_buffer = (input.jump_buffer - dt).max(0.0);
    input.coyote = (input.coyote - dt).max(0.0);

    if input.jump_buffer > 0.0 && (player.on_ground || input.coyote > 0.0) {
        player.vy = tuning.jump_velocity;
        player.on_ground = false;
        input.jump_buffer = 0.0;
        input.coyote = 0.0;
        input.jump_hold = 0.0;
        outcome.jumped = true;
    }

    let mut g = tuning.gravity;
    if player.vy < 0.0 {
        if input.jump_held && input.jump_hold < tuning.max_hold {
            g *= tuning.hold_gravity_factor;
            input.jump_hold += dt;
        } else if !input.jump_held {
            g *= tuning.cut_gravity_factor;
        }
    }
    player.vy += g * dt;
    player.y += player.vy * dt;

    let height = player.height(input.duck_held);
    let over_gap = deck.is_open_at(player.center_x(), GAP_FORGIVENESS_PAD);
    if !over_gap && player.y + height >= ground_y {
        player.y = ground_y - height;
        if !player.on_ground {
            outcome.landed = Some(player.vy);
        }
        player.on_ground = true;
        player.vy = 0.0;
        input.coyote = tuning.coyote_time;
        input.jump_hold = 0.0;
    } else {
        player.on_ground = false;
    }

    outcome.fell_out = player.y > world_bottom + FALL_OUT_MARGIN;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SimRng;
    use proptest::prelude::*;

    const GROUND: f32 = 400.0;
    const BOTTOM: f32 = 600.0;
    const DT: f32 = 1.0 / 120.0;

    fn setup() -> (Player, InputState, Deck, Tuning) {
        (
            Player::new(GROUND),
            InputState::default(),
            Deck::new(&mut SimRng::from_seed(5)),
            Tuning::default(),
        )
    }

    fn step(p: &mut Player, i: &mut InputState, d: &Deck, t: &Tuning) -> StepOutcome {
        integrate(p, i, d, t, GROUND, BOTTOM, DT)
    }

    /// Seconds from take-off until the cat is back on the deck
    fn airtime(tuning: &Tuning, hold: bool) -> f32 {
        let (mut p, mut i, d, _) = setup();
        i.jump_held = hold;
        press_jump(&mut i, tuning);
        let mut t = 0.0;
        let mut airborne = false;
        for _ in 0..10_000 {
            let out = integrate(&mut p, &mut i, &d, tuning, GROUND, BOTTOM, DT);
            t += DT;
            if out.jumped {
                airborne = true;
                t = DT;
            } else if airborne && out.landed.is_some() {
                return t;
            }
        }
        t
    }

    #[test]
    fn test_grounded_dt_zero_is_idempotent() {
        let (mut p, mut i, d, t) = setup();
        let before = p.clone();
        for _ in 0..5 {
            let out = integrate(&mut p, &mut i, &d, &t, GROUND, BOTTOM, 0.0);
            assert!(out.landed.is_none());
        }
        assert_eq!(p.y, before.y);
        assert_eq!(p.vy, 0.0);
        assert!(p.on_ground);
    }

    #[test]
    fn test_buffered_jump_fires_on_ground() {
        let (mut p, mut i, d, t) = setup();
        press_jump(&mut i, &t);
        let out = step(&mut p, &mut i, &d, &t);
        assert!(out.jumped);
        assert!(p.vy < 0.0);
        assert!(!p.on_ground);
        assert_eq!(i.jump_buffer, 0.0);
    }

    #[test]
    fn test_buffer_expires() {
        let (mut p, mut i, d, t) = setup();
        p.on_ground = false;
        p.y = GROUND - 300.0;
        press_jump(&mut i, &t);
        // Falls for longer than the buffer window before landing
        let mut jumped = false;
        for _ in 0..20 {
            jumped |= step(&mut p, &mut i, &d, &t).jumped;
        }
        assert!(!jumped);
        assert_eq!(i.jump_buffer, 0.0);
    }

    #[test]
    fn test_early_press_lands_into_jump() {
        let (mut p, mut i, d, t) = setup();
        p.on_ground = false;
        p.y = GROUND - p.stand_height - 1.0;
        p.vy = 200.0;
        press_jump(&mut i, &t);
        let first = step(&mut p, &mut i, &d, &t);
        assert!(first.landed.is_some());
        let second = step(&mut p, &mut i, &d, &t);
        assert!(second.jumped);
    }

    #[test]
    fn test_coyote_jump_after_walking_off() {
        let (mut p, mut i, mut d, t) = setup();
        // Ground once to arm coyote time
        step(&mut p, &mut i, &d, &t);
        assert_eq!(i.coyote, t.coyote_time);
        // Deck opens under the cat
        d.punch_gap(p.x - 50.0, 200.0);
        step(&mut p, &mut i, &d, &t);
        assert!(!p.on_ground);
        press_jump(&mut i, &t);
        assert!(step(&mut p, &mut i, &d, &t).jumped);
    }

    #[test]
    fn test_no_coyote_after_window() {
        let (mut p, mut i, mut d, t) = setup();
        step(&mut p, &mut i, &d, &t);
        d.punch_gap(p.x - 50.0, 400.0);
        let frames = (t.coyote_time / DT).ceil() as usize + 2;
        for _ in 0..frames {
            step(&mut p, &mut i, &d, &t);
        }
        press_jump(&mut i, &t);
        assert!(!step(&mut p, &mut i, &d, &t).jumped);
    }

    #[test]
    fn test_falls_through_gap_and_out() {
        let (mut p, mut i, mut d, t) = setup();
        d.punch_gap(p.x - 50.0, 400.0);
        let mut fell = false;
        for _ in 0..600 {
            if step(&mut p, &mut i, &d, &t).fell_out {
                fell = true;
                break;
            }
        }
        assert!(fell);
        assert!(p.y > BOTTOM + FALL_OUT_MARGIN);
    }

    #[test]
    fn test_gap_pad_forgives_edge() {
        let (mut p, mut i, mut d, t) = setup();
        // Centre sits 2px inside the gap: within the pad, still solid
        let cx = p.center_x();
        d.punch_gap(cx - 2.0, 100.0);
        for _ in 0..30 {
            step(&mut p, &mut i, &d, &t);
        }
        assert!(p.on_ground);
        assert_eq!(p.y, GROUND - p.stand_height);
    }

    #[test]
    fn test_duck_snaps_with_duck_height() {
        let (mut p, mut i, d, t) = setup();
        i.duck_held = true;
        step(&mut p, &mut i, &d, &t);
        assert_eq!(p.y, GROUND - p.duck_height);
    }

    #[test]
    fn test_release_damps_once() {
        let (mut p, mut i, _, t) = setup();
        p.vy = -800.0;
        i.jump_held = true;
        release_jump(&mut p, &mut i, &t);
        assert_eq!(p.vy, -600.0);
        // Second release without a press does nothing
        release_jump(&mut p, &mut i, &t);
        assert_eq!(p.vy, -600.0);
    }

    #[test]
    fn test_release_while_falling_keeps_velocity() {
        let (mut p, mut i, _, t) = setup();
        p.vy = 300.0;
        i.jump_held = true;
        release_jump(&mut p, &mut i, &t);
        assert_eq!(p.vy, 300.0);
        assert!(!i.jump_held);
    }

    #[test]
    fn test_holding_jump_goes_higher() {
        let t = Tuning::default();
        assert!(airtime(&t, true) > airtime(&t, false));
    }

    #[test]
    fn test_hold_time_capped() {
        let (mut p, mut i, d, t) = setup();
        i.jump_held = true;
        press_jump(&mut i, &t);
        for _ in 0..60 {
            step(&mut p, &mut i, &d, &t);
        }
        assert!(i.jump_hold <= t.max_hold + DT);
    }

    proptest! {
        /// The widest gap the spawner can produce is clearable with a held
        /// jump at any speed in the ramp
        #[test]
        fn test_gaps_are_jumpable(frac in 0.0f32..=1.0) {
            let t = Tuning::default();
            let speed = t.base_speed + frac * (t.max_speed - t.base_speed);
            let range = crate::sim::spawn::jumpable_gap_range(speed);
            let distance = airtime(&t, true) * speed;
            prop_assert!(distance > range.max.round() + crate::consts::PLAYER_WIDTH);
        }
    }
}
