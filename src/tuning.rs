//! Game balance knobs
//!
//! Everything the fairness math depends on lives here so tests (and the
//! native runner's `--tuning` file) can vary it without touching code.

use serde::{Deserialize, Serialize};

/// Physics, pacing and scoring constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Jump physics ===
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Take-off velocity (negative = up, px/s)
    pub jump_velocity: f32,
    /// Grace period after leaving the deck during which a jump still fires
    pub coyote_time: f32,
    /// How long an early jump press is remembered
    pub jump_buffer: f32,
    /// Longest time holding jump keeps the ascent floaty
    pub max_hold: f32,
    /// Gravity multiplier while rising with jump held
    pub hold_gravity_factor: f32,
    /// Gravity multiplier while rising after jump was released
    pub cut_gravity_factor: f32,
    /// One-shot velocity multiplier applied on jump release while rising
    pub release_damping: f32,

    // === Scroll speed ===
    pub base_speed: f32,
    pub max_speed: f32,
    /// Speed gained per second (px/s²)
    pub speed_ramp: f32,
    /// Ramp multiplier under reduced motion
    pub reduced_motion_ramp: f32,

    // === Scoring ===
    /// Points per pixel scrolled, before the speed multiplier
    pub score_rate: f32,
    pub score_mult_base: f32,
    pub score_mult_gain: f32,
    pub score_mult_exponent: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 2400.0,
            jump_velocity: -900.0,
            coyote_time: 0.12,
            jump_buffer: 0.12,
            max_hold: 0.22,
            hold_gravity_factor: 0.55,
            cut_gravity_factor: 1.9,
            release_damping: 0.75,

            base_speed: 340.0,
            max_speed: 1200.0,
            speed_ramp: 36.0,
            reduced_motion_ramp: 0.5,

            score_rate: 0.02,
            score_mult_base: 0.85,
            score_mult_gain: 1.3,
            score_mult_exponent: 1.15,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Speed range used for normalization, never zero
    pub fn speed_span(&self) -> f32 {
        (self.max_speed - self.base_speed).max(1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 2000.0, "max_speed": 900.0 }"#).unwrap();
        assert_eq!(tuning.gravity, 2000.0);
        assert_eq!(tuning.max_speed, 900.0);
        assert_eq!(tuning.jump_velocity, Tuning::default().jump_velocity);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ gravity: }").is_err());
    }

    #[test]
    fn test_speed_span_never_zero() {
        let tuning = Tuning {
            base_speed: 500.0,
            max_speed: 500.0,
            ..Default::default()
        };
        assert!(tuning.speed_span() > 0.0);
    }
}
