//! Device input mapping
//!
//! Keys and pointers become `HostAction`s. Kept free of DOM types so the
//! mapping is testable off the browser.

use crate::sim::Intent;

/// What a device event asks the host to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostAction {
    Game(Intent),
    /// T: next day-cycle mode
    CycleDayMode,
    /// R: next weather mode
    CycleWeather,
}

fn is_jump_key(key: &str) -> bool {
    matches!(key, " " | "arrowup" | "w")
}

fn is_duck_key(key: &str) -> bool {
    matches!(key, "arrowdown" | "s")
}

/// Whether the browser default (page scroll) should be suppressed
pub fn captures_key(key: &str) -> bool {
    let key = key.to_lowercase();
    is_jump_key(&key) || is_duck_key(&key)
}

/// Map a key press. Auto-repeat is ignored; while paused every key only
/// resumes.
pub fn key_down(key: &str, repeat: bool, paused: bool) -> Vec<HostAction> {
    if repeat {
        return Vec::new();
    }
    if paused {
        return vec![HostAction::Game(Intent::Poke)];
    }
    let key = key.to_lowercase();
    match key.as_str() {
        k if is_jump_key(k) => vec![
            HostAction::Game(Intent::StartOrJump),
            HostAction::Game(Intent::SetJumpHeld(true)),
        ],
        k if is_duck_key(k) => vec![HostAction::Game(Intent::SetDuckHeld(true))],
        "p" => vec![HostAction::Game(Intent::TogglePause)],
        "t" => vec![HostAction::CycleDayMode],
        "r" => vec![HostAction::CycleWeather],
        _ => Vec::new(),
    }
}

pub fn key_up(key: &str) -> Vec<HostAction> {
    let key = key.to_lowercase();
    if is_jump_key(&key) {
        vec![HostAction::Game(Intent::SetJumpHeld(false))]
    } else if is_duck_key(&key) {
        vec![HostAction::Game(Intent::SetDuckHeld(false))]
    } else {
        Vec::new()
    }
}

/// Touch/mouse zones: left half of the canvas ducks, right half jumps.
/// Tracks which pointer owns each zone so multi-touch releases the right one.
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    duck_id: Option<i32>,
    jump_id: Option<i32>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer pressed at `x` (canvas-relative) on a canvas `width` wide
    pub fn down(&mut self, id: i32, x: f32, width: f32, paused: bool) -> Vec<Intent> {
        if paused {
            self.clear();
            return vec![Intent::Poke];
        }
        let mut intents = Vec::new();
        if x < width * 0.5 {
            self.duck_id = Some(id);
            if self.jump_id == Some(id) {
                self.jump_id = None;
                intents.push(Intent::SetJumpHeld(false));
            }
            intents.push(Intent::SetDuckHeld(true));
        } else {
            self.jump_id = Some(id);
            if self.duck_id == Some(id) {
                self.duck_id = None;
                intents.push(Intent::SetDuckHeld(false));
            }
            intents.push(Intent::StartOrJump);
            intents.push(Intent::SetJumpHeld(true));
        }
        intents
    }

    /// Pointer released or cancelled
    pub fn up(&mut self, id: i32) -> Vec<Intent> {
        let mut intents = Vec::new();
        if self.duck_id == Some(id) {
            self.duck_id = None;
            intents.push(Intent::SetDuckHeld(false));
        }
        if self.jump_id == Some(id) {
            self.jump_id = None;
            intents.push(Intent::SetJumpHeld(false));
        }
        intents
    }

    pub fn clear(&mut self) {
        self.duck_id = None;
        self.jump_id = None;
    }

    pub fn is_idle(&self) -> bool {
        self.duck_id.is_none() && self.jump_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intents(actions: Vec<HostAction>) -> Vec<Intent> {
        actions
            .into_iter()
            .filter_map(|a| match a {
                HostAction::Game(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_jump_keys() {
        for key in [" ", "ArrowUp", "w", "W"] {
            assert_eq!(
                intents(key_down(key, false, false)),
                vec![Intent::StartOrJump, Intent::SetJumpHeld(true)]
            );
            assert_eq!(intents(key_up(key)), vec![Intent::SetJumpHeld(false)]);
        }
    }

    #[test]
    fn test_duck_keys() {
        assert_eq!(intents(key_down("ArrowDown", false, false)), vec![Intent::SetDuckHeld(true)]);
        assert_eq!(intents(key_up("s")), vec![Intent::SetDuckHeld(false)]);
    }

    #[test]
    fn test_repeat_ignored_and_pause_swallows() {
        assert!(key_down(" ", true, false).is_empty());
        assert_eq!(key_down("t", false, true), vec![HostAction::Game(Intent::Poke)]);
    }

    #[test]
    fn test_settings_keys() {
        assert_eq!(key_down("t", false, false), vec![HostAction::CycleDayMode]);
        assert_eq!(key_down("R", false, false), vec![HostAction::CycleWeather]);
        assert_eq!(key_down("p", false, false), vec![HostAction::Game(Intent::TogglePause)]);
        assert!(key_down("q", false, false).is_empty());
    }

    #[test]
    fn test_captures_only_game_keys() {
        assert!(captures_key(" "));
        assert!(captures_key("ArrowDown"));
        assert!(!captures_key("p"));
    }

    #[test]
    fn test_pointer_zones() {
        let mut p = PointerTracker::new();
        assert_eq!(p.down(1, 100.0, 800.0, false), vec![Intent::SetDuckHeld(true)]);
        assert_eq!(
            p.down(2, 600.0, 800.0, false),
            vec![Intent::StartOrJump, Intent::SetJumpHeld(true)]
        );
        assert_eq!(p.up(2), vec![Intent::SetJumpHeld(false)]);
        assert_eq!(p.up(1), vec![Intent::SetDuckHeld(false)]);
        assert!(p.is_idle());
        assert!(p.up(3).is_empty());
    }

    #[test]
    fn test_same_pointer_switches_zone() {
        let mut p = PointerTracker::new();
        p.down(7, 700.0, 800.0, false);
        assert_eq!(
            p.down(7, 10.0, 800.0, false),
            vec![Intent::SetJumpHeld(false), Intent::SetDuckHeld(true)]
        );
    }

    #[test]
    fn test_pointer_resumes_when_paused() {
        let mut p = PointerTracker::new();
        p.down(1, 10.0, 800.0, false);
        assert_eq!(p.down(2, 500.0, 800.0, true), vec![Intent::Poke]);
        assert!(p.is_idle());
    }
}
