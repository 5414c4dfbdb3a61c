//! Abstract input signals
//!
//! The host turns keys, pointers and page lifecycle into `Intent`s and pushes
//! them; the tick drains the queue once per frame, so input is applied at a
//! single, well-defined point.

use serde::{Deserialize, Serialize};

/// Something the player (or the page) asked for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Start a run, restart after death, or jump
    StartOrJump,
    /// Any other press; only meaningful as "resume" while paused
    Poke,
    SetDuckHeld(bool),
    SetJumpHeld(bool),
    TogglePause,
    /// Window blur or page hidden
    FocusLost,
    /// Back to the ready screen from any state
    Restart { keep_score: bool },
    SetReducedMotion(bool),
    Resize { width: f32, height: f32 },
}

impl Intent {
    /// Presses that resume a paused run
    pub fn is_press(&self) -> bool {
        matches!(
            self,
            Intent::StartOrJump | Intent::Poke | Intent::TogglePause | Intent::SetDuckHeld(true) | Intent::SetJumpHeld(true)
        )
    }
}

/// Pending intents for the next tick
#[derive(Debug, Default)]
pub struct InputQueue {
    intents: Vec<Intent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            intents: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Take every pending intent, oldest first
    pub fn drain(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain_in_order() {
        let mut q = InputQueue::new();
        q.push(Intent::SetJumpHeld(true));
        q.push(Intent::StartOrJump);
        assert_eq!(q.len(), 2);
        assert_eq!(q.drain(), vec![Intent::SetJumpHeld(true), Intent::StartOrJump]);
        assert!(q.is_empty());
        assert!(q.drain().is_empty());
    }

    #[test]
    fn test_releases_are_not_presses() {
        assert!(Intent::Poke.is_press());
        assert!(Intent::SetDuckHeld(true).is_press());
        assert!(!Intent::SetDuckHeld(false).is_press());
        assert!(!Intent::SetJumpHeld(false).is_press());
        assert!(!Intent::FocusLost.is_press());
        assert!(!Intent::Resize { width: 1.0, height: 1.0 }.is_press());
    }
}
