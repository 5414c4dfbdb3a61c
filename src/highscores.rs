//! Best score
//!
//! A single persisted scalar: the highest floored score ever reached.

use crate::persistence::{Storage, keys, read_or_warn, write_or_warn};
use crate::sim::GameEvent;

/// Best score tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore {
    value: u64,
    /// Value last written to storage
    saved: u64,
}

impl BestScore {
    pub fn new(value: u64) -> Self {
        Self { value, saved: value }
    }

    /// Load from storage; missing or garbage values start at zero
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        // Older saves may hold a float
        let best = read_or_warn(storage, keys::BEST, |v| {
            v.parse::<u64>()
                .ok()
                .or_else(|| v.parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
        })
        .unwrap_or(0);
        log::info!("Best score: {}", best);
        Self::new(best)
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Record a score; returns true if it beat the best
    pub fn observe(&mut self, score: u64) -> bool {
        if score > self.value {
            self.value = score;
            true
        } else {
            false
        }
    }

    /// Apply a simulation event
    pub fn handle(&mut self, event: &GameEvent) -> bool {
        match event {
            GameEvent::NewBest(score) => self.observe(*score),
            _ => false,
        }
    }

    /// Whether a new best is waiting to be written
    pub fn is_dirty(&self) -> bool {
        self.value != self.saved
    }

    /// Write the best score if it changed since the last save
    pub fn save<S: Storage + ?Sized>(&mut self, storage: &mut S) {
        if !self.is_dirty() {
            return;
        }
        write_or_warn(storage, keys::BEST, &self.value.to_string());
        self.saved = self.value;
    }
}
