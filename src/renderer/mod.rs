//! Render contract
//!
//! Renderers get a read-only `&World` once per frame. The browser build
//! ships a plain 2D-canvas debug renderer; the native runner traces
//! frame summaries to the log.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use std::fmt;

use crate::sim::{RunStatus, World};

/// Something that can present a world snapshot
pub trait Renderer {
    fn draw(&mut self, world: &World);
}

/// Compact per-frame description of a world
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub status: RunStatus,
    pub score: u64,
    pub best: u64,
    pub speed: f32,
    pub obstacles: usize,
    pub gaps: usize,
    pub spans: usize,
    pub airborne: bool,
}

impl FrameSummary {
    pub fn of(world: &World) -> Self {
        Self {
            status: world.status,
            score: world.display_score(),
            best: world.best_score,
            speed: world.scroll_speed,
            obstacles: world.obstacles.len(),
            gaps: world.deck.gap_count(),
            spans: world.deck.facade().len(),
            airborne: !world.player.on_ground,
        }
    }
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] score {} (best {}) speed {:.0} obstacles {} gaps {} spans {}{}",
            self.status.as_str(),
            self.score,
            self.best,
            self.speed,
            self.obstacles,
            self.gaps,
            self.spans,
            if self.airborne { " airborne" } else { "" }
        )
    }
}

/// Logs a summary every `every` frames
#[derive(Debug)]
pub struct TraceRenderer {
    every: u64,
    frames: u64,
    last: Option<FrameSummary>,
}

impl TraceRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
            last: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last(&self) -> Option<&FrameSummary> {
        self.last.as_ref()
    }
}

impl Renderer for TraceRenderer {
    fn draw(&mut self, world: &World) {
        let summary = FrameSummary::of(world);
        if self.frames % self.every == 0 {
            log::debug!("{summary}");
        }
        self.frames += 1;
        self.last = Some(summary);
    }
}
