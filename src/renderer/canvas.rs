//! 2D-canvas debug renderer
//!
//! Flat shapes only: sky, deck strip, themed under-deck facade, collider
//! boxes, the cat, dust and a text HUD. Art is out of scope here; this draws
//! exactly what the simulation collides with.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::Renderer;
use crate::consts::{DECK_HEIGHT, DECK_LIP};
use crate::sim::deck::{FACADE_BAY_WIDTH, FACADE_PERIOD};
use crate::sim::{FacadeTheme, FacadeTileCache, ObstacleKind, RunStatus, World, tile_origins};

/// Colors for one facade theme
#[derive(Debug, Clone, Copy)]
struct FacadeTile {
    pilaster: &'static str,
    bay: &'static str,
    window: &'static str,
}

fn build_tiles() -> Vec<FacadeTile> {
    FacadeTheme::ALL
        .iter()
        .map(|theme| match theme {
            FacadeTheme::RibsSkyscraper => FacadeTile {
                pilaster: "#2b2f3a",
                bay: "#3a4050",
                window: "#55617a",
            },
            FacadeTheme::GlazedTokyo => FacadeTile {
                pilaster: "#1f2a33",
                bay: "#2e4a5c",
                window: "#6fa3bf",
            },
            FacadeTheme::DiagridSkyscraper => FacadeTile {
                pilaster: "#2d2a36",
                bay: "#433c52",
                window: "#7b6f96",
            },
            FacadeTheme::GlazedSkyscraper => FacadeTile {
                pilaster: "#24303a",
                bay: "#35505f",
                window: "#8cc0d6",
            },
        })
        .collect()
}

fn obstacle_color(kind: &ObstacleKind) -> &'static str {
    match kind {
        ObstacleKind::Chimney => "#8a4b3a",
        ObstacleKind::Antenna(_) => "#9aa3ad",
        ObstacleKind::Hvac => "#7d8a94",
        ObstacleKind::VentPipe { .. } => "#a0a8ae",
        ObstacleKind::AccessShed { .. } => "#6b5a4a",
        ObstacleKind::WaterTank { .. } => "#5f7f8f",
        ObstacleKind::Billboard { .. } => "#c9a227",
        ObstacleKind::WaterTowerGate { .. } => "#7a5533",
        ObstacleKind::Wire { .. } => "#222222",
    }
}

/// Sky gradient endpoints blended by phase (0 = night, 1 = day)
fn sky_color(phase: f32) -> String {
    let night = (14.0, 18.0, 40.0);
    let day = (120.0, 170.0, 220.0);
    let p = crate::clamp(phase, 0.0, 1.0);
    format!(
        "rgb({:.0},{:.0},{:.0})",
        crate::lerp(night.0, day.0, p),
        crate::lerp(night.1, day.1, p),
        crate::lerp(night.2, day.2, p)
    )
}

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    /// CSS pixel size of the canvas
    css_width: f64,
    css_height: f64,
    dpr: f64,
    tiles: FacadeTileCache<FacadeTile>,
    /// Set by the host from the day-cycle preference
    pub sky_phase: f32,
    /// Storm flash strength in [0, 1]
    pub lightning: f32,
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            css_width: 1.0,
            css_height: 1.0,
            dpr: 1.0,
            tiles: FacadeTileCache::new(),
            sky_phase: 0.05,
            lightning: 0.0,
        }
    }

    pub fn set_size(&mut self, css_width: f64, css_height: f64, dpr: f64) {
        self.css_width = css_width;
        self.css_height = css_height;
        self.dpr = dpr;
    }

    fn fill(&self, color: &str, x: f32, y: f32, w: f32, h: f32) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn draw_facade(&mut self, world: &World) -> Result<(), JsValue> {
        let top = world.ground_y + DECK_HEIGHT + DECK_LIP;
        let bottom = world.viewport.world_bottom();
        let height = (bottom - top).max(0.0);

        if let Some(key) = self.tiles.request(height) {
            self.tiles.install(key, build_tiles());
        }

        let deck = &world.deck;
        for span in deck.facade() {
            let Some(tile) = self.tiles.tile(span.theme).copied() else {
                self.fill("#333", span.x, top, span.width, height);
                continue;
            };
            self.ctx.save();
            self.ctx.begin_path();
            self.ctx.rect(span.x as f64, top as f64, span.width as f64, height as f64);
            self.ctx.clip();
            for x in tile_origins(deck.scroll_x(), span.x, span.width, FACADE_PERIOD) {
                self.fill(tile.pilaster, x, top, FACADE_PERIOD - FACADE_BAY_WIDTH, height);
                let bay_x = x + FACADE_PERIOD - FACADE_BAY_WIDTH;
                self.fill(tile.bay, bay_x, top, FACADE_BAY_WIDTH, height);
                let mut wy = top + 14.0;
                while wy + 22.0 < bottom {
                    self.fill(tile.window, bay_x + 12.0, wy, FACADE_BAY_WIDTH - 24.0, 18.0);
                    wy += 34.0;
                }
            }
            self.ctx.restore();
        }
        Ok(())
    }

    fn draw_world(&mut self, world: &World) -> Result<(), JsValue> {
        let zoom = world.viewport.zoom as f64;
        let gy = world.ground_y as f64;
        let view_w = world.viewport.world_width();
        let bottom = world.viewport.world_bottom();

        self.ctx.save();
        let shake = world.shake.strength() as f64;
        if shake > 0.0 {
            let t = world.shake.elapsed as f64 * 60.0;
            self.ctx.translate(t.sin() * shake, (t * 1.3).cos() * shake)?;
        }
        // Pull the camera back around the deck line
        self.ctx.translate(0.0, gy * (1.0 - zoom))?;
        self.ctx.scale(zoom, zoom)?;

        self.draw_facade(world)?;

        // Deck strip with holes
        let mut x = 0.0f32;
        for gap in world.deck.gaps() {
            if gap.x > x {
                self.fill("#4a4e57", x, world.ground_y, gap.x - x, DECK_HEIGHT);
            }
            self.fill("#0b0c10", gap.x, world.ground_y, gap.width, bottom - world.ground_y);
            x = x.max(gap.right());
        }
        if x < view_w {
            self.fill("#4a4e57", x, world.ground_y, view_w - x, DECK_HEIGHT);
        }
        for rail in world.deck.rails(world.ground_y, bottom) {
            self.fill("#1a1c22", rail.x, rail.y, rail.w, rail.h);
        }

        for obstacle in &world.obstacles {
            let color = obstacle_color(&obstacle.kind);
            for c in obstacle.colliders() {
                self.fill(color, c.x, c.y, c.w, c.h);
            }
        }

        self.ctx.set_fill_style_str("#d8d8d8");
        for puff in &world.puffs {
            self.ctx.set_global_alpha(puff.alpha.clamp(0.0, 1.0) as f64);
            self.ctx.begin_path();
            self.ctx
                .arc(puff.pos.x as f64, puff.pos.y as f64, puff.radius as f64, 0.0, std::f64::consts::TAU)?;
            self.ctx.fill();
        }
        self.ctx.set_global_alpha(1.0);

        let cat = world.player_hitbox();
        self.fill("#111111", cat.x, cat.y, cat.w, cat.h);

        self.ctx.restore();
        Ok(())
    }

    fn draw_hud(&self, world: &World) -> Result<(), JsValue> {
        let w = self.css_width;
        self.ctx.set_fill_style_str("#ffffff");
        self.ctx.set_font("16px monospace");
        self.ctx.set_text_align("left");
        self.ctx.fill_text(&format!("Score {}", world.display_score()), 16.0, 28.0)?;
        self.ctx.set_text_align("right");
        self.ctx.fill_text(&format!("Best {}", world.best_score), w - 16.0, 28.0)?;

        let banner = match world.status {
            RunStatus::Ready => Some("Space / tap right to jump - Down / tap left to duck"),
            RunStatus::Paused => Some("Paused - press any key"),
            RunStatus::Dead => Some("Ouch! Jump to try again"),
            RunStatus::Playing => None,
        };
        let hint = world.hint_alpha.clamp(0.0, 1.0) as f64;
        if let Some(text) = banner {
            let alpha = if world.status == RunStatus::Ready { hint.max(0.6) } else { 1.0 };
            self.ctx.set_global_alpha(alpha);
            self.ctx.set_text_align("center");
            self.ctx.fill_text(text, w * 0.5, self.css_height * 0.3)?;
            self.ctx.set_global_alpha(1.0);
        }
        Ok(())
    }

    fn draw_frame(&mut self, world: &World) -> Result<(), JsValue> {
        self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0)?;
        let (w, h) = (self.css_width as f32, self.css_height as f32);
        self.fill(&sky_color(self.sky_phase), 0.0, 0.0, w, h);

        self.draw_world(world)?;

        let flash = if world.reduced_motion {
            0.0
        } else {
            (world.hit_flash / crate::sim::state::HIT_FLASH_DURATION).max(self.lightning)
        };
        if flash > 0.0 {
            self.ctx.set_global_alpha((flash * 0.35).min(1.0) as f64);
            self.fill("#ffffff", 0.0, 0.0, w, h);
            self.ctx.set_global_alpha(1.0);
        }

        self.draw_hud(world)
    }
}

impl Renderer for CanvasRenderer {
    fn draw(&mut self, world: &World) {
        if let Err(e) = self.draw_frame(world) {
            log::warn!("Canvas draw failed: {e:?}");
        }
    }
}
