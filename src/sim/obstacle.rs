//! Rooftop obstacles and their collider sets
//!
//! Every kind answers `colliders()`. Simple kinds collide with their bounds;
//! the pass-under kinds (gated water tower, pylon antenna, wire) expose the
//! narrower shapes that leave room for a ducking or jumping cat.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::MIN_OBSTACLE_DIMENSION;

/// Number of straight pieces a sagging cable is split into for collision
pub const WIRE_SEGMENTS: usize = 8;
/// Collision thickness of a cable
pub const WIRE_THICKNESS: f32 = 8.0;
/// Collision width of a wire pole
pub const WIRE_POLE_WIDTH: f32 = 6.0;

/// Antenna silhouette
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AntennaStyle {
    /// Thin mast, collides with its bounds
    Mast,
    /// Wide lattice pylon the cat can duck under
    Pylon { clearance: f32 },
}

/// Vent pipe length class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VentTier {
    Medium,
    Long,
    ExtraLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoofSlope {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TankStyle {
    Drum,
    PolyRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillboardFace {
    Classic,
    Slats,
    Led,
    Wood,
}

/// Obstacle variants with their kind-specific fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Chimney,
    Antenna(AntennaStyle),
    Hvac,
    VentPipe {
        tier: VentTier,
        /// Fraction of the length that is straight run before the elbow
        run_frac: f32,
        brackets: bool,
    },
    AccessShed {
        roof: RoofSlope,
    },
    WaterTank {
        style: TankStyle,
    },
    Billboard {
        face: BillboardFace,
    },
    /// Water tower on legs with a crossbeam the cat must duck under.
    /// `y`/`height` describe the beam; the tower above is derived.
    WaterTowerGate {
        clearance: f32,
        stem: f32,
        tank_height: f32,
    },
    /// Sagging cable between two poles. `y` is the pole tops.
    Wire {
        sag: f32,
        pole_height: f32,
    },
}

/// An obstacle sitting on (or strung above) the deck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Deck surface the obstacle was anchored to
    pub base_y: f32,
}

impl Obstacle {
    /// Build an obstacle; non-finite or tiny dimensions are clamped
    pub fn new(kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32, base_y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            width: sanitize_dimension(width),
            height: sanitize_dimension(height),
            base_y,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn is_wire(&self) -> bool {
        matches!(self.kind, ObstacleKind::Wire { .. })
    }

    /// Shift vertically after the deck moved by `dy`
    pub fn reanchor(&mut self, dy: f32) {
        self.y += dy;
        self.base_y += dy;
    }

    /// Short kind name for logs
    pub fn name(&self) -> &'static str {
        match self.kind {
            ObstacleKind::Chimney => "chimney",
            ObstacleKind::Antenna(AntennaStyle::Mast) => "antenna",
            ObstacleKind::Antenna(AntennaStyle::Pylon { .. }) => "pylon",
            ObstacleKind::Hvac => "hvac",
            ObstacleKind::VentPipe { .. } => "vent_pipe",
            ObstacleKind::AccessShed { .. } => "access_shed",
            ObstacleKind::WaterTank { .. } => "water_tank",
            ObstacleKind::Billboard { .. } => "billboard",
            ObstacleKind::WaterTowerGate { .. } => "water_tower_gate",
            ObstacleKind::Wire { .. } => "wire",
        }
    }

    /// Collision rectangles; never empty
    pub fn colliders(&self) -> Vec<Rect> {
        let rects = match self.kind {
            ObstacleKind::Antenna(AntennaStyle::Pylon { clearance }) => self.pylon_colliders(clearance),
            ObstacleKind::WaterTowerGate {
                clearance,
                stem,
                tank_height,
            } => self.gate_colliders(clearance, stem, tank_height),
            ObstacleKind::Wire { sag, pole_height } => self.wire_colliders(sag, pole_height),
            _ => Vec::new(),
        };
        if rects.is_empty() {
            vec![self.bounds()]
        } else {
            rects
        }
    }

    fn pylon_colliders(&self, clearance: f32) -> Vec<Rect> {
        let clear_y = self.base_y - clearance;
        let cx = self.x + self.width / 2.0;

        let core_w = (self.width * 0.30).max(12.0);
        let spine = Rect::new(cx - core_w / 2.0, self.y, core_w, (clear_y - self.y).max(1.0));

        let arm_y = self.y + (self.height * 0.26).max(12.0);
        let arm_w = (self.width * 0.40).max(16.0);
        let arm = Rect::new(cx - arm_w / 2.0, arm_y - 4.0, arm_w, 8.0);

        vec![spine, arm]
    }

    fn gate_colliders(&self, clearance: f32, stem: f32, tank_height: f32) -> Vec<Rect> {
        // Duck bar spans between the legs only
        let inset = (self.width * 0.18).max(10.0);
        let leg_w = (self.width * 0.08).clamp(4.0, 7.0);
        let inner_l = self.x + inset + leg_w + 2.0;
        let inner_r = self.right() - inset - leg_w - 2.0;
        let bar = Rect::new(inner_l, self.y, (inner_r - inner_l).max(20.0), self.height);

        // Tower from the cap down to the top of the beam
        let leg_h = clearance + self.height + stem;
        let platform_y = self.base_y - leg_h;
        let tank_top = platform_y - 6.0 - tank_height;
        let tower_top = tank_top - 12.0;
        let tower = Rect::new(self.x, tower_top, self.width, (self.y - tower_top).max(0.0));

        vec![bar, tower]
    }

    fn wire_colliders(&self, sag: f32, pole_height: f32) -> Vec<Rect> {
        let x1 = self.x;
        let x2 = self.right();
        let y = self.y;
        let half_pole = WIRE_POLE_WIDTH / 2.0;

        let mut rects = Vec::with_capacity(2 + WIRE_SEGMENTS);
        rects.push(Rect::new(x1 - half_pole, y - pole_height, WIRE_POLE_WIDTH, pole_height));
        rects.push(Rect::new(x2 - half_pole, y - pole_height, WIRE_POLE_WIDTH, pole_height));

        // Quadratic Bezier through (x1, y), control (mid, y + sag), (x2, y)
        let cx = (x1 + x2) / 2.0;
        let cy = y + sag;
        let eval = |t: f32| {
            let mt = 1.0 - t;
            (
                mt * mt * x1 + 2.0 * mt * t * cx + t * t * x2,
                mt * mt * y + 2.0 * mt * t * cy + t * t * y,
            )
        };
        let half_t = WIRE_THICKNESS / 2.0;
        for i in 0..WIRE_SEGMENTS {
            let (xa, ya) = eval(i as f32 / WIRE_SEGMENTS as f32);
            let (xb, yb) = eval((i + 1) as f32 / WIRE_SEGMENTS as f32);
            rects.push(Rect::new(
                xa.min(xb),
                ya.min(yb) - half_t,
                (xb - xa).abs().max(1.0),
                ((yb - ya).abs() + WIRE_THICKNESS).max(1.0),
            ));
        }
        rects
    }
}

fn sanitize_dimension(v: f32) -> f32 {
    if v.is_finite() {
        v.max(MIN_OBSTACLE_DIMENSION)
    } else {
        MIN_OBSTACLE_DIMENSION
    }
}
