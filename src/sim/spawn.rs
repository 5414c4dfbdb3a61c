//! Procedural obstacle and gap spawning
//!
//! A spawn attempt either defers (returns a delay), creates exactly one
//! obstacle or deck gap at the spawn edge, or does nothing and lets the
//! caller fall back to the default cadence.

use super::obstacle::{
    AntennaStyle, BillboardFace, Obstacle, ObstacleKind, RoofSlope, TankStyle, VentTier,
};
use super::rng::SimRng;
use super::state::World;
use crate::tuning::Tuning;

/// Speeds below this are treated as this for deferral math
pub const MIN_SPAWN_SPEED: f32 = 120.0;
/// Horizontal clearance kept around wires
pub const WIRE_MARGIN: f32 = 160.0;
/// Padding between a skylight footprint and its gap
pub const SKYLIGHT_GAP_PAD: f32 = 8.0;
/// Runway between gaps at base speed
pub const GAP_RUNWAY_BASE: f32 = 160.0;
/// Extra runway per px/s above base speed
pub const GAP_RUNWAY_PER_SPEED: f32 = 0.18;
/// Skew of gap widths toward the easy end (lower = easier)
pub const GAP_WIDTH_BIAS: f32 = 0.35;

const WIRE_MIN_DELAY: f32 = 0.08;
const GAP_MIN_DELAY: f32 = 0.06;

/// Raw spawn choice before geometry is rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPick {
    Chimney,
    Antenna,
    Hvac,
    Skylight,
    VentPipe,
    AccessShed,
    WaterTank,
    Billboard,
    WaterTowerGate,
    Wire,
}

pub const SPAWN_TABLE: [(SpawnPick, f32); 10] = [
    (SpawnPick::Chimney, 22.0),
    (SpawnPick::Antenna, 16.0),
    (SpawnPick::Hvac, 14.0),
    (SpawnPick::Skylight, 40.0),
    (SpawnPick::VentPipe, 10.0),
    (SpawnPick::AccessShed, 9.0),
    (SpawnPick::WaterTank, 6.0),
    (SpawnPick::Billboard, 4.0),
    (SpawnPick::WaterTowerGate, 8.0),
    (SpawnPick::Wire, 17.0),
];

/// Fair gap widths at a given speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapRange {
    pub min: f32,
    pub max: f32,
}

pub fn jumpable_gap_range(speed: f32) -> GapRange {
    let v = speed.clamp(280.0, 1200.0);
    GapRange {
        min: 80.0 + 0.06 * v,
        max: 130.0 + 0.15 * v,
    }
}

/// Whole-pixel gap width inside the fair range, biased toward narrow
pub fn pick_gap_width(speed: f32, rng: &mut SimRng) -> f32 {
    let range = jumpable_gap_range(speed);
    let t = rng.unit().powf(GAP_WIDTH_BIAS);
    (range.min + t * (range.max - range.min)).round()
}

/// Solid deck needed between consecutive gaps
pub fn required_runway(speed: f32, tuning: &Tuning) -> f32 {
    GAP_RUNWAY_BASE + (speed - tuning.base_speed) * GAP_RUNWAY_PER_SPEED
}

/// Delay used when a spawn attempt neither deferred nor chose one
pub fn default_cadence(world: &mut World) -> f32 {
    let t = &world.tuning;
    let speed_factor = 1.0 - (world.scroll_speed - t.base_speed) / (t.max_speed - t.base_speed + 1e-6);
    1.08 * (0.55 + speed_factor * 0.8) * (0.8 + world.rng.unit() * 0.6)
}

/// Try to spawn at the right edge. `Some(delay)` means retry after `delay`.
pub fn spawn(world: &mut World) -> Option<f32> {
    let spawn_x = world.viewport.spawn_edge();
    let speed = world.scroll_speed.max(MIN_SPAWN_SPEED);

    // Never start anything while a wire still hangs over the spawn edge
    if let Some(delay) = blocked_delay(world.obstacles.iter().filter(|o| o.is_wire()), spawn_x, speed, WIRE_MIN_DELAY) {
        log::debug!("Spawn deferred {delay:.2}s: wire overhead");
        return Some(delay);
    }

    let pick = world.rng.weighted(&SPAWN_TABLE)?;
    spawn_with(world, pick)
}

/// Spawn a specific pick, still honouring the pick's own fairness guards
pub fn spawn_with(world: &mut World, pick: SpawnPick) -> Option<f32> {
    let spawn_x = world.viewport.spawn_edge();
    let speed = world.scroll_speed.max(MIN_SPAWN_SPEED);

    match pick {
        SpawnPick::Skylight => spawn_gap(world, spawn_x, speed),
        SpawnPick::Wire => {
            // Wires never hang over a ground obstacle
            if let Some(delay) = blocked_delay(world.obstacles.iter().filter(|o| !o.is_wire()), spawn_x, speed, WIRE_MIN_DELAY) {
                log::debug!("Wire deferred {delay:.2}s: ground obstacle below");
                return Some(delay);
            }
            place(world, pick, spawn_x);
            None
        }
        _ => {
            place(world, pick, spawn_x);
            None
        }
    }
}

/// Deferral needed until every obstacle whose margin covers `spawn_x` has
/// scrolled clear
fn blocked_delay<'a>(
    obstacles: impl Iterator<Item = &'a Obstacle>,
    spawn_x: f32,
    speed: f32,
    min_delay: f32,
) -> Option<f32> {
    let block_right = obstacles
        .filter(|o| spawn_x >= o.x - WIRE_MARGIN && spawn_x <= o.right() + WIRE_MARGIN)
        .map(Obstacle::right)
        .fold(None, |acc: Option<f32>, r| Some(acc.map_or(r, |a| a.max(r))))?;
    let remaining = block_right + WIRE_MARGIN - spawn_x;
    (remaining > 0.0).then(|| (remaining / speed).max(min_delay))
}

fn spawn_gap(world: &mut World, spawn_x: f32, speed: f32) -> Option<f32> {
    let need = required_runway(world.scroll_speed, &world.tuning);
    if let Some(last_right) = world.deck.last_gap_right() {
        let runway = spawn_x - (last_right + SKYLIGHT_GAP_PAD * 2.0);
        if runway < need {
            let delay = ((need - runway) / speed).max(GAP_MIN_DELAY);
            log::debug!("Gap deferred {delay:.2}s: runway {runway:.0} < {need:.0}");
            return Some(delay);
        }
    }

    let width = pick_gap_width(world.scroll_speed, &mut world.rng);
    let x = spawn_x + SKYLIGHT_GAP_PAD;
    match world.deck.punch_gap(x, width) {
        Some(id) => log::debug!("Gap {id} punched at x={x:.0} width={width}"),
        None => log::debug!("Gap at x={x:.0} refused by deck"),
    }
    None
}

fn place(world: &mut World, pick: SpawnPick, x: f32) {
    let n = world.normalized_speed();
    let gy = world.ground_y;
    let duck_height = world.player.duck_height;
    if let Some(obstacle) = build(pick, x, gy, n, duck_height, &mut world.rng) {
        log::debug!(
            "Spawned {} at x={:.0} ({:.0}x{:.0})",
            obstacle.name(),
            obstacle.x,
            obstacle.width,
            obstacle.height
        );
        world.push_obstacle(obstacle);
    }
}

/// Roll geometry for a pick standing on the deck at `gy`.
/// `n` is the normalized scroll speed. Skylights are gaps, not obstacles.
pub fn build(
    pick: SpawnPick,
    x: f32,
    gy: f32,
    n: f32,
    duck_height: f32,
    rng: &mut SimRng,
) -> Option<Obstacle> {
    let standing = |kind, w: f32, h: f32| Some(Obstacle::new(kind, x, gy - h, w, h, gy));

    match pick {
        SpawnPick::Skylight => None,
        SpawnPick::Chimney => {
            let w = rng.range(26.0, 46.0);
            let h = rng.range(44.0, 78.0);
            standing(ObstacleKind::Chimney, w, h)
        }
        SpawnPick::Antenna => {
            if rng.chance(0.45 + 0.25 * n) {
                let w = rng.range(56.0, 88.0) * 1.5;
                let h = rng.range(110.0, 156.0) * 1.5;
                let clearance = (duck_height + 10.0).max(34.0);
                standing(ObstacleKind::Antenna(AntennaStyle::Pylon { clearance }), w, h)
            } else {
                let w = rng.range(12.0, 22.0);
                let h = rng.range(64.0, 116.0);
                standing(ObstacleKind::Antenna(AntennaStyle::Mast), w, h)
            }
        }
        SpawnPick::Hvac => {
            let w = rng.range(44.0, 80.0);
            let h = rng.range(22.0, 34.0);
            standing(ObstacleKind::Hvac, w, h)
        }
        SpawnPick::VentPipe => {
            const DIAMETER: f32 = 44.0;
            let tier = rng
                .weighted(&[(VentTier::Medium, 5.0), (VentTier::Long, 4.0), (VentTier::ExtraLong, 2.0)])
                .unwrap_or(VentTier::Medium);
            let (len, run_frac) = match tier {
                VentTier::Medium => (rng.range(84.0, 108.0), rng.range(0.80, 0.90)),
                VentTier::Long => (rng.range(112.0, 148.0), rng.range(0.88, 0.95)),
                VentTier::ExtraLong => (rng.range(156.0, 220.0), rng.range(0.90, 0.95)),
            };
            // Long enough for a constant elbow radius at this diameter
            let min_len = ((DIAMETER * (0.30 / 0.18)).ceil() + 4.0).max(84.0);
            standing(
                ObstacleKind::VentPipe {
                    tier,
                    run_frac,
                    brackets: true,
                },
                len.max(min_len),
                DIAMETER,
            )
        }
        SpawnPick::AccessShed => {
            let w = rng.range(36.0, 60.0);
            let h = rng.range(34.0, 54.0);
            let roof = if rng.chance(0.5) { RoofSlope::Left } else { RoofSlope::Right };
            standing(ObstacleKind::AccessShed { roof }, w, h)
        }
        SpawnPick::WaterTank => {
            let mut w = rng.range(96.0, 150.0);
            let mut h = rng.range(46.0, 60.0);
            let style = if rng.chance(0.5) { TankStyle::Drum } else { TankStyle::PolyRound };
            if style == TankStyle::PolyRound {
                h = (h + 6.0).round();
                w = w.max(((h - 2.0) * 2.0 + 12.0).round());
            }
            standing(ObstacleKind::WaterTank { style }, w, h)
        }
        SpawnPick::Billboard => {
            let w = rng.range(110.0, 180.0);
            let h = rng.range(56.0, 84.0);
            let face = rng
                .weighted(&[
                    (BillboardFace::Classic, 3.0),
                    (BillboardFace::Slats, 4.0),
                    (BillboardFace::Led, 3.0),
                    (BillboardFace::Wood, 3.0),
                ])
                .unwrap_or(BillboardFace::Classic);
            standing(ObstacleKind::Billboard { face }, w, h)
        }
        SpawnPick::WaterTowerGate => {
            const BEAM: f32 = 12.0;
            let w = rng.range(84.0, 120.0);
            let clearance = 26.0 + (rng.unit() * 4.0).floor();
            let stem = rng.range(28.0, 50.0);
            let tank_height = rng.range(56.0, 76.0);
            Some(Obstacle::new(
                ObstacleKind::WaterTowerGate {
                    clearance,
                    stem,
                    tank_height,
                },
                x,
                gy - (clearance + BEAM),
                w,
                BEAM,
                gy,
            ))
        }
        SpawnPick::Wire => {
            let span = rng.range(140.0, 280.0) + n.max(0.0) * 160.0;
            let y = gy - rng.range(48.0, 74.0);
            let sag = rng.range(10.0, 30.0);
            let pole_height = rng.range(28.0, 44.0);
            Some(Obstacle::new(ObstacleKind::Wire { sag, pole_height }, x, y, span, 4.0, gy))
        }
    }
}
