//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keys, pointer zones)
//! - Display sizing (device pixel ratio, touch-screen camera zoom)
//! - The browser frame loop and listener lifetime (wasm32 only)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{HostAction, PointerTracker};

/// Difficulty ease applied on top of the touch zoom
const TOUCH_ZOOM_EASE: f32 = 0.80;

/// Backing-store pixel ratio: capped lower on touch devices to keep fill
/// rate down
pub fn effective_dpr(raw_dpr: f64, touch: bool) -> f64 {
    let (cap, quality) = if touch { (1.25, 0.80) } else { (2.0, 1.0) };
    let raw = if raw_dpr.is_finite() && raw_dpr > 0.0 { raw_dpr } else { 1.0 };
    (raw * quality).clamp(1.0, cap)
}

/// Render zoom for a viewport `css_width` wide. Narrow touch screens pull the
/// camera back so more of the rooftop is visible.
pub fn camera_zoom(css_width: f32, touch: bool) -> f32 {
    if !touch {
        return 1.0;
    }
    let z = match css_width {
        w if w <= 360.0 => 0.72,
        w if w <= 420.0 => 0.78,
        w if w <= 480.0 => 0.84,
        w if w <= 560.0 => 0.88,
        _ => 0.92,
    };
    z * TOUCH_ZOOM_EASE
}
