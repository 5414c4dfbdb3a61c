//! The scrolling rooftop deck
//!
//! The deck is a continuous walkable strip punched by skylight gaps. It owns
//! the gap list (the only source of open ground and gap-wall rails), the
//! per-gap facade themes, and the facade span layout the renderer tiles.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::rng::SimRng;
use crate::consts::{CULL_MARGIN, DECK_HEIGHT, DECK_LIP, GAP_RAIL_WIDTH};

/// Stable identity of a gap for its whole lifetime
pub type GapId = u32;

/// Width of the pilaster between facade bays
pub const FACADE_PILASTER_WIDTH: f32 = 18.0;
/// Width of one facade bay
pub const FACADE_BAY_WIDTH: f32 = 148.0;
/// Horizontal repeat of a facade tile
pub const FACADE_PERIOD: f32 = FACADE_PILASTER_WIDTH + FACADE_BAY_WIDTH;
/// Each gap is widened by this much on both sides when laying out spans
pub const FACADE_SAFE_MARGIN: f32 = 16.0;

/// A hole in the deck, in screen-space x
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckGap {
    pub id: GapId,
    pub x: f32,
    pub width: f32,
}

impl DeckGap {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Whether `cx` is strictly inside the gap shrunk by `pad` on each side
    #[inline]
    pub fn is_open_at(&self, cx: f32, pad: f32) -> bool {
        cx > self.x + pad && cx < self.right() - pad
    }

    /// Lethal walls flanking the gap below the deck
    pub fn rails(&self, ground_y: f32, world_bottom: f32) -> [Rect; 2] {
        let top = ground_y + DECK_HEIGHT + DECK_LIP;
        let h = (world_bottom - top).max(0.0);
        [
            Rect::new(self.x - GAP_RAIL_WIDTH, top, GAP_RAIL_WIDTH, h),
            Rect::new(self.right(), top, GAP_RAIL_WIDTH, h),
        ]
    }
}

/// Under-deck wall designs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacadeTheme {
    RibsSkyscraper,
    GlazedTokyo,
    DiagridSkyscraper,
    GlazedSkyscraper,
}

impl FacadeTheme {
    pub const ALL: [FacadeTheme; 4] = [
        FacadeTheme::RibsSkyscraper,
        FacadeTheme::GlazedTokyo,
        FacadeTheme::DiagridSkyscraper,
        FacadeTheme::GlazedSkyscraper,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        match self {
            FacadeTheme::RibsSkyscraper => 0,
            FacadeTheme::GlazedTokyo => 1,
            FacadeTheme::DiagridSkyscraper => 2,
            FacadeTheme::GlazedSkyscraper => 3,
        }
    }

    /// Out-of-range indices clamp to the last theme
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::COUNT - 1)]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FacadeTheme::RibsSkyscraper => "ribs_skyscraper",
            FacadeTheme::GlazedTokyo => "glazed_tokyo",
            FacadeTheme::DiagridSkyscraper => "diagrid_skyscraper",
            FacadeTheme::GlazedSkyscraper => "glazed_skyscraper",
        }
    }
}

/// Solid deck stretch between two gaps (before clipping to the view)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanExtent {
    pub start: f32,
    pub end: f32,
    pub left_gap: Option<GapId>,
    pub right_gap: Option<GapId>,
}

/// A visible, themed piece of the under-deck wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacadeSpan {
    pub x: f32,
    pub width: f32,
    pub theme: FacadeTheme,
    pub left_gap: Option<GapId>,
}

/// Deck state for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Sorted by x, never overlapping
    gaps: VecDeque<DeckGap>,
    next_gap_id: GapId,
    themes: HashMap<GapId, FacadeTheme>,
    /// Per-run salt so theme sequences differ between runs
    salt: u32,
    /// Theme of the leftmost visible span last frame
    carry_theme: FacadeTheme,
    /// World-space phase of the facade tiling
    scroll_x: f32,
    /// Span layout from the last refresh
    facade: Vec<FacadeSpan>,
}

impl Deck {
    pub fn new(rng: &mut SimRng) -> Self {
        let salt = rng.next_u32() & 0x7fff_ffff;
        let first = FacadeTheme::from_index((rng.unit() * FacadeTheme::COUNT as f32) as usize);
        Self {
            gaps: VecDeque::new(),
            next_gap_id: 1,
            themes: HashMap::new(),
            salt,
            carry_theme: first,
            scroll_x: 0.0,
            facade: Vec::new(),
        }
    }

    pub fn gaps(&self) -> impl Iterator<Item = &DeckGap> {
        self.gaps.iter()
    }

    pub fn gap_count(&self) -> usize {
        self.gaps.len()
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    /// Facade layout computed by the last `refresh_facade`
    pub fn facade(&self) -> &[FacadeSpan] {
        &self.facade
    }

    /// Right edge of the newest gap
    pub fn last_gap_right(&self) -> Option<f32> {
        self.gaps.back().map(DeckGap::right)
    }

    /// Add a gap at the right end of the deck.
    ///
    /// Returns `None` (and changes nothing) if the gap is degenerate or would
    /// overlap or precede the newest gap.
    pub fn punch_gap(&mut self, x: f32, width: f32) -> Option<GapId> {
        if !x.is_finite() || !width.is_finite() || width <= 0.0 {
            return None;
        }
        if let Some(right) = self.last_gap_right() {
            if x < right {
                return None;
            }
        }
        let id = self.next_gap_id;
        self.next_gap_id += 1;
        self.gaps.push_back(DeckGap { id, x, width });
        Some(id)
    }

    /// Scroll everything left by `dx` and drop gaps that left the screen
    pub fn advance(&mut self, dx: f32) {
        self.scroll_x += dx;
        for gap in &mut self.gaps {
            gap.x -= dx;
        }
        while let Some(front) = self.gaps.front() {
            if front.right() >= -CULL_MARGIN {
                break;
            }
            let id = front.id;
            self.gaps.pop_front();
            self.themes.remove(&id);
        }
    }

    /// Whether a point on the deck is over an open gap (gaps shrunk by `pad`)
    pub fn is_open_at(&self, cx: f32, pad: f32) -> bool {
        self.gaps.iter().any(|g| g.is_open_at(cx, pad))
    }

    /// Every gap-wall rail
    pub fn rails(&self, ground_y: f32, world_bottom: f32) -> impl Iterator<Item = Rect> + '_ {
        self.gaps
            .iter()
            .flat_map(move |g| g.rails(ground_y, world_bottom))
    }

    /// Theme of the span to the right of a gap, picked on first use
    pub fn theme_for(&mut self, gap: GapId) -> FacadeTheme {
        let salt = self.salt;
        *self
            .themes
            .entry(gap)
            .or_insert_with(|| FacadeTheme::from_index(theme_index(gap, salt, FacadeTheme::COUNT)))
    }

    /// Solid spans between gaps (each gap widened by `margin`) clipped to
    /// `[0, view_width]`. Never empty for a positive view width.
    pub fn world_spans(&self, view_width: f32, margin: f32) -> Vec<SpanExtent> {
        if self.gaps.is_empty() {
            return vec![SpanExtent {
                start: 0.0,
                end: view_width,
                left_gap: None,
                right_gap: None,
            }];
        }

        let mut spans = Vec::with_capacity(self.gaps.len() + 1);
        let mut cursor = f32::NEG_INFINITY;
        let mut prev: Option<GapId> = None;
        for gap in &self.gaps {
            let left = gap.x.round() - margin;
            let right = gap.right().round() + margin;
            if left > cursor {
                spans.push(SpanExtent {
                    start: cursor,
                    end: left,
                    left_gap: prev,
                    right_gap: Some(gap.id),
                });
            }
            cursor = cursor.max(right);
            prev = Some(gap.id);
        }
        spans.push(SpanExtent {
            start: cursor,
            end: f32::INFINITY,
            left_gap: prev,
            right_gap: None,
        });

        let mut visible: Vec<SpanExtent> = spans
            .into_iter()
            .filter_map(|s| {
                let start = s.start.max(0.0);
                let end = s.end.min(view_width);
                (end > start).then_some(SpanExtent { start, end, ..s })
            })
            .collect();
        if visible.is_empty() {
            visible.push(SpanExtent {
                start: 0.0,
                end: view_width,
                left_gap: prev,
                right_gap: None,
            });
        }
        visible
    }

    /// Recompute the themed facade layout for this frame.
    ///
    /// A span takes its left gap's theme; the leading span with no gap to its
    /// left keeps whatever theme led the previous frame, so the wall does not
    /// flip as gaps scroll off.
    pub fn refresh_facade(&mut self, view_width: f32) {
        let spans = self.world_spans(view_width, FACADE_SAFE_MARGIN);
        let mut facade = Vec::with_capacity(spans.len());
        for span in spans {
            let theme = match span.left_gap {
                Some(id) => self.theme_for(id),
                None => self.carry_theme,
            };
            facade.push(FacadeSpan {
                x: span.start,
                width: span.end - span.start,
                theme,
                left_gap: span.left_gap,
            });
        }
        if let Some(first) = facade.first() {
            self.carry_theme = first.theme;
        }
        self.facade = facade;
    }
}

/// 32-bit integer mix mapped to [0, 1]
fn mix01(mut n: u32) -> f64 {
    n = (n ^ 61) ^ (n >> 16);
    n = n.wrapping_add(n << 3);
    n ^= n >> 4;
    n = n.wrapping_mul(0x27d4_eb2d);
    n ^= n >> 15;
    n as f64 / u32::MAX as f64
}

/// Deterministic theme pick for a gap under a run salt
pub fn theme_index(gap: GapId, salt: u32, theme_count: usize) -> usize {
    if theme_count == 0 {
        return 0;
    }
    let r = mix01((gap ^ salt).wrapping_mul(0x9e37_79b1));
    ((r * theme_count as f64).floor() as usize).min(theme_count - 1)
}

/// Left edges of the facade tiles needed to cover a span, phase-locked to
/// the deck scroll so tiles move with the world
pub fn tile_origins(scroll_x: f32, span_x: f32, span_width: f32, period: f32) -> impl Iterator<Item = f32> {
    let valid = period > 0.0 && period.is_finite() && span_width.is_finite();
    let offset = if valid { (scroll_x + span_x).rem_euclid(period) } else { 0.0 };
    let start = span_x - offset - period;
    let end = span_x + span_width + period;
    let count = if valid { ((end - start) / period).ceil().max(0.0) as usize } else { 0 };
    (0..count).map(move |i| start + i as f32 * period)
}

/// Cache key for pre-rendered facade tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub tile_height: u32,
    pub period: u32,
    pub theme_count: u32,
}

impl TileKey {
    pub fn new(tile_height: f32) -> Self {
        Self {
            tile_height: tile_height.round().max(0.0) as u32,
            period: FACADE_PERIOD as u32,
            theme_count: FacadeTheme::COUNT as u32,
        }
    }
}

/// One pre-rendered tile per theme, built off the tick by the host.
///
/// `request` hands out a build job only when the key changed and nothing is
/// already pending for it. `install` ignores results for a key that is no
/// longer wanted.
#[derive(Debug)]
pub struct FacadeTileCache<T> {
    key: Option<TileKey>,
    pending: Option<TileKey>,
    tiles: Vec<T>,
}

impl<T> Default for FacadeTileCache<T> {
    fn default() -> Self {
        Self {
            key: None,
            pending: None,
            tiles: Vec::new(),
        }
    }
}

impl<T> FacadeTileCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for tiles of the given height; `Some(key)` means "build these now"
    pub fn request(&mut self, tile_height: f32) -> Option<TileKey> {
        let key = TileKey::new(tile_height);
        if self.key == Some(key) || self.pending == Some(key) {
            return None;
        }
        self.key = None;
        self.tiles.clear();
        self.pending = Some(key);
        Some(key)
    }

    /// Store built tiles. Returns false if `key` is stale.
    pub fn install(&mut self, key: TileKey, tiles: Vec<T>) -> bool {
        if self.pending != Some(key) {
            log::debug!("Dropping stale facade tiles for height {}", key.tile_height);
            return false;
        }
        self.pending = None;
        self.key = Some(key);
        self.tiles = tiles;
        true
    }

    pub fn is_ready(&self) -> bool {
        self.key.is_some()
    }

    /// Tile for a theme, or `None` while a build is outstanding
    pub fn tile(&self, theme: FacadeTheme) -> Option<&T> {
        if self.is_ready() {
            self.tiles.get(theme.index())
        } else {
            None
        }
    }
}
