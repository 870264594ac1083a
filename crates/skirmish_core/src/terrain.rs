//! Terrain queries used by snapshot construction and the decision policy.
//!
//! The predictor only needs two facts about the map: the ground height at a
//! position (for the uphill attack penalty and elevation correction) and
//! the narrowest choke between two points (for the bottleneck correction).

use serde::{Deserialize, Serialize};

use crate::math::Position;

/// How far a choke's center may be from the straight line between two
/// points and still count as being on the way, in pixels.
pub const CHOKE_PATH_TOLERANCE: i64 = 64;

/// Read-only map lookups.
///
/// Implementations must be pure; the same query always gives the same
/// answer for the lifetime of a prediction.
pub trait TerrainQuery: Send + Sync {
    /// Ground height tier at `pos`, or `None` if unknown (off the map).
    fn ground_height(&self, pos: Position) -> Option<i32>;

    /// Width in pixels of the narrowest choke between `from` and `to`, or
    /// `None` if the way is open.
    fn narrowest_choke_between(&self, from: Position, to: Position) -> Option<i32>;
}

/// Featureless map: height 0 everywhere, no chokes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain;

impl TerrainQuery for FlatTerrain {
    fn ground_height(&self, _pos: Position) -> Option<i32> {
        Some(0)
    }

    fn narrowest_choke_between(&self, _from: Position, _to: Position) -> Option<i32> {
        None
    }
}

/// Rectangular raised or lowered area, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plateau {
    /// Left tile column.
    pub x: i32,
    /// Top tile row.
    pub y: i32,
    /// Width in tiles.
    pub width: i32,
    /// Height in tiles.
    pub height: i32,
    /// Ground height tier inside the area.
    pub level: i32,
}

impl Plateau {
    fn contains_tile(&self, (tx, ty): (i32, i32)) -> bool {
        tx >= self.x && tx < self.x + self.width && ty >= self.y && ty < self.y + self.height
    }
}

/// A passage between two regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choke {
    /// Center of the passage in pixels.
    pub center: Position,
    /// Passage width in pixels.
    pub width: i32,
}

/// Tile map with height regions and explicit chokes.
///
/// Later plateaus override earlier ones where they overlap.
///
/// # Example
///
/// ```
/// use skirmish_core::math::Position;
/// use skirmish_core::terrain::{GridTerrain, TerrainQuery};
///
/// let terrain = GridTerrain::new(64, 64)
///     .with_plateau(0, 0, 16, 16, 2)
///     .with_choke(Position::new(600, 300), 80);
///
/// assert_eq!(terrain.ground_height(Position::new(100, 100)), Some(2));
/// assert_eq!(terrain.ground_height(Position::new(1000, 1000)), Some(0));
/// assert_eq!(
///     terrain.narrowest_choke_between(Position::new(300, 300), Position::new(900, 300)),
///     Some(80)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTerrain {
    /// Map width in tiles.
    pub width: i32,
    /// Map height in tiles.
    pub height: i32,
    /// Height tier outside every plateau.
    #[serde(default)]
    pub base_level: i32,
    /// Raised or lowered areas.
    #[serde(default)]
    pub plateaus: Vec<Plateau>,
    /// Passages.
    #[serde(default)]
    pub chokes: Vec<Choke>,
}

impl GridTerrain {
    /// Create a flat map of the given size in tiles.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            base_level: 0,
            plateaus: Vec::new(),
            chokes: Vec::new(),
        }
    }

    /// Builder method to add a plateau.
    #[must_use]
    pub fn with_plateau(mut self, x: i32, y: i32, width: i32, height: i32, level: i32) -> Self {
        self.plateaus.push(Plateau {
            x,
            y,
            width,
            height,
            level,
        });
        self
    }

    /// Builder method to add a choke.
    #[must_use]
    pub fn with_choke(mut self, center: Position, width: i32) -> Self {
        self.chokes.push(Choke { center, width });
        self
    }

    fn in_bounds(&self, (tx, ty): (i32, i32)) -> bool {
        tx >= 0 && ty >= 0 && tx < self.width && ty < self.height
    }
}

impl TerrainQuery for GridTerrain {
    fn ground_height(&self, pos: Position) -> Option<i32> {
        let tile = pos.tile();
        if !self.in_bounds(tile) {
            return None;
        }

        let level = self
            .plateaus
            .iter()
            .rev()
            .find(|p| p.contains_tile(tile))
            .map_or(self.base_level, |p| p.level);
        Some(level)
    }

    fn narrowest_choke_between(&self, from: Position, to: Position) -> Option<i32> {
        self.chokes
            .iter()
            .filter(|choke| near_segment(choke.center, from, to, CHOKE_PATH_TOLERANCE))
            .map(|choke| choke.width)
            .min()
    }
}

/// Check whether `point` lies within `tolerance` pixels of segment `a`-`b`.
fn near_segment(point: Position, a: Position, b: Position, tolerance: i64) -> bool {
    let (abx, aby) = (i64::from(b.x - a.x), i64::from(b.y - a.y));
    let (apx, apy) = (i64::from(point.x - a.x), i64::from(point.y - a.y));
    let tolerance_sq = tolerance * tolerance;

    let len_sq = abx * abx + aby * aby;
    let dot = apx * abx + apy * aby;

    if len_sq == 0 || dot <= 0 {
        return point.distance_squared(a) <= tolerance_sq;
    }
    if dot >= len_sq {
        return point.distance_squared(b) <= tolerance_sq;
    }

    // Perpendicular distance² = cross² / len²
    let cross = i128::from(apx * aby - apy * abx);
    cross * cross <= i128::from(tolerance_sq) * i128::from(len_sq)
}
