//! Fixed-point math and map geometry for deterministic simulation.
//!
//! Vitality (health, shields, armor) uses an 8-fractional-bit fixed-point
//! type so that sub-point damage accumulates exactly; movement speeds use a
//! wider 32.32 type. Floating-point never enters the frame loop.

use fixed::types::{I24F8, I32F32};
use serde::{Deserialize, Serialize};

/// Fixed-point number type for speeds and interpolation factors.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Fixed-point type for health, shields and armor.
///
/// One game hit point is `1 << 8` raw units, which is the granularity the
/// damage floor and regeneration trickles are expressed in.
pub type Hp = I24F8;

/// Serde support for speeds written as decimals in data files.
///
/// Data files read `top_speed: 4.92`; the value is converted to [`Fixed`]
/// once at load time so no floating point survives into the simulation.
pub mod decimal_fixed_serde {
    use super::Fixed;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| de::Error::custom(format!("{value} does not fit a fixed-point speed")))
    }
}

/// Pixel position on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in pixels.
    pub x: i32,
    /// Y coordinate in pixels.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Map origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Tile coordinate (32 pixels per tile) containing this position.
    #[must_use]
    pub const fn tile(self) -> (i32, i32) {
        (self.x.div_euclid(32), self.y.div_euclid(32))
    }

    /// Squared euclidean distance, widened to avoid overflow.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    /// Integer approximate distance to another position.
    ///
    /// Octagonal approximation of euclidean distance used by the host game
    /// for all range checks.
    #[must_use]
    pub fn approx_distance(self, other: Self) -> i32 {
        approx_distance(self.x - other.x, self.y - other.y)
    }

    /// Move `speed` pixels toward `target`, truncating toward zero.
    ///
    /// Returns `self` unchanged when the positions coincide.
    #[must_use]
    pub fn step_toward(self, target: Self, speed: Fixed) -> Self {
        let (sx, sy) = step_components(target.x - self.x, target.y - self.y, speed);
        Self::new(self.x + sx, self.y + sy)
    }

    /// Move `speed` pixels directly away from `threat`, truncating toward zero.
    #[must_use]
    pub fn step_away(self, threat: Self, speed: Fixed) -> Self {
        let (sx, sy) = step_components(threat.x - self.x, threat.y - self.y, speed);
        Self::new(self.x - sx, self.y - sy)
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Unit bounding-box extents around its center, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Pixels left of center.
    pub left: i32,
    /// Pixels above center.
    pub up: i32,
    /// Pixels right of center.
    pub right: i32,
    /// Pixels below center.
    pub down: i32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(left: i32, up: i32, right: i32, down: i32) -> Self {
        Self {
            left,
            up,
            right,
            down,
        }
    }
}

/// Integer approximate length of the vector `(dx, dy)`.
#[must_use]
pub fn approx_distance(dx: i32, dy: i32) -> i32 {
    let mut min = dx.unsigned_abs();
    let mut max = dy.unsigned_abs();
    if max < min {
        std::mem::swap(&mut min, &mut max);
    }

    if min < (max >> 2) {
        return max as i32;
    }

    let min_calc = (3 * min) >> 3;
    ((min_calc >> 5) + min_calc + max - (max >> 4) - (max >> 6)) as i32
}

/// Gap between two unit bounding boxes, as an approximate distance.
///
/// Touching or overlapping boxes are at distance zero.
#[must_use]
pub fn edge_to_edge_distance(
    first_dims: Dimensions,
    first_center: Position,
    second_dims: Dimensions,
    second_center: Position,
) -> i32 {
    let first_left = first_center.x - first_dims.left;
    let first_top = first_center.y - first_dims.up;
    let first_right = first_center.x + first_dims.right;
    let first_bottom = first_center.y + first_dims.down;

    let second_left = second_center.x - second_dims.left;
    let second_top = second_center.y - second_dims.up;
    let second_right = second_center.x + second_dims.right;
    let second_bottom = second_center.y + second_dims.down;

    let x_gap = (first_left - second_right - 1)
        .max(second_left - first_right - 1)
        .max(0);
    let y_gap = (first_top - second_bottom - 1)
        .max(second_top - first_bottom - 1)
        .max(0);

    approx_distance(x_gap, y_gap)
}

/// Per-axis displacement of a `speed`-long step along `(dx, dy)`.
///
/// Each axis is `trunc(d * speed / |(dx, dy)|)`, so a step never carries a
/// unit further than `speed` pixels.
fn step_components(dx: i32, dy: i32, speed: Fixed) -> (i32, i32) {
    if dx == 0 && dy == 0 {
        return (0, 0);
    }

    let len_sq = i64::from(dx) * i64::from(dx) + i64::from(dy) * i64::from(dy);
    let len = fixed_sqrt_i64(len_sq);
    let sx = (Fixed::from_num(dx) * speed / len).round_to_zero().to_num::<i32>();
    let sy = (Fixed::from_num(dy) * speed / len).round_to_zero().to_num::<i32>();
    (sx, sy)
}

/// Square root of a non-negative integer as a fixed-point number.
fn fixed_sqrt_i64(value: i64) -> Fixed {
    if value <= 0 {
        return Fixed::ZERO;
    }
    fixed_sqrt(Fixed::from_num(value))
}

/// Computes the square root of a fixed-point number using binary search.
///
/// Works on the raw bits so perfect squares come out exact.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    // sqrt(bits / 2^32) * 2^32 == sqrt(bits << 32)
    let radicand = u128::from(value.to_bits().unsigned_abs()) << 32;
    let mut root: u128 = 0;
    let mut bit: u128 = 1 << 48;
    while bit > 0 {
        let candidate = root | bit;
        if candidate * candidate <= radicand {
            root = candidate;
        }
        bit >>= 1;
    }

    Fixed::from_bits(root as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_distance_axis_aligned() {
        assert_eq!(approx_distance(0, 0), 0);
        assert_eq!(approx_distance(100, 0), 100);
        assert_eq!(approx_distance(0, -64), 64);
        // Small minor axis is ignored entirely
        assert_eq!(approx_distance(100, 20), 100);
    }

    #[test]
    fn test_approx_distance_diagonal() {
        // Euclidean would be 141; the octagonal approximation lands close
        let d = approx_distance(100, 100);
        assert!((130..=145).contains(&d), "got {d}");
        assert_eq!(approx_distance(100, 100), approx_distance(-100, 100));
    }

    #[test]
    fn test_edge_to_edge_touching_is_zero() {
        let dims = Dimensions::new(8, 9, 8, 10);
        let a = Position::new(100, 100);
        let b = Position::new(117, 100);
        assert_eq!(edge_to_edge_distance(dims, a, dims, b), 0);
    }

    #[test]
    fn test_edge_to_edge_gap() {
        let dims = Dimensions::new(8, 9, 8, 10);
        let a = Position::new(100, 100);
        let b = Position::new(200, 100);
        // 200 - 8 - (100 + 8) - 1 = 83
        assert_eq!(edge_to_edge_distance(dims, a, dims, b), 83);
    }

    #[test]
    fn test_step_toward_axis() {
        let from = Position::new(0, 0);
        let to = Position::new(100, 0);
        let stepped = from.step_toward(to, Fixed::from_num(4));
        assert_eq!(stepped, Position::new(4, 0));
    }

    #[test]
    fn test_step_truncates_toward_zero() {
        let from = Position::new(0, 0);
        let to = Position::new(-30, -40);
        // Direction (-0.6, -0.8) scaled by 5 → (-3, -4)
        let stepped = from.step_toward(to, Fixed::from_num(5));
        assert_eq!(stepped, Position::new(-3, -4));

        // Fractional speeds never overshoot a whole pixel
        let stepped = from.step_toward(Position::new(-100, 0), Fixed::from_num(2.9));
        assert_eq!(stepped, Position::new(-2, 0));
    }

    #[test]
    fn test_step_away_mirrors_step_toward() {
        let from = Position::new(50, 50);
        let threat = Position::new(50, 100);
        let stepped = from.step_away(threat, Fixed::from_num(6));
        assert_eq!(stepped, Position::new(50, 44));
    }

    #[test]
    fn test_step_coincident_is_noop() {
        let p = Position::new(7, 7);
        assert_eq!(p.step_toward(p, Fixed::from_num(10)), p);
    }

    #[test]
    fn test_hp_fixed_point_layout() {
        // One hit point is 256 raw units
        assert_eq!(Hp::from_num(1).to_bits(), 256);
        assert_eq!(Hp::from_bits(128), Hp::from_num(0.5));
    }

    #[test]
    fn test_fixed_sqrt() {
        assert_eq!(fixed_sqrt(Fixed::from_num(2500)), Fixed::from_num(50));
        assert_eq!(fixed_sqrt(Fixed::from_num(0.25)), Fixed::from_num(0.5));
        assert_eq!(fixed_sqrt(Fixed::ZERO), Fixed::ZERO);

        let root2 = fixed_sqrt(Fixed::from_num(2));
        let err = (root2 * root2 - Fixed::from_num(2)).abs();
        assert!(err < Fixed::from_num(0.0001), "got {root2}");
    }

    #[test]
    fn test_tile_of_position() {
        assert_eq!(Position::new(64, 95).tile(), (2, 2));
        assert_eq!(Position::new(0, 31).tile(), (0, 0));
    }
}
