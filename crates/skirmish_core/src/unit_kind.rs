//! Unit type identity and classification flags.
//!
//! - [`UnitTypeId`]: Numeric ID for fast, deterministic runtime use
//! - [`UnitTraits`]: Bitflags for fast classification queries
//!
//! Both are assigned when the [`UnitCatalog`](crate::data::UnitCatalog) is
//! loaded; the simulation never touches unit type names.

use serde::{Deserialize, Serialize};

/// Numeric identifier for a unit type.
///
/// This is the identity used everywhere at runtime:
/// - Cheap: `Copy`, 2 bytes
/// - Deterministic: index into the catalog, derived from file order
/// - Fast: array indexing for lookups, no hashing needed
///
/// # Example
///
/// ```
/// use skirmish_core::unit_kind::UnitTypeId;
///
/// let id = UnitTypeId::new(42);
/// assert_eq!(id.as_u16(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct UnitTypeId(u16);

impl UnitTypeId {
    /// Sentinel value indicating no unit type.
    pub const NONE: Self = Self(u16::MAX);

    /// Create a new unit type ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Check if this is a valid ID (not NONE).
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u16::MAX
    }
}

/// Bitflags for fast unit classification queries.
///
/// Computed from the RON `tags` array at load time, then cached per type.
///
/// # Example
///
/// ```
/// use skirmish_core::unit_kind::UnitTraits;
///
/// let traits = UnitTraits::FLYER.union(UnitTraits::ORGANIC);
/// assert!(traits.contains(UnitTraits::ORGANIC));
/// assert!(!traits.contains(UnitTraits::BUILDING));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnitTraits(u32);

impl UnitTraits {
    /// Unit flies; only air weapons can hit it.
    pub const FLYER: Self = Self(1 << 0);
    /// Structure; counted in the buildings-only score.
    pub const BUILDING: Self = Self(1 << 1);
    /// Biological; can be healed by medics.
    pub const ORGANIC: Self = Self(1 << 2);
    /// Resource gatherer; only fights when ordered to.
    pub const WORKER: Self = Self(1 << 3);
    /// Destroys itself when it attacks.
    pub const SUICIDE: Self = Self(1 << 4);
    /// Heals organic allies instead of attacking.
    pub const HEALER: Self = Self(1 << 5);
    /// Fast melee unit that the simulation overrates in large numbers.
    pub const SWARM: Self = Self(1 << 6);
    /// Launched by a carrier; never simulated on its own.
    pub const FIGHTER: Self = Self(1 << 7);

    /// Empty trait set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine two trait sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Get raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build trait flags from RON tags.
    ///
    /// Called once at load time for each unit type. Unknown tags are
    /// ignored so data files can carry annotations for other tools.
    #[must_use]
    pub fn from_tags(tags: &[String]) -> Self {
        tags.iter().fold(Self::empty(), |traits, tag| {
            let flag = match tag.as_str() {
                "flyer" => Self::FLYER,
                "building" => Self::BUILDING,
                "organic" => Self::ORGANIC,
                "worker" => Self::WORKER,
                "suicide" => Self::SUICIDE,
                "healer" => Self::HEALER,
                "swarm" => Self::SWARM,
                "fighter" => Self::FIGHTER,
                _ => Self::empty(),
            };
            traits.union(flag)
        })
    }
}

impl std::ops::BitOr for UnitTraits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for UnitTraits {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}
