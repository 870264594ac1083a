//! Shared combat vocabulary.
//!
//! Small plain-data enums used by the catalog, the snapshots and the engine.

use serde::{Deserialize, Serialize};

// ============================================================================
// Allegiance
// ============================================================================

/// Which roster a unit belongs to.
///
/// The friendly side is the bot's own army ("side A"); the enemy side is
/// everything it is considering fighting ("side B").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The bot's own units.
    Friendly,
    /// Opposing units.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Friendly => Self::Enemy,
            Self::Enemy => Self::Friendly,
        }
    }
}

// ============================================================================
// Combat Types
// ============================================================================

/// Damage type classification for weapons.
///
/// Concussive and explosive damage are scaled by the target's size; normal
/// damage is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DamageType {
    /// Full damage against every size.
    #[default]
    Normal,
    /// Strong against small targets, weak against large ones.
    Concussive,
    /// Strong against large targets, weak against small ones.
    Explosive,
}

/// Size class of a unit, which scales incoming concussive/explosive damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitSize {
    /// Infantry, zerglings, small flyers.
    #[default]
    Small,
    /// Vehicles such as vultures, hydralisks, corsairs.
    Medium,
    /// Tanks, capital ships, buildings.
    Large,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent_is_involution() {
        assert_eq!(Side::Friendly.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Friendly);
        assert_eq!(Side::Friendly.opponent().opponent(), Side::Friendly);
    }
}
