//! Race definitions and race-level mechanics.

use serde::{Deserialize, Serialize};

use crate::math::Hp;

/// Playable race a unit type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    /// Terran - no passive regeneration in combat.
    Terran,
    /// Protoss - shields recharge over time.
    Protoss,
    /// Zerg - health regenerates over time.
    Zerg,
}

impl Race {
    /// Get the display name for this race.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Terran => "Terran",
            Self::Protoss => "Protoss",
            Self::Zerg => "Zerg",
        }
    }

    /// Passive per-frame health regeneration.
    #[must_use]
    pub const fn health_regen(&self) -> Hp {
        match self {
            Self::Zerg => Hp::from_bits(4),
            Self::Terran | Self::Protoss => Hp::ZERO,
        }
    }

    /// Passive per-frame shield regeneration.
    #[must_use]
    pub const fn shield_regen(&self) -> Hp {
        match self {
            Self::Protoss => Hp::from_bits(7),
            Self::Terran | Self::Zerg => Hp::ZERO,
        }
    }
}
