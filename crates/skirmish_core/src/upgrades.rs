//! Researched-upgrade lookups.
//!
//! Snapshot construction asks an [`UpgradeLookup`] for the level of each
//! upgrade that affects a unit. Levels the caller does not know (an enemy
//! that has not been scouted) come back as `None` and the unit is built
//! with base stats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::Side;

/// Every upgrade or research that changes a simulated stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeType {
    // ========================================
    // Terran
    // ========================================
    /// Infantry weapon damage.
    TerranInfantryWeapons,
    /// Infantry armor.
    TerranInfantryArmor,
    /// Vehicle weapon damage.
    TerranVehicleWeapons,
    /// Vehicle armor.
    TerranVehiclePlating,
    /// Ship weapon damage.
    TerranShipWeapons,
    /// Ship armor.
    TerranShipPlating,
    /// Marine range.
    U238Shells,
    /// Vulture speed.
    IonThrusters,
    /// Goliath air range.
    CharonBoosters,

    // ========================================
    // Protoss
    // ========================================
    /// Ground weapon damage.
    ProtossGroundWeapons,
    /// Ground armor.
    ProtossGroundArmor,
    /// Air weapon damage (also interceptors).
    ProtossAirWeapons,
    /// Air armor.
    ProtossAirArmor,
    /// Shield armor for every shielded unit.
    ProtossPlasmaShields,
    /// Dragoon range.
    SingularityCharge,
    /// Zealot speed.
    LegEnhancements,
    /// Scarab damage.
    ScarabDamage,
    /// Carrier interceptor capacity.
    CarrierCapacity,
    /// Scout speed.
    GraviticThrusters,

    // ========================================
    // Zerg
    // ========================================
    /// Melee attack damage.
    ZergMeleeAttacks,
    /// Ranged ground attack damage.
    ZergMissileAttacks,
    /// Ground armor.
    ZergCarapace,
    /// Flyer attack damage.
    ZergFlyerAttacks,
    /// Flyer armor.
    ZergFlyerCarapace,
    /// Zergling speed.
    MetabolicBoost,
    /// Zergling attack speed.
    AdrenalGlands,
    /// Hydralisk range.
    GroovedSpines,
    /// Hydralisk speed.
    MuscularAugments,
    /// Ultralisk speed.
    AnabolicSynthesis,
}

/// Source of researched-upgrade levels.
///
/// Implementations are pure queries: calling them must not change any
/// state. They are shared across predictions, hence `Send + Sync`.
pub trait UpgradeLookup: Send + Sync {
    /// Researched level of `upgrade` for `side`, or `None` if unknown.
    fn upgrade_level(&self, side: Side, upgrade: UpgradeType) -> Option<u8>;

    /// Researched level, treating unknown as unresearched.
    fn level_or_base(&self, side: Side, upgrade: UpgradeType) -> u8 {
        self.upgrade_level(side, upgrade).unwrap_or(0)
    }
}

/// Lookup that knows nothing; every unit gets base stats.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUpgrades;

impl UpgradeLookup for NoUpgrades {
    fn upgrade_level(&self, _side: Side, _upgrade: UpgradeType) -> Option<u8> {
        None
    }
}

/// Upgrade levels known per side.
///
/// Enemy knowledge only ever ratchets upward through [`observe`]: once a
/// level has been seen, a later glimpse of a unit that does not show it
/// does not erase it.
///
/// [`observe`]: KnownUpgrades::observe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownUpgrades {
    /// Levels for the friendly side.
    #[serde(default)]
    pub friendly: BTreeMap<UpgradeType, u8>,
    /// Levels for the enemy side.
    #[serde(default)]
    pub enemy: BTreeMap<UpgradeType, u8>,
}

impl KnownUpgrades {
    /// Create an empty set of known upgrades.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a level outright.
    pub fn set(&mut self, side: Side, upgrade: UpgradeType, level: u8) {
        self.levels_mut(side).insert(upgrade, level);
    }

    /// Record an observed level, keeping the highest level ever seen.
    pub fn observe(&mut self, side: Side, upgrade: UpgradeType, level: u8) {
        let entry = self.levels_mut(side).entry(upgrade).or_insert(level);
        *entry = (*entry).max(level);
    }

    /// Builder method to set a level.
    #[must_use]
    pub fn with(mut self, side: Side, upgrade: UpgradeType, level: u8) -> Self {
        self.set(side, upgrade, level);
        self
    }

    fn levels(&self, side: Side) -> &BTreeMap<UpgradeType, u8> {
        match side {
            Side::Friendly => &self.friendly,
            Side::Enemy => &self.enemy,
        }
    }

    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<UpgradeType, u8> {
        match side {
            Side::Friendly => &mut self.friendly,
            Side::Enemy => &mut self.enemy,
        }
    }
}

impl UpgradeLookup for KnownUpgrades {
    fn upgrade_level(&self, side: Side, upgrade: UpgradeType) -> Option<u8> {
        self.levels(side).get(&upgrade).copied()
    }
}
