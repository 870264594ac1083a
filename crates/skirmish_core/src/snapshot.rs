//! Unit snapshots: the engine's view of one combatant.
//!
//! A [`UnitSnapshot`] is derived once from a [`UnitRecord`] by the
//! [`SnapshotBuilder`], which folds in researched upgrades, archetype
//! overrides, temporary buffs and terrain elevation. After that the engine
//! mutates it in place until the prediction is thrown away.

use serde::{Deserialize, Serialize};

use crate::combat::Vitality;
use crate::components::{DamageType, Side};
use crate::data::{Archetype, KiteRule, UnitCatalog, UnitType, WeaponData};
use crate::error::Result;
use crate::factions::Race;
use crate::math::{Dimensions, Fixed, Hp, Position};
use crate::terrain::TerrainQuery;
use crate::unit_kind::{UnitTraits, UnitTypeId};
use crate::upgrades::{UpgradeLookup, UpgradeType};

/// Cooldown used by a carrier that has no fighters left.
pub const EMPTY_CARRIER_COOLDOWN: u32 = 5;

// ============================================================================
// Input Record
// ============================================================================

/// What the caller knows about one unit, live or remembered.
///
/// Health and shields are in whole hit points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Unit type.
    pub unit_type: UnitTypeId,
    /// Owning side.
    pub side: Side,
    /// Last known position.
    pub position: Position,
    /// Last known health.
    pub health: u32,
    /// Last known shields.
    #[serde(default)]
    pub shields: u32,
    /// Whether construction has finished.
    #[serde(default = "default_true")]
    pub completed: bool,
    /// Frame construction is expected to finish, if still building.
    #[serde(default)]
    pub estimated_completion_frame: Option<u32>,
    /// Whether the unit is currently in sight.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether the unit was seen to leave its last known position.
    #[serde(default)]
    pub gone_from_last_position: bool,
    /// Whether the unit has power (protoss buildings).
    #[serde(default = "default_true")]
    pub powered: bool,
    /// Whether the unit is temporarily unable to fight.
    #[serde(default)]
    pub disabled: bool,
    /// Whether the unit has an attack order (matters for workers).
    #[serde(default)]
    pub attacking: bool,
    /// Whether the attack-speed buff is active.
    #[serde(default)]
    pub stimmed: bool,
    /// Active fighters, for carriers in sight.
    #[serde(default)]
    pub fighter_count: Option<u32>,
    /// Frames until the weapon is ready.
    #[serde(default)]
    pub weapon_cooldown: u32,
}

const fn default_true() -> bool {
    true
}

impl UnitRecord {
    /// Create a record for a visible, completed unit.
    #[must_use]
    pub fn new(unit_type: UnitTypeId, side: Side, position: Position, health: u32, shields: u32) -> Self {
        Self {
            unit_type,
            side,
            position,
            health,
            shields,
            completed: true,
            estimated_completion_frame: None,
            visible: true,
            gone_from_last_position: false,
            powered: true,
            disabled: false,
            attacking: false,
            stimmed: false,
            fighter_count: None,
            weapon_cooldown: 0,
        }
    }

    /// Builder method to mark the unit as out of sight.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Builder method to mark the unit as under construction.
    #[must_use]
    pub fn under_construction(mut self, estimated_completion_frame: u32) -> Self {
        self.completed = false;
        self.estimated_completion_frame = Some(estimated_completion_frame);
        self
    }

    /// Builder method to mark the unit as seen leaving its last position.
    #[must_use]
    pub fn gone(mut self) -> Self {
        self.gone_from_last_position = true;
        self
    }

    /// Builder method to set the attack order flag.
    #[must_use]
    pub fn attacking(mut self) -> Self {
        self.attacking = true;
        self
    }

    /// Builder method to activate the attack-speed buff.
    #[must_use]
    pub fn stimmed(mut self) -> Self {
        self.stimmed = true;
        self
    }

    /// Builder method to set the active fighter count.
    #[must_use]
    pub fn with_fighters(mut self, count: u32) -> Self {
        self.fighter_count = Some(count);
        self
    }

    /// Builder method to set the remaining weapon cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, frames: u32) -> Self {
        self.weapon_cooldown = frames;
        self
    }

    /// Check if the unit counts as finished at `frame`.
    #[must_use]
    pub fn is_complete_at(&self, frame: u32) -> bool {
        self.completed || self.estimated_completion_frame.is_some_and(|eta| eta < frame)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Effective stats of one weapon after upgrades and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Damage per hit.
    pub damage: Hp,
    /// Frames between hits.
    pub cooldown: u32,
    /// Maximum range in pixels.
    pub max_range: i32,
    /// Minimum range in pixels.
    pub min_range: i32,
    /// Damage type.
    pub damage_type: DamageType,
}

impl WeaponProfile {
    /// No weapon.
    pub const NONE: Self = Self {
        damage: Hp::ZERO,
        cooldown: 0,
        max_range: 0,
        min_range: 0,
        damage_type: DamageType::Normal,
    };

    /// Check if this weapon can hurt anything.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.damage > Hp::ZERO
    }
}

/// Units released into the dying unit's roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeathSpawn {
    /// Full-health unit to copy.
    pub template: Box<UnitSnapshot>,
    /// Number of copies.
    pub count: u32,
}

/// One combatant inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Sequence id, assigned when the unit joins a simulation.
    pub id: u32,
    /// Source unit type.
    pub unit_type: UnitTypeId,
    /// Owning side.
    pub side: Side,
    /// Owning race.
    pub race: Race,
    /// Classification flags.
    pub traits: UnitTraits,
    /// Current position.
    pub position: Position,
    /// Bounding box around the position.
    pub dimensions: Dimensions,
    /// Health, shields and armor.
    pub vitality: Vitality,
    /// Weapon against ground targets.
    pub ground: WeaponProfile,
    /// Weapon against air targets.
    pub air: WeaponProfile,
    /// Pixels per frame.
    pub speed: Fixed,
    /// Ground height tier, if known.
    pub elevation: Option<i32>,
    /// Frames until the weapon is ready.
    pub cooldown_remaining: u32,
    /// Kiting behaviour while reloading.
    pub kite: Option<KiteRule>,
    /// Set by a healer this frame.
    pub healed_this_frame: bool,
    /// Value for scoring.
    pub score: u32,
    /// Flat value added while alive.
    pub score_bonus: u32,
    /// Units released on death.
    pub death_spawn: Option<DeathSpawn>,
}

impl UnitSnapshot {
    /// Check for a trait flag.
    #[inline]
    #[must_use]
    pub const fn is(&self, traits: UnitTraits) -> bool {
        self.traits.contains(traits)
    }

    /// Check if the unit flies.
    #[must_use]
    pub const fn is_flyer(&self) -> bool {
        self.is(UnitTraits::FLYER)
    }

    /// Check if the unit is a structure.
    #[must_use]
    pub const fn is_building(&self) -> bool {
        self.is(UnitTraits::BUILDING)
    }

    /// Check if the unit can be healed.
    #[must_use]
    pub const fn is_organic(&self) -> bool {
        self.is(UnitTraits::ORGANIC)
    }

    /// Check if the unit destroys itself when attacking.
    #[must_use]
    pub const fn is_suicide(&self) -> bool {
        self.is(UnitTraits::SUICIDE)
    }

    /// Check if the unit heals instead of attacking.
    #[must_use]
    pub const fn is_healer(&self) -> bool {
        self.is(UnitTraits::HEALER)
    }

    /// Check if the unit is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.vitality.is_alive()
    }

    /// Check if the unit can attack anything at all.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.ground.is_armed() || self.air.is_armed()
    }

    /// Weapon this unit would use against `target`.
    #[must_use]
    pub fn weapon_against(&self, target: &Self) -> &WeaponProfile {
        if target.is_flyer() {
            &self.air
        } else {
            &self.ground
        }
    }

    /// Check if the kite rule allows backing off right now.
    #[must_use]
    pub fn may_kite(&self) -> bool {
        match self.kite {
            Some(KiteRule::Always) => true,
            Some(KiteRule::AfterFrames(frames)) => {
                self.cooldown_remaining <= self.ground.cooldown.saturating_sub(frames)
            }
            None => false,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Derives snapshots from records.
///
/// Holds the shared, read-only collaborators for one prediction.
pub struct SnapshotBuilder<'a> {
    catalog: &'a UnitCatalog,
    upgrades: &'a dyn UpgradeLookup,
    terrain: &'a dyn TerrainQuery,
}

impl<'a> SnapshotBuilder<'a> {
    /// Create a builder.
    #[must_use]
    pub fn new(
        catalog: &'a UnitCatalog,
        upgrades: &'a dyn UpgradeLookup,
        terrain: &'a dyn TerrainQuery,
    ) -> Self {
        Self {
            catalog,
            upgrades,
            terrain,
        }
    }

    /// Catalog used for type lookups.
    #[must_use]
    pub fn catalog(&self) -> &'a UnitCatalog {
        self.catalog
    }

    /// Build a snapshot from a record.
    ///
    /// Unknown upgrade levels fall back to base stats.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownUnitTypeId`](crate::error::SimError) if the
    /// record's type (or a type its archetype refers to) is not in the catalog.
    pub fn build(&self, record: &UnitRecord) -> Result<UnitSnapshot> {
        let unit_type = self.catalog.unit(record.unit_type)?;
        let mut snapshot = self.full_strength(unit_type, record.side, record.position)?;

        let multiplier = health_multiplier(unit_type);
        let vitality = &mut snapshot.vitality;
        vitality.health = whole_points(record.health.saturating_mul(multiplier)).min(vitality.max_health);
        vitality.shields = whole_points(record.shields).min(vitality.max_shields);

        if let Archetype::Carrier(rule) = unit_type.archetype {
            if record.visible {
                if let Some(fighters) = record.fighter_count {
                    if fighters == 0 {
                        snapshot.ground.damage = Hp::ZERO;
                        snapshot.ground.cooldown = EMPTY_CARRIER_COOLDOWN;
                    } else {
                        snapshot.ground.cooldown = rounded_div(rule.base_cooldown, fighters);
                    }
                    snapshot.air = snapshot.ground;
                }
            }
        }

        if record.stimmed {
            snapshot.ground.cooldown /= 2;
            snapshot.air.cooldown /= 2;
        }

        snapshot.cooldown_remaining = record.weapon_cooldown;
        snapshot.elevation = self.terrain.ground_height(record.position);

        tracing::trace!(
            unit = unit_type.name(),
            side = ?record.side,
            health = %snapshot.vitality.health,
            shields = %snapshot.vitality.shields,
            ground_damage = %snapshot.ground.damage,
            ground_cooldown = snapshot.ground.cooldown,
            "Snapshot built"
        );

        Ok(snapshot)
    }

    /// Full-health snapshot of a type at a position, with no elevation.
    fn full_strength(&self, unit_type: &UnitType, side: Side, position: Position) -> Result<UnitSnapshot> {
        let data = &unit_type.data;
        let level = |upgrade: Option<UpgradeType>| {
            upgrade.map_or(0, |u| self.upgrades.level_or_base(side, u))
        };

        let shield_armor = if data.shields > 0 {
            self.upgrades.level_or_base(side, UpgradeType::ProtossPlasmaShields)
        } else {
            0
        };
        let vitality = Vitality::new(whole_points(data.hit_points), whole_points(data.shields), data.size)
            .with_armor(
                whole_points(data.armor + u32::from(level(data.armor_upgrade))),
                whole_points(u32::from(shield_armor)),
            );

        let speed = match data.speed_upgrade {
            Some(upgrade) if level(Some(upgrade.upgrade)) > 0 => upgrade.top_speed,
            _ => data.top_speed,
        };

        let mut snapshot = UnitSnapshot {
            id: 0,
            unit_type: unit_type.id,
            side,
            race: data.race,
            traits: unit_type.traits,
            position,
            dimensions: data.dimensions,
            vitality,
            ground: self.profile(side, data.ground_weapon.as_ref()),
            air: self.profile(side, data.air_weapon.as_ref()),
            speed,
            elevation: None,
            cooldown_remaining: 0,
            kite: data.kite,
            healed_this_frame: false,
            score: data.score(),
            score_bonus: 0,
            death_spawn: None,
        };

        match unit_type.archetype {
            Archetype::Standard => {}
            Archetype::Carrier(rule) => {
                let fighter = self.catalog.unit(rule.fighter)?;
                let capacity = if self.upgrades.level_or_base(side, rule.capacity_upgrade) > 0 {
                    rule.upgraded_capacity
                } else {
                    rule.capacity
                };

                let mut weapon = self.profile(side, fighter.data.ground_weapon.as_ref());
                weapon.cooldown = rounded_div(rule.base_cooldown, capacity);
                weapon.max_range = rule.range;
                snapshot.ground = weapon;
                snapshot.air = weapon;
            }
            Archetype::Bunker(rule) => {
                let garrison_type = self.catalog.unit(rule.garrison)?;
                let garrison = self.full_strength(garrison_type, side, position)?;

                let mut weapon = garrison.ground;
                weapon.cooldown /= rule.cooldown_divisor;
                weapon.max_range += rule.range_bonus;
                snapshot.ground = weapon;
                snapshot.air = weapon;

                let vitality = &mut snapshot.vitality;
                vitality.max_health = vitality.max_health.saturating_mul_int(to_hp_int(rule.health_multiplier));
                vitality.health = vitality.max_health;

                snapshot.score_bonus = rule.count.saturating_mul(garrison.score);
                snapshot.death_spawn = Some(DeathSpawn {
                    template: Box::new(garrison),
                    count: rule.count,
                });
            }
            Archetype::ProjectileLauncher { projectile } => {
                let projectile = self.catalog.unit(projectile)?;
                let weapon = self.profile(side, projectile.data.ground_weapon.as_ref());
                snapshot.ground.damage = weapon.damage;
                snapshot.ground.damage_type = weapon.damage_type;
            }
        }

        Ok(snapshot)
    }

    /// Effective profile of a weapon for `side`.
    fn profile(&self, side: Side, weapon: Option<&WeaponData>) -> WeaponProfile {
        let Some(weapon) = weapon else {
            return WeaponProfile::NONE;
        };
        let researched = |upgrade: UpgradeType| self.upgrades.level_or_base(side, upgrade);

        let damage_level = weapon.upgrade.map_or(0, researched);
        let damage = weapon.damage + weapon.damage_bonus * u32::from(damage_level);

        let base_cooldown = match weapon.cooldown_upgrade {
            Some(upgrade) if researched(upgrade.upgrade) > 0 => upgrade.cooldown,
            _ => weapon.cooldown,
        };
        let range_bonus = match weapon.range_upgrade {
            Some(upgrade) if researched(upgrade.upgrade) > 0 => upgrade.bonus,
            _ => 0,
        };

        WeaponProfile {
            damage: whole_points(damage),
            cooldown: base_cooldown / (weapon.damage_factor * weapon.max_hits),
            max_range: weapon.max_range + range_bonus,
            min_range: weapon.min_range,
            damage_type: weapon.damage_type,
        }
    }
}

fn health_multiplier(unit_type: &UnitType) -> u32 {
    match unit_type.archetype {
        Archetype::Bunker(rule) => rule.health_multiplier,
        _ => 1,
    }
}

/// Whole hit points to fixed point, saturating on absurd inputs.
fn whole_points(points: u32) -> Hp {
    Hp::saturating_from_num(points)
}

fn to_hp_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// `numerator / denominator` rounded to the nearest integer.
fn rounded_div(numerator: u32, denominator: u32) -> u32 {
    (numerator + denominator / 2) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{FlatTerrain, GridTerrain};
    use crate::upgrades::{KnownUpgrades, NoUpgrades};

    fn catalog() -> UnitCatalog {
        UnitCatalog::builtin().unwrap()
    }

    fn record(catalog: &UnitCatalog, name: &str, side: Side) -> UnitRecord {
        let unit = catalog.find(name).unwrap();
        UnitRecord::new(
            unit.id,
            side,
            Position::new(100, 100),
            unit.data.hit_points,
            unit.data.shields,
        )
    }

    #[test]
    fn test_marine_base_stats() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let marine = builder.build(&record(&catalog, "terran_marine", Side::Friendly)).unwrap();

        assert_eq!(marine.vitality.health, Hp::from_num(40));
        assert_eq!(marine.vitality.health.to_bits(), 40 << 8);
        assert_eq!(marine.ground.damage, Hp::from_num(6));
        assert_eq!(marine.ground.cooldown, 15);
        assert_eq!(marine.ground.max_range, 128);
        assert_eq!(marine.air, marine.ground);
        assert_eq!(marine.score, 100);
        assert_eq!(marine.elevation, Some(0));
        assert!(marine.is_organic());
    }

    #[test]
    fn test_upgrades_apply_per_side() {
        let catalog = catalog();
        let upgrades = KnownUpgrades::new()
            .with(Side::Enemy, UpgradeType::TerranInfantryWeapons, 2)
            .with(Side::Enemy, UpgradeType::TerranInfantryArmor, 1)
            .with(Side::Enemy, UpgradeType::U238Shells, 1);
        let builder = SnapshotBuilder::new(&catalog, &upgrades, &FlatTerrain);

        let theirs = builder.build(&record(&catalog, "terran_marine", Side::Enemy)).unwrap();
        assert_eq!(theirs.ground.damage, Hp::from_num(8));
        assert_eq!(theirs.ground.max_range, 160);
        assert_eq!(theirs.vitality.armor, Hp::from_num(1));

        let ours = builder.build(&record(&catalog, "terran_marine", Side::Friendly)).unwrap();
        assert_eq!(ours.ground.damage, Hp::from_num(6));
        assert_eq!(ours.ground.max_range, 128);
    }

    #[test]
    fn test_damage_factor_divides_cooldown() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let zealot = builder.build(&record(&catalog, "protoss_zealot", Side::Enemy)).unwrap();

        assert_eq!(zealot.ground.damage, Hp::from_num(8));
        assert_eq!(zealot.ground.cooldown, 11);
        assert!(!zealot.air.is_armed());
    }

    #[test]
    fn test_speed_and_cooldown_research() {
        let catalog = catalog();
        let upgrades = KnownUpgrades::new()
            .with(Side::Enemy, UpgradeType::MetabolicBoost, 1)
            .with(Side::Enemy, UpgradeType::AdrenalGlands, 1);
        let builder = SnapshotBuilder::new(&catalog, &upgrades, &FlatTerrain);
        let ling = builder.build(&record(&catalog, "zerg_zergling", Side::Enemy)).unwrap();

        assert_eq!(ling.speed, Fixed::from_num(8.23));
        assert_eq!(ling.ground.cooldown, 6);
    }

    #[test]
    fn test_stim_halves_cooldowns() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let marine = builder
            .build(&record(&catalog, "terran_marine", Side::Friendly).stimmed())
            .unwrap();
        assert_eq!(marine.ground.cooldown, 7);
        assert_eq!(marine.air.cooldown, 7);
    }

    #[test]
    fn test_plasma_shields_only_for_shielded_units() {
        let catalog = catalog();
        let upgrades = KnownUpgrades::new().with(Side::Enemy, UpgradeType::ProtossPlasmaShields, 2);
        let builder = SnapshotBuilder::new(&catalog, &upgrades, &FlatTerrain);

        let dragoon = builder.build(&record(&catalog, "protoss_dragoon", Side::Enemy)).unwrap();
        assert_eq!(dragoon.vitality.shield_armor, Hp::from_num(2));
    }

    #[test]
    fn test_bunker_override() {
        let catalog = catalog();
        let upgrades = KnownUpgrades::new().with(Side::Enemy, UpgradeType::U238Shells, 1);
        let builder = SnapshotBuilder::new(&catalog, &upgrades, &FlatTerrain);
        let bunker = builder.build(&record(&catalog, "terran_bunker", Side::Enemy)).unwrap();

        assert_eq!(bunker.vitality.max_health, Hp::from_num(700));
        assert_eq!(bunker.vitality.health, Hp::from_num(700));
        assert_eq!(bunker.ground.damage, Hp::from_num(6));
        assert_eq!(bunker.ground.cooldown, 3);
        assert_eq!(bunker.ground.max_range, 128 + 32 + 32);
        assert_eq!(bunker.air, bunker.ground);
        assert_eq!(bunker.score_bonus, 400);

        let spawn = bunker.death_spawn.as_ref().unwrap();
        assert_eq!(spawn.count, 4);
        assert_eq!(spawn.template.unit_type, catalog.id_of("terran_marine").unwrap());
        assert_eq!(spawn.template.vitality.health, Hp::from_num(40));
    }

    #[test]
    fn test_damaged_bunker_health_is_doubled() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let mut bunker_record = record(&catalog, "terran_bunker", Side::Enemy);
        bunker_record.health = 100;
        let bunker = builder.build(&bunker_record).unwrap();
        assert_eq!(bunker.vitality.health, Hp::from_num(200));
    }

    #[test]
    fn test_carrier_cooldown_from_capacity() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let hidden = builder
            .build(&record(&catalog, "protoss_carrier", Side::Enemy).hidden())
            .unwrap();
        assert_eq!(hidden.ground.cooldown, 9);
        assert_eq!(hidden.ground.damage, Hp::from_num(6));
        assert_eq!(hidden.ground.max_range, 256);
        assert_eq!(hidden.air, hidden.ground);

        let upgrades = KnownUpgrades::new().with(Side::Enemy, UpgradeType::CarrierCapacity, 1);
        let builder = SnapshotBuilder::new(&catalog, &upgrades, &FlatTerrain);
        let upgraded = builder
            .build(&record(&catalog, "protoss_carrier", Side::Enemy).hidden())
            .unwrap();
        assert_eq!(upgraded.ground.cooldown, 5);
    }

    #[test]
    fn test_carrier_cooldown_from_visible_fighters() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);

        let three = builder
            .build(&record(&catalog, "protoss_carrier", Side::Enemy).with_fighters(3))
            .unwrap();
        assert_eq!(three.ground.cooldown, 12);

        let empty = builder
            .build(&record(&catalog, "protoss_carrier", Side::Enemy).with_fighters(0))
            .unwrap();
        assert_eq!(empty.ground.damage, Hp::ZERO);
        assert_eq!(empty.ground.cooldown, EMPTY_CARRIER_COOLDOWN);
        assert!(!empty.is_armed());
    }

    #[test]
    fn test_reaver_uses_projectile_damage() {
        let catalog = catalog();
        let upgrades = KnownUpgrades::new().with(Side::Enemy, UpgradeType::ScarabDamage, 1);
        let builder = SnapshotBuilder::new(&catalog, &upgrades, &FlatTerrain);
        let reaver = builder.build(&record(&catalog, "protoss_reaver", Side::Enemy)).unwrap();

        assert_eq!(reaver.ground.damage, Hp::from_num(125));
        assert_eq!(reaver.ground.cooldown, 60);
        assert_eq!(reaver.ground.max_range, 256);
    }

    #[test]
    fn test_static_defense_score_override() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let cannon = builder
            .build(&record(&catalog, "protoss_photon_cannon", Side::Enemy))
            .unwrap();
        assert_eq!(cannon.score, 750);
        let sunken = builder
            .build(&record(&catalog, "zerg_sunken_colony", Side::Enemy))
            .unwrap();
        assert_eq!(sunken.score, 1000);
    }

    #[test]
    fn test_elevation_from_terrain() {
        let catalog = catalog();
        let terrain = GridTerrain::new(16, 16).with_plateau(0, 0, 8, 8, 2);
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &terrain);

        let high = builder.build(&record(&catalog, "terran_marine", Side::Enemy)).unwrap();
        assert_eq!(high.elevation, Some(2));

        let mut off_map = record(&catalog, "terran_marine", Side::Enemy);
        off_map.position = Position::new(-50, 10);
        let unknown = builder.build(&off_map).unwrap();
        assert_eq!(unknown.elevation, None);
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let bogus = UnitRecord::new(UnitTypeId::new(9999), Side::Enemy, Position::ORIGIN, 10, 0);
        assert!(builder.build(&bogus).is_err());
    }

    #[test]
    fn test_dragoon_kite_window() {
        let catalog = catalog();
        let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
        let mut dragoon = builder.build(&record(&catalog, "protoss_dragoon", Side::Friendly)).unwrap();

        dragoon.cooldown_remaining = 25;
        assert!(!dragoon.may_kite());
        dragoon.cooldown_remaining = 21;
        assert!(dragoon.may_kite());

        let marine = builder.build(&record(&catalog, "terran_marine", Side::Friendly)).unwrap();
        assert!(!marine.may_kite());
    }

    #[test]
    fn test_record_completion() {
        let record = UnitRecord::new(UnitTypeId::new(0), Side::Enemy, Position::ORIGIN, 10, 0)
            .under_construction(500);
        assert!(!record.is_complete_at(400));
        assert!(!record.is_complete_at(500));
        assert!(record.is_complete_at(501));
    }
}
