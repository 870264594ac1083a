//! Unit data structures for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use crate::components::{DamageType, UnitSize};
use crate::factions::Race;
use crate::math::{decimal_fixed_serde, Dimensions, Fixed};
use crate::upgrades::UpgradeType;

/// Weapon range bonus unlocked by an upgrade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RangeUpgrade {
    /// Upgrade that grants the bonus.
    pub upgrade: UpgradeType,
    /// Extra range in pixels once researched.
    pub bonus: i32,
}

/// Replacement cooldown unlocked by an upgrade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CooldownUpgrade {
    /// Upgrade that grants the faster attack.
    pub upgrade: UpgradeType,
    /// Cooldown in frames once researched.
    pub cooldown: u32,
}

/// Replacement top speed unlocked by an upgrade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeedUpgrade {
    /// Upgrade that grants the speed.
    pub upgrade: UpgradeType,
    /// Top speed in pixels per frame once researched.
    #[serde(with = "decimal_fixed_serde")]
    pub top_speed: Fixed,
}

/// One weapon of a unit type.
///
/// # Example RON
///
/// ```ron
/// WeaponData(
///     name: "Gauss Rifle",
///     damage: 6,
///     damage_bonus: 1,
///     cooldown: 15,
///     max_range: 128,
///     upgrade: Some(TerranInfantryWeapons),
///     range_upgrade: Some(RangeUpgrade(upgrade: U238Shells, bonus: 32)),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeaponData {
    /// Weapon name, for reports.
    pub name: String,

    /// Base damage per hit.
    pub damage: u32,

    /// Extra damage per level of `upgrade`.
    #[serde(default)]
    pub damage_bonus: u32,

    /// Number of projectiles per hit (zealot blades, goliath missiles).
    #[serde(default = "default_one")]
    pub damage_factor: u32,

    /// Maximum hits per attack.
    #[serde(default = "default_one")]
    pub max_hits: u32,

    /// Frames between attacks.
    pub cooldown: u32,

    /// Maximum range in pixels.
    pub max_range: i32,

    /// Minimum range in pixels.
    #[serde(default)]
    pub min_range: i32,

    /// Damage type.
    #[serde(default)]
    pub damage_type: DamageType,

    /// Upgrade that scales `damage_bonus`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradeType>,

    /// Range research, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_upgrade: Option<RangeUpgrade>,

    /// Attack-speed research, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_upgrade: Option<CooldownUpgrade>,
}

/// Default damage factor and hit count.
const fn default_one() -> u32 {
    1
}

/// When a ranged unit may back away while its weapon reloads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KiteRule {
    /// Kites for the whole cooldown.
    Always,
    /// Kites once this many frames of the cooldown have passed.
    AfterFrames(u32),
}

/// Per-type construction override, by unit type name.
///
/// Names are resolved to ids when the catalog is built; see
/// [`Archetype`](super::Archetype) for the resolved form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ArchetypeData {
    /// Stats come straight from the unit's own weapons.
    #[default]
    Standard,
    /// Fights through launched fighters.
    Carrier {
        /// Fighter unit type whose weapon is used.
        fighter: String,
        /// Frames of fighter cycling shared across all fighters.
        base_cooldown: u32,
        /// Fighters carried without the capacity upgrade.
        capacity: u32,
        /// Fighters carried with the capacity upgrade.
        upgraded_capacity: u32,
        /// Upgrade raising capacity.
        capacity_upgrade: UpgradeType,
        /// Leash range in pixels.
        range: i32,
    },
    /// Fights through a garrison that escapes when it dies.
    Bunker {
        /// Garrison unit type.
        garrison: String,
        /// Number of garrison units.
        count: u32,
        /// Range added to the garrison weapon.
        range_bonus: i32,
        /// Garrison cooldown is divided by this.
        cooldown_divisor: u32,
        /// Health multiplier to account for repair.
        health_multiplier: u32,
    },
    /// Ground damage comes from a launched projectile unit's weapon.
    ProjectileLauncher {
        /// Projectile unit type.
        projectile: String,
    },
}

/// Friendly units left out of remembered-mode predictions for every enemy
/// of the owning type, by unit type name.
///
/// Corrects matchups the engine gets badly wrong, such as mutalisks
/// against spore colonies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountData {
    /// Friendly unit type to leave out.
    pub unit: String,
    /// Units left out per enemy.
    pub count: u32,
}

/// Data-driven unit type definition.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     name: "terran_marine",
///     race: Terran,
///     size: Small,
///     hit_points: 40,
///     armor_upgrade: Some(TerranInfantryArmor),
///     top_speed: 4.0,
///     dimensions: (left: 8, up: 9, right: 8, down: 10),
///     destroy_score: 100,
///     ground_weapon: Some(WeaponData(name: "Gauss Rifle", damage: 6, cooldown: 15, max_range: 128)),
///     tags: ["organic"],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitData {
    /// Unique string identifier for this unit type.
    pub name: String,

    /// Owning race.
    pub race: Race,

    /// Size class.
    #[serde(default)]
    pub size: UnitSize,

    /// Maximum hit points.
    pub hit_points: u32,

    /// Maximum shields.
    #[serde(default)]
    pub shields: u32,

    /// Base armor.
    #[serde(default)]
    pub armor: u32,

    /// Upgrade adding one armor per level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor_upgrade: Option<UpgradeType>,

    /// Base top speed in pixels per frame.
    #[serde(with = "decimal_fixed_serde")]
    pub top_speed: Fixed,

    /// Speed research, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_upgrade: Option<SpeedUpgrade>,

    /// Bounding box around the unit's center.
    pub dimensions: Dimensions,

    /// Value awarded for destroying one unit of this type.
    pub destroy_score: u32,

    /// Value used instead of `destroy_score` when scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_override: Option<u32>,

    /// Weapon used against ground targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_weapon: Option<WeaponData>,

    /// Weapon used against air targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_weapon: Option<WeaponData>,

    /// Kiting behaviour while reloading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kite: Option<KiteRule>,

    /// Construction override.
    #[serde(default)]
    pub archetype: ArchetypeData,

    /// Friendly units this type cancels out in remembered mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountData>,

    /// Tags for classification (e.g., "flyer", "organic", "building").
    #[serde(default)]
    pub tags: Vec<String>,
}

impl UnitData {
    /// Check if this unit has the specified tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Value used for scoring.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score_override.unwrap_or(self.destroy_score)
    }

    /// Check if this unit has any weapon of its own.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.ground_weapon.is_some() || self.air_weapon.is_some()
    }
}

/// Root of a catalog RON file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogData {
    /// Every unit type, in id order.
    pub units: Vec<UnitData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_unit() -> UnitData {
        UnitData {
            name: "protoss_photon_cannon".to_string(),
            race: Race::Protoss,
            size: UnitSize::Large,
            hit_points: 100,
            shields: 100,
            armor: 0,
            armor_upgrade: None,
            top_speed: Fixed::ZERO,
            speed_upgrade: None,
            dimensions: Dimensions::new(16, 16, 15, 15),
            destroy_score: 300,
            score_override: Some(750),
            ground_weapon: Some(WeaponData {
                name: "STS Photon Cannon".to_string(),
                damage: 20,
                damage_bonus: 0,
                damage_factor: 1,
                max_hits: 1,
                cooldown: 22,
                max_range: 224,
                min_range: 0,
                damage_type: DamageType::Normal,
                upgrade: None,
                range_upgrade: None,
                cooldown_upgrade: None,
            }),
            air_weapon: None,
            kite: None,
            archetype: ArchetypeData::Standard,
            discount: None,
            tags: vec!["building".to_string()],
        }
    }

    #[test]
    fn test_has_tag() {
        let unit = create_test_unit();
        assert!(unit.has_tag("building"));
        assert!(!unit.has_tag("flyer"));
    }

    #[test]
    fn test_score_override_wins() {
        let mut unit = create_test_unit();
        assert_eq!(unit.score(), 750);

        unit.score_override = None;
        assert_eq!(unit.score(), 300);
    }

    #[test]
    fn test_is_armed() {
        let mut unit = create_test_unit();
        assert!(unit.is_armed());

        unit.ground_weapon = None;
        assert!(!unit.is_armed());
    }

    #[test]
    fn test_weapon_defaults_from_ron() {
        let weapon: WeaponData = ron::from_str(
            r#"WeaponData(name: "Claws", damage: 5, cooldown: 8, max_range: 15)"#,
        )
        .unwrap();

        assert_eq!(weapon.damage_factor, 1);
        assert_eq!(weapon.max_hits, 1);
        assert_eq!(weapon.min_range, 0);
        assert_eq!(weapon.damage_type, DamageType::Normal);
        assert!(weapon.upgrade.is_none());
    }

    #[test]
    fn test_speed_parses_from_decimal() {
        let upgrade: SpeedUpgrade =
            ron::from_str("SpeedUpgrade(upgrade: IonThrusters, top_speed: 9.5)").unwrap();
        assert_eq!(upgrade.top_speed, Fixed::from_num(9.5));
    }
}
