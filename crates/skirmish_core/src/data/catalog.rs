//! Resolved unit type catalog.
//!
//! [`CatalogData`] is what a RON file contains; [`UnitCatalog`] is the
//! validated, id-indexed form the rest of the crate works with. Type names
//! in archetype overrides are resolved to [`UnitTypeId`]s here, so a typo in
//! a data file is caught at load time rather than mid-simulation.

use std::collections::HashMap;

use serde::Serialize;

use super::unit_data::{ArchetypeData, CatalogData, UnitData, WeaponData};
use crate::error::{Result, SimError};
use crate::unit_kind::{UnitTraits, UnitTypeId};
use crate::upgrades::UpgradeType;

/// Built-in catalog covering the Brood War combat units.
const BUILTIN_UNITS: &str = include_str!("../../data/units.ron");

/// Carrier override with its fighter resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarrierRule {
    /// Fighter unit type.
    pub fighter: UnitTypeId,
    /// Frames of fighter cycling shared across all fighters.
    pub base_cooldown: u32,
    /// Fighters carried without the capacity upgrade.
    pub capacity: u32,
    /// Fighters carried with the capacity upgrade.
    pub upgraded_capacity: u32,
    /// Upgrade raising capacity.
    pub capacity_upgrade: UpgradeType,
    /// Leash range in pixels.
    pub range: i32,
}

/// Bunker override with its garrison resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BunkerRule {
    /// Garrison unit type.
    pub garrison: UnitTypeId,
    /// Number of garrison units.
    pub count: u32,
    /// Range added to the garrison weapon.
    pub range_bonus: i32,
    /// Garrison cooldown is divided by this.
    pub cooldown_divisor: u32,
    /// Health multiplier to account for repair.
    pub health_multiplier: u32,
}

/// Remembered-mode discount with its unit type resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountRule {
    /// Friendly unit type to leave out.
    pub unit: UnitTypeId,
    /// Units left out per enemy.
    pub count: u32,
}

/// Per-type construction override, resolved to ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Archetype {
    /// No override.
    #[default]
    Standard,
    /// Fights through launched fighters.
    Carrier(CarrierRule),
    /// Fights through a garrison.
    Bunker(BunkerRule),
    /// Ground damage comes from a projectile unit.
    ProjectileLauncher {
        /// Projectile unit type.
        projectile: UnitTypeId,
    },
}

/// A unit type as stored in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct UnitType {
    /// Numeric id (index into the catalog).
    pub id: UnitTypeId,
    /// Classification flags derived from tags.
    pub traits: UnitTraits,
    /// Resolved construction override.
    pub archetype: Archetype,
    /// Resolved remembered-mode discount.
    pub discount: Option<DiscountRule>,
    /// Raw definition.
    pub data: UnitData,
}

impl UnitType {
    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Check for a trait flag.
    #[must_use]
    pub const fn is(&self, traits: UnitTraits) -> bool {
        self.traits.contains(traits)
    }

    /// Check if this type deals damage in the simulation.
    ///
    /// Carriers and bunkers count even without weapons of their own.
    #[must_use]
    pub fn deals_damage(&self) -> bool {
        self.data.is_armed() || matches!(self.archetype, Archetype::Carrier(_) | Archetype::Bunker(_))
    }
}

/// Validated, id-indexed set of unit types.
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    types: Vec<UnitType>,
    by_name: HashMap<String, UnitTypeId>,
}

impl UnitCatalog {
    /// Load the catalog embedded in the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded data is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_ron_str("builtin", BUILTIN_UNITS)
    }

    /// Parse and validate a catalog from RON text.
    ///
    /// `source_name` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataParseError`] if the text is not a valid
    /// catalog and [`SimError::InvalidCatalog`] if it is inconsistent.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let data: CatalogData = ron::from_str(text).map_err(|e| SimError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Self::from_data(data)
    }

    /// Validate parsed catalog data and resolve archetype references.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidCatalog`] for duplicate names, unresolved
    /// archetype references or degenerate weapon/archetype numbers.
    pub fn from_data(data: CatalogData) -> Result<Self> {
        if data.units.len() >= usize::from(u16::MAX) {
            return Err(SimError::InvalidCatalog {
                unit: "<catalog>".to_string(),
                reason: format!("{} unit types is more than ids can address", data.units.len()),
            });
        }

        let mut by_name = HashMap::with_capacity(data.units.len());
        for (index, unit) in data.units.iter().enumerate() {
            let id = UnitTypeId::new(index as u16);
            if by_name.insert(unit.name.clone(), id).is_some() {
                return Err(invalid(unit, "duplicate unit type name"));
            }
        }

        let mut types = Vec::with_capacity(data.units.len());
        for (index, unit) in data.units.into_iter().enumerate() {
            for weapon in unit.ground_weapon.iter().chain(unit.air_weapon.iter()) {
                validate_weapon(&unit, weapon)?;
            }
            let archetype = resolve_archetype(&unit, &by_name)?;
            let discount = unit
                .discount
                .as_ref()
                .map(|discount| {
                    by_name
                        .get(&discount.unit)
                        .map(|&id| DiscountRule {
                            unit: id,
                            count: discount.count,
                        })
                        .ok_or_else(|| invalid(&unit, format!("discounted unit '{}' is not in the catalog", discount.unit)))
                })
                .transpose()?;
            types.push(UnitType {
                id: UnitTypeId::new(index as u16),
                traits: UnitTraits::from_tags(&unit.tags),
                archetype,
                discount,
                data: unit,
            });
        }

        // Referenced types must not carry overrides of their own
        for unit in &types {
            let referenced = match unit.archetype {
                Archetype::Standard => continue,
                Archetype::Carrier(rule) => rule.fighter,
                Archetype::Bunker(rule) => rule.garrison,
                Archetype::ProjectileLauncher { projectile } => projectile,
            };
            let target = &types[usize::from(referenced.as_u16())];
            if target.archetype != Archetype::Standard {
                return Err(invalid(
                    &unit.data,
                    format!("'{}' cannot be referenced because it has its own archetype", target.name()),
                ));
            }
        }

        tracing::debug!(unit_types = types.len(), "Unit catalog loaded");
        Ok(Self { types, by_name })
    }

    /// Look up a unit type by id.
    #[must_use]
    pub fn get(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.types.get(usize::from(id.as_u16()))
    }

    /// Look up a unit type by id, failing if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownUnitTypeId`] if the id is not in the catalog.
    pub fn unit(&self, id: UnitTypeId) -> Result<&UnitType> {
        self.get(id).ok_or(SimError::UnknownUnitTypeId(id.as_u16()))
    }

    /// Look up a unit type by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&UnitType> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    /// Resolve a unit type name to its id.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownUnitType`] if the name is not in the catalog.
    pub fn id_of(&self, name: &str) -> Result<UnitTypeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownUnitType(name.to_string()))
    }

    /// Iterate over all unit types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitType> {
        self.types.iter()
    }

    /// Number of unit types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the catalog has no unit types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn invalid(unit: &UnitData, reason: impl Into<String>) -> SimError {
    SimError::InvalidCatalog {
        unit: unit.name.clone(),
        reason: reason.into(),
    }
}

fn validate_weapon(unit: &UnitData, weapon: &WeaponData) -> Result<()> {
    if weapon.damage_factor == 0 || weapon.max_hits == 0 {
        return Err(invalid(
            unit,
            format!("weapon '{}' needs a nonzero damage factor and hit count", weapon.name),
        ));
    }
    if weapon.min_range > weapon.max_range {
        return Err(invalid(
            unit,
            format!("weapon '{}' has min range above max range", weapon.name),
        ));
    }
    Ok(())
}

fn resolve_archetype(unit: &UnitData, by_name: &HashMap<String, UnitTypeId>) -> Result<Archetype> {
    let lookup = |role: &str, name: &str| {
        by_name
            .get(name)
            .copied()
            .ok_or_else(|| invalid(unit, format!("{role} '{name}' is not in the catalog")))
    };

    let archetype = match &unit.archetype {
        ArchetypeData::Standard => Archetype::Standard,
        ArchetypeData::Carrier {
            fighter,
            base_cooldown,
            capacity,
            upgraded_capacity,
            capacity_upgrade,
            range,
        } => {
            if *capacity == 0 || *upgraded_capacity == 0 {
                return Err(invalid(unit, "carrier capacity must be nonzero"));
            }
            Archetype::Carrier(CarrierRule {
                fighter: lookup("fighter", fighter)?,
                base_cooldown: *base_cooldown,
                capacity: *capacity,
                upgraded_capacity: *upgraded_capacity,
                capacity_upgrade: *capacity_upgrade,
                range: *range,
            })
        }
        ArchetypeData::Bunker {
            garrison,
            count,
            range_bonus,
            cooldown_divisor,
            health_multiplier,
        } => {
            if *cooldown_divisor == 0 {
                return Err(invalid(unit, "bunker cooldown divisor must be nonzero"));
            }
            Archetype::Bunker(BunkerRule {
                garrison: lookup("garrison", garrison)?,
                count: *count,
                range_bonus: *range_bonus,
                cooldown_divisor: *cooldown_divisor,
                health_multiplier: *health_multiplier,
            })
        }
        ArchetypeData::ProjectileLauncher { projectile } => Archetype::ProjectileLauncher {
            projectile: lookup("projectile", projectile)?,
        },
    };

    Ok(archetype)
}
