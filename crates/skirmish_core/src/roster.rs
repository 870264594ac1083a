//! Roster assembly: which known units take part in a prediction.
//!
//! Friendly units are taken around the friendly vanguard, enemy units around
//! the enemy vanguard. Enemy units come either from what is in sight right
//! now (plus static defense known to be there) or from every remembered
//! sighting that has not been disproved.
//!
//! In remembered mode, enemy types with a catalog discount (spore colonies
//! against mutalisks) also leave some friendly units out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::data::{Archetype, UnitType};
use crate::decision::PredictionRequest;
use crate::math::Position;
use crate::simulation::CombatSim;
use crate::snapshot::{SnapshotBuilder, UnitRecord};
use crate::unit_kind::{UnitTraits, UnitTypeId};

/// Which enemy sightings count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetectionMode {
    /// Units in sight now, plus out-of-sight static defense.
    #[default]
    VisibleOnly,
    /// Every remembered unit not seen to have left.
    Remembered,
}

/// Enemy unit kinds to leave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Exclusions {
    /// Skip garrisoned fortifications.
    #[serde(default)]
    pub bunkers: bool,
    /// Skip flying units.
    #[serde(default)]
    pub flyers: bool,
}

impl Exclusions {
    /// No exclusions.
    pub const NONE: Self = Self {
        bunkers: false,
        flyers: false,
    };

    fn excludes(self, unit_type: &UnitType) -> bool {
        (self.bunkers && matches!(unit_type.archetype, Archetype::Bunker(_)))
            || (self.flyers && unit_type.is(UnitTraits::FLYER))
    }
}

/// Assembled rosters plus the facts the decision policy needs about them.
#[derive(Debug, Clone, Default)]
pub struct Engagement {
    /// Simulation loaded with both rosters.
    pub sim: CombatSim,
    /// Average position of the selected friendly units.
    pub friendly_centroid: Option<Position>,
    /// Average position of the selected enemy units.
    pub enemy_centroid: Option<Position>,
    /// Whether any selected friendly unit flies.
    pub air_battle: bool,
    /// Selected enemy swarm units.
    pub swarm_count: u32,
}

/// Check if a unit type can ever take part in a simulation.
///
/// Workers and fighters are left out; everything that deals damage or
/// heals is in.
#[must_use]
pub fn is_combat_type(unit_type: &UnitType) -> bool {
    if unit_type.is(UnitTraits::WORKER) || unit_type.is(UnitTraits::FIGHTER) {
        return false;
    }
    unit_type.deals_damage() || unit_type.is(UnitTraits::HEALER)
}

/// Check if a unit in sight should take part in a simulation.
///
/// It must be finished, powered and able to act. Workers only count while
/// they have an attack order.
#[must_use]
pub fn is_combat_unit(unit_type: &UnitType, record: &UnitRecord) -> bool {
    if !record.completed || !record.powered || record.disabled {
        return false;
    }
    if unit_type.is(UnitTraits::WORKER) {
        return record.attacking;
    }
    is_combat_type(unit_type)
}

/// Pick the units for a prediction and load them into a fresh simulation.
///
/// Records with unknown unit types are logged and skipped.
#[must_use]
pub fn assemble(builder: &SnapshotBuilder<'_>, records: &[UnitRecord], request: &PredictionRequest) -> Engagement {
    let catalog = builder.catalog();
    let radius_sq = i64::from(request.radius) * i64::from(request.radius);

    let mut exclusions = request.exclusions;
    if request.rushing {
        exclusions.flyers = true;
    }

    let mut enemy = Vec::new();
    let mut friendly = Vec::new();

    for record in records {
        let Some(unit_type) = catalog.get(record.unit_type) else {
            tracing::warn!(unit_type = record.unit_type.as_u16(), "Skipping record with unknown unit type");
            continue;
        };

        match record.side {
            Side::Enemy => {
                if record.position.distance_squared(request.enemy_vanguard) > radius_sq
                    || exclusions.excludes(unit_type)
                    || record.health == 0
                {
                    continue;
                }
                if enemy_selected(unit_type, record, request) {
                    enemy.push((record, unit_type));
                }
            }
            Side::Friendly => {
                if record.position.distance_squared(request.friendly_vanguard) > radius_sq
                    || record.health == 0
                {
                    continue;
                }
                if is_combat_unit(unit_type, record) {
                    friendly.push((record, unit_type));
                }
            }
        }
    }

    if request.mode == DetectionMode::Remembered {
        apply_discounts(&enemy, &mut friendly);
    }

    let mut engagement = Engagement {
        enemy_centroid: centroid(enemy.iter().map(|(record, _)| record.position)),
        friendly_centroid: centroid(friendly.iter().map(|(record, _)| record.position)),
        air_battle: friendly.iter().any(|(_, unit_type)| unit_type.is(UnitTraits::FLYER)),
        swarm_count: u32::try_from(enemy.iter().filter(|(_, unit_type)| unit_type.is(UnitTraits::SWARM)).count())
            .unwrap_or(u32::MAX),
        ..Engagement::default()
    };

    for (record, unit_type) in enemy.into_iter().chain(friendly) {
        match builder.build(record) {
            Ok(snapshot) => {
                engagement.sim.add_if_combat_unit(snapshot);
            }
            Err(err) => {
                tracing::warn!(unit = unit_type.name(), error = %err, "Skipping unit that could not be built");
            }
        }
    }

    tracing::debug!(
        friendly = engagement.sim.roster(Side::Friendly).len(),
        enemy = engagement.sim.roster(Side::Enemy).len(),
        air_battle = engagement.air_battle,
        swarm = engagement.swarm_count,
        "Rosters assembled"
    );

    engagement
}

fn enemy_selected(unit_type: &UnitType, record: &UnitRecord, request: &PredictionRequest) -> bool {
    match request.mode {
        DetectionMode::VisibleOnly => {
            if record.visible {
                is_combat_unit(unit_type, record)
            } else {
                unit_type.is(UnitTraits::BUILDING)
                    && record.is_complete_at(request.frame)
                    && is_combat_type(unit_type)
            }
        }
        DetectionMode::Remembered => {
            if record.visible {
                is_combat_unit(unit_type, record)
            } else {
                !record.gone_from_last_position
                    && record.is_complete_at(request.frame)
                    && is_combat_type(unit_type)
            }
        }
    }
}

/// Drop the first friendly units of each discounted type, as many as the
/// selected enemies call for.
fn apply_discounts(enemy: &[(&UnitRecord, &UnitType)], friendly: &mut Vec<(&UnitRecord, &UnitType)>) {
    let mut remaining: HashMap<UnitTypeId, u32> = HashMap::new();
    for rule in enemy.iter().filter_map(|(_, unit_type)| unit_type.discount) {
        *remaining.entry(rule.unit).or_default() += rule.count;
    }
    if remaining.is_empty() {
        return;
    }

    friendly.retain(|(_, unit_type)| match remaining.get_mut(&unit_type.id) {
        Some(left) if *left > 0 => {
            *left -= 1;
            false
        }
        _ => true,
    });
    tracing::debug!(unused = ?remaining, "Discounted friendly units");
}

/// Truncating average of a set of positions.
fn centroid(positions: impl Iterator<Item = Position>) -> Option<Position> {
    let (mut x, mut y, mut count) = (0_i64, 0_i64, 0_i64);
    for position in positions {
        x += i64::from(position.x);
        y += i64::from(position.y);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let average = |sum: i64| i32::try_from(sum / count).unwrap_or_default();
    Some(Position::new(average(x), average(y)))
}
