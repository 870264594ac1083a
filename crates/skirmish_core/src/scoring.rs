//! Army value.
//!
//! A unit is worth its destroy score scaled by how much of its health and
//! shields remain, with health weighted three times as heavily as shields.
//! Sums are kept separately for mobile units and buildings so the decision
//! policy can tell army attrition from static defense attrition.

use serde::{Deserialize, Serialize};

use crate::snapshot::UnitSnapshot;

/// Value of one unit.
///
/// `(score * (3h + s) + score) / (3H + S) + bonus`, on raw fixed-point
/// vitality, never more than `score + bonus`. Dead units and units without
/// a health pool are worth nothing.
#[must_use]
pub fn unit_value(unit: &UnitSnapshot) -> i64 {
    let vitality = &unit.vitality;
    if vitality.health.to_bits() <= 0 || vitality.max_health.to_bits() <= 0 {
        return 0;
    }

    let score = i64::from(unit.score);
    let remaining = 3 * i64::from(vitality.health.to_bits()) + i64::from(vitality.shields.to_bits());
    let full = 3 * i64::from(vitality.max_health.to_bits()) + i64::from(vitality.max_shields.to_bits());

    let scaled = ((score * remaining + score) / full).min(score);
    scaled + i64::from(unit.score_bonus)
}

/// One side's value, split by unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Every unit.
    pub total: i64,
    /// Non-buildings only.
    pub units: i64,
    /// Buildings only.
    pub buildings: i64,
}

impl ScoreBreakdown {
    /// Sum a roster.
    #[must_use]
    pub fn of(roster: &[UnitSnapshot]) -> Self {
        roster.iter().fold(Self::default(), |mut acc, unit| {
            let value = unit_value(unit);
            acc.total += value;
            if unit.is_building() {
                acc.buildings += value;
            } else {
                acc.units += value;
            }
            acc
        })
    }
}

/// Both sides' values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SideScores {
    /// Side A.
    pub friendly: ScoreBreakdown,
    /// Side B.
    pub enemy: ScoreBreakdown,
}

impl SideScores {
    /// Score both rosters.
    #[must_use]
    pub fn of(friendly: &[UnitSnapshot], enemy: &[UnitSnapshot]) -> Self {
        Self {
            friendly: ScoreBreakdown::of(friendly),
            enemy: ScoreBreakdown::of(enemy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Side;
    use crate::data::UnitCatalog;
    use crate::math::{Hp, Position};
    use crate::snapshot::{SnapshotBuilder, UnitRecord};
    use crate::terrain::FlatTerrain;
    use crate::upgrades::NoUpgrades;

    fn snapshot(name: &str) -> UnitSnapshot {
        let catalog = UnitCatalog::builtin().unwrap();
        let unit_type = catalog.find(name).unwrap();
        let record = UnitRecord::new(
            unit_type.id,
            Side::Enemy,
            Position::ORIGIN,
            unit_type.data.hit_points,
            unit_type.data.shields,
        );
        SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain)
            .build(&record)
            .unwrap()
    }

    #[test]
    fn test_full_health_is_full_score() {
        assert_eq!(unit_value(&snapshot("terran_marine")), 100);
        assert_eq!(unit_value(&snapshot("protoss_dragoon")), 500);
    }

    #[test]
    fn test_health_weighs_more_than_shields() {
        let full = snapshot("protoss_dragoon");

        let mut no_shields = full.clone();
        no_shields.vitality.shields = Hp::ZERO;
        let mut half_health = full.clone();
        half_health.vitality.health = Hp::from_num(50);

        // 3*100 of 380 left vs 3*50+80 of 380 left
        assert_eq!(unit_value(&no_shields), 394);
        assert_eq!(unit_value(&half_health), 302);
    }

    #[test]
    fn test_dead_unit_is_worthless() {
        let mut marine = snapshot("terran_marine");
        marine.vitality.health = Hp::ZERO;
        assert_eq!(unit_value(&marine), 0);
    }

    #[test]
    fn test_bunker_bonus_and_split() {
        let bunker = snapshot("terran_bunker");
        let marine = snapshot("terran_marine");
        assert_eq!(unit_value(&bunker), 300 + 400);

        let scores = ScoreBreakdown::of(&[bunker, marine]);
        assert_eq!(scores.total, 800);
        assert_eq!(scores.buildings, 700);
        assert_eq!(scores.units, 100);
    }

    #[test]
    fn test_empty_rosters_score_zero() {
        let scores = SideScores::of(&[], &[]);
        assert_eq!(scores, SideScores::default());
    }
}
