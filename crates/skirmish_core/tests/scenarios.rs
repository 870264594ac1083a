//! End-to-end engagements.
//!
//! These tests drive the engine and the decision policy through the public
//! API only, using the built-in catalog.

use skirmish_core::components::Side;
use skirmish_core::decision::{CombatPredictor, DecidingRule, PredictionRequest, PredictorConfig, Verdict};
use skirmish_core::math::{Hp, Position};
use skirmish_core::simulation::{CombatSim, StopReason};
use skirmish_core::terrain::{FlatTerrain, GridTerrain};
use skirmish_core::upgrades::NoUpgrades;
use skirmish_test_utils::fixtures::{catalog, record, sim_from, snapshot, snapshot_of, squad};

// =============================================================================
// Engine
// =============================================================================

#[test]
fn test_ranged_unit_closes_before_firing() {
    let mut sim = CombatSim::new();
    sim.add_unit(snapshot("terran_marine", Side::Friendly, 0, 0));
    sim.add_unit(snapshot("zerg_zergling", Side::Enemy, 160, 0));

    let report = sim.simulate(1);
    assert_eq!(report.frames, 1);

    // 143 pixels apart: out of the marine's 128 range after a 4 pixel step
    let marine = &sim.roster(Side::Friendly)[0];
    let ling = &sim.roster(Side::Enemy)[0];
    assert_eq!(marine.position, Position::new(4, 0));
    assert_eq!(marine.cooldown_remaining, 0);
    assert_eq!(ling.vitality.health, Hp::from_num(35));
    assert_eq!(ling.position, Position::new(155, 0));
}

#[test]
fn test_ranged_unit_in_range_fires_first_frame() {
    let mut sim = CombatSim::new();
    sim.add_unit(snapshot("terran_marine", Side::Friendly, 0, 0));
    sim.add_unit(snapshot("zerg_zergling", Side::Enemy, 140, 0));

    sim.simulate(1);

    let marine = &sim.roster(Side::Friendly)[0];
    let ling = &sim.roster(Side::Enemy)[0];
    assert_eq!(marine.position, Position::ORIGIN);
    assert_eq!(marine.cooldown_remaining, 14);
    // 6 damage, then one frame of zerg regeneration
    assert_eq!(ling.vitality.health, Hp::from_num(29) + Hp::from_bits(4));
}

#[test]
fn test_bunker_death_releases_garrison() {
    let marine_type = catalog().id_of("terran_marine").unwrap();
    let mut bunker = record("terran_bunker", Side::Enemy, 400, 400).with_cooldown(10);
    bunker.health = 1;

    let mut sim = CombatSim::new();
    sim.add_unit(snapshot("protoss_dragoon", Side::Friendly, 300, 400));
    sim.add_unit(snapshot_of(&bunker));

    sim.simulate(1);

    let enemy = sim.roster(Side::Enemy);
    assert_eq!(enemy.len(), 4);
    for marine in enemy {
        assert_eq!(marine.unit_type, marine_type);
        assert_eq!(marine.position, Position::new(400, 400));
        assert_eq!(marine.vitality.health, Hp::from_num(40));
    }
    assert_eq!(sim.scores().enemy.buildings, 0);
    assert_eq!(sim.scores().enemy.units, 400);

    let mut ids: Vec<u32> = enemy.iter().map(|unit| unit.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_mutually_lethal_pair_converges() {
    let mut sim = CombatSim::new();
    sim.add_unit(snapshot("terran_marine", Side::Friendly, 0, 0));
    sim.add_unit(snapshot("zerg_zergling", Side::Enemy, 20, 0));

    let report = sim.simulate(1000);

    // Eight zergling hits, one every 8 frames, finish the marine first
    assert_eq!(report.stop, StopReason::RosterEmpty);
    assert_eq!(report.frames, 57);
    assert!(sim.roster(Side::Friendly).is_empty());
    assert_eq!(sim.roster(Side::Enemy).len(), 1);
}

#[test]
fn test_unreachable_rosters_stop_without_changes() {
    let records = [
        record("protoss_photon_cannon", Side::Friendly, 100, 100),
        record("protoss_photon_cannon", Side::Enemy, 2000, 100),
    ];
    let mut sim = sim_from(&records);
    let friendly = sim.roster(Side::Friendly).to_vec();
    let enemy = sim.roster(Side::Enemy).to_vec();

    let report = sim.simulate(100);
    assert_eq!(report.stop, StopReason::NoProgress);
    assert!(report.frames < 100);
    assert_eq!(sim.roster(Side::Friendly), friendly.as_slice());
    assert_eq!(sim.roster(Side::Enemy), enemy.as_slice());

    // A second burst changes nothing either
    let again = sim.simulate(100);
    assert_eq!(again.stop, StopReason::NoProgress);
    assert_eq!(sim.roster(Side::Friendly), friendly.as_slice());
}

// =============================================================================
// Decision policy
// =============================================================================

#[test]
fn test_overwhelming_army_attacks_through_choke() {
    let terrain = GridTerrain::new(64, 64).with_choke(Position::new(400, 200), 64);
    let predictor = CombatPredictor::new(catalog(), &NoUpgrades, &terrain, PredictorConfig::default());

    let mut records = squad("protoss_dragoon", Side::Friendly, 24, Position::new(100, 150), 32);
    records.extend(squad("zerg_zergling", Side::Enemy, 3, Position::new(600, 200), 16));
    let request = PredictionRequest {
        friendly_vanguard: Position::new(200, 200),
        enemy_vanguard: Position::new(600, 200),
        radius: 400,
        ..PredictionRequest::default()
    };

    let prediction = predictor.predict(&records, &request);
    assert!(prediction.corrections.narrow_choke);
    assert_eq!(prediction.corrections.elevation_difference, 0);
    assert_eq!(prediction.verdict, Verdict::Attack);
    assert!(prediction.bursts <= 6);
}

#[test]
fn test_mirror_fight_is_decided_by_corrections_only() {
    let records = [
        record("protoss_zealot", Side::Friendly, 300, 300),
        record("protoss_zealot", Side::Enemy, 330, 300),
    ];
    let request = PredictionRequest {
        friendly_vanguard: Position::new(300, 300),
        enemy_vanguard: Position::new(700, 300),
        radius: 400,
        ..PredictionRequest::default()
    };

    // Open field: both sides lose exactly the same
    let predictor = CombatPredictor::new(catalog(), &NoUpgrades, &FlatTerrain, PredictorConfig::default());
    let even = predictor.predict(&records, &request);
    assert!(even.friendly_change > 0);
    assert_eq!(even.friendly_change, even.enemy_change);
    assert_eq!(even.bursts, 6);
    assert_ne!(even.verdict, Verdict::Attack);

    // Same fight, but the enemy sits below a narrow choke
    let terrain = GridTerrain::new(64, 64)
        .with_plateau(20, 0, 12, 64, -1)
        .with_choke(Position::new(500, 300), 64);
    let predictor = CombatPredictor::new(catalog(), &NoUpgrades, &terrain, PredictorConfig::default());
    let downhill = predictor.predict(&records, &request);
    assert!(downhill.corrections.narrow_choke);
    assert_eq!(downhill.corrections.elevation_difference, -1);
    assert_eq!(downhill.verdict, Verdict::Attack);
    assert_eq!(downhill.rule, DecidingRule::ProjectedGain);
    assert_eq!(downhill.bursts, 3);
}

#[test]
fn test_empty_enemy_roster_abstains() {
    let predictor = CombatPredictor::new(catalog(), &NoUpgrades, &FlatTerrain, PredictorConfig::default());
    let records = squad("terran_marine", Side::Friendly, 6, Position::new(100, 100), 20);
    let request = PredictionRequest {
        friendly_vanguard: Position::new(100, 100),
        enemy_vanguard: Position::new(500, 100),
        radius: 300,
        ..PredictionRequest::default()
    };

    let prediction = predictor.predict(&records, &request);
    assert_eq!(prediction.verdict, Verdict::NoResult);
    assert_eq!(prediction.verdict.as_i8(), 0);
    assert_eq!(prediction.initial.enemy.total, 0);
}
