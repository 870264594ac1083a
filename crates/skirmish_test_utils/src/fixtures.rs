//! Test fixtures and helpers.
//!
//! Built-in catalog access, unit records by type name and small
//! pre-built engagements for consistent testing.

use std::sync::OnceLock;

use fixed::types::{I24F8, I32F32};
use skirmish_core::components::Side;
use skirmish_core::data::UnitCatalog;
use skirmish_core::math::Position;
use skirmish_core::simulation::CombatSim;
use skirmish_core::snapshot::{SnapshotBuilder, UnitRecord, UnitSnapshot};
use skirmish_core::terrain::FlatTerrain;
use skirmish_core::upgrades::NoUpgrades;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a hit point value from whole points.
#[must_use]
pub fn hp(n: i32) -> I24F8 {
    I24F8::from_num(n)
}

/// The built-in catalog, parsed once per test binary.
///
/// # Panics
///
/// Panics if the embedded catalog fails validation.
pub fn catalog() -> &'static UnitCatalog {
    static CATALOG: OnceLock<UnitCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| UnitCatalog::builtin().expect("built-in catalog must load"))
}

/// A full-health, visible, completed record of the named type.
///
/// # Panics
///
/// Panics if the name is not in the built-in catalog.
#[must_use]
pub fn record(name: &str, side: Side, x: i32, y: i32) -> UnitRecord {
    let unit_type = catalog()
        .find(name)
        .unwrap_or_else(|| panic!("unknown unit type '{name}'"));
    UnitRecord::new(
        unit_type.id,
        side,
        Position::new(x, y),
        unit_type.data.hit_points,
        unit_type.data.shields,
    )
}

/// `count` records of one type in rows of eight, `spacing` pixels apart.
#[must_use]
pub fn squad(name: &str, side: Side, count: usize, origin: Position, spacing: i32) -> Vec<UnitRecord> {
    (0..count)
        .map(|i| {
            let col = (i % 8) as i32;
            let row = (i / 8) as i32;
            record(name, side, origin.x + col * spacing, origin.y + row * spacing)
        })
        .collect()
}

/// Build a snapshot on flat ground without upgrades.
///
/// # Panics
///
/// Panics if the record's type is not in the built-in catalog.
#[must_use]
pub fn snapshot_of(record: &UnitRecord) -> UnitSnapshot {
    SnapshotBuilder::new(catalog(), &NoUpgrades, &FlatTerrain)
        .build(record)
        .expect("record type must be in the built-in catalog")
}

/// Build a snapshot of the named type on flat ground.
#[must_use]
pub fn snapshot(name: &str, side: Side, x: i32, y: i32) -> UnitSnapshot {
    snapshot_of(&record(name, side, x, y))
}

/// Simulation seeded with every record that qualifies as a combat unit.
#[must_use]
pub fn sim_from(records: &[UnitRecord]) -> CombatSim {
    let mut sim = CombatSim::new();
    for record in records {
        sim.add_if_combat_unit(snapshot_of(record));
    }
    sim
}

/// Ten marines against ten zerglings, 200 pixels apart.
#[must_use]
pub fn marines_vs_zerglings() -> CombatSim {
    let mut records = squad("terran_marine", Side::Friendly, 10, Position::new(100, 100), 24);
    records.extend(squad("zerg_zergling", Side::Enemy, 10, Position::new(300, 100), 24));
    sim_from(&records)
}

/// A mixed twenty-a-side skirmish: ranged, melee, air and a healer.
#[must_use]
pub fn mixed_skirmish() -> CombatSim {
    let mut records = squad("terran_marine", Side::Friendly, 12, Position::new(200, 200), 20);
    records.extend(squad("terran_medic", Side::Friendly, 2, Position::new(160, 200), 20));
    records.extend(squad("terran_siege_tank_tank_mode", Side::Friendly, 4, Position::new(140, 260), 40));
    records.extend(squad("terran_wraith", Side::Friendly, 2, Position::new(200, 320), 30));

    records.extend(squad("zerg_zergling", Side::Enemy, 10, Position::new(600, 200), 16));
    records.extend(squad("zerg_hydralisk", Side::Enemy, 6, Position::new(660, 200), 24));
    records.extend(squad("zerg_mutalisk", Side::Enemy, 4, Position::new(640, 300), 30));
    sim_from(&records)
}
