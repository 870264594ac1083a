//! Frame-stepped skirmish engine.
//!
//! The engine owns two rosters and advances them one frame at a time. Each
//! frame every friendly unit acts in roster order, then every enemy unit,
//! then both rosters get end-of-frame housekeeping.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (vitality is [`Hp`], speed is [`Fixed`])
//! - No randomness
//! - Units act in roster order; ties in target selection go to the
//!   earliest candidate
//! - Same inputs always produce the same rosters
//!
//! # Example
//!
//! ```
//! use skirmish_core::components::Side;
//! use skirmish_core::data::UnitCatalog;
//! use skirmish_core::math::Position;
//! use skirmish_core::simulation::CombatSim;
//! use skirmish_core::snapshot::{SnapshotBuilder, UnitRecord};
//! use skirmish_core::terrain::FlatTerrain;
//! use skirmish_core::upgrades::NoUpgrades;
//!
//! let catalog = UnitCatalog::builtin().unwrap();
//! let builder = SnapshotBuilder::new(&catalog, &NoUpgrades, &FlatTerrain);
//! let marine = catalog.id_of("terran_marine").unwrap();
//! let zergling = catalog.id_of("zerg_zergling").unwrap();
//!
//! let mut sim = CombatSim::new();
//! sim.add_unit(builder.build(&UnitRecord::new(marine, Side::Friendly, Position::new(0, 0), 40, 0)).unwrap());
//! sim.add_unit(builder.build(&UnitRecord::new(zergling, Side::Enemy, Position::new(300, 0), 35, 0)).unwrap());
//!
//! let report = sim.simulate(24);
//! assert!(report.frames > 0);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::factions::Race;
use crate::math::{edge_to_edge_distance, Fixed, Hp, Position};
use crate::scoring::SideScores;
use crate::snapshot::UnitSnapshot;
use crate::unit_kind::UnitTraits;

/// Health restored by one heal, in raw [`Hp`] units.
pub const HEAL_AMOUNT: Hp = Hp::from_bits(150);

/// Why a burst ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Ran every requested frame.
    FrameLimit,
    /// One side has no units left.
    RosterEmpty,
    /// A whole frame passed without any unit acting.
    NoProgress,
}

/// Summary of one [`CombatSim::simulate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstReport {
    /// Frames actually simulated.
    pub frames: u32,
    /// Why the burst ended.
    pub stop: StopReason,
}

/// What one unit did in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitAction {
    /// Nothing to do.
    Idle,
    /// Weapon reloading.
    Reloading,
    /// Backed away from its target.
    Kited,
    /// Hit its target.
    Attacked,
    /// Stepped toward its target.
    Moved,
    /// Healed an ally.
    Healed,
    /// Hit its target and destroyed itself.
    Detonated,
}

impl UnitAction {
    const fn is_activity(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Two-roster combat simulation.
///
/// Caller-owned; build one per prediction or reuse it after [`clear`](Self::clear).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSim {
    /// Side A.
    friendly: Vec<UnitSnapshot>,
    /// Side B.
    enemy: Vec<UnitSnapshot>,
    /// Frames simulated since the last clear.
    frame: u64,
    /// Next unit id to assign.
    next_id: u32,
}

impl CombatSim {
    /// Create an empty simulation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames simulated since creation or the last clear.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Units currently on one side.
    #[must_use]
    pub fn roster(&self, side: Side) -> &[UnitSnapshot] {
        match side {
            Side::Friendly => &self.friendly,
            Side::Enemy => &self.enemy,
        }
    }

    /// Add a unit to the roster of its side and assign it an id.
    ///
    /// Returns the assigned id.
    pub fn add_unit(&mut self, mut unit: UnitSnapshot) -> u32 {
        unit.id = self.next_id;
        self.next_id += 1;

        let id = unit.id;
        match unit.side {
            Side::Friendly => self.friendly.push(unit),
            Side::Enemy => self.enemy.push(unit),
        }
        id
    }

    /// Add a unit only if it can fight: it must be armed or a healer.
    ///
    /// Friendly fighters are left out; their carrier fights for them.
    pub fn add_if_combat_unit(&mut self, unit: UnitSnapshot) -> Option<u32> {
        if unit.side == Side::Friendly && unit.is(UnitTraits::FIGHTER) {
            return None;
        }
        if !unit.is_armed() && !unit.is_healer() {
            return None;
        }
        Some(self.add_unit(unit))
    }

    /// Add every unit from an iterator.
    pub fn add_units(&mut self, units: impl IntoIterator<Item = UnitSnapshot>) {
        for unit in units {
            self.add_unit(unit);
        }
    }

    /// Remove every unit and reset the frame counter.
    pub fn clear(&mut self) {
        self.friendly.clear();
        self.enemy.clear();
        self.frame = 0;
        self.next_id = 0;
    }

    /// Current army values of both sides.
    #[must_use]
    pub fn scores(&self) -> SideScores {
        SideScores::of(&self.friendly, &self.enemy)
    }

    /// Run up to `frames` frames.
    ///
    /// Stops early when either roster is empty or when a frame passes
    /// without any unit acting.
    pub fn simulate(&mut self, frames: u32) -> BurstReport {
        let mut run = 0;
        let mut stop = StopReason::FrameLimit;

        while run < frames {
            if self.friendly.is_empty() || self.enemy.is_empty() {
                stop = StopReason::RosterEmpty;
                break;
            }

            let active = self.step();
            run += 1;

            if !active {
                stop = StopReason::NoProgress;
                break;
            }
        }

        tracing::trace!(
            frames = run,
            ?stop,
            friendly = self.friendly.len(),
            enemy = self.enemy.len(),
            "Burst finished"
        );

        BurstReport { frames: run, stop }
    }

    /// Advance one frame. Returns whether any unit acted.
    fn step(&mut self) -> bool {
        let friendly_active = run_roster(&mut self.friendly, &mut self.enemy, &mut self.next_id);
        let enemy_active = run_roster(&mut self.enemy, &mut self.friendly, &mut self.next_id);

        end_of_frame(&mut self.friendly);
        end_of_frame(&mut self.enemy);
        self.frame += 1;

        friendly_active || enemy_active
    }

    /// Compute a hash of the simulation state.
    ///
    /// Used for determinism checks: two simulations fed the same units must
    /// hash the same after the same number of frames.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frame.hash(&mut hasher);
        self.friendly.hash(&mut hasher);
        self.enemy.hash(&mut hasher);
        hasher.finish()
    }
}

// ============================================================================
// Per-unit behaviour
// ============================================================================

/// Let every unit in `own` act against `foes`. Returns whether any acted.
fn run_roster(own: &mut Vec<UnitSnapshot>, foes: &mut Vec<UnitSnapshot>, next_id: &mut u32) -> bool {
    let mut active = false;
    let mut index = 0;

    while index < own.len() {
        let action = if own[index].is_suicide() {
            suicide_step(own, index, foes, next_id)
        } else if own[index].is_healer() {
            heal_step(own, index)
        } else {
            combat_step(&mut own[index], foes, next_id)
        };

        active |= action.is_activity();

        if action == UnitAction::Detonated {
            // Order is preserved so later units still act in sequence
            own.remove(index);
        } else {
            index += 1;
        }
    }

    active
}

/// Nearest foe the unit can shoot, with its edge-to-edge distance.
///
/// Ties go to the earliest foe in roster order.
fn nearest_target(unit: &UnitSnapshot, foes: &[UnitSnapshot]) -> Option<(usize, i32)> {
    let mut best: Option<(usize, i32)> = None;

    for (index, foe) in foes.iter().enumerate() {
        let weapon = unit.weapon_against(foe);
        if !weapon.is_armed() {
            continue;
        }

        let distance = distance_between(unit, foe);
        if distance < weapon.min_range {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }

    best
}

fn distance_between(a: &UnitSnapshot, b: &UnitSnapshot) -> i32 {
    edge_to_edge_distance(a.dimensions, a.position, b.dimensions, b.position)
}

fn within(distance: i32, reach: Fixed) -> bool {
    Fixed::from_num(distance) <= reach
}

/// Hit a foe and return whether it died.
fn strike(attacker: &UnitSnapshot, target: &mut UnitSnapshot) -> bool {
    let weapon = attacker.weapon_against(target);
    target.vitality.take_hit(weapon.damage, weapon.damage_type);
    !target.is_alive()
}

fn suicide_step(
    own: &mut [UnitSnapshot],
    index: usize,
    foes: &mut Vec<UnitSnapshot>,
    next_id: &mut u32,
) -> UnitAction {
    let unit = &own[index];
    let Some((target, distance)) = nearest_target(unit, foes) else {
        return UnitAction::Idle;
    };

    let range = unit.weapon_against(&foes[target]).max_range;
    if within(distance, unit.speed) || distance <= range {
        let killed = strike(unit, &mut foes[target]);
        tracing::trace!(unit = unit.id, target = foes[target].id, killed, "Suicide attack");
        if killed {
            remove_casualty(foes, target, next_id);
        }
        return UnitAction::Detonated;
    }

    let destination = foes[target].position;
    advance(&mut own[index], destination)
}

fn heal_step(own: &mut [UnitSnapshot], index: usize) -> UnitAction {
    let healer = &own[index];
    let mut best: Option<(usize, i32)> = None;

    for (candidate, ally) in own.iter().enumerate() {
        if candidate == index
            || !ally.is_organic()
            || !ally.vitality.is_wounded()
            || ally.healed_this_frame
        {
            continue;
        }
        let distance = distance_between(healer, ally);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((candidate, distance));
        }
    }

    let Some((patient, _)) = best else {
        return UnitAction::Idle;
    };

    let ally = &mut own[patient];
    ally.vitality.heal(HEAL_AMOUNT);
    ally.healed_this_frame = true;
    let destination = ally.position;

    let healer = &mut own[index];
    healer.position = destination;
    tracing::trace!(unit = healer.id, patient, "Healed ally");
    UnitAction::Healed
}

fn combat_step(unit: &mut UnitSnapshot, foes: &mut Vec<UnitSnapshot>, next_id: &mut u32) -> UnitAction {
    if unit.cooldown_remaining > 0 {
        if !unit.may_kite() {
            return UnitAction::Reloading;
        }

        if let Some((target, distance)) = nearest_target(unit, foes) {
            let threat = &foes[target];
            let kite_reach = Fixed::from_num(unit.ground.max_range) + unit.speed;
            if threat.ground.max_range < unit.ground.max_range && within(distance, kite_reach) {
                unit.position = unit.position.step_away(threat.position, unit.speed);
                tracing::trace!(unit = unit.id, x = unit.position.x, y = unit.position.y, "Kited");
                return UnitAction::Kited;
            }
        }
        return UnitAction::Reloading;
    }

    let Some((target, mut distance)) = nearest_target(unit, foes) else {
        return UnitAction::Idle;
    };

    let mut action = UnitAction::Idle;
    if within(distance, unit.speed) && unit.position != foes[target].position {
        unit.position = foes[target].position;
        distance = 0;
        action = UnitAction::Moved;
    }

    let weapon = *unit.weapon_against(&foes[target]);
    if distance <= weapon.max_range {
        let killed = strike(unit, &mut foes[target]);

        unit.cooldown_remaining = weapon.cooldown;
        if !foes[target].is_flyer() {
            if let (Some(own), Some(theirs)) = (unit.elevation, foes[target].elevation) {
                if theirs > own {
                    unit.cooldown_remaining += weapon.cooldown;
                }
            }
        }

        tracing::trace!(unit = unit.id, target = foes[target].id, killed, "Attacked");
        if killed {
            remove_casualty(foes, target, next_id);
        }
        return UnitAction::Attacked;
    }

    if !within(distance, unit.speed) {
        return advance(unit, foes[target].position);
    }

    action
}

/// Step toward `destination`. A step that goes nowhere is not progress.
fn advance(unit: &mut UnitSnapshot, destination: Position) -> UnitAction {
    let next = unit.position.step_toward(destination, unit.speed);
    if next == unit.position {
        return UnitAction::Idle;
    }
    unit.position = next;
    UnitAction::Moved
}

/// Remove a dead unit from its roster and release its death spawn there.
fn remove_casualty(roster: &mut Vec<UnitSnapshot>, index: usize, next_id: &mut u32) {
    let dead = roster.swap_remove(index);
    tracing::trace!(unit = dead.id, side = ?dead.side, "Unit destroyed");

    let Some(spawn) = dead.death_spawn else {
        return;
    };

    for _ in 0..spawn.count {
        let mut unit = (*spawn.template).clone();
        unit.id = *next_id;
        *next_id += 1;
        unit.position = dead.position;
        unit.elevation = dead.elevation;
        unit.cooldown_remaining = dead.cooldown_remaining;
        roster.push(unit);
    }
}

/// Cooldown tick, heal flag reset and racial regeneration.
fn end_of_frame(roster: &mut [UnitSnapshot]) {
    for unit in roster {
        unit.cooldown_remaining = unit.cooldown_remaining.saturating_sub(1);
        unit.healed_this_frame = false;

        match unit.race {
            Race::Zerg => unit.vitality.heal(Race::Zerg.health_regen()),
            Race::Protoss => unit.vitality.recharge(Race::Protoss.shield_regen()),
            Race::Terran => {}
        }
    }
}
