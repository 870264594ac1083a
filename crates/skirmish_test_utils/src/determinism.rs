//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the combat simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A prediction is only useful if the same inputs always give the same
//! verdict. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`skirmish_core::math::Fixed`] and
//!   [`skirmish_core::math::Hp`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Rosters are plain vectors processed in insertion order.
//!
//! - **System randomness**: The engine has none. Ties are broken by
//!   roster order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual step determinism (targeting, kiting, healing)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full predictions are reproducible
//! 4. **Parallel tests**: Running N simulations in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skirmish_core::simulation::CombatSim;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of frames each simulation ran.
    pub frames: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Frames: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `frames` - Number of steps per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use skirmish_test_utils::determinism::verify_determinism;
/// use skirmish_test_utils::fixtures::marines_vs_zerglings;
///
/// let result = verify_determinism(
///     3,
///     48,
///     marines_vs_zerglings,
///     |sim| { sim.simulate(1); },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..frames {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Simplified determinism verification for [`CombatSim`].
///
/// Runs the simulation twice with identical setup and verifies the final
/// state hashes match exactly.
///
/// # Returns
///
/// `true` if both runs produced identical state hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_frames: u64) -> bool
where
    F: Fn() -> CombatSim,
{
    let result = verify_determinism(
        2,
        num_frames,
        &setup_fn,
        |sim| {
            sim.simulate(1);
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling
/// variations or different memory layouts.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_frames: u64) -> ParallelSimResult
where
    F: Fn() -> CombatSim + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_frames {
                        sim.simulate(1);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        frames: num_frames,
        num_sims,
    }
}

/// Compare two simulation runs frame-by-frame, finding first divergence.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(frame)` if they diverge
/// at that frame.
pub fn find_first_divergence<F>(setup_fn: F, num_frames: u64) -> Option<u64>
where
    F: Fn() -> CombatSim,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for frame in 1..=num_frames {
        sim1.simulate(1);
        sim2.simulate(1);

        if sim1.state_hash() != sim2.state_hash() {
            tracing::debug!(frame, "Simulations diverged");
            return Some(frame);
        }
    }

    None
}

/// Verify that a RON round-trip preserves simulation state exactly.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_frames: u64) -> bool
where
    F: Fn() -> CombatSim,
{
    let mut sim = setup_fn();

    for _ in 0..num_frames {
        sim.simulate(1);
    }

    let hash_before = sim.state_hash();

    let Ok(text) = ron::to_string(&sim) else {
        return false;
    };
    let Ok(restored) = ron::from_str::<CombatSim>(&text) else {
        return false;
    };

    hash_before == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for combat testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of damage, scoring and simulation determinism.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::components::{DamageType, Side, UnitSize};
    use skirmish_core::math::{Hp, Position};
    use skirmish_core::snapshot::UnitRecord;

    use crate::fixtures::record;

    /// Types that take part in combat without special construction.
    pub const PLAIN_COMBAT_TYPES: &[&str] = &[
        "terran_marine",
        "terran_firebat",
        "terran_ghost",
        "terran_vulture",
        "terran_goliath",
        "terran_siege_tank_tank_mode",
        "terran_wraith",
        "protoss_zealot",
        "protoss_dragoon",
        "protoss_archon",
        "protoss_scout",
        "zerg_zergling",
        "zerg_hydralisk",
        "zerg_ultralisk",
        "zerg_mutalisk",
    ];

    /// A pixel position within a 1024x1024 area.
    pub fn arb_position() -> impl Strategy<Value = Position> {
        (0i32..1024, 0i32..1024).prop_map(|(x, y)| Position::new(x, y))
    }

    /// Per-hit damage, 1 to 100 points in quarter steps.
    pub fn arb_damage() -> impl Strategy<Value = Hp> {
        (4i32..=400).prop_map(|quarters| Hp::from_bits(quarters * 64))
    }

    /// Armor level 0 to 5.
    pub fn arb_armor() -> impl Strategy<Value = Hp> {
        (0i32..=5).prop_map(Hp::from_num)
    }

    /// Any damage type.
    pub fn arb_damage_type() -> impl Strategy<Value = DamageType> {
        prop_oneof![
            Just(DamageType::Normal),
            Just(DamageType::Concussive),
            Just(DamageType::Explosive),
        ]
    }

    /// Any unit size.
    pub fn arb_unit_size() -> impl Strategy<Value = UnitSize> {
        prop_oneof![
            Just(UnitSize::Small),
            Just(UnitSize::Medium),
            Just(UnitSize::Large),
        ]
    }

    /// Either side.
    pub fn arb_side() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Friendly), Just(Side::Enemy)]
    }

    /// Full-health record of a plain combat type at a random position.
    pub fn arb_record() -> impl Strategy<Value = UnitRecord> {
        (proptest::sample::select(PLAIN_COMBAT_TYPES), arb_side(), arb_position())
            .prop_map(|(name, side, position)| record(name, side, position.x, position.y))
    }

    /// Between 2 and `max_units` records in total, on random sides.
    pub fn arb_engagement(max_units: usize) -> impl Strategy<Value = Vec<UnitRecord>> {
        prop::collection::vec(arb_record(), 2..=max_units.max(2))
    }
}
