//! Attack/hold verdicts from short simulated bursts.
//!
//! The predictor assembles both rosters, runs the engine one second at a
//! time, and after every burst compares how much value each side lost.
//! Raw losses are corrected for effects the engine does not model:
//!
//! - **Narrow passages**: the enemy's losses shrink as the friendly army
//!   grows, since only part of a big army fits through a choke.
//! - **Elevation**: attacking uphill through a choke costs extra, attacking
//!   downhill through one helps.
//! - **Swarms**: units that stack without collision look stronger in the
//!   engine than they are, so friendly losses to a large swarm shrink.
//!
//! # Example
//!
//! ```
//! use skirmish_core::components::Side;
//! use skirmish_core::data::UnitCatalog;
//! use skirmish_core::decision::{CombatPredictor, PredictionRequest, PredictorConfig, Verdict};
//! use skirmish_core::math::Position;
//! use skirmish_core::snapshot::UnitRecord;
//! use skirmish_core::terrain::FlatTerrain;
//! use skirmish_core::upgrades::NoUpgrades;
//!
//! let catalog = UnitCatalog::builtin().unwrap();
//! let predictor = CombatPredictor::new(&catalog, &NoUpgrades, &FlatTerrain, PredictorConfig::default());
//!
//! // Nothing to fight: no result
//! let marine = catalog.id_of("terran_marine").unwrap();
//! let records = [UnitRecord::new(marine, Side::Friendly, Position::new(0, 0), 40, 0)];
//! let request = PredictionRequest {
//!     friendly_vanguard: Position::new(0, 0),
//!     enemy_vanguard: Position::new(400, 0),
//!     radius: 640,
//!     ..PredictionRequest::default()
//! };
//! assert_eq!(predictor.predict(&records, &request).verdict, Verdict::NoResult);
//! ```

use serde::{Deserialize, Serialize};

use crate::data::UnitCatalog;
use crate::math::Position;
use crate::roster::{self, DetectionMode, Engagement, Exclusions};
use crate::scoring::SideScores;
use crate::snapshot::{SnapshotBuilder, UnitRecord};
use crate::terrain::TerrainQuery;
use crate::upgrades::UpgradeLookup;

// ============================================================================
// Configuration
// ============================================================================

/// Tuning constants for the decision policy.
///
/// # Example RON
///
/// ```ron
/// PredictorConfig(
///     burst_frames: 24,
///     max_bursts: 6,
///     narrow_choke_width: 96,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Frames per burst.
    pub burst_frames: u32,
    /// Bursts to run at most.
    pub max_bursts: u32,
    /// Bursts before an early verdict may fire.
    pub min_bursts: u32,
    /// Chokes narrower than this, in pixels, count as narrow passages.
    pub narrow_choke_width: i32,
    /// Friendly losses below this count as insignificant.
    pub loss_floor: i64,
    /// Friendly army value at which a choke starts to hurt.
    pub choke_full_strength: i64,
    /// Friendly army value at which a choke halves enemy losses.
    pub choke_half_strength: i64,
    /// Enemy swarm units above this count trigger the swarm correction.
    pub swarm_threshold: u32,
    /// Swarm count at which friendly losses are halved.
    pub swarm_half_count: u32,
    /// Friendly value that keeps a rush going while retreating.
    pub rush_min_value: i64,
    /// Friendly value that keeps a rush going while advancing.
    pub rush_min_value_advancing: i64,
    /// Enemy-to-friendly loss ratio a rush accepts, in percent.
    pub rush_trade_percent: i64,
    /// Enemy-to-friendly remaining value ratio below which the friendly
    /// side presses the attack, in percent.
    pub outnumber_percent: i64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            burst_frames: 24,
            max_bursts: 6,
            min_bursts: 3,
            narrow_choke_width: 96,
            loss_floor: 50,
            choke_full_strength: 1000,
            choke_half_strength: 3000,
            swarm_threshold: 10,
            swarm_half_count: 25,
            rush_min_value: 300,
            rush_min_value_advancing: 100,
            rush_trade_percent: 50,
            outnumber_percent: 50,
        }
    }
}

// ============================================================================
// Request / Result
// ============================================================================

/// Where and how to look for a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionRequest {
    /// Forward-most friendly position.
    pub friendly_vanguard: Position,
    /// Forward-most known enemy position.
    pub enemy_vanguard: Position,
    /// Search radius around each vanguard, in pixels.
    pub radius: i32,
    /// Which enemy sightings count.
    pub mode: DetectionMode,
    /// Enemy unit kinds to leave out.
    pub exclusions: Exclusions,
    /// Whether the friendly side is rushing.
    pub rushing: bool,
    /// Whether the friendly side is currently falling back.
    pub currently_retreating: bool,
    /// Current game frame, for construction estimates.
    pub frame: u32,
}

/// Ternary engagement verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum Verdict {
    /// Engage.
    Attack = 1,
    /// Nothing would happen; skip the fight.
    NoResult = 0,
    /// Stay away.
    DoNotAttack = -1,
}

impl Verdict {
    /// Numeric form: 1, 0 or -1.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }
}

/// Which rule produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecidingRule {
    /// Net gain after enough bursts, with a safe margin.
    ProjectedGain,
    /// Rush is trading acceptably.
    RushTrade,
    /// Neither side lost anything.
    NoChange,
    /// The enemy is left with a fraction of the friendly value.
    Outnumbered,
    /// The friendly side lost a smaller share of its value.
    EfficientTrade,
    /// None of the above.
    Unfavorable,
}

/// Terrain and composition corrections in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Corrections {
    /// The way to the enemy crosses a narrow passage.
    pub narrow_choke: bool,
    /// Enemy ground height minus friendly ground height.
    pub elevation_difference: i32,
    /// Enemy swarm units.
    pub swarm_count: u32,
}

/// Outcome of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// The verdict.
    pub verdict: Verdict,
    /// Rule that decided it.
    pub rule: DecidingRule,
    /// Scores before the first burst.
    pub initial: SideScores,
    /// Scores after the last burst.
    pub final_scores: SideScores,
    /// Corrected friendly loss.
    pub friendly_change: i64,
    /// Corrected enemy loss.
    pub enemy_change: i64,
    /// Bursts run.
    pub bursts: u32,
    /// Corrections applied to the losses.
    pub corrections: Corrections,
}

// ============================================================================
// Predictor
// ============================================================================

/// Runs predictions against shared, read-only game knowledge.
pub struct CombatPredictor<'a> {
    builder: SnapshotBuilder<'a>,
    terrain: &'a dyn TerrainQuery,
    config: PredictorConfig,
}

impl<'a> CombatPredictor<'a> {
    /// Create a predictor.
    #[must_use]
    pub fn new(
        catalog: &'a UnitCatalog,
        upgrades: &'a dyn UpgradeLookup,
        terrain: &'a dyn TerrainQuery,
        config: PredictorConfig,
    ) -> Self {
        Self {
            builder: SnapshotBuilder::new(catalog, upgrades, terrain),
            terrain,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Pick the rosters from `records` without simulating.
    #[must_use]
    pub fn assemble(&self, records: &[UnitRecord], request: &PredictionRequest) -> Engagement {
        roster::assemble(&self.builder, records, request)
    }

    /// Assemble rosters from `records` and decide.
    #[must_use]
    pub fn predict(&self, records: &[UnitRecord], request: &PredictionRequest) -> Prediction {
        let mut engagement = self.assemble(records, request);
        self.decide(&mut engagement, request)
    }

    /// Decide on an already assembled engagement.
    ///
    /// Runs the engagement's simulation forward.
    pub fn decide(&self, engagement: &mut Engagement, request: &PredictionRequest) -> Prediction {
        let config = &self.config;
        let corrections = self.corrections(engagement, request);
        let initial = engagement.sim.scores();

        let mut prediction = Prediction {
            verdict: Verdict::NoResult,
            rule: DecidingRule::NoChange,
            initial,
            final_scores: initial,
            friendly_change: 0,
            enemy_change: 0,
            bursts: 0,
            corrections,
        };

        for burst in 1..=config.max_bursts {
            engagement.sim.simulate(config.burst_frames);
            let now = engagement.sim.scores();
            let (ours, theirs) = self.corrected_changes(&initial, &now, &corrections);

            prediction.bursts = burst;
            prediction.final_scores = now;
            prediction.friendly_change = ours;
            prediction.enemy_change = theirs;

            let friendly = now.friendly.total;
            let enemy = now.enemy.total;
            tracing::debug!(
                burst,
                friendly,
                enemy,
                gain = theirs - ours,
                "Burst simulated"
            );

            if burst < config.min_bursts {
                continue;
            }
            if let Some((verdict, rule)) = self.early_verdict(&initial, &now, ours, theirs, request) {
                return finish(prediction, verdict, rule);
            }
        }

        let (verdict, rule) = self.final_verdict(
            &initial,
            &prediction.final_scores,
            prediction.friendly_change,
            prediction.enemy_change,
        );
        finish(prediction, verdict, rule)
    }

    /// Verdict that may end the burst loop early, given corrected losses
    /// `ours` and `theirs`.
    fn early_verdict(
        &self,
        initial: &SideScores,
        now: &SideScores,
        ours: i64,
        theirs: i64,
        request: &PredictionRequest,
    ) -> Option<(Verdict, DecidingRule)> {
        let config = &self.config;
        let friendly = now.friendly.total;
        let enemy = now.enemy.total;

        if theirs > ours
            && (friendly >= enemy
                || friendly >= initial.friendly.total - config.loss_floor
                || theirs - ours > enemy - friendly)
        {
            return Some((Verdict::Attack, DecidingRule::ProjectedGain));
        }

        if request.rushing {
            let floor = if request.currently_retreating {
                config.rush_min_value
            } else {
                config.rush_min_value_advancing
            };
            let enemy_delta = enemy - initial.enemy.total;
            let friendly_delta = friendly - initial.friendly.total;
            if friendly >= floor && ratio_exceeds(enemy_delta, friendly_delta, config.rush_trade_percent) {
                return Some((Verdict::Attack, DecidingRule::RushTrade));
            }
        }

        None
    }

    /// Verdict once every burst has run.
    fn final_verdict(&self, initial: &SideScores, now: &SideScores, ours: i64, theirs: i64) -> (Verdict, DecidingRule) {
        if now.friendly.total == initial.friendly.total && now.enemy.total == initial.enemy.total {
            return (Verdict::NoResult, DecidingRule::NoChange);
        }

        if now.friendly.total > 0 && 100 * now.enemy.total < self.config.outnumber_percent * now.friendly.total {
            return (Verdict::Attack, DecidingRule::Outnumbered);
        }

        // ours / initial_ours < theirs / initial_theirs
        if initial.friendly.total > 0
            && initial.enemy.total > 0
            && i128::from(ours) * i128::from(initial.enemy.total) < i128::from(theirs) * i128::from(initial.friendly.total)
        {
            return (Verdict::Attack, DecidingRule::EfficientTrade);
        }

        (Verdict::DoNotAttack, DecidingRule::Unfavorable)
    }

    fn corrections(&self, engagement: &Engagement, request: &PredictionRequest) -> Corrections {
        let mut corrections = Corrections {
            swarm_count: engagement.swarm_count,
            ..Corrections::default()
        };

        if engagement.air_battle || request.rushing {
            return corrections;
        }
        let Some(centroid) = engagement.friendly_centroid else {
            return corrections;
        };

        corrections.narrow_choke = self
            .terrain
            .narrowest_choke_between(centroid, request.enemy_vanguard)
            .is_some_and(|width| width < self.config.narrow_choke_width);

        if let (Some(theirs), Some(ours)) = (
            self.terrain.ground_height(request.enemy_vanguard),
            self.terrain.ground_height(centroid),
        ) {
            corrections.elevation_difference = theirs - ours;
        }

        if corrections.narrow_choke {
            tracing::debug!(
                elevation_difference = corrections.elevation_difference,
                "Fight crosses a narrow choke"
            );
        }
        corrections
    }

    /// Friendly and enemy losses since `initial`, with corrections applied.
    fn corrected_changes(&self, initial: &SideScores, now: &SideScores, corrections: &Corrections) -> (i64, i64) {
        let config = &self.config;
        let mut ours = initial.friendly.total - now.friendly.total;
        let mut theirs = initial.enemy.total - now.enemy.total;

        if corrections.narrow_choke {
            theirs = scale_down(
                theirs,
                initial.friendly.total,
                config.choke_full_strength,
                config.choke_half_strength,
            );

            if corrections.elevation_difference > 0 {
                theirs /= 2;
            } else if corrections.elevation_difference < 0 {
                ours = ours * 2 / 3;
            }
        }

        if corrections.swarm_count > config.swarm_threshold {
            ours = scale_down(
                ours,
                i64::from(corrections.swarm_count),
                i64::from(config.swarm_threshold),
                i64::from(config.swarm_half_count),
            );
        }

        (ours, theirs)
    }
}

fn finish(mut prediction: Prediction, verdict: Verdict, rule: DecidingRule) -> Prediction {
    prediction.verdict = verdict;
    prediction.rule = rule;
    tracing::debug!(?verdict, ?rule, bursts = prediction.bursts, "Combat prediction");
    prediction
}

/// Scale `change` by a factor that falls linearly from 1 at `full` to 1/2
/// at `half` and stays within those bounds, rounding up.
fn scale_down(change: i64, x: i64, full: i64, half: i64) -> i64 {
    let span = half - full;
    let (numerator, denominator) = if span <= 0 {
        if x > full {
            (1, 2)
        } else {
            (1, 1)
        }
    } else {
        ((2 * span - (x - full)).clamp(span, 2 * span), 2 * span)
    };
    ceil_div(change * numerator, denominator)
}

/// `a / b` rounded toward positive infinity, for `b > 0`.
fn ceil_div(a: i64, b: i64) -> i64 {
    -((-a).div_euclid(b))
}

/// `numerator / denominator > percent / 100` without dividing.
///
/// A zero denominator only passes for a positive numerator.
fn ratio_exceeds(numerator: i64, denominator: i64, percent: i64) -> bool {
    let lhs = i128::from(numerator) * 100;
    let rhs = i128::from(percent) * i128::from(denominator);
    match denominator.signum() {
        1 => lhs > rhs,
        -1 => lhs < rhs,
        _ => numerator > 0,
    }
}
