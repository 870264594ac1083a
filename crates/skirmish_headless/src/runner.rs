//! Single-scenario evaluation.
//!
//! Turns a [`Scenario`] into a [`PredictionReport`]: records are expanded
//! against the catalog, rosters assembled, and the decision policy run.

use serde::{Deserialize, Serialize};

use skirmish_core::components::Side;
use skirmish_core::data::UnitCatalog;
use skirmish_core::decision::{CombatPredictor, Corrections, DecidingRule, Prediction};
use skirmish_core::scoring::SideScores;

use crate::scenario::{Scenario, ScenarioError};

/// Everything a run prints about one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Scenario name.
    pub scenario: String,
    /// `1` attack, `0` no result, `-1` do not attack.
    pub verdict: i8,
    /// Rule that produced the verdict.
    pub rule: DecidingRule,
    /// Bursts simulated.
    pub bursts: u32,
    /// Units selected for the friendly roster.
    pub friendly_units: usize,
    /// Units selected for the enemy roster.
    pub enemy_units: usize,
    /// Scores before simulating.
    pub initial: SideScores,
    /// Scores after the last burst.
    pub final_scores: SideScores,
    /// Corrected friendly loss.
    pub friendly_change: i64,
    /// Corrected enemy loss.
    pub enemy_change: i64,
    /// Terrain and swarm corrections in effect.
    pub corrections: Corrections,
    /// Frame number the simulation reached.
    pub frames_simulated: u64,
}

impl PredictionReport {
    fn new(scenario: &str, prediction: &Prediction, friendly_units: usize, enemy_units: usize, frames: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            verdict: prediction.verdict.as_i8(),
            rule: prediction.rule,
            bursts: prediction.bursts,
            friendly_units,
            enemy_units,
            initial: prediction.initial,
            final_scores: prediction.final_scores,
            friendly_change: prediction.friendly_change,
            enemy_change: prediction.enemy_change,
            corrections: prediction.corrections,
            frames_simulated: frames,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run the predictor on a scenario.
pub fn evaluate(scenario: &Scenario, catalog: &UnitCatalog) -> Result<PredictionReport, ScenarioError> {
    let records = scenario.records(catalog)?;
    let predictor = CombatPredictor::new(catalog, &scenario.upgrades, scenario.terrain.query(), scenario.config);

    let mut engagement = predictor.assemble(&records, &scenario.request);
    let friendly_units = engagement.sim.roster(Side::Friendly).len();
    let enemy_units = engagement.sim.roster(Side::Enemy).len();

    let prediction = predictor.decide(&mut engagement, &scenario.request);
    tracing::info!(
        scenario = %scenario.name,
        verdict = prediction.verdict.as_i8(),
        rule = ?prediction.rule,
        bursts = prediction.bursts,
        "Prediction finished"
    );

    Ok(PredictionReport::new(
        &scenario.name,
        &prediction,
        friendly_units,
        enemy_units,
        engagement.sim.frame(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::UnitPlacement;

    #[test]
    fn test_default_scenario_reports() {
        let catalog = UnitCatalog::builtin().unwrap();
        let report = evaluate(&Scenario::default(), &catalog).unwrap();

        assert_eq!(report.scenario, "Marines vs Zerglings");
        assert_eq!(report.friendly_units, 12);
        assert_eq!(report.enemy_units, 8);
        assert_eq!(report.initial.friendly.total, 1200);
        assert_eq!(report.initial.enemy.total, 400);
        assert!(report.bursts >= 3 && report.bursts <= 6);
        assert!((-1..=1).contains(&report.verdict));
    }

    #[test]
    fn test_enemy_out_of_radius_gives_no_result() {
        let catalog = UnitCatalog::builtin().unwrap();
        let mut scenario = Scenario::default();
        scenario.units = vec![
            UnitPlacement::new("terran_marine", Side::Friendly, 300, 300, 4),
            UnitPlacement::new("zerg_zergling", Side::Enemy, 2000, 2000, 4),
        ];

        let report = evaluate(&scenario, &catalog).unwrap();
        assert_eq!(report.verdict, 0);
        assert_eq!(report.enemy_units, 0);
        assert_eq!(report.rule, DecidingRule::NoChange);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let catalog = UnitCatalog::builtin().unwrap();
        let report = evaluate(&Scenario::default(), &catalog).unwrap();
        let json = report.to_json().unwrap();

        let parsed: PredictionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(json.contains("\"verdict\""));
    }

    #[test]
    fn test_bundled_scenarios_evaluate() {
        let catalog = UnitCatalog::builtin().unwrap();
        let bundled = [
            include_str!("../scenarios/choke_assault.ron"),
            include_str!("../scenarios/bunker_hold.ron"),
            include_str!("../scenarios/remembered_carriers.ron"),
        ];

        for text in bundled {
            let scenario = Scenario::from_ron_str(text).unwrap();
            let report = evaluate(&scenario, &catalog).unwrap();
            assert!(report.friendly_units > 0, "{}", scenario.name);
            assert!(report.enemy_units > 0, "{}", scenario.name);
        }
    }

    #[test]
    fn test_choke_assault_attacks() {
        let catalog = UnitCatalog::builtin().unwrap();
        let scenario = Scenario::from_ron_str(include_str!("../scenarios/choke_assault.ron")).unwrap();
        let report = evaluate(&scenario, &catalog).unwrap();

        assert_eq!(report.friendly_units, 24);
        assert_eq!(report.enemy_units, 3);
        assert!(report.corrections.narrow_choke);
        assert_eq!(report.verdict, 1);
    }
}
