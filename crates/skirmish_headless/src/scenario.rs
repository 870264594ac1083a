//! Scenario loading and configuration.
//!
//! A scenario describes one engagement to predict: the units both sides
//! know about, researched upgrades, the map around the fight and the
//! request parameters handed to the predictor.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::components::Side;
use skirmish_core::data::UnitCatalog;
use skirmish_core::decision::{PredictionRequest, PredictorConfig};
use skirmish_core::error::SimError;
use skirmish_core::math::Position;
use skirmish_core::snapshot::UnitRecord;
use skirmish_core::terrain::{FlatTerrain, GridTerrain, TerrainQuery};
use skirmish_core::upgrades::KnownUpgrades;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario names a unit type the catalog does not have.
    #[error("Scenario '{scenario}' is invalid: {source}")]
    InvalidUnits {
        /// Scenario name.
        scenario: String,
        /// Underlying catalog error.
        source: SimError,
    },
}

/// Map around the engagement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainSetup {
    /// Level ground, no chokes.
    #[default]
    Flat,
    /// Tile grid with plateaus and chokes.
    Grid(GridTerrain),
}

impl TerrainSetup {
    /// Terrain as a query object.
    #[must_use]
    pub fn query(&self) -> &dyn TerrainQuery {
        match self {
            Self::Flat => &FlatTerrain,
            Self::Grid(grid) => grid,
        }
    }
}

/// One or more units of a type placed in a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Catalog name of the unit type.
    pub unit: String,
    /// Owning side.
    pub side: Side,
    /// Position of the first unit.
    pub position: (i32, i32),
    /// Number of units.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Horizontal gap between units, in pixels.
    #[serde(default = "default_spacing")]
    pub spacing: i32,
    /// Health override; full health when absent.
    #[serde(default)]
    pub health: Option<u32>,
    /// Shields override; full shields when absent.
    #[serde(default)]
    pub shields: Option<u32>,
    /// Last seen rather than in sight.
    #[serde(default)]
    pub hidden: bool,
    /// Seen leaving its last known position.
    #[serde(default)]
    pub gone: bool,
    /// Still under construction, finishing at this frame.
    #[serde(default)]
    pub completes_at: Option<u32>,
    /// Workers only: has an attack order.
    #[serde(default)]
    pub attacking: bool,
    /// Attack-speed buff active.
    #[serde(default)]
    pub stimmed: bool,
    /// Carriers only: fighters on board.
    #[serde(default)]
    pub fighters: Option<u32>,
    /// Frames left on the weapon cooldown.
    #[serde(default)]
    pub cooldown: u32,
}

fn default_count() -> u32 {
    1
}

fn default_spacing() -> i32 {
    24
}

impl UnitPlacement {
    /// Place `count` units of a type starting at `(x, y)`.
    #[must_use]
    pub fn new(unit: &str, side: Side, x: i32, y: i32, count: u32) -> Self {
        Self {
            unit: unit.to_string(),
            side,
            position: (x, y),
            count,
            spacing: default_spacing(),
            health: None,
            shields: None,
            hidden: false,
            gone: false,
            completes_at: None,
            attacking: false,
            stimmed: false,
            fighters: None,
            cooldown: 0,
        }
    }

    fn records(&self, catalog: &UnitCatalog) -> Result<Vec<UnitRecord>, SimError> {
        let unit_type = catalog
            .find(&self.unit)
            .ok_or_else(|| SimError::UnknownUnitType(self.unit.clone()))?;

        let (x, y) = self.position;
        let records = (0..self.count)
            .map(|i| {
                let position = Position::new(x + self.spacing * i as i32, y);
                let mut record = UnitRecord::new(
                    unit_type.id,
                    self.side,
                    position,
                    self.health.unwrap_or(unit_type.data.hit_points),
                    self.shields.unwrap_or(unit_type.data.shields),
                )
                .with_cooldown(self.cooldown);

                if self.hidden {
                    record = record.hidden();
                }
                if self.gone {
                    record = record.gone();
                }
                if let Some(frame) = self.completes_at {
                    record = record.under_construction(frame);
                }
                if self.attacking {
                    record = record.attacking();
                }
                if self.stimmed {
                    record = record.stimmed();
                }
                if let Some(fighters) = self.fighters {
                    record = record.with_fighters(fighters);
                }
                record
            })
            .collect();
        Ok(records)
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Known units on both sides.
    pub units: Vec<UnitPlacement>,
    /// Researched upgrade levels.
    #[serde(default)]
    pub upgrades: KnownUpgrades,
    /// Map around the fight.
    #[serde(default)]
    pub terrain: TerrainSetup,
    /// Vanguards, radius and mode.
    pub request: PredictionRequest,
    /// Policy overrides.
    #[serde(default)]
    pub config: PredictorConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::marines_vs_zerglings()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Twelve marines meeting eight zerglings in the open.
    #[must_use]
    pub fn marines_vs_zerglings() -> Self {
        Self {
            name: "Marines vs Zerglings".to_string(),
            description: "Open-field infantry fight".to_string(),
            units: vec![
                UnitPlacement::new("terran_marine", Side::Friendly, 200, 300, 6),
                UnitPlacement::new("terran_marine", Side::Friendly, 200, 324, 6),
                UnitPlacement::new("zerg_zergling", Side::Enemy, 600, 300, 8),
            ],
            upgrades: KnownUpgrades::default(),
            terrain: TerrainSetup::Flat,
            request: PredictionRequest {
                friendly_vanguard: Position::new(300, 300),
                enemy_vanguard: Position::new(600, 300),
                radius: 400,
                ..PredictionRequest::default()
            },
            config: PredictorConfig::default(),
        }
    }

    /// Expand placements into unit records.
    pub fn records(&self, catalog: &UnitCatalog) -> Result<Vec<UnitRecord>, ScenarioError> {
        let mut records = Vec::new();
        for placement in &self.units {
            let placed = placement
                .records(catalog)
                .map_err(|source| ScenarioError::InvalidUnits {
                    scenario: self.name.clone(),
                    source,
                })?;
            records.extend(placed);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::upgrades::UpgradeType;

    #[test]
    fn test_default_scenario() {
        let scenario = Scenario::default();
        assert_eq!(scenario.units.len(), 3);
        assert_eq!(scenario.terrain, TerrainSetup::Flat);

        let catalog = UnitCatalog::builtin().unwrap();
        let records = scenario.records(&catalog).unwrap();
        assert_eq!(records.len(), 20);
    }

    #[test]
    fn test_placement_spacing_and_flags() {
        let catalog = UnitCatalog::builtin().unwrap();
        let mut placement = UnitPlacement::new("protoss_carrier", Side::Enemy, 100, 50, 3);
        placement.spacing = 40;
        placement.hidden = true;
        placement.fighters = Some(2);
        placement.health = Some(100);

        let records = placement.records(&catalog).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].position, Position::new(180, 50));
        assert!(records.iter().all(|r| !r.visible && r.fighter_count == Some(2)));
        assert_eq!(records[0].health, 100);
    }

    #[test]
    fn test_unknown_unit_is_reported() {
        let catalog = UnitCatalog::builtin().unwrap();
        let mut scenario = Scenario::default();
        scenario.units.push(UnitPlacement::new("terran_dropship", Side::Friendly, 0, 0, 1));

        let err = scenario.records(&catalog).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidUnits { .. }));
        assert!(err.to_string().contains("terran_dropship"));
    }

    #[test]
    fn test_parse_from_ron() {
        let ron = r#"
            Scenario(
                name: "Test",
                units: [
                    UnitPlacement(unit: "terran_marine", side: Friendly, position: (100, 100), count: 4),
                    UnitPlacement(unit: "zerg_zergling", side: Enemy, position: (400, 100), hidden: true),
                ],
                upgrades: KnownUpgrades(
                    friendly: { TerranInfantryWeapons: 1 },
                ),
                terrain: Grid(GridTerrain(
                    width: 32,
                    height: 32,
                    chokes: [Choke(center: (x: 250, y: 100), width: 64)],
                )),
                request: PredictionRequest(
                    friendly_vanguard: (x: 100, y: 100),
                    enemy_vanguard: (x: 400, y: 100),
                    radius: 320,
                ),
                config: PredictorConfig(max_bursts: 4),
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.name, "Test");
        assert_eq!(scenario.units[0].count, 4);
        assert_eq!(scenario.units[1].count, 1);
        assert!(scenario.units[1].hidden);
        assert_eq!(scenario.upgrades.friendly.get(&UpgradeType::TerranInfantryWeapons), Some(&1));
        assert_eq!(scenario.request.radius, 320);
        assert_eq!(scenario.config.max_bursts, 4);
        assert_eq!(scenario.config.burst_frames, 24);
        assert_eq!(
            scenario.terrain.query().narrowest_choke_between(Position::new(100, 100), Position::new(400, 100)),
            Some(64)
        );
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }
}
