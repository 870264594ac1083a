//! Headless prediction runner for scenario files and CI verification.
//!
//! Scenarios are RON files describing the units both sides know about,
//! researched upgrades, terrain and the prediction request. The runner
//! evaluates them with [`skirmish_core`] and reports the outcome as JSON:
//!
//! - **stdout**: Reports (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Evaluate one scenario
//! cargo run -p skirmish_headless -- run --scenario scenarios/choke_assault.ron
//!
//! # Evaluate a directory of scenarios in parallel
//! cargo run -p skirmish_headless -- batch --input scenarios --output results/batch.json
//!
//! # List the unit catalog
//! cargo run -p skirmish_headless -- catalog
//! ```

pub mod batch;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use runner::{evaluate, PredictionReport};
pub use scenario::{Scenario, ScenarioError, TerrainSetup, UnitPlacement};

use std::path::Path;

use skirmish_core::data::UnitCatalog;
use skirmish_core::error::SimError;

/// Load a catalog from a RON file, or the built-in one when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<UnitCatalog, ScenarioError> {
    let Some(path) = path else {
        return UnitCatalog::builtin().map_err(|source| ScenarioError::InvalidUnits {
            scenario: "builtin catalog".to_string(),
            source,
        });
    };

    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    let source_name = path.display().to_string();
    UnitCatalog::from_ron_str(&source_name, &text).map_err(|source: SimError| ScenarioError::InvalidUnits {
        scenario: source_name.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = load_catalog(None).unwrap();
        assert!(catalog.find("terran_marine").is_some());
    }

    #[test]
    fn test_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("units.ron");
        std::fs::write(
            &path,
            r#"
            CatalogData(units: [
                UnitData(
                    name: "training_dummy",
                    race: Terran,
                    size: Large,
                    hit_points: 500,
                    top_speed: 0.0,
                    dimensions: (left: 16, up: 16, right: 16, down: 16),
                    destroy_score: 10,
                ),
            ])
            "#,
        )
        .unwrap();

        let catalog = load_catalog(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("training_dummy").is_some());
    }

    #[test]
    fn test_catalog_errors() {
        let err = load_catalog(Some(Path::new("missing/units.ron"))).unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "CatalogData(units: [").unwrap();
        let err = load_catalog(Some(&path)).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidUnits { .. }));
    }
}
