//! Batch scenario runner.
//!
//! Evaluates many scenario files in parallel using rayon. Predictions share
//! the catalog read-only, so each scenario runs on its own worker with no
//! coordination beyond collecting results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use skirmish_core::data::UnitCatalog;

use crate::runner::{evaluate, PredictionReport};
use crate::scenario::Scenario;

/// Configuration for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario files to evaluate.
    pub scenarios: Vec<PathBuf>,
    /// Maximum parallel predictions (0 = use rayon default).
    pub parallel: usize,
}

impl BatchConfig {
    /// Collect every `.ron` file in a directory, sorted by path.
    pub fn from_dir(dir: &Path) -> std::io::Result<Self> {
        let mut scenarios: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        scenarios.sort();
        Ok(Self {
            scenarios,
            parallel: 0,
        })
    }

    /// Set the worker count.
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Verdict counts across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Scenarios evaluated.
    pub total: usize,
    /// Verdict `1`.
    pub attack: usize,
    /// Verdict `0`.
    pub no_result: usize,
    /// Verdict `-1`.
    pub do_not_attack: usize,
}

impl BatchSummary {
    /// Tally reports.
    pub fn from_reports(reports: &[PredictionReport]) -> Self {
        reports.iter().fold(Self::default(), |mut acc, report| {
            acc.total += 1;
            match report.verdict {
                1 => acc.attack += 1,
                0 => acc.no_result += 1,
                _ => acc.do_not_attack += 1,
            }
            acc
        })
    }
}

/// Error during batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Scenario file.
    pub path: PathBuf,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Reports in input order.
    pub reports: Vec<PredictionReport>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Scenarios that could not be evaluated.
    pub errors: Vec<BatchError>,
    /// Total runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

fn run_one(path: &Path, catalog: &UnitCatalog) -> Result<PredictionReport, BatchError> {
    Scenario::load(path)
        .and_then(|scenario| evaluate(&scenario, catalog))
        .map_err(|err| {
            warn!(path = %path.display(), error = %err, "Scenario failed");
            BatchError {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        })
}

/// Evaluate every scenario in the batch.
pub fn run_batch(config: &BatchConfig, catalog: &UnitCatalog) -> BatchResults {
    let start = Instant::now();
    info!(scenarios = config.scenarios.len(), parallel = config.parallel, "Starting batch run");

    let evaluate_all = || -> Vec<Result<PredictionReport, BatchError>> {
        config
            .scenarios
            .par_iter()
            .map(|path| run_one(path, catalog))
            .collect()
    };

    let results = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new().num_threads(config.parallel).build() {
            Ok(pool) => pool.install(evaluate_all),
            Err(err) => {
                warn!(error = %err, "Could not build thread pool, using the global one");
                evaluate_all()
            }
        }
    } else {
        evaluate_all()
    };

    let (reports, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let reports: Vec<PredictionReport> = reports.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_reports(&reports);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        evaluated = reports.len(),
        failed = errors.len(),
        duration_secs = format!("{duration_seconds:.2}"),
        "Batch complete"
    );

    BatchResults {
        reports,
        summary,
        errors,
        duration_seconds,
    }
}
