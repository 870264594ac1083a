//! # Skirmish Core
//!
//! Fast combat outcome prediction for a real-time strategy bot.
//!
//! This crate contains **only** deterministic logic:
//! - No IO (catalog text is passed in by the caller)
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! A prediction takes a list of known units, builds a snapshot of each,
//! simulates a few seconds of fighting in one-second bursts and turns the
//! value each side lost into an attack/hold verdict.
//!
//! ## Crate Structure
//!
//! - [`data`] - Unit type catalog loaded from RON
//! - [`upgrades`] - Researched upgrade levels per side
//! - [`terrain`] - Ground height and choke lookups
//! - [`snapshot`] - Per-unit combat state and its construction
//! - [`combat`] - Damage resolution
//! - [`simulation`] - Frame-stepped engine
//! - [`scoring`] - Army value
//! - [`roster`] - Selecting units for a prediction
//! - [`decision`] - Verdict policy
//! - [`math`] - Fixed-point and distance utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod components;
pub mod data;
pub mod decision;
pub mod error;
pub mod factions;
pub mod math;
pub mod roster;
pub mod scoring;
pub mod simulation;
pub mod snapshot;
pub mod terrain;
pub mod unit_kind;
pub mod upgrades;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::{DamageType, Side, UnitSize};
    pub use crate::data::UnitCatalog;
    pub use crate::decision::{CombatPredictor, Prediction, PredictionRequest, PredictorConfig, Verdict};
    pub use crate::error::{Result, SimError};
    pub use crate::factions::Race;
    pub use crate::math::{Fixed, Hp, Position};
    pub use crate::roster::{DetectionMode, Exclusions};
    pub use crate::scoring::{ScoreBreakdown, SideScores};
    pub use crate::simulation::{BurstReport, CombatSim, StopReason};
    pub use crate::snapshot::{SnapshotBuilder, UnitRecord, UnitSnapshot};
    pub use crate::terrain::{FlatTerrain, GridTerrain, TerrainQuery};
    pub use crate::unit_kind::{UnitTraits, UnitTypeId};
    pub use crate::upgrades::{KnownUpgrades, NoUpgrades, UpgradeLookup, UpgradeType};
}
