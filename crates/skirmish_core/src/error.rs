//! Error types for catalog loading and snapshot construction.
//!
//! The simulation and decision paths themselves never fail; these errors
//! only surface at the data edges (catalog parsing, type lookups).

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for the combat predictor.
#[derive(Debug, Error)]
pub enum SimError {
    /// Catalog data file could not be parsed.
    #[error("Failed to parse catalog data '{source_name}': {message}")]
    DataParseError {
        /// Name of the data source (file path or "builtin").
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Catalog data parsed but is internally inconsistent.
    #[error("Invalid catalog data for '{unit}': {reason}")]
    InvalidCatalog {
        /// Unit type the problem was found on.
        unit: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Unit type id does not exist in the catalog.
    #[error("Unknown unit type id: {0}")]
    UnknownUnitTypeId(u16),

    /// Unit type name does not exist in the catalog.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),
}
