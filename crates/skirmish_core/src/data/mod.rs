//! Unit type data.
//!
//! [`unit_data`] holds the plain structures deserialized from RON;
//! [`catalog`] validates them and assigns ids.
//!
//! **Note:** This module contains no IO. Callers that want a catalog from
//! disk read the file themselves and pass the text to
//! [`UnitCatalog::from_ron_str`].

mod catalog;
mod unit_data;

pub use catalog::{Archetype, BunkerRule, CarrierRule, DiscountRule, UnitCatalog, UnitType};
pub use unit_data::{
    ArchetypeData, CatalogData, CooldownUpgrade, DiscountData, KiteRule, RangeUpgrade, SpeedUpgrade, UnitData,
    WeaponData,
};
