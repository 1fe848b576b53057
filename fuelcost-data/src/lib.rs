//! Reference data loading and persistence for the fuel-cost engine.
//!
//! Datasets are JSON documents describing the vehicle fleet, efficiency
//! adjustment bands and fuel price history. They can be validated into a
//! [`fuelcost_core::ReferenceCatalog`] or written to the SQLite schema read by
//! [`fuelcost_core::SqliteReferenceStore`].
#![forbid(unsafe_code)]

mod dataset;
pub mod fs;
mod sqlite;

pub use dataset::{
    BandRecord, DatasetError, FuelPriceRecord, ReferenceDataset, VehicleRecord, default_dataset,
    load_catalog, load_dataset,
};
pub use sqlite::{PersistReferenceError, SeedSummary, persist_reference_data};
