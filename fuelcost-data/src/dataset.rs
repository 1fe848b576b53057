//! JSON reference datasets.
//!
//! A dataset is the portable form of a [`ReferenceCatalog`]: vehicles with
//! their per-road efficiencies, the weight and temperature bands, and the
//! fuel price history. [`ReferenceDataset::into_catalog`] applies the same
//! validation as the catalogue constructors.

use std::collections::BTreeMap;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use fuelcost_core::{
    AdjustmentBand, AdjustmentBandError, AdjustmentTables, BandSet, FuelPriceError,
    FuelPricePoint, ReferenceCatalog, ReferenceCatalogError, RoadType, Vehicle, VehicleClass,
    VehicleError, VehicleProfile,
};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fs::open_utf8_file;

const BUNDLED_DATASET: &str = include_str!("../assets/reference_dataset.json");

/// Errors raised while loading or validating a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be opened.
    #[error("failed to open dataset {path}")]
    Open {
        /// Dataset location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading the dataset file failed.
    #[error("failed to read dataset {path}")]
    Read {
        /// Dataset location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The dataset is not valid JSON for the expected shape.
    #[error("failed to parse dataset {origin}")]
    Parse {
        /// File path, or `bundled` for the embedded dataset.
        origin: String,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A vehicle record failed validation.
    #[error(transparent)]
    Vehicle(#[from] VehicleError),
    /// A band record failed validation.
    #[error("invalid {table} band")]
    Band {
        /// `weight` or `temperature`.
        table: &'static str,
        /// Validation failure.
        #[source]
        source: AdjustmentBandError,
    },
    /// A price record failed validation.
    #[error(transparent)]
    Price(#[from] FuelPriceError),
    /// The assembled catalogue is inconsistent.
    #[error(transparent)]
    Catalog(#[from] ReferenceCatalogError),
}

/// One vehicle and its nominal efficiencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VehicleRecord {
    /// Stable identifier.
    pub id: u64,
    /// Propulsion class.
    pub vehicle_type: VehicleClass,
    /// Size category label.
    pub category: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Maximum load in kilograms.
    pub max_load_capacity: f64,
    /// Safety rating from 0 to 10.
    #[serde(default)]
    pub security_score: Option<u8>,
    /// Nominal distance per fuel unit keyed by road type.
    #[serde(default)]
    pub efficiencies: BTreeMap<RoadType, f64>,
}

/// One adjustment band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandRecord {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Efficiency penalty in percent.
    pub adjustment: f64,
}

/// One fuel price effective from a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FuelPriceRecord {
    /// Fuel label.
    pub fuel_type: String,
    /// First day the price applies.
    pub validity_date: NaiveDate,
    /// Price per fuel unit.
    pub price: f64,
    /// ISO currency code.
    pub currency: String,
}

/// Complete reference data in its serialised form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReferenceDataset {
    /// Vehicle fleet.
    pub vehicles: Vec<VehicleRecord>,
    /// Weight bands in kilograms.
    pub weight_bands: Vec<BandRecord>,
    /// Temperature bands in degrees Celsius.
    pub temperature_bands: Vec<BandRecord>,
    /// Fuel price history.
    pub fuel_prices: Vec<FuelPriceRecord>,
}

impl ReferenceDataset {
    /// Parse a dataset from JSON text. `origin` names the source in errors.
    pub fn from_json(text: &str, origin: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(text).map_err(|source| DatasetError::Parse {
            origin: origin.to_owned(),
            source,
        })
    }

    /// Validate every record and assemble a [`ReferenceCatalog`].
    pub fn into_catalog(self) -> Result<ReferenceCatalog, DatasetError> {
        let vehicles = self
            .vehicles
            .into_iter()
            .map(VehicleRecord::into_vehicle)
            .collect::<Result<Vec<_>, _>>()?;
        let adjustments = AdjustmentTables {
            weight: band_set("weight", &self.weight_bands)?,
            temperature: band_set("temperature", &self.temperature_bands)?,
        };
        let fuel_prices = self
            .fuel_prices
            .into_iter()
            .map(|record| {
                FuelPricePoint::new(
                    record.fuel_type,
                    record.validity_date,
                    record.price,
                    record.currency,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "assembled catalogue with {} vehicles and {} prices",
            vehicles.len(),
            fuel_prices.len()
        );
        Ok(ReferenceCatalog::new(vehicles, adjustments, fuel_prices)?)
    }
}

impl VehicleRecord {
    fn into_vehicle(self) -> Result<Vehicle, VehicleError> {
        Vehicle::new(
            VehicleProfile {
                id: self.id,
                class: self.vehicle_type,
                category: self.category,
                brand: self.brand,
                model: self.model,
                max_load_capacity: self.max_load_capacity,
                security_rating: self.security_score,
            },
            self.efficiencies,
        )
    }
}

fn band_set(table: &'static str, records: &[BandRecord]) -> Result<BandSet, DatasetError> {
    records
        .iter()
        .map(|record| AdjustmentBand::new(record.min, record.max, record.adjustment))
        .collect::<Result<Vec<_>, _>>()
        .and_then(BandSet::new)
        .map_err(|source| DatasetError::Band { table, source })
}

/// The reference dataset shipped with the crate.
///
/// # Examples
/// ```
/// let dataset = fuelcost_data::default_dataset().expect("bundled dataset parses");
/// assert_eq!(dataset.fuel_prices.len(), 8);
/// ```
pub fn default_dataset() -> Result<ReferenceDataset, DatasetError> {
    ReferenceDataset::from_json(BUNDLED_DATASET, "bundled")
}

/// Read a dataset from a JSON file.
pub fn load_dataset(path: &Utf8Path) -> Result<ReferenceDataset, DatasetError> {
    let mut file = open_utf8_file(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    ReferenceDataset::from_json(&text, path.as_str())
}

/// Read and validate a dataset file in one step.
pub fn load_catalog(path: &Utf8Path) -> Result<ReferenceCatalog, DatasetError> {
    load_dataset(path)?.into_catalog()
}
