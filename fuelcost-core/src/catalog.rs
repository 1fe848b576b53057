//! In-memory reference data.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;
use crate::{
    AdjustmentTables, CandidateQuery, FuelPricePoint, ReferenceStore, Vehicle, VehicleCandidate,
    latest_price, select_candidates,
};

/// Errors returned by [`ReferenceCatalog::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceCatalogError {
    /// Two vehicles share an identifier.
    #[error("vehicle id {id} appears more than once")]
    DuplicateVehicle {
        /// Repeated identifier.
        id: u64,
    },
}

/// Complete reference data held in memory.
///
/// The catalogue answers [`ReferenceStore`] queries by linear scan, which
/// suits the small reference tables this engine works with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceCatalog {
    vehicles: Vec<Vehicle>,
    adjustments: AdjustmentTables,
    fuel_prices: Vec<FuelPricePoint>,
}

impl ReferenceCatalog {
    /// Validate and assemble a catalogue.
    pub fn new(
        mut vehicles: Vec<Vehicle>,
        adjustments: AdjustmentTables,
        fuel_prices: Vec<FuelPricePoint>,
    ) -> Result<Self, ReferenceCatalogError> {
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = vehicles
            .iter()
            .find(|vehicle| !seen.insert(vehicle.profile().id))
        {
            return Err(ReferenceCatalogError::DuplicateVehicle {
                id: duplicate.profile().id,
            });
        }
        vehicles.sort_by_key(|vehicle| vehicle.profile().id);
        Ok(Self {
            vehicles,
            adjustments,
            fuel_prices,
        })
    }

    /// Vehicles ordered by ascending id.
    #[must_use]
    pub const fn vehicles(&self) -> &[Vehicle] {
        self.vehicles.as_slice()
    }

    /// Weight and temperature bands.
    #[must_use]
    pub const fn adjustments(&self) -> &AdjustmentTables {
        &self.adjustments
    }

    /// Every recorded price point, in insertion order.
    #[must_use]
    pub const fn fuel_prices(&self) -> &[FuelPricePoint] {
        self.fuel_prices.as_slice()
    }
}

impl ReferenceStore for ReferenceCatalog {
    fn select_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<VehicleCandidate>, StoreError> {
        Ok(select_candidates(&self.vehicles, query))
    }

    fn weight_adjustment(&self, weight: f64) -> Result<Option<f64>, StoreError> {
        Ok(self.adjustments.weight.lookup(weight))
    }

    fn temperature_adjustment(&self, temperature: f64) -> Result<Option<f64>, StoreError> {
        Ok(self.adjustments.temperature.lookup(temperature))
    }

    fn latest_price(
        &self,
        fuel_type: &str,
        as_of: NaiveDate,
    ) -> Result<Option<FuelPricePoint>, StoreError> {
        Ok(latest_price(&self.fuel_prices, fuel_type, as_of).cloned())
    }
}
