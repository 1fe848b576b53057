//! Facade crate for the fuel-cost estimation engine.
//!
//! This crate re-exports the core domain types and exposes the SQLite
//! reference store behind a feature flag.

#![forbid(unsafe_code)]

pub use fuelcost_core::{
    Adjustment, CandidateQuery, DegenerateEstimate, EstimateError, EstimateRequest, EstimateRow,
    EstimateResponse, Estimator, ExcludedCandidate, FuelCostEstimator, FuelPricePoint, Priority,
    RankedEstimate, ReferenceCatalog, ReferenceStore, RoadType, RouteSummary, StoreError, Vehicle,
    VehicleCandidate, VehicleClass, VehicleClassFilter, VehicleProfile,
};

#[cfg(feature = "store-sqlite")]
pub use fuelcost_core::{SqliteReferenceStore, SqliteReferenceStoreError};
