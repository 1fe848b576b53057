//! Core domain types for the fuel-cost engine.
//!
//! The engine selects vehicles able to carry a load, derates their nominal
//! fuel efficiency for cargo weight and ambient temperature, prices the route
//! with the fuel price in effect, and ranks the results by the caller's
//! priority. Reference data is reached only through [`ReferenceStore`].
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod adjustment;
mod catalog;
mod estimate;
mod pipeline;
mod price;
mod rank;
mod route;
mod selector;
pub mod store;
mod vehicle;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use adjustment::{
    Adjustment, AdjustmentBand, AdjustmentBandError, AdjustmentTables, BandSet,
    resolve_adjustment,
};
pub use catalog::{ReferenceCatalog, ReferenceCatalogError};
pub use estimate::{
    DISPLAY_DECIMALS, DegenerateEstimate, EstimateRow, RankedEstimate, adjusted_efficiency,
    estimate, format_fixed,
};
pub use pipeline::{
    EstimateError, EstimateRequest, EstimateRequestValidationError, EstimateResponse,
    Estimator, ExcludedCandidate, FuelCostEstimator,
};
pub use price::{FuelPriceError, FuelPricePoint, latest_price};
pub use rank::{Priority, rank};
pub use route::{HIGHWAYS_PREFERENCE, RouteSummary, RouteSummaryError, road_type_for_preference};
pub use selector::{CandidateQuery, select_candidates};
pub use store::{ReferenceStore, StoreError};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteReferenceStore, SqliteReferenceStoreError};
pub use vehicle::{
    ALL_CLASSES, MAX_SECURITY_RATING, ParseLabelError, RoadType, Vehicle, VehicleCandidate,
    VehicleClass, VehicleClassFilter, VehicleError, VehicleProfile,
};
