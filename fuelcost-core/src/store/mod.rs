//! Read access to vehicle, adjustment and price reference data.
//!
//! The [`ReferenceStore`] trait is the only way the estimation pipeline
//! touches reference data. Callers own the store (and any connection it
//! holds) and pass it into [`crate::FuelCostEstimator`].

use chrono::NaiveDate;
use thiserror::Error;

use crate::{CandidateQuery, FuelPricePoint, VehicleCandidate};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{DATE_FORMAT, REFERENCE_SCHEMA, SqliteReferenceStore, SqliteReferenceStoreError};

/// Boxed error produced by a storage backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`ReferenceStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not answer a query.
    #[error("reference store failed to {operation}: {source}")]
    Query {
        /// The query that failed.
        operation: &'static str,
        /// Backend error.
        #[source]
        source: BackendError,
    },
    /// A stored row could not be interpreted.
    #[error("reference store returned a malformed {entity}: {message}")]
    Malformed {
        /// Kind of row being decoded.
        entity: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl StoreError {
    /// Wrap a backend failure for `operation`.
    pub fn query<E>(operation: &'static str, source: E) -> Self
    where
        E: Into<BackendError>,
    {
        Self::Query {
            operation,
            source: source.into(),
        }
    }
}

/// Read-only access to reference tables.
///
/// Every lookup is independent; implementations must not require calls in a
/// particular order.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use fuelcost_core::{
///     CandidateQuery, FuelPricePoint, ReferenceStore, RoadType, VehicleCandidate,
///     VehicleClassFilter,
/// };
/// use fuelcost_core::store::StoreError;
///
/// struct EmptyStore;
///
/// impl ReferenceStore for EmptyStore {
///     fn select_candidates(
///         &self,
///         _query: &CandidateQuery,
///     ) -> Result<Vec<VehicleCandidate>, StoreError> {
///         Ok(Vec::new())
///     }
///
///     fn weight_adjustment(&self, _weight: f64) -> Result<Option<f64>, StoreError> {
///         Ok(None)
///     }
///
///     fn temperature_adjustment(&self, _temperature: f64) -> Result<Option<f64>, StoreError> {
///         Ok(None)
///     }
///
///     fn latest_price(
///         &self,
///         _fuel_type: &str,
///         _as_of: NaiveDate,
///     ) -> Result<Option<FuelPricePoint>, StoreError> {
///         Ok(None)
///     }
/// }
///
/// let query = CandidateQuery {
///     min_capacity: 0.0,
///     road_type: RoadType::Average,
///     class: VehicleClassFilter::All,
/// };
/// assert!(EmptyStore.select_candidates(&query).expect("query succeeds").is_empty());
/// ```
pub trait ReferenceStore: Send + Sync {
    /// Vehicles satisfying `query`, ordered by ascending id.
    fn select_candidates(&self, query: &CandidateQuery)
    -> Result<Vec<VehicleCandidate>, StoreError>;

    /// Penalty of the weight band containing `weight`, if any.
    fn weight_adjustment(&self, weight: f64) -> Result<Option<f64>, StoreError>;

    /// Penalty of the temperature band containing `temperature`, if any.
    fn temperature_adjustment(&self, temperature: f64) -> Result<Option<f64>, StoreError>;

    /// Most recent price for `fuel_type` effective on or before `as_of`.
    fn latest_price(
        &self,
        fuel_type: &str,
        as_of: NaiveDate,
    ) -> Result<Option<FuelPricePoint>, StoreError>;
}

impl<S: ReferenceStore + ?Sized> ReferenceStore for &S {
    fn select_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<VehicleCandidate>, StoreError> {
        (**self).select_candidates(query)
    }

    fn weight_adjustment(&self, weight: f64) -> Result<Option<f64>, StoreError> {
        (**self).weight_adjustment(weight)
    }

    fn temperature_adjustment(&self, temperature: f64) -> Result<Option<f64>, StoreError> {
        (**self).temperature_adjustment(temperature)
    }

    fn latest_price(
        &self,
        fuel_type: &str,
        as_of: NaiveDate,
    ) -> Result<Option<FuelPricePoint>, StoreError> {
        (**self).latest_price(fuel_type, as_of)
    }
}
