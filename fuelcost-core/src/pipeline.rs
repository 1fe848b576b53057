//! Request pipeline: validate, select, resolve, estimate, rank.
//!
//! Adjustment and fuel price depend only on the request, so they are resolved
//! once and shared by every candidate. A candidate whose numbers degenerate is
//! dropped and reported; a storage failure fails the whole request.

use chrono::{Local, NaiveDate};
use log::{debug, warn};
use thiserror::Error;

use crate::store::StoreError;
use crate::{
    Adjustment, CandidateQuery, DegenerateEstimate, FuelPricePoint, ParseLabelError, Priority,
    RankedEstimate, ReferenceStore, RoadType, RouteSummary, RouteSummaryError,
    VehicleClassFilter, estimate, rank, resolve_adjustment,
};

/// Inputs for one estimation run.
///
/// # Examples
/// ```rust
/// use fuelcost_core::{EstimateRequest, Priority, RoadType, VehicleClass, VehicleClassFilter};
///
/// let request = EstimateRequest {
///     weight: 6000.0,
///     distance: 100.0,
///     road_type: RoadType::Average,
///     vehicle_class: VehicleClassFilter::Only(VehicleClass::Gas),
///     fuel_type: Some("Gas Licuado (GLP)".into()),
///     temperature: 0.0,
///     priority: Priority::Cost,
///     as_of: None,
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EstimateRequest {
    /// Cargo weight; also the minimum load capacity of candidates.
    pub weight: f64,
    /// Route distance.
    pub distance: f64,
    /// Road type selecting the nominal efficiency.
    pub road_type: RoadType,
    /// Class restriction (`"all"` for none).
    pub vehicle_class: VehicleClassFilter,
    /// Fuel label used for the price lookup.
    ///
    /// Labels are not checked against a fixed list: an unknown label is a
    /// price miss, not a validation error.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fuel_type: Option<String>,
    /// Ambient temperature.
    pub temperature: f64,
    /// Ranking criterion.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
    /// Date used for the price lookup; today when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub as_of: Option<NaiveDate>,
}

/// Validation failures for [`EstimateRequest`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateRequestValidationError {
    /// Weight was negative, NaN or infinite.
    #[error("weight {weight} must be a non-negative finite number")]
    InvalidWeight {
        /// Rejected weight.
        weight: f64,
    },
    /// Distance was negative, NaN or infinite.
    #[error(transparent)]
    InvalidDistance(#[from] RouteSummaryError),
    /// Temperature was NaN or infinite.
    #[error("temperature {temperature} must be a finite number")]
    InvalidTemperature {
        /// Rejected temperature.
        temperature: f64,
    },
    /// The fuel label was present but blank.
    #[error("fuel type must not be blank")]
    BlankFuelType,
    /// A label did not name a known road type, class or priority.
    #[error(transparent)]
    UnknownLabel(#[from] ParseLabelError),
}

impl EstimateRequest {
    /// Build a request from textual labels, as received from a form or query.
    ///
    /// Unknown labels and out-of-range numbers are rejected before any lookup.
    ///
    /// # Examples
    /// ```rust
    /// use fuelcost_core::{EstimateRequest, EstimateRequestValidationError, Priority};
    ///
    /// let request = EstimateRequest::from_labels(
    ///     6000.0, 100.0, "average", "all", Some("Gasoil Optimo"), 25.0, None,
    /// )
    /// .expect("valid labels");
    /// assert_eq!(request.priority, Priority::Cost);
    ///
    /// let err = EstimateRequest::from_labels(
    ///     6000.0, 100.0, "average", "diesel", None, 25.0, None,
    /// )
    /// .expect_err("unknown class");
    /// assert!(matches!(err, EstimateRequestValidationError::UnknownLabel(_)));
    /// ```
    pub fn from_labels(
        weight: f64,
        distance: f64,
        road_type: &str,
        vehicle_class: &str,
        fuel_type: Option<&str>,
        temperature: f64,
        priority: Option<&str>,
    ) -> Result<Self, EstimateRequestValidationError> {
        let request = Self {
            weight,
            distance,
            road_type: road_type.parse()?,
            vehicle_class: vehicle_class.parse()?,
            fuel_type: fuel_type.map(str::to_owned),
            temperature,
            priority: priority.map(str::parse).transpose()?.unwrap_or_default(),
            as_of: None,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check numeric ranges and labels.
    pub fn validate(&self) -> Result<(), EstimateRequestValidationError> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(EstimateRequestValidationError::InvalidWeight {
                weight: self.weight,
            });
        }
        self.route()?;
        if !self.temperature.is_finite() {
            return Err(EstimateRequestValidationError::InvalidTemperature {
                temperature: self.temperature,
            });
        }
        if self
            .fuel_type
            .as_deref()
            .is_some_and(|fuel| fuel.trim().is_empty())
        {
            return Err(EstimateRequestValidationError::BlankFuelType);
        }
        Ok(())
    }

    /// Route distance and road type as a validated summary.
    pub const fn route(&self) -> Result<RouteSummary, RouteSummaryError> {
        RouteSummary::new(self.distance, self.road_type)
    }

    const fn candidate_query(&self) -> CandidateQuery {
        CandidateQuery {
            min_capacity: self.weight,
            road_type: self.road_type,
            class: self.vehicle_class,
        }
    }
}

/// A candidate dropped from the results, with the reason.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExcludedCandidate {
    /// Identifier of the dropped vehicle.
    pub vehicle_id: u64,
    /// Human-readable reason.
    pub reason: String,
}

impl From<&DegenerateEstimate> for ExcludedCandidate {
    fn from(error: &DegenerateEstimate) -> Self {
        Self {
            vehicle_id: error.vehicle_id(),
            reason: error.to_string(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EstimateResponse {
    /// Estimates in ranked order.
    pub estimates: Vec<RankedEstimate>,
    /// Candidates dropped because their estimate degenerated.
    pub excluded: Vec<ExcludedCandidate>,
    /// Adjustment applied to every candidate.
    pub adjustment: Adjustment,
    /// Price point used, when one was found.
    pub price: Option<FuelPricePoint>,
}

/// Errors returned by [`Estimator::estimate`].
#[derive(Debug, Error)]
pub enum EstimateError {
    /// The request failed validation; nothing was looked up.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] EstimateRequestValidationError),
    /// Cost ranking needs a price but none was recorded.
    #[error("no price is available for fuel type {fuel_type:?}")]
    PriceUnavailable {
        /// Fuel label that had no price, if one was supplied.
        fuel_type: Option<String>,
    },
    /// The reference store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Produce ranked estimates for a request.
///
/// Estimators must be `Send + Sync` so a single instance can serve concurrent
/// requests.
pub trait Estimator: Send + Sync {
    /// Estimate and rank candidate vehicles for `request`.
    fn estimate(&self, request: &EstimateRequest) -> Result<EstimateResponse, EstimateError>;
}

/// [`Estimator`] backed by an injected [`ReferenceStore`].
///
/// # Examples
/// ```rust
/// use fuelcost_core::test_support::sample_catalog;
/// use fuelcost_core::{EstimateRequest, Estimator, FuelCostEstimator};
///
/// let estimator = FuelCostEstimator::new(sample_catalog());
/// let request = EstimateRequest::from_labels(
///     6000.0, 100.0, "average", "gas", Some("Gas Licuado (GLP)"), 0.0, None,
/// )
/// .expect("valid request");
/// let response = estimator.estimate(&request).expect("estimate succeeds");
/// assert!(!response.estimates.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct FuelCostEstimator<S> {
    store: S,
}

impl<S: ReferenceStore> FuelCostEstimator<S> {
    /// Wrap `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn resolve_price(
        &self,
        request: &EstimateRequest,
    ) -> Result<Option<FuelPricePoint>, EstimateError> {
        let as_of = request
            .as_of
            .unwrap_or_else(|| Local::now().date_naive());
        let price = match request.fuel_type.as_deref() {
            Some(fuel_type) => self.store.latest_price(fuel_type, as_of)?,
            None => None,
        };
        if price.is_none() && request.priority == Priority::Cost {
            return Err(EstimateError::PriceUnavailable {
                fuel_type: request.fuel_type.clone(),
            });
        }
        Ok(price)
    }
}

impl<S: ReferenceStore> Estimator for FuelCostEstimator<S> {
    fn estimate(&self, request: &EstimateRequest) -> Result<EstimateResponse, EstimateError> {
        request.validate()?;
        let route = request.route().map_err(EstimateRequestValidationError::from)?;

        let candidates = self.store.select_candidates(&request.candidate_query())?;
        if candidates.is_empty() {
            debug!("no vehicles match the request filters");
            return Ok(EstimateResponse::default());
        }

        let adjustment = resolve_adjustment(&self.store, request.weight, request.temperature)?;
        let price = self.resolve_price(request)?;
        debug!(
            "resolved {}% adjustment and price {:?} for {} candidates",
            adjustment.total_percent(),
            price.as_ref().map(|point| point.price),
            candidates.len()
        );

        let mut estimates = Vec::with_capacity(candidates.len());
        let mut excluded = Vec::new();
        for candidate in candidates {
            match estimate(
                candidate,
                route.distance(),
                price.as_ref().map(|point| point.price),
                adjustment.total_percent(),
            ) {
                Ok(result) => estimates.push(result),
                Err(error) => {
                    warn!("excluding candidate: {error}");
                    excluded.push(ExcludedCandidate::from(&error));
                }
            }
        }

        Ok(EstimateResponse {
            estimates: rank(estimates, request.priority),
            excluded,
            adjustment,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingStore, sample_catalog};
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> EstimateRequest {
        EstimateRequest {
            weight: 6000.0,
            distance: 100.0,
            road_type: RoadType::Average,
            vehicle_class: VehicleClassFilter::All,
            fuel_type: Some("Gas Licuado (GLP)".into()),
            temperature: 0.0,
            priority: Priority::Cost,
            as_of: NaiveDate::from_ymd_opt(2024, 1, 1),
        }
    }

    #[rstest]
    #[case::negative_weight(|r: &mut EstimateRequest| r.weight = -1.0)]
    #[case::nan_weight(|r: &mut EstimateRequest| r.weight = f64::NAN)]
    #[case::negative_distance(|r: &mut EstimateRequest| r.distance = -5.0)]
    #[case::infinite_temperature(|r: &mut EstimateRequest| r.temperature = f64::INFINITY)]
    #[case::blank_fuel(|r: &mut EstimateRequest| r.fuel_type = Some("  ".into()))]
    fn validation_runs_before_lookups(
        mut request: EstimateRequest,
        #[case] corrupt: fn(&mut EstimateRequest),
    ) {
        corrupt(&mut request);
        let estimator = FuelCostEstimator::new(FailingStore);
        let err = estimator.estimate(&request).expect_err("invalid request");
        assert!(matches!(err, EstimateError::InvalidRequest(_)));
    }

    #[rstest]
    fn store_failure_fails_the_request(request: EstimateRequest) {
        let estimator = FuelCostEstimator::new(FailingStore);
        let err = estimator.estimate(&request).expect_err("store offline");
        assert!(matches!(err, EstimateError::Store(_)));
    }

    #[rstest]
    fn missing_price_blocks_cost_ranking(mut request: EstimateRequest) {
        request.fuel_type = Some("Hydrogen".into());
        let estimator = FuelCostEstimator::new(sample_catalog());
        let err = estimator.estimate(&request).expect_err("no price");
        assert!(matches!(
            err,
            EstimateError::PriceUnavailable { fuel_type: Some(ref fuel) } if fuel == "Hydrogen"
        ));
    }

    #[rstest]
    fn unknown_fuel_label_passes_validation(mut request: EstimateRequest) {
        request.fuel_type = Some("Hydrogen".into());
        assert_eq!(request.validate(), Ok(()));
        request.priority = Priority::Efficiency;
        let response = FuelCostEstimator::new(sample_catalog())
            .estimate(&request)
            .expect("efficiency ranking without a price");
        assert!(response.price.is_none());
        assert!(
            response
                .estimates
                .iter()
                .all(|estimate| estimate.estimated_cost.is_none())
        );
    }

    #[rstest]
    fn missing_price_yields_costless_estimates_for_other_priorities(
        mut request: EstimateRequest,
    ) {
        request.fuel_type = None;
        request.priority = Priority::Security;
        let estimator = FuelCostEstimator::new(sample_catalog());
        let response = estimator.estimate(&request).expect("security ranking");
        assert!(!response.estimates.is_empty());
        assert!(
            response
                .estimates
                .iter()
                .all(|estimate| estimate.estimated_cost.is_none())
        );
        assert_eq!(response.price, None);
    }

    #[rstest]
    fn prices_before_their_effective_date_are_ignored(mut request: EstimateRequest) {
        request.as_of = NaiveDate::from_ymd_opt(2020, 1, 1);
        let estimator = FuelCostEstimator::new(sample_catalog());
        let err = estimator.estimate(&request).expect_err("price not yet effective");
        assert!(matches!(err, EstimateError::PriceUnavailable { .. }));
    }

    #[rstest]
    fn unmatched_filters_return_empty_response(mut request: EstimateRequest) {
        request.weight = 1.0e9;
        let estimator = FuelCostEstimator::new(sample_catalog());
        let response = estimator.estimate(&request).expect("empty is not an error");
        assert!(response.estimates.is_empty());
        assert!(response.excluded.is_empty());
    }

    #[rstest]
    fn from_labels_defaults_priority_to_cost() {
        let request =
            EstimateRequest::from_labels(10.0, 1.0, "city", "electric", None, 20.0, None)
                .expect("valid request");
        assert_eq!(request.priority, Priority::Cost);
        assert_eq!(request.road_type, RoadType::City);
    }

    #[rstest]
    #[case("motorway", "all", None)]
    #[case("city", "diesel", None)]
    #[case("city", "all", Some("fastest"))]
    fn from_labels_rejects_unknown_labels(
        #[case] road: &str,
        #[case] class: &str,
        #[case] priority: Option<&str>,
    ) {
        let err = EstimateRequest::from_labels(10.0, 1.0, road, class, None, 20.0, priority)
            .expect_err("unknown label");
        assert!(matches!(err, EstimateRequestValidationError::UnknownLabel(_)));
    }
}
