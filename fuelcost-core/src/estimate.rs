//! Per-candidate cost estimation.
//!
//! The estimator derates a candidate's nominal efficiency by the request's
//! total adjustment, then converts distance into fuel cost. Values keep full
//! precision; [`EstimateRow`] renders the rounded presentation form.

use thiserror::Error;

use crate::{RoadType, VehicleCandidate, VehicleProfile};

/// Fractional digits shown in presentation output.
pub const DISPLAY_DECIMALS: usize = 4;

/// Full-precision estimate for one candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RankedEstimate {
    /// Descriptive attributes of the vehicle.
    pub profile: VehicleProfile,
    /// Road type whose nominal efficiency was used.
    pub road_type: RoadType,
    /// Nominal efficiency before adjustment.
    pub nominal_efficiency: f64,
    /// Efficiency after the weight and temperature penalties.
    pub adjusted_efficiency: f64,
    /// Fuel cost for the route, absent when no price was available.
    pub estimated_cost: Option<f64>,
}

impl RankedEstimate {
    /// Vehicle identifier.
    #[must_use]
    pub const fn vehicle_id(&self) -> u64 {
        self.profile.id
    }

    /// Security rating, when assessed.
    #[must_use]
    pub const fn security_rating(&self) -> Option<u8> {
        self.profile.security_rating
    }
}

/// A candidate whose estimate could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DegenerateEstimate {
    /// The penalties consumed all of the nominal efficiency.
    #[error(
        "vehicle {vehicle_id}: adjusted efficiency {adjusted_efficiency} is not positive \
         after a {adjustment_percent}% adjustment"
    )]
    NonPositiveEfficiency {
        /// Excluded vehicle.
        vehicle_id: u64,
        /// Efficiency after adjustment.
        adjusted_efficiency: f64,
        /// Total adjustment applied.
        adjustment_percent: f64,
    },
    /// Inputs overflowed or were not finite.
    #[error("vehicle {vehicle_id}: estimated cost is not a finite number")]
    NonFiniteCost {
        /// Excluded vehicle.
        vehicle_id: u64,
    },
}

impl DegenerateEstimate {
    /// Identifier of the excluded vehicle.
    #[must_use]
    pub const fn vehicle_id(&self) -> u64 {
        match self {
            Self::NonPositiveEfficiency { vehicle_id, .. } | Self::NonFiniteCost { vehicle_id } => {
                *vehicle_id
            }
        }
    }
}

/// Nominal efficiency derated by `adjustment_percent`.
///
/// The adjustment is not clamped, so penalties of 100% or more yield zero or
/// negative efficiency.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "efficiency derating is inherently floating-point"
)]
pub const fn adjusted_efficiency(nominal: f64, adjustment_percent: f64) -> f64 {
    nominal * (1.0 - adjustment_percent / 100.0)
}

/// Estimate the fuel cost of driving `distance` with `candidate`.
///
/// A missing `fuel_price` produces an estimate without a cost rather than a
/// zero cost.
///
/// # Examples
/// ```
/// use fuelcost_core::{
///     RoadType, VehicleCandidate, VehicleClass, VehicleProfile, estimate,
/// };
///
/// let candidate = VehicleCandidate {
///     profile: VehicleProfile {
///         id: 2,
///         class: VehicleClass::Gas,
///         category: "Categoría 2".into(),
///         brand: "Ford".into(),
///         model: "F-150".into(),
///         max_load_capacity: 7000.0,
///         security_rating: Some(4),
///     },
///     road_type: RoadType::Average,
///     nominal_efficiency: 8.0,
/// };
/// let result = estimate(candidate, 100.0, Some(132.60), 12.5).expect("positive efficiency");
/// assert_eq!(result.adjusted_efficiency, 7.0);
/// let cost = result.estimated_cost.expect("price supplied");
/// assert!((cost - 1894.2857).abs() < 1e-4);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "cost is distance over efficiency times unit price"
)]
pub fn estimate(
    candidate: VehicleCandidate,
    distance: f64,
    fuel_price: Option<f64>,
    adjustment_percent: f64,
) -> Result<RankedEstimate, DegenerateEstimate> {
    let vehicle_id = candidate.profile.id;
    let adjusted = adjusted_efficiency(candidate.nominal_efficiency, adjustment_percent);
    if !adjusted.is_finite() {
        return Err(DegenerateEstimate::NonFiniteCost { vehicle_id });
    }
    if adjusted <= 0.0 {
        return Err(DegenerateEstimate::NonPositiveEfficiency {
            vehicle_id,
            adjusted_efficiency: adjusted,
            adjustment_percent,
        });
    }

    let estimated_cost = fuel_price.map(|price| distance / adjusted * price);
    if estimated_cost.is_some_and(|cost| !cost.is_finite()) {
        return Err(DegenerateEstimate::NonFiniteCost { vehicle_id });
    }

    Ok(RankedEstimate {
        profile: candidate.profile,
        road_type: candidate.road_type,
        nominal_efficiency: candidate.nominal_efficiency,
        adjusted_efficiency: adjusted,
        estimated_cost,
    })
}

/// Render `value` with [`DISPLAY_DECIMALS`] fractional digits.
///
/// # Examples
/// ```
/// use fuelcost_core::format_fixed;
///
/// assert_eq!(format_fixed(1894.285714), "1894.2857");
/// assert_eq!(format_fixed(7.0), "7.0000");
/// ```
#[must_use]
pub fn format_fixed(value: f64) -> String {
    format!("{value:.precision$}", precision = DISPLAY_DECIMALS)
}

/// Presentation form of a [`RankedEstimate`].
///
/// Numeric outputs are fixed-point strings so repeated runs print identical
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimateRow {
    /// Vehicle identifier.
    pub id: u64,
    /// Propulsion class label.
    pub vehicle_type: String,
    /// Axle category label.
    pub category: String,
    /// Manufacturer name.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Maximum cargo weight.
    pub max_load_capacity: String,
    /// Security rating, when assessed.
    pub security_score: Option<u8>,
    /// Adjusted efficiency.
    pub fuel_efficiency: String,
    /// Estimated fuel cost, absent when no price was available.
    pub fuel_cost: Option<String>,
    /// Currency of `fuel_cost`.
    pub currency: Option<String>,
    /// Road type whose efficiency figure was used.
    pub efficiency_type: RoadType,
}

impl EstimateRow {
    /// Build a presentation row, tagging the cost with `currency`.
    #[must_use]
    pub fn from_estimate(estimate: &RankedEstimate, currency: Option<&str>) -> Self {
        let profile = &estimate.profile;
        Self {
            id: profile.id,
            vehicle_type: profile.class.as_str().to_owned(),
            category: profile.category.clone(),
            brand: profile.brand.clone(),
            model: profile.model.clone(),
            max_load_capacity: format!("{:.2}", profile.max_load_capacity),
            security_score: profile.security_rating,
            fuel_efficiency: format_fixed(estimate.adjusted_efficiency),
            fuel_cost: estimate.estimated_cost.map(format_fixed),
            currency: estimate
                .estimated_cost
                .and(currency)
                .map(str::to_owned),
            efficiency_type: estimate.road_type,
        }
    }
}
