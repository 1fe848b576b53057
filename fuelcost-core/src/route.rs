//! Route summaries handed over by the routing collaborator.

use thiserror::Error;

use crate::RoadType;

/// Route preference label that selects the highways efficiency figure.
pub const HIGHWAYS_PREFERENCE: &str = "highways";

/// Distance and road classification of a resolved route.
///
/// # Examples
/// ```
/// use fuelcost_core::{RoadType, RouteSummary};
///
/// let route = RouteSummary::from_preference(120.0, Some("highways")).expect("valid route");
/// assert_eq!(route.road_type(), RoadType::Highways);
///
/// let fallback = RouteSummary::from_preference(80.0, None).expect("valid route");
/// assert_eq!(fallback.road_type(), RoadType::Average);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RouteSummary {
    distance: f64,
    road_type: RoadType,
}

/// Errors returned by [`RouteSummary::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RouteSummaryError {
    /// Distance was negative, NaN or infinite.
    #[error("route distance {distance} must be a non-negative finite number")]
    InvalidDistance {
        /// Rejected distance.
        distance: f64,
    },
}

impl RouteSummary {
    /// Validate and construct a route summary.
    pub const fn new(distance: f64, road_type: RoadType) -> Result<Self, RouteSummaryError> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(RouteSummaryError::InvalidDistance { distance });
        }
        Ok(Self {
            distance,
            road_type,
        })
    }

    /// Build a summary from the routing preference the caller chose.
    ///
    /// Only an explicit highways preference maps to [`RoadType::Highways`];
    /// every other route is costed with the blended figure.
    pub fn from_preference(
        distance: f64,
        preference: Option<&str>,
    ) -> Result<Self, RouteSummaryError> {
        Self::new(distance, road_type_for_preference(preference))
    }

    /// Route length in the efficiency denominator's distance unit.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    /// Classification selecting the nominal efficiency.
    #[must_use]
    pub const fn road_type(&self) -> RoadType {
        self.road_type
    }
}

/// Road type implied by a routing preference label.
#[must_use]
pub fn road_type_for_preference(preference: Option<&str>) -> RoadType {
    match preference {
        Some(label) if label.trim().eq_ignore_ascii_case(HIGHWAYS_PREFERENCE) => {
            RoadType::Highways
        }
        _ => RoadType::Average,
    }
}
