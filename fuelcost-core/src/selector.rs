//! Candidate selection over an in-memory vehicle catalogue.

use crate::{RoadType, Vehicle, VehicleCandidate, VehicleClassFilter};

/// Filters applied when selecting candidate vehicles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateQuery {
    /// Minimum load capacity a vehicle must offer.
    pub min_capacity: f64,
    /// Road type whose efficiency record must exist.
    pub road_type: RoadType,
    /// Class restriction.
    pub class: VehicleClassFilter,
}

impl CandidateQuery {
    /// Whether `vehicle` satisfies the capacity and class filters.
    ///
    /// The road-type requirement is checked when the candidate is built.
    #[must_use]
    pub fn admits(&self, vehicle: &Vehicle) -> bool {
        vehicle.profile().max_load_capacity >= self.min_capacity
            && self.class.admits(vehicle.profile().class)
    }
}

/// Select vehicles matching `query`, ordered by ascending id.
///
/// Vehicles without an efficiency record for the requested road type are
/// skipped. An empty result is a valid outcome.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use fuelcost_core::{
///     CandidateQuery, RoadType, Vehicle, VehicleClass, VehicleClassFilter, VehicleProfile,
///     select_candidates,
/// };
///
/// let vehicle = Vehicle::new(
///     VehicleProfile {
///         id: 2,
///         class: VehicleClass::Gas,
///         category: "Categoría 2".into(),
///         brand: "Ford".into(),
///         model: "F-150".into(),
///         max_load_capacity: 7000.0,
///         security_rating: Some(4),
///     },
///     BTreeMap::from([(RoadType::Average, 8.0)]),
/// )
/// .expect("valid vehicle");
///
/// let query = CandidateQuery {
///     min_capacity: 6000.0,
///     road_type: RoadType::Average,
///     class: VehicleClassFilter::All,
/// };
/// let candidates = select_candidates([&vehicle], &query);
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates[0].nominal_efficiency, 8.0);
/// ```
#[must_use]
pub fn select_candidates<'a, I>(vehicles: I, query: &CandidateQuery) -> Vec<VehicleCandidate>
where
    I: IntoIterator<Item = &'a Vehicle>,
{
    let mut candidates: Vec<_> = vehicles
        .into_iter()
        .filter(|vehicle| query.admits(vehicle))
        .filter_map(|vehicle| vehicle.candidate_for(query.road_type))
        .collect();
    candidates.sort_by_key(|candidate| candidate.profile.id);
    candidates
}
