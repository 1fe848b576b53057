//! Vehicle catalogue types.
//!
//! A [`Vehicle`] is a catalogue row carrying one nominal efficiency per
//! [`RoadType`]. Selection narrows a vehicle to a [`VehicleCandidate`] holding
//! the single efficiency figure that applies to the requested road type.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Label accepted by [`VehicleClassFilter`] to disable class filtering.
pub const ALL_CLASSES: &str = "all";

/// Highest security rating a vehicle may carry.
pub const MAX_SECURITY_RATING: u8 = 10;

/// Error raised when a textual label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {label:?}")]
pub struct ParseLabelError {
    /// Which label family was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub label: String,
}

impl ParseLabelError {
    fn new(kind: &'static str, label: &str) -> Self {
        Self {
            kind,
            label: label.to_owned(),
        }
    }
}

/// Propulsion class of a vehicle.
///
/// # Examples
/// ```
/// use fuelcost_core::VehicleClass;
///
/// let class: VehicleClass = "gas".parse().expect("known class");
/// assert_eq!(class, VehicleClass::Gas);
/// assert_eq!(class.as_str(), "gas");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VehicleClass {
    /// Battery electric vehicles.
    Electric,
    /// Vehicles burning gaseous fuels (LPG, CNG).
    Gas,
    /// Vehicles burning liquid fuels.
    Gasoline,
}

impl VehicleClass {
    /// Every class in catalogue order.
    pub const ALL: [Self; 3] = [Self::Electric, Self::Gas, Self::Gasoline];

    /// Lowercase label used in requests and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electric => "electric",
            Self::Gas => "gas",
            Self::Gasoline => "gasoline",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError::new("vehicle class", s))
    }
}

/// Class restriction applied during candidate selection.
///
/// The label `"all"` disables the restriction.
///
/// # Examples
/// ```
/// use fuelcost_core::{VehicleClass, VehicleClassFilter};
///
/// let filter: VehicleClassFilter = "all".parse().expect("sentinel");
/// assert!(filter.admits(VehicleClass::Electric));
///
/// let only_gas: VehicleClassFilter = "gas".parse().expect("class");
/// assert!(!only_gas.admits(VehicleClass::Gasoline));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum VehicleClassFilter {
    /// Admit every class.
    #[default]
    All,
    /// Admit one class only.
    Only(VehicleClass),
}

impl VehicleClassFilter {
    /// Whether a vehicle of `class` passes this filter.
    #[must_use]
    pub fn admits(self, class: VehicleClass) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == class,
        }
    }

    /// Label used in requests and storage queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => ALL_CLASSES,
            Self::Only(class) => class.as_str(),
        }
    }
}

impl fmt::Display for VehicleClassFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClassFilter {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_CLASSES) {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl From<VehicleClass> for VehicleClassFilter {
    fn from(class: VehicleClass) -> Self {
        Self::Only(class)
    }
}

impl TryFrom<String> for VehicleClassFilter {
    type Error = ParseLabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VehicleClassFilter> for String {
    fn from(filter: VehicleClassFilter) -> Self {
        filter.as_str().to_owned()
    }
}

/// Road-type classification selecting which nominal efficiency applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RoadType {
    /// Urban stop-start driving.
    City,
    /// Sustained motorway driving.
    Highways,
    /// Blended figure for mixed routes.
    Average,
}

impl RoadType {
    /// Every road type in catalogue order.
    pub const ALL: [Self; 3] = [Self::City, Self::Highways, Self::Average];

    /// Lowercase label used in requests and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Highways => "highways",
            Self::Average => "average",
        }
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|road| road.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError::new("road type", s))
    }
}

/// Descriptive attributes shared by catalogue rows and selected candidates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleProfile {
    /// Unique catalogue identifier.
    pub id: u64,
    /// Propulsion class.
    pub class: VehicleClass,
    /// Axle category label.
    pub category: String,
    /// Manufacturer name.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Maximum cargo weight the vehicle can carry.
    pub max_load_capacity: f64,
    /// Security rating in `0..=10`, when assessed.
    pub security_rating: Option<u8>,
}

/// Errors returned by [`Vehicle::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VehicleError {
    /// Load capacity was negative, NaN or infinite.
    #[error("vehicle {id} has invalid load capacity {capacity}")]
    InvalidCapacity {
        /// Offending vehicle.
        id: u64,
        /// Rejected capacity.
        capacity: f64,
    },
    /// A nominal efficiency was not a positive finite number.
    #[error("vehicle {id} has invalid {road_type} efficiency {value}")]
    InvalidEfficiency {
        /// Offending vehicle.
        id: u64,
        /// Road type of the rejected record.
        road_type: RoadType,
        /// Rejected efficiency.
        value: f64,
    },
    /// Security rating exceeded [`MAX_SECURITY_RATING`].
    #[error("vehicle {id} has security rating {rating} above {MAX_SECURITY_RATING}")]
    InvalidSecurityRating {
        /// Offending vehicle.
        id: u64,
        /// Rejected rating.
        rating: u8,
    },
}

/// A catalogue row with nominal efficiencies per road type.
///
/// A vehicle may lack a record for some road types; such vehicles are never
/// selected for those road types. Rows are only built through
/// [`Vehicle::new`], so the fields stay private:
///
/// ```compile_fail
/// use std::collections::BTreeMap;
/// use fuelcost_core::{RoadType, Vehicle, VehicleClass, VehicleProfile};
///
/// let profile = VehicleProfile {
///     id: 1,
///     class: VehicleClass::Gas,
///     category: "Categoría 1".into(),
///     brand: "Toyota".into(),
///     model: "Camry".into(),
///     max_load_capacity: 5000.0,
///     security_rating: Some(7),
/// };
/// let mut vehicle = Vehicle::new(profile, BTreeMap::from([(RoadType::Average, 8.0)]))
///     .expect("valid vehicle");
/// vehicle.efficiencies.insert(RoadType::City, -1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vehicle {
    profile: VehicleProfile,
    efficiencies: BTreeMap<RoadType, f64>,
}

impl Vehicle {
    /// Validate and construct a catalogue row.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    /// use fuelcost_core::{RoadType, Vehicle, VehicleClass, VehicleProfile};
    ///
    /// let profile = VehicleProfile {
    ///     id: 1,
    ///     class: VehicleClass::Gas,
    ///     category: "Categoría 1".into(),
    ///     brand: "Toyota".into(),
    ///     model: "Camry".into(),
    ///     max_load_capacity: 5000.0,
    ///     security_rating: Some(7),
    /// };
    /// let vehicle = Vehicle::new(profile, BTreeMap::from([(RoadType::Average, 8.0)]))
    ///     .expect("valid vehicle");
    /// assert_eq!(vehicle.efficiency(RoadType::Average), Some(8.0));
    /// assert_eq!(vehicle.efficiency(RoadType::City), None);
    /// ```
    pub fn new(
        profile: VehicleProfile,
        efficiencies: BTreeMap<RoadType, f64>,
    ) -> Result<Self, VehicleError> {
        let id = profile.id;
        let capacity = profile.max_load_capacity;
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(VehicleError::InvalidCapacity { id, capacity });
        }
        if let Some(rating) = profile
            .security_rating
            .filter(|rating| *rating > MAX_SECURITY_RATING)
        {
            return Err(VehicleError::InvalidSecurityRating { id, rating });
        }
        if let Some((road_type, value)) = efficiencies
            .iter()
            .find(|(_, value)| !value.is_finite() || **value <= 0.0)
        {
            return Err(VehicleError::InvalidEfficiency {
                id,
                road_type: *road_type,
                value: *value,
            });
        }
        Ok(Self {
            profile,
            efficiencies,
        })
    }

    /// Descriptive attributes.
    #[must_use]
    pub const fn profile(&self) -> &VehicleProfile {
        &self.profile
    }

    /// Nominal efficiency (distance per fuel unit) keyed by road type.
    #[must_use]
    pub const fn efficiencies(&self) -> &BTreeMap<RoadType, f64> {
        &self.efficiencies
    }

    /// Nominal efficiency for `road_type`, if recorded.
    #[must_use]
    pub fn efficiency(&self, road_type: RoadType) -> Option<f64> {
        self.efficiencies.get(&road_type).copied()
    }

    /// Narrow this vehicle to a candidate for `road_type`.
    #[must_use]
    pub fn candidate_for(&self, road_type: RoadType) -> Option<VehicleCandidate> {
        self.efficiency(road_type)
            .map(|nominal_efficiency| VehicleCandidate {
                profile: self.profile.clone(),
                road_type,
                nominal_efficiency,
            })
    }
}

/// A vehicle selected for a request, with the nominal efficiency that applies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VehicleCandidate {
    /// Descriptive attributes.
    pub profile: VehicleProfile,
    /// Road type whose efficiency record was selected.
    pub road_type: RoadType,
    /// Efficiency under reference conditions, before adjustment.
    pub nominal_efficiency: f64,
}
