//! Banded efficiency adjustments for cargo weight and ambient temperature.
//!
//! Each dimension has its own [`BandSet`]. A probe value that falls outside
//! every band contributes no penalty. The weight and temperature penalties are
//! summed, never multiplied.

use thiserror::Error;

use crate::ReferenceStore;
use crate::store::StoreError;

/// A numeric interval mapped to an efficiency penalty percentage.
///
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentBand {
    min: f64,
    max: f64,
    percent: f64,
}

/// Errors raised when constructing bands and band sets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdjustmentBandError {
    /// A bound or the percentage was NaN or infinite.
    #[error("band [{min}, {max}] -> {percent}% contains a non-finite value")]
    NonFinite {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Penalty percentage.
        percent: f64,
    },
    /// The lower bound exceeded the upper bound.
    #[error("band lower bound {min} exceeds upper bound {max}")]
    Inverted {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Two bands in the same set share at least one value.
    #[error("band [{first_min}, {first_max}] overlaps band [{second_min}, {second_max}]")]
    Overlapping {
        /// Lower bound of the earlier band.
        first_min: f64,
        /// Upper bound of the earlier band.
        first_max: f64,
        /// Lower bound of the later band.
        second_min: f64,
        /// Upper bound of the later band.
        second_max: f64,
    },
}

impl AdjustmentBand {
    /// Validate and construct a band covering `[min, max]`.
    ///
    /// # Examples
    /// ```
    /// use fuelcost_core::AdjustmentBand;
    ///
    /// let band = AdjustmentBand::new(5001.0, 6000.0, 12.5).expect("valid band");
    /// assert!(band.contains(5001.0));
    /// assert!(band.contains(6000.0));
    /// assert!(!band.contains(6000.5));
    /// ```
    pub const fn new(min: f64, max: f64, percent: f64) -> Result<Self, AdjustmentBandError> {
        if !(min.is_finite() && max.is_finite() && percent.is_finite()) {
            return Err(AdjustmentBandError::NonFinite { min, max, percent });
        }
        if min > max {
            return Err(AdjustmentBandError::Inverted { min, max });
        }
        Ok(Self { min, max, percent })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Penalty percentage applied to nominal efficiency.
    #[must_use]
    pub const fn percent(&self) -> f64 {
        self.percent
    }

    /// Whether `value` lies within the band.
    #[must_use]
    pub const fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Non-overlapping bands for one adjustment dimension, sorted by lower bound.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandSet {
    bands: Vec<AdjustmentBand>,
}

impl BandSet {
    /// Sort `bands` and reject any pair that overlaps.
    pub fn new(mut bands: Vec<AdjustmentBand>) -> Result<Self, AdjustmentBandError> {
        bands.sort_by(|left, right| left.min.total_cmp(&right.min));
        for pair in bands.windows(2) {
            if let [first, second] = pair
                && second.min <= first.max
            {
                return Err(AdjustmentBandError::Overlapping {
                    first_min: first.min,
                    first_max: first.max,
                    second_min: second.min,
                    second_max: second.max,
                });
            }
        }
        Ok(Self { bands })
    }

    /// Penalty of the band containing `value`, if any.
    ///
    /// # Examples
    /// ```
    /// use fuelcost_core::{AdjustmentBand, BandSet};
    ///
    /// let bands = BandSet::new(vec![
    ///     AdjustmentBand::new(0.0, 1000.0, 0.0).expect("band"),
    ///     AdjustmentBand::new(1001.0, 2000.0, 2.5).expect("band"),
    /// ])
    /// .expect("disjoint bands");
    /// assert_eq!(bands.lookup(1001.0), Some(2.5));
    /// assert_eq!(bands.lookup(5000.0), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, value: f64) -> Option<f64> {
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map(AdjustmentBand::percent)
    }

    /// Bands in ascending order of lower bound.
    #[must_use]
    pub const fn bands(&self) -> &[AdjustmentBand] {
        self.bands.as_slice()
    }

    /// Whether the set holds no bands.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl TryFrom<Vec<AdjustmentBand>> for BandSet {
    type Error = AdjustmentBandError;

    fn try_from(bands: Vec<AdjustmentBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

/// Resolved penalties for one request.
///
/// Missing bands are recorded as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Adjustment {
    /// Penalty from the cargo-weight band.
    pub weight_percent: f64,
    /// Penalty from the ambient-temperature band.
    pub temperature_percent: f64,
}

impl Adjustment {
    /// Combine per-dimension lookups, treating a miss as no penalty.
    #[must_use]
    pub fn from_lookups(weight: Option<f64>, temperature: Option<f64>) -> Self {
        Self {
            weight_percent: weight.unwrap_or(0.0),
            temperature_percent: temperature.unwrap_or(0.0),
        }
    }

    /// Total penalty percentage applied to nominal efficiency.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "adjustments compose additively"
    )]
    pub const fn total_percent(&self) -> f64 {
        self.weight_percent + self.temperature_percent
    }
}

/// Weight and temperature band sets held together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdjustmentTables {
    /// Bands keyed by cargo weight.
    pub weight: BandSet,
    /// Bands keyed by ambient temperature.
    pub temperature: BandSet,
}

impl AdjustmentTables {
    /// Look up both dimensions independently.
    ///
    /// # Examples
    /// ```
    /// use fuelcost_core::{AdjustmentBand, AdjustmentTables, BandSet};
    ///
    /// let tables = AdjustmentTables {
    ///     weight: BandSet::new(vec![AdjustmentBand::new(5001.0, 6000.0, 12.5).expect("band")])
    ///         .expect("bands"),
    ///     temperature: BandSet::default(),
    /// };
    /// let adjustment = tables.resolve(6000.0, 25.0);
    /// assert_eq!(adjustment.total_percent(), 12.5);
    /// ```
    #[must_use]
    pub fn resolve(&self, weight: f64, temperature: f64) -> Adjustment {
        Adjustment::from_lookups(self.weight.lookup(weight), self.temperature.lookup(temperature))
    }
}

/// Resolve the total adjustment for a request through `store`.
///
/// Each dimension is looked up once; a missing band contributes nothing.
pub fn resolve_adjustment<S>(
    store: &S,
    weight: f64,
    temperature: f64,
) -> Result<Adjustment, StoreError>
where
    S: ReferenceStore + ?Sized,
{
    let weight_percent = store.weight_adjustment(weight)?;
    let temperature_percent = store.temperature_adjustment(temperature)?;
    Ok(Adjustment::from_lookups(weight_percent, temperature_percent))
}
