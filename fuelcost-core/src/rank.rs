//! Ordering estimates by the caller's priority.
//!
//! Each [`Priority`] maps to one comparator. Ties on the primary key fall back
//! to ascending vehicle id, so output order never depends on storage order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{ParseLabelError, RankedEstimate};

/// Ranking criterion selected by the caller.
///
/// # Examples
/// ```
/// use fuelcost_core::Priority;
///
/// assert_eq!(Priority::default(), Priority::Cost);
/// assert_eq!("security".parse::<Priority>(), Ok(Priority::Security));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Priority {
    /// Cheapest first.
    #[default]
    Cost,
    /// Highest security rating first; unrated vehicles last.
    Security,
    /// Highest adjusted efficiency first.
    Efficiency,
}

type Comparator = fn(&RankedEstimate, &RankedEstimate) -> Ordering;

const STRATEGIES: [(Priority, Comparator); 3] = [
    (Priority::Cost, by_cost),
    (Priority::Security, by_security),
    (Priority::Efficiency, by_efficiency),
];

impl Priority {
    /// Every priority in declaration order.
    pub const ALL: [Self; 3] = [Self::Cost, Self::Security, Self::Efficiency];

    /// Lowercase label used in requests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Security => "security",
            Self::Efficiency => "efficiency",
        }
    }

    fn comparator(self) -> Comparator {
        STRATEGIES
            .iter()
            .find(|(priority, _)| *priority == self)
            .map_or(by_cost, |(_, comparator)| *comparator)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError {
                kind: "priority",
                label: s.to_owned(),
            })
    }
}

fn by_cost(left: &RankedEstimate, right: &RankedEstimate) -> Ordering {
    match (left.estimated_cost, right.estimated_cost) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_security(left: &RankedEstimate, right: &RankedEstimate) -> Ordering {
    // `None < Some(_)`, so reversing places unrated vehicles last.
    right.security_rating().cmp(&left.security_rating())
}

fn by_efficiency(left: &RankedEstimate, right: &RankedEstimate) -> Ordering {
    right.adjusted_efficiency.total_cmp(&left.adjusted_efficiency)
}

/// Order `estimates` by `priority`, breaking ties by ascending vehicle id.
///
/// Ranking uses full-precision values.
///
/// # Examples
/// ```
/// use fuelcost_core::{Priority, rank};
///
/// let ranked = rank(Vec::new(), Priority::Efficiency);
/// assert!(ranked.is_empty());
/// ```
#[must_use]
pub fn rank(mut estimates: Vec<RankedEstimate>, priority: Priority) -> Vec<RankedEstimate> {
    let primary = priority.comparator();
    estimates.sort_by(|left, right| {
        primary(left, right).then_with(|| left.vehicle_id().cmp(&right.vehicle_id()))
    });
    estimates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VehicleClass;
    use crate::test_support::ranked;
    use rstest::{fixture, rstest};

    fn ids(estimates: &[RankedEstimate]) -> Vec<u64> {
        estimates.iter().map(RankedEstimate::vehicle_id).collect()
    }

    #[fixture]
    fn estimates() -> Vec<RankedEstimate> {
        vec![
            ranked(4, VehicleClass::Gas, Some(6), 7.0, Some(1894.29)),
            ranked(1, VehicleClass::Electric, None, 9.0, Some(391.67)),
            ranked(3, VehicleClass::Gasoline, Some(9), 5.5, Some(4990.91)),
            ranked(2, VehicleClass::Gas, Some(6), 9.0, Some(1473.33)),
        ]
    }

    #[rstest]
    fn cost_ranks_ascending(estimates: Vec<RankedEstimate>) {
        assert_eq!(ids(&rank(estimates, Priority::Cost)), vec![1, 2, 4, 3]);
    }

    #[rstest]
    fn security_ranks_descending_with_unrated_last(estimates: Vec<RankedEstimate>) {
        assert_eq!(ids(&rank(estimates, Priority::Security)), vec![3, 2, 4, 1]);
    }

    #[rstest]
    fn efficiency_ranks_descending_with_id_tie_break(estimates: Vec<RankedEstimate>) {
        assert_eq!(ids(&rank(estimates, Priority::Efficiency)), vec![1, 2, 4, 3]);
    }

    #[rstest]
    fn costless_estimates_sort_after_costed_ones() {
        let estimates = vec![
            ranked(1, VehicleClass::Gas, None, 7.0, None),
            ranked(2, VehicleClass::Gas, None, 7.0, Some(10.0)),
        ];
        assert_eq!(ids(&rank(estimates, Priority::Cost)), vec![2, 1]);
    }

    #[rstest]
    fn ranking_uses_full_precision() {
        let estimates = vec![
            ranked(1, VehicleClass::Gas, None, 7.0, Some(100.000_04)),
            ranked(2, VehicleClass::Gas, None, 7.0, Some(100.000_01)),
        ];
        assert_eq!(ids(&rank(estimates, Priority::Cost)), vec![2, 1]);
    }

    #[rstest]
    #[case("cost", Priority::Cost)]
    #[case("Security", Priority::Security)]
    #[case(" efficiency", Priority::Efficiency)]
    fn parses_priority_labels(#[case] label: &str, #[case] expected: Priority) {
        assert_eq!(label.parse::<Priority>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_priority() {
        assert!("speed".parse::<Priority>().is_err());
    }
}
