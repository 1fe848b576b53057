//! Dated fuel prices.

use chrono::NaiveDate;
use thiserror::Error;

/// Price of one fuel type effective from a given date.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use fuelcost_core::FuelPricePoint;
///
/// let date = NaiveDate::from_ymd_opt(2023, 12, 17).expect("valid date");
/// let point = FuelPricePoint::new("Gas Licuado (GLP)", date, 132.60, "DOP")
///     .expect("valid price");
/// assert_eq!(point.price, 132.60);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FuelPricePoint {
    /// Fuel label, e.g. `"Gasolina Premium"`.
    pub fuel_type: String,
    /// First day the price applies.
    pub effective_from: NaiveDate,
    /// Price per fuel unit.
    pub price: f64,
    /// ISO currency code of `price`.
    pub currency: String,
}

/// Errors returned by [`FuelPricePoint::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuelPriceError {
    /// The fuel label was empty.
    #[error("fuel type must not be blank")]
    BlankFuelType,
    /// The price was zero, negative, NaN or infinite.
    #[error("price {price} for {fuel_type:?} must be a positive finite number")]
    NonPositivePrice {
        /// Fuel label of the rejected point.
        fuel_type: String,
        /// Rejected price.
        price: f64,
    },
}

impl FuelPricePoint {
    /// Validate and construct a price point.
    pub fn new(
        fuel_type: impl Into<String>,
        effective_from: NaiveDate,
        price: f64,
        currency: impl Into<String>,
    ) -> Result<Self, FuelPriceError> {
        let fuel_type = fuel_type.into();
        if fuel_type.trim().is_empty() {
            return Err(FuelPriceError::BlankFuelType);
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(FuelPriceError::NonPositivePrice { fuel_type, price });
        }
        Ok(Self {
            fuel_type,
            effective_from,
            price,
            currency: currency.into(),
        })
    }
}

/// Most recent price for `fuel_type` effective on or before `as_of`.
///
/// When several points share the winning date the one listed last wins.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use fuelcost_core::{FuelPricePoint, latest_price};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date");
/// let points = vec![
///     FuelPricePoint::new("Kerosene", day(1), 200.0, "DOP").expect("price"),
///     FuelPricePoint::new("Kerosene", day(8), 210.0, "DOP").expect("price"),
///     FuelPricePoint::new("Kerosene", day(15), 220.0, "DOP").expect("price"),
/// ];
/// let current = latest_price(&points, "Kerosene", day(10)).expect("price in effect");
/// assert_eq!(current.price, 210.0);
/// assert!(latest_price(&points, "Kerosene", NaiveDate::MIN).is_none());
/// ```
#[must_use]
pub fn latest_price<'a, I>(points: I, fuel_type: &str, as_of: NaiveDate) -> Option<&'a FuelPricePoint>
where
    I: IntoIterator<Item = &'a FuelPricePoint>,
{
    points
        .into_iter()
        .filter(|point| point.fuel_type == fuel_type && point.effective_from <= as_of)
        .max_by_key(|point| point.effective_from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, month, day).expect("valid date")
    }

    fn point(fuel: &str, date: NaiveDate, price: f64) -> FuelPricePoint {
        FuelPricePoint::new(fuel, date, price, "DOP").expect("valid point")
    }

    #[fixture]
    fn history() -> Vec<FuelPricePoint> {
        vec![
            point("Gasolina Regular", day(12, 17), 274.50),
            point("Gasolina Regular", day(11, 1), 270.00),
            point("Electricidad", day(12, 17), 35.25),
            point("Gasolina Regular", day(12, 24), 280.00),
        ]
    }

    #[rstest]
    #[case(day(12, 20), Some(274.50))]
    #[case(day(12, 17), Some(274.50))]
    #[case(day(12, 16), Some(270.00))]
    #[case(day(12, 31), Some(280.00))]
    #[case(day(10, 31), None)]
    fn picks_latest_effective_price(
        history: Vec<FuelPricePoint>,
        #[case] as_of: NaiveDate,
        #[case] expected: Option<f64>,
    ) {
        let found = latest_price(&history, "Gasolina Regular", as_of).map(|point| point.price);
        assert_eq!(found, expected);
    }

    #[rstest]
    fn unknown_fuel_has_no_price(history: Vec<FuelPricePoint>) {
        assert!(latest_price(&history, "Hydrogen", day(12, 31)).is_none());
    }

    #[rstest]
    fn later_listed_point_wins_on_equal_dates() {
        let points = vec![
            point("Kerosene", day(12, 17), 200.0),
            point("Kerosene", day(12, 17), 209.90),
        ];
        let found = latest_price(&points, "Kerosene", day(12, 17)).expect("price");
        assert_eq!(found.price, 209.90);
    }

    #[rstest]
    #[case("", 1.0, FuelPriceError::BlankFuelType)]
    #[case("Kerosene", -1.0, FuelPriceError::NonPositivePrice { fuel_type: "Kerosene".into(), price: -1.0 })]
    #[case("Kerosene", 0.0, FuelPriceError::NonPositivePrice { fuel_type: "Kerosene".into(), price: 0.0 })]
    fn rejects_invalid_points(
        #[case] fuel: &str,
        #[case] price: f64,
        #[case] expected: FuelPriceError,
    ) {
        assert_eq!(
            FuelPricePoint::new(fuel, day(1, 1), price, "DOP"),
            Err(expected)
        );
    }
}
