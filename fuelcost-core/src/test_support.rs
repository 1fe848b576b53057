//! Test utilities for crates depending on `fuelcost-core`.
//!
//! The sample catalogue mirrors a slice of the bundled reference dataset with
//! fixed efficiencies so tests can assert exact figures.
#![expect(
    clippy::expect_used,
    clippy::missing_panics_doc,
    reason = "fixture data is static and known to be valid"
)]

use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDate;

use crate::store::StoreError;
use crate::{
    AdjustmentBand, AdjustmentTables, BandSet, CandidateQuery, FuelPricePoint, RankedEstimate,
    ReferenceCatalog, ReferenceStore, RoadType, Vehicle, VehicleCandidate, VehicleClass,
    VehicleProfile,
};

/// Currency used by every sample price.
pub const SAMPLE_CURRENCY: &str = "DOP";

/// Date on which every sample price takes effect.
#[must_use]
pub fn sample_price_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 17).expect("valid date")
}

fn profile(id: u64, class: VehicleClass, capacity: f64, rating: Option<u8>) -> VehicleProfile {
    VehicleProfile {
        id,
        class,
        category: "Categoría 1".into(),
        brand: "Toyota".into(),
        model: format!("Model {id}"),
        max_load_capacity: capacity,
        security_rating: rating,
    }
}

/// A vehicle with only an `average` efficiency.
#[must_use]
pub fn vehicle(
    id: u64,
    class: VehicleClass,
    capacity: f64,
    rating: Option<u8>,
    average_efficiency: f64,
) -> Vehicle {
    Vehicle::new(
        profile(id, class, capacity, rating),
        BTreeMap::from([(RoadType::Average, average_efficiency)]),
    )
    .expect("valid vehicle")
}

/// A candidate on `average` roads.
#[must_use]
pub fn candidate(
    id: u64,
    class: VehicleClass,
    rating: Option<u8>,
    nominal_efficiency: f64,
) -> VehicleCandidate {
    VehicleCandidate {
        profile: profile(id, class, 10_000.0, rating),
        road_type: RoadType::Average,
        nominal_efficiency,
    }
}

/// A finished estimate with the given figures.
#[must_use]
pub fn ranked(
    id: u64,
    class: VehicleClass,
    rating: Option<u8>,
    adjusted_efficiency: f64,
    estimated_cost: Option<f64>,
) -> RankedEstimate {
    RankedEstimate {
        profile: profile(id, class, 10_000.0, rating),
        road_type: RoadType::Average,
        nominal_efficiency: adjusted_efficiency,
        adjusted_efficiency,
        estimated_cost,
    }
}

#[expect(clippy::too_many_arguments, reason = "mirrors one dataset row")]
fn seeded(
    id: u64,
    class: VehicleClass,
    category: &str,
    brand: &str,
    model: &str,
    capacity: f64,
    rating: Option<u8>,
    efficiencies: &[(RoadType, f64)],
) -> Vehicle {
    Vehicle::new(
        VehicleProfile {
            id,
            class,
            category: category.into(),
            brand: brand.into(),
            model: model.into(),
            max_load_capacity: capacity,
            security_rating: rating,
        },
        efficiencies.iter().copied().collect(),
    )
    .expect("valid vehicle")
}

const fn triple(city: f64, highways: f64, average: f64) -> [(RoadType, f64); 3] {
    [
        (RoadType::City, city),
        (RoadType::Highways, highways),
        (RoadType::Average, average),
    ]
}

/// Vehicles covering every class, a vehicle without efficiencies and one
/// without a security rating.
#[must_use]
pub fn sample_vehicles() -> Vec<Vehicle> {
    use VehicleClass::{Electric, Gas, Gasoline};
    vec![
        seeded(1, Electric, "Categoría 1", "Toyota", "Camry", 5000.0, Some(7), &triple(6.5, 8.8, 7.4)),
        seeded(2, Gas, "Categoría 2", "Ford", "F-150", 7000.0, Some(4), &triple(7.2, 9.1, 8.0)),
        seeded(4, Gas, "Categoría 2", "Honda", "Civic", 8000.0, Some(6), &triple(6.0, 8.4, 7.5)),
        seeded(5, Electric, "Categoría 3", "Volkswagen", "Jetta", 9000.0, Some(3), &triple(5.8, 7.9, 6.6)),
        seeded(21, Gasoline, "Categoría 3", "Volkswagen", "Passat", 8500.0, Some(8), &triple(5.5, 7.3, 6.2)),
        seeded(22, Gasoline, "Categoría 3", "Nissan", "Maxima", 9800.0, Some(3), &triple(5.1, 6.9, 6.0)),
        seeded(26, Gasoline, "Categoría 5", "Hyundai", "Tucson", 19800.0, Some(1), &[]),
        seeded(30, Gas, "Categoría 2", "Ford", "Transit", 6500.0, None, &[(RoadType::Average, 8.0)]),
    ]
}

fn bands(lower: f64, step: f64, first_upper: f64, count: u16, percent_step: f64) -> BandSet {
    #[expect(clippy::float_arithmetic, reason = "band edges are computed from steps")]
    let built = (0..count)
        .map(|position| {
            let index = f64::from(position);
            let min = if position == 0 {
                lower
            } else {
                first_upper + step * (index - 1.0) + 1.0
            };
            let max = first_upper + step * index;
            AdjustmentBand::new(min, max, percent_step * index).expect("valid band")
        })
        .collect();
    BandSet::new(built).expect("disjoint bands")
}

/// Weight bands of 1000 kg from 0 to 10000, 2.5% apart.
#[must_use]
pub fn sample_weight_bands() -> BandSet {
    bands(0.0, 1000.0, 1000.0, 10, 2.5)
}

/// Temperature bands from -20 to 90 °C, 1.5% apart.
#[must_use]
pub fn sample_temperature_bands() -> BandSet {
    bands(-20.0, 10.0, 0.0, 10, 1.5)
}

/// Prices for every sample fuel, all effective on [`sample_price_date`].
#[must_use]
pub fn sample_prices() -> Vec<FuelPricePoint> {
    [
        ("Gasolina Premium", 293.10),
        ("Gasolina Regular", 274.50),
        ("Gasoil Optimo", 239.10),
        ("Gasoil Regular", 221.60),
        ("Kerosene", 209.90),
        ("Gas Licuado (GLP)", 132.60),
        ("Gas Natural (GNV)", 43.97),
        ("Electricidad", 35.25),
    ]
    .into_iter()
    .map(|(fuel, price)| {
        FuelPricePoint::new(fuel, sample_price_date(), price, SAMPLE_CURRENCY)
            .expect("valid price")
    })
    .collect()
}

/// Catalogue assembled from the sample vehicles, bands and prices.
#[must_use]
pub fn sample_catalog() -> ReferenceCatalog {
    ReferenceCatalog::new(
        sample_vehicles(),
        AdjustmentTables {
            weight: sample_weight_bands(),
            temperature: sample_temperature_bands(),
        },
        sample_prices(),
    )
    .expect("valid catalogue")
}

/// Store whose every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

fn offline(operation: &'static str) -> StoreError {
    StoreError::query(operation, io::Error::other("reference store offline"))
}

impl ReferenceStore for FailingStore {
    fn select_candidates(
        &self,
        _query: &CandidateQuery,
    ) -> Result<Vec<VehicleCandidate>, StoreError> {
        Err(offline("select candidate vehicles"))
    }

    fn weight_adjustment(&self, _weight: f64) -> Result<Option<f64>, StoreError> {
        Err(offline("look up weight band"))
    }

    fn temperature_adjustment(&self, _temperature: f64) -> Result<Option<f64>, StoreError> {
        Err(offline("look up temperature band"))
    }

    fn latest_price(
        &self,
        _fuel_type: &str,
        _as_of: NaiveDate,
    ) -> Result<Option<FuelPricePoint>, StoreError> {
        Err(offline("look up fuel price"))
    }
}

/// Write `catalog` into a fresh SQLite database at `path`.
#[cfg(feature = "store-sqlite")]
pub fn write_reference_database(
    path: &std::path::Path,
    catalog: &ReferenceCatalog,
) -> rusqlite::Result<()> {
    use crate::store::{DATE_FORMAT, REFERENCE_SCHEMA};
    use rusqlite::{Connection, params};

    let mut connection = Connection::open(path)?;
    let tx = connection.transaction()?;
    tx.execute_batch(REFERENCE_SCHEMA)?;
    for class in VehicleClass::ALL {
        tx.execute(
            "INSERT INTO vehicle_type (name) VALUES (?1)",
            [class.as_str()],
        )?;
    }
    for road_type in RoadType::ALL {
        tx.execute(
            "INSERT INTO fuel_efficiency (name) VALUES (?1)",
            [road_type.as_str()],
        )?;
    }
    for vehicle in catalog.vehicles() {
        let profile = vehicle.profile();
        tx.execute(
            "INSERT OR IGNORE INTO vehicle_category (name) VALUES (?1)",
            [&profile.category],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO vehicle_brand (name) VALUES (?1)",
            [&profile.brand],
        )?;
        tx.execute(
            "INSERT INTO vehicle (id, vehicle_type_id, category_id, brand_id, model,
                                  max_load_capacity, security_score)
             VALUES (?1,
                     (SELECT id FROM vehicle_type WHERE name = ?2),
                     (SELECT id FROM vehicle_category WHERE name = ?3),
                     (SELECT id FROM vehicle_brand WHERE name = ?4),
                     ?5, ?6, ?7)",
            params![
                i64::try_from(profile.id).expect("id fits in i64"),
                profile.class.as_str(),
                profile.category,
                profile.brand,
                profile.model,
                profile.max_load_capacity,
                profile.security_rating,
            ],
        )?;
        for (road_type, value) in vehicle.efficiencies() {
            tx.execute(
                "INSERT INTO vehicle_efficiency (vehicle_id, efficiency_id, efficiency_value)
                 VALUES (?1, (SELECT id FROM fuel_efficiency WHERE name = ?2), ?3)",
                params![
                    i64::try_from(profile.id).expect("id fits in i64"),
                    road_type.as_str(),
                    value
                ],
            )?;
        }
    }
    let tables = catalog.adjustments();
    for band in tables.weight.bands() {
        tx.execute(
            "INSERT INTO weight_range (min_weight, max_weight, efficiency_adjustment)
             VALUES (?1, ?2, ?3)",
            params![band.min(), band.max(), band.percent()],
        )?;
    }
    for band in tables.temperature.bands() {
        tx.execute(
            "INSERT INTO temperature_range (min_temperature, max_temperature, efficiency_adjustment)
             VALUES (?1, ?2, ?3)",
            params![band.min(), band.max(), band.percent()],
        )?;
    }
    for point in catalog.fuel_prices() {
        tx.execute(
            "INSERT INTO fuel_price (fuel_type, validity_date, price, currency)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                point.fuel_type,
                point.effective_from.format(DATE_FORMAT).to_string(),
                point.price,
                point.currency,
            ],
        )?;
    }
    tx.commit()
}
