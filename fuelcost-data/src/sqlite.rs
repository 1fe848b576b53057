//! SQLite persistence for reference catalogues.

use camino::{Utf8Path, Utf8PathBuf};
use fuelcost_core::store::{DATE_FORMAT, REFERENCE_SCHEMA};
use fuelcost_core::{BandSet, ReferenceCatalog, RoadType, Vehicle, VehicleClass};
use log::info;
use rusqlite::{Connection, Error as SqliteError, Transaction, params};
use serde::Serialize;
use thiserror::Error;

use crate::fs::ensure_parent_dir;

/// Tables emptied before seeding, children first.
const SEEDED_TABLES: [&str; 9] = [
    "vehicle_efficiency",
    "vehicle",
    "vehicle_brand",
    "vehicle_category",
    "vehicle_type",
    "fuel_efficiency",
    "weight_range",
    "temperature_range",
    "fuel_price",
];

/// Errors raised when persisting reference data to SQLite.
#[derive(Debug, Error)]
pub enum PersistReferenceError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin reference data transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the reference tables failed.
    #[error("failed to create reference tables")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Removing previous rows failed.
    #[error("failed to clear table {table}")]
    ClearTable {
        /// Table being emptied.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing an insert statement failed.
    #[error("failed to prepare insert into {table}")]
    PrepareInsert {
        /// Target table.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A vehicle identifier could not be represented as an SQLite integer.
    #[error("vehicle id {vehicle_id} exceeds SQLite i64 range")]
    VehicleIdOutOfRange {
        /// Identifier that failed the conversion.
        vehicle_id: u64,
    },
    /// Writing a row failed.
    #[error("failed to write a row into {table}")]
    PersistRow {
        /// Target table.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit reference data transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Row counts written by [`persist_reference_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    /// Vehicles written.
    pub vehicles: usize,
    /// Efficiency records written.
    pub efficiencies: usize,
    /// Weight bands written.
    pub weight_bands: usize,
    /// Temperature bands written.
    pub temperature_bands: usize,
    /// Fuel price points written.
    pub fuel_prices: usize,
}

/// Write `catalog` to the SQLite database at `path`.
///
/// Parent directories and tables are created when missing. Existing
/// reference rows are replaced in a single transaction, so re-seeding leaves
/// exactly the catalogue's contents behind.
pub fn persist_reference_data(
    path: &Utf8Path,
    catalog: &ReferenceCatalog,
) -> Result<SeedSummary, PersistReferenceError> {
    ensure_parent_dir(path).map_err(|source| PersistReferenceError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| PersistReferenceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| PersistReferenceError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| PersistReferenceError::BeginTransaction { source })?;

    transaction
        .execute_batch(REFERENCE_SCHEMA)
        .map_err(|source| PersistReferenceError::CreateSchema { source })?;
    clear_tables(&transaction)?;
    persist_lookups(&transaction)?;
    let (vehicles, efficiencies) = persist_vehicles(&transaction, catalog.vehicles())?;
    let adjustments = catalog.adjustments();
    let summary = SeedSummary {
        vehicles,
        efficiencies,
        weight_bands: persist_bands(&transaction, WEIGHT_RANGE, &adjustments.weight)?,
        temperature_bands: persist_bands(
            &transaction,
            TEMPERATURE_RANGE,
            &adjustments.temperature,
        )?,
        fuel_prices: persist_prices(&transaction, catalog)?,
    };

    transaction
        .commit()
        .map_err(|source| PersistReferenceError::Commit { source })?;
    info!(
        "seeded {path} with {} vehicles, {} weight bands, {} temperature bands and {} prices",
        summary.vehicles, summary.weight_bands, summary.temperature_bands, summary.fuel_prices
    );
    Ok(summary)
}

fn clear_tables(transaction: &Transaction<'_>) -> Result<(), PersistReferenceError> {
    for table in SEEDED_TABLES {
        transaction
            .execute(&format!("DELETE FROM {table}"), [])
            .map_err(|source| PersistReferenceError::ClearTable { table, source })?;
    }
    Ok(())
}

fn persist_lookups(transaction: &Transaction<'_>) -> Result<(), PersistReferenceError> {
    insert_names(transaction, "vehicle_type", VehicleClass::ALL.map(VehicleClass::as_str))?;
    insert_names(transaction, "fuel_efficiency", RoadType::ALL.map(RoadType::as_str))
}

fn insert_names(
    transaction: &Transaction<'_>,
    table: &'static str,
    names: [&str; 3],
) -> Result<(), PersistReferenceError> {
    let mut statement = transaction
        .prepare(&format!("INSERT INTO {table} (id, name) VALUES (?1, ?2)"))
        .map_err(|source| PersistReferenceError::PrepareInsert { table, source })?;
    for (id, name) in (1_i64..).zip(names) {
        statement
            .execute((id, name))
            .map_err(|source| PersistReferenceError::PersistRow { table, source })?;
    }
    Ok(())
}

fn persist_vehicles(
    transaction: &Transaction<'_>,
    vehicles: &[Vehicle],
) -> Result<(usize, usize), PersistReferenceError> {
    let mut category = prepare(
        transaction,
        "vehicle_category",
        "INSERT OR IGNORE INTO vehicle_category (name) VALUES (?1)",
    )?;
    let mut brand = prepare(
        transaction,
        "vehicle_brand",
        "INSERT OR IGNORE INTO vehicle_brand (name) VALUES (?1)",
    )?;
    let mut vehicle_row = prepare(
        transaction,
        "vehicle",
        "INSERT INTO vehicle (id, vehicle_type_id, category_id, brand_id, model,
                              max_load_capacity, security_score)
         VALUES (?1,
                 (SELECT id FROM vehicle_type WHERE name = ?2),
                 (SELECT id FROM vehicle_category WHERE name = ?3),
                 (SELECT id FROM vehicle_brand WHERE name = ?4),
                 ?5, ?6, ?7)",
    )?;
    let mut efficiency_row = prepare(
        transaction,
        "vehicle_efficiency",
        "INSERT INTO vehicle_efficiency (vehicle_id, efficiency_id, efficiency_value)
         VALUES (?1, (SELECT id FROM fuel_efficiency WHERE name = ?2), ?3)",
    )?;

    let mut efficiencies = 0_usize;
    for vehicle in vehicles {
        let profile = vehicle.profile();
        let vehicle_id = i64::try_from(profile.id).map_err(|_| {
            PersistReferenceError::VehicleIdOutOfRange {
                vehicle_id: profile.id,
            }
        })?;
        category
            .execute([&profile.category])
            .map_err(|source| row_error("vehicle_category", source))?;
        brand
            .execute([&profile.brand])
            .map_err(|source| row_error("vehicle_brand", source))?;
        vehicle_row
            .execute(params![
                vehicle_id,
                profile.class.as_str(),
                profile.category,
                profile.brand,
                profile.model,
                profile.max_load_capacity,
                profile.security_rating,
            ])
            .map_err(|source| row_error("vehicle", source))?;
        for (road_type, value) in vehicle.efficiencies() {
            efficiency_row
                .execute(params![vehicle_id, road_type.as_str(), value])
                .map_err(|source| row_error("vehicle_efficiency", source))?;
        }
        efficiencies = efficiencies.saturating_add(vehicle.efficiencies().len());
    }
    Ok((vehicles.len(), efficiencies))
}

const WEIGHT_RANGE: (&str, &str) = (
    "weight_range",
    "INSERT INTO weight_range (min_weight, max_weight, efficiency_adjustment)
     VALUES (?1, ?2, ?3)",
);

const TEMPERATURE_RANGE: (&str, &str) = (
    "temperature_range",
    "INSERT INTO temperature_range (min_temperature, max_temperature, efficiency_adjustment)
     VALUES (?1, ?2, ?3)",
);

fn persist_bands(
    transaction: &Transaction<'_>,
    (table, sql): (&'static str, &str),
    bands: &BandSet,
) -> Result<usize, PersistReferenceError> {
    let mut statement = prepare(transaction, table, sql)?;
    for band in bands.bands() {
        statement
            .execute((band.min(), band.max(), band.percent()))
            .map_err(|source| row_error(table, source))?;
    }
    Ok(bands.bands().len())
}

fn persist_prices(
    transaction: &Transaction<'_>,
    catalog: &ReferenceCatalog,
) -> Result<usize, PersistReferenceError> {
    const TABLE: &str = "fuel_price";
    let mut statement = prepare(
        transaction,
        TABLE,
        "INSERT INTO fuel_price (fuel_type, validity_date, price, currency)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for point in catalog.fuel_prices() {
        statement
            .execute((
                &point.fuel_type,
                point.effective_from.format(DATE_FORMAT).to_string(),
                point.price,
                &point.currency,
            ))
            .map_err(|source| row_error(TABLE, source))?;
    }
    Ok(catalog.fuel_prices().len())
}

fn prepare<'conn>(
    transaction: &'conn Transaction<'_>,
    table: &'static str,
    sql: &str,
) -> Result<rusqlite::Statement<'conn>, PersistReferenceError> {
    transaction
        .prepare(sql)
        .map_err(|source| PersistReferenceError::PrepareInsert { table, source })
}

const fn row_error(table: &'static str, source: SqliteError) -> PersistReferenceError {
    PersistReferenceError::PersistRow { table, source }
}
