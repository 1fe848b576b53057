//! SQLite-backed reference store.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use thiserror::Error;

use super::{ReferenceStore, StoreError};
use crate::{
    CandidateQuery, FuelPricePoint, MAX_SECURITY_RATING, RoadType, VehicleCandidate,
    VehicleClass, VehicleProfile,
};

/// Date format used for `fuel_price.validity_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tables read by [`SqliteReferenceStore`].
///
/// Lookup tables (`vehicle_type`, `fuel_efficiency`, `vehicle_category`,
/// `vehicle_brand`) are joined by name so labels stay human-readable.
pub const REFERENCE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vehicle_type (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS vehicle_category (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS vehicle_brand (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS fuel_efficiency (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS vehicle (
    id INTEGER PRIMARY KEY,
    vehicle_type_id INTEGER NOT NULL REFERENCES vehicle_type(id),
    category_id INTEGER NOT NULL REFERENCES vehicle_category(id),
    brand_id INTEGER NOT NULL REFERENCES vehicle_brand(id),
    model TEXT NOT NULL,
    max_load_capacity REAL NOT NULL,
    security_score INTEGER
);
CREATE TABLE IF NOT EXISTS vehicle_efficiency (
    vehicle_id INTEGER NOT NULL REFERENCES vehicle(id),
    efficiency_id INTEGER NOT NULL REFERENCES fuel_efficiency(id),
    efficiency_value REAL NOT NULL,
    PRIMARY KEY (vehicle_id, efficiency_id)
);
CREATE TABLE IF NOT EXISTS weight_range (
    id INTEGER PRIMARY KEY,
    min_weight REAL NOT NULL,
    max_weight REAL NOT NULL,
    efficiency_adjustment REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS temperature_range (
    id INTEGER PRIMARY KEY,
    min_temperature REAL NOT NULL,
    max_temperature REAL NOT NULL,
    efficiency_adjustment REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS fuel_price (
    id INTEGER PRIMARY KEY,
    fuel_type TEXT NOT NULL,
    validity_date TEXT NOT NULL,
    price REAL NOT NULL,
    currency TEXT NOT NULL
);
";

const SELECT_CANDIDATES_SQL: &str = "
SELECT v.id, vt.name, vc.name, vb.name, v.model, v.max_load_capacity, v.security_score,
       ve.efficiency_value
FROM vehicle AS v
JOIN vehicle_type AS vt ON vt.id = v.vehicle_type_id
JOIN vehicle_category AS vc ON vc.id = v.category_id
JOIN vehicle_brand AS vb ON vb.id = v.brand_id
JOIN vehicle_efficiency AS ve ON ve.vehicle_id = v.id
JOIN fuel_efficiency AS fe ON fe.id = ve.efficiency_id
WHERE v.max_load_capacity >= ?1
  AND fe.name = ?2
  AND (?3 = 'all' OR vt.name = ?3)
ORDER BY v.id";

const WEIGHT_BAND_SQL: &str = "
SELECT efficiency_adjustment FROM weight_range
WHERE min_weight <= ?1 AND max_weight >= ?1
ORDER BY min_weight
LIMIT 1";

const TEMPERATURE_BAND_SQL: &str = "
SELECT efficiency_adjustment FROM temperature_range
WHERE min_temperature <= ?1 AND max_temperature >= ?1
ORDER BY min_temperature
LIMIT 1";

const LATEST_PRICE_SQL: &str = "
SELECT fuel_type, validity_date, price, currency FROM fuel_price
WHERE fuel_type = ?1 AND validity_date <= ?2
ORDER BY validity_date DESC, id DESC
LIMIT 1";

const STATEMENTS: [&str; 4] = [
    SELECT_CANDIDATES_SQL,
    WEIGHT_BAND_SQL,
    TEMPERATURE_BAND_SQL,
    LATEST_PRICE_SQL,
];

/// Error raised when opening a reference database.
#[derive(Debug, Error)]
pub enum SqliteReferenceStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database lacks the expected tables or columns.
    #[error("SQLite database at {path} does not contain the reference schema: {source}")]
    Schema {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Read-only [`ReferenceStore`] over a SQLite database.
pub struct SqliteReferenceStore {
    connection: Mutex<Connection>,
    path: PathBuf,
}

impl fmt::Debug for SqliteReferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteReferenceStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteReferenceStore {
    /// Open `path` read-only and check that every query can be prepared.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteReferenceStoreError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteReferenceStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;

        for sql in STATEMENTS {
            connection
                .prepare_cached(sql)
                .map_err(|source| SqliteReferenceStoreError::Schema {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        Ok(Self {
            connection: Mutex::new(connection),
            path: path.to_path_buf(),
        })
    }

    /// Location of the backing database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        // Queries keep no state between calls; a poisoned lock is still usable.
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn band_lookup(
        &self,
        sql: &str,
        value: f64,
        operation: &'static str,
    ) -> Result<Option<f64>, StoreError> {
        let connection = self.connection();
        let mut statement = connection
            .prepare_cached(sql)
            .map_err(|source| StoreError::query(operation, source))?;
        statement
            .query_row([value], |row| row.get::<_, f64>(0))
            .optional()
            .map_err(|source| StoreError::query(operation, source))
    }
}

struct CandidateRow {
    id: i64,
    class: String,
    category: String,
    brand: String,
    model: String,
    max_load_capacity: f64,
    security_score: Option<i64>,
    efficiency: f64,
}

impl CandidateRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            class: row.get(1)?,
            category: row.get(2)?,
            brand: row.get(3)?,
            model: row.get(4)?,
            max_load_capacity: row.get(5)?,
            security_score: row.get(6)?,
            efficiency: row.get(7)?,
        })
    }

    fn into_candidate(self, road_type: RoadType) -> Result<VehicleCandidate, StoreError> {
        let id = u64::try_from(self.id).map_err(|_| malformed_vehicle(self.id, "negative id"))?;
        let class: VehicleClass = self
            .class
            .parse()
            .map_err(|err: crate::ParseLabelError| malformed_vehicle(self.id, &err.to_string()))?;
        let security_rating = self
            .security_score
            .map(|score| {
                u8::try_from(score)
                    .ok()
                    .filter(|rating| *rating <= MAX_SECURITY_RATING)
                    .ok_or_else(|| {
                        malformed_vehicle(
                            self.id,
                            &format!("security score {score} outside 0..={MAX_SECURITY_RATING}"),
                        )
                    })
            })
            .transpose()?;
        Ok(VehicleCandidate {
            profile: VehicleProfile {
                id,
                class,
                category: self.category,
                brand: self.brand,
                model: self.model,
                max_load_capacity: self.max_load_capacity,
                security_rating,
            },
            road_type,
            nominal_efficiency: self.efficiency,
        })
    }
}

fn malformed_vehicle(id: i64, message: &str) -> StoreError {
    StoreError::Malformed {
        entity: "vehicle",
        message: format!("vehicle {id}: {message}"),
    }
}

impl ReferenceStore for SqliteReferenceStore {
    fn select_candidates(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<VehicleCandidate>, StoreError> {
        const OPERATION: &str = "select candidate vehicles";
        let connection = self.connection();
        let mut statement = connection
            .prepare_cached(SELECT_CANDIDATES_SQL)
            .map_err(|source| StoreError::query(OPERATION, source))?;
        let rows = statement
            .query_map(
                (
                    query.min_capacity,
                    query.road_type.as_str(),
                    query.class.as_str(),
                ),
                CandidateRow::read,
            )
            .map_err(|source| StoreError::query(OPERATION, source))?;

        rows.map(|row| {
            row.map_err(|source| StoreError::query(OPERATION, source))?
                .into_candidate(query.road_type)
        })
        .collect()
    }

    fn weight_adjustment(&self, weight: f64) -> Result<Option<f64>, StoreError> {
        self.band_lookup(WEIGHT_BAND_SQL, weight, "look up weight band")
    }

    fn temperature_adjustment(&self, temperature: f64) -> Result<Option<f64>, StoreError> {
        self.band_lookup(TEMPERATURE_BAND_SQL, temperature, "look up temperature band")
    }

    fn latest_price(
        &self,
        fuel_type: &str,
        as_of: NaiveDate,
    ) -> Result<Option<FuelPricePoint>, StoreError> {
        const OPERATION: &str = "look up fuel price";
        let connection = self.connection();
        let mut statement = connection
            .prepare_cached(LATEST_PRICE_SQL)
            .map_err(|source| StoreError::query(OPERATION, source))?;
        let as_of_text = as_of.format(DATE_FORMAT).to_string();
        let row = statement
            .query_row((fuel_type, as_of_text.as_str()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()
            .map_err(|source| StoreError::query(OPERATION, source))?;

        row.map(|(fuel, date, price, currency)| {
            let effective_from =
                NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|err| {
                    StoreError::Malformed {
                        entity: "fuel price",
                        message: format!("{fuel} validity date {date:?}: {err}"),
                    }
                })?;
            FuelPricePoint::new(fuel, effective_from, price, currency).map_err(|err| {
                StoreError::Malformed {
                    entity: "fuel price",
                    message: err.to_string(),
                }
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingStore, sample_catalog, write_reference_database};
    use crate::{ReferenceCatalog, VehicleClassFilter};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        catalog: ReferenceCatalog,
        store: SqliteReferenceStore,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("reference.db");
        let catalog = sample_catalog();
        write_reference_database(&path, &catalog).expect("write reference database");
        let store = SqliteReferenceStore::open(&path).expect("open store");
        Fixture {
            _dir: dir,
            catalog,
            store,
        }
    }

    #[rstest]
    #[case(0.0, RoadType::Average, VehicleClassFilter::All)]
    #[case(6000.0, RoadType::Average, VehicleClassFilter::Only(VehicleClass::Gas))]
    #[case(8500.0, RoadType::Highways, VehicleClassFilter::All)]
    #[case(0.0, RoadType::City, VehicleClassFilter::Only(VehicleClass::Electric))]
    #[case(1.0e9, RoadType::City, VehicleClassFilter::All)]
    fn candidate_selection_matches_in_memory_catalog(
        fixture: Fixture,
        #[case] min_capacity: f64,
        #[case] road_type: RoadType,
        #[case] class: VehicleClassFilter,
    ) {
        let query = CandidateQuery {
            min_capacity,
            road_type,
            class,
        };
        assert_eq!(
            fixture.store.select_candidates(&query).expect("sqlite query"),
            fixture.catalog.select_candidates(&query).expect("memory query"),
        );
    }

    #[rstest]
    #[case(5001.0, Some(12.5))]
    #[case(6000.0, Some(12.5))]
    #[case(1000.5, None)]
    #[case(20_000.0, None)]
    fn weight_bands_are_inclusive(
        fixture: Fixture,
        #[case] weight: f64,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(
            fixture.store.weight_adjustment(weight).expect("band query"),
            expected
        );
    }

    #[rstest]
    fn temperature_bands_match_catalog(fixture: Fixture) {
        for probe in [-20.0, 0.0, 1.0, 25.0, 32.0, 90.0, 95.0] {
            assert_eq!(
                fixture.store.temperature_adjustment(probe).expect("band query"),
                fixture.catalog.temperature_adjustment(probe).expect("band query"),
                "temperature {probe}"
            );
        }
    }

    #[rstest]
    fn latest_price_respects_effective_date(fixture: Fixture) {
        let before = NaiveDate::from_ymd_opt(2023, 12, 16).expect("date");
        let after = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
        assert!(
            fixture
                .store
                .latest_price("Gas Licuado (GLP)", before)
                .expect("price query")
                .is_none()
        );
        assert_eq!(
            fixture
                .store
                .latest_price("Gas Licuado (GLP)", after)
                .expect("price query"),
            fixture
                .catalog
                .latest_price("Gas Licuado (GLP)", after)
                .expect("price query"),
        );
    }

    fn tampered_store(dir: &TempDir, statement: &str) -> SqliteReferenceStore {
        let path = dir.path().join("tampered.db");
        write_reference_database(&path, &sample_catalog()).expect("write reference database");
        Connection::open(&path)
            .and_then(|connection| connection.execute_batch(statement))
            .expect("edit reference database");
        SqliteReferenceStore::open(&path).expect("open store")
    }

    #[rstest]
    #[case(42)]
    #[case(11)]
    #[case(-1)]
    fn stored_security_score_above_ceiling_is_malformed(#[case] score: i64) {
        let dir = TempDir::new().expect("tempdir");
        let store = tampered_store(
            &dir,
            &format!("UPDATE vehicle SET security_score = {score} WHERE id = 2;"),
        );
        let query = CandidateQuery {
            min_capacity: 0.0,
            road_type: RoadType::Average,
            class: VehicleClassFilter::All,
        };
        let err = store.select_candidates(&query).expect_err("rating rejected");
        assert!(
            matches!(err, StoreError::Malformed { entity: "vehicle", .. }),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn stored_security_score_at_ceiling_is_accepted() {
        let dir = TempDir::new().expect("tempdir");
        let store = tampered_store(&dir, "UPDATE vehicle SET security_score = 10 WHERE id = 2;");
        let query = CandidateQuery {
            min_capacity: 0.0,
            road_type: RoadType::Average,
            class: VehicleClassFilter::All,
        };
        let candidates = store.select_candidates(&query).expect("sqlite query");
        let rating = candidates
            .iter()
            .find(|candidate| candidate.profile.id == 2)
            .and_then(|candidate| candidate.profile.security_rating);
        assert_eq!(rating, Some(MAX_SECURITY_RATING));
    }

    #[rstest]
    fn stored_zero_price_is_malformed() {
        let dir = TempDir::new().expect("tempdir");
        let store = tampered_store(
            &dir,
            "UPDATE fuel_price SET price = 0.0 WHERE fuel_type = 'Gas Licuado (GLP)';",
        );
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
        let err = store
            .latest_price("Gas Licuado (GLP)", as_of)
            .expect_err("zero price rejected");
        assert!(
            matches!(err, StoreError::Malformed { entity: "fuel price", .. }),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn opening_missing_database_fails() {
        let dir = TempDir::new().expect("tempdir");
        let err = SqliteReferenceStore::open(dir.path().join("absent.db"))
            .expect_err("missing database");
        assert!(matches!(err, SqliteReferenceStoreError::OpenDatabase { .. }));
    }

    #[rstest]
    fn opening_database_without_schema_fails() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .and_then(|connection| connection.execute_batch("CREATE TABLE unrelated (id INTEGER);"))
            .expect("create unrelated database");
        let err = SqliteReferenceStore::open(&path).expect_err("schema missing");
        assert!(matches!(err, SqliteReferenceStoreError::Schema { .. }));
    }

    #[rstest]
    fn failing_store_reports_operation() {
        let err = FailingStore
            .latest_price("Kerosene", NaiveDate::MIN)
            .expect_err("store offline");
        assert!(err.to_string().contains("look up fuel price"));
    }
}
