//! Behavioural tests for `SqliteReferenceStore` using rstest-bdd.

use std::{cell::RefCell, path::PathBuf};

use chrono::NaiveDate;
use fuelcost_core::test_support::{sample_catalog, write_reference_database};
use fuelcost_core::{
    EstimateRequest, EstimateResponse, Estimator, FuelCostEstimator, Priority, RoadType,
    SqliteReferenceStore, SqliteReferenceStoreError, VehicleClassFilter,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// Shared state for SQLite store scenarios.
#[derive(Debug)]
struct ReferenceStoreWorld {
    temp_dir: TempDir,
    path: RefCell<Option<PathBuf>>,
    store: RefCell<Option<SqliteReferenceStore>>,
    open_error: RefCell<Option<SqliteReferenceStoreError>>,
    responses: RefCell<Option<(EstimateResponse, EstimateResponse)>>,
}

impl ReferenceStoreWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            path: RefCell::new(None),
            store: RefCell::new(None),
            open_error: RefCell::new(None),
            responses: RefCell::new(None),
        }
    }

    fn database_path(&self) -> PathBuf {
        self.temp_dir.path().join("reference.db")
    }

    fn expect_path(&self) -> PathBuf {
        self.path
            .borrow()
            .clone()
            .expect("a database path should be prepared first")
    }

    fn expect_open_error(&self) -> std::cell::Ref<'_, Option<SqliteReferenceStoreError>> {
        let error = self.open_error.borrow();
        assert!(error.is_some(), "opening the store should have failed");
        error
    }
}

#[fixture]
fn world() -> ReferenceStoreWorld {
    ReferenceStoreWorld::new()
}

fn request(weight: f64, distance: f64) -> EstimateRequest {
    EstimateRequest {
        weight,
        distance,
        road_type: RoadType::Average,
        vehicle_class: VehicleClassFilter::All,
        fuel_type: Some("Gasolina Regular".to_owned()),
        temperature: 25.0,
        priority: Priority::Cost,
        as_of: NaiveDate::from_ymd_opt(2024, 3, 1),
    }
}

#[given("a SQLite reference database written from the sample catalogue")]
fn given_sample_database(world: &ReferenceStoreWorld) {
    let path = world.database_path();
    write_reference_database(&path, &sample_catalog()).expect("write reference database");
    world.path.replace(Some(path));
}

#[given("a path to a database that does not exist")]
fn given_missing_database(world: &ReferenceStoreWorld) {
    world.path.replace(Some(world.database_path()));
}

#[given("a SQLite database without reference tables")]
fn given_unrelated_database(world: &ReferenceStoreWorld) {
    let path = world.database_path();
    rusqlite::Connection::open(&path)
        .and_then(|connection| connection.execute_batch("CREATE TABLE notes (body TEXT);"))
        .expect("create unrelated database");
    world.path.replace(Some(path));
}

#[when("I open the SQLite reference store")]
fn open_store(world: &ReferenceStoreWorld) {
    match SqliteReferenceStore::open(world.expect_path()) {
        Ok(store) => {
            world.store.replace(Some(store));
            world.open_error.replace(None);
        }
        Err(err) => {
            world.store.replace(None);
            world.open_error.replace(Some(err));
        }
    }
}

#[when("I estimate {weight} kg over {distance} km with both stores")]
fn estimate_with_both(world: &ReferenceStoreWorld, weight: f64, distance: f64) {
    let request = request(weight, distance);
    let borrowed = world.store.borrow();
    let store = borrowed.as_ref().expect("store should be open");
    let from_sqlite = FuelCostEstimator::new(store)
        .estimate(&request)
        .expect("sqlite estimate");
    let from_memory = FuelCostEstimator::new(sample_catalog())
        .estimate(&request)
        .expect("in-memory estimate");
    world.responses.replace(Some((from_sqlite, from_memory)));
}

#[then("both stores produce the same ranking")]
fn then_same_ranking(world: &ReferenceStoreWorld) {
    let borrowed = world.responses.borrow();
    let (from_sqlite, from_memory) = borrowed.as_ref().expect("responses recorded");
    assert!(!from_sqlite.estimates.is_empty(), "expected candidates");
    assert_eq!(from_sqlite, from_memory);
}

#[then("opening the SQLite reference store fails with an open error")]
fn then_open_error(world: &ReferenceStoreWorld) {
    let error = world.expect_open_error();
    assert!(matches!(
        error.as_ref(),
        Some(SqliteReferenceStoreError::OpenDatabase { .. })
    ));
}

#[then("opening the SQLite reference store fails with a schema error")]
fn then_schema_error(world: &ReferenceStoreWorld) {
    let error = world.expect_open_error();
    assert!(matches!(
        error.as_ref(),
        Some(SqliteReferenceStoreError::Schema { .. })
    ));
}

#[scenario(path = "tests/features/sqlite_reference_store.feature", index = 0)]
fn sqlite_matches_catalogue(world: ReferenceStoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_reference_store.feature", index = 1)]
fn missing_database(world: ReferenceStoreWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/sqlite_reference_store.feature", index = 2)]
fn database_without_schema(world: ReferenceStoreWorld) {
    let _ = world;
}
