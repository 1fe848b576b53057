//! Behavioural tests for dataset loading and SQLite seeding.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use fuelcost_core::{
    EstimateRequest, Estimator, FuelCostEstimator, Priority, ReferenceCatalog, RoadType,
    SqliteReferenceStore, VehicleClass, VehicleClassFilter,
};
use fuelcost_data::{
    BandRecord, DatasetError, SeedSummary, default_dataset, load_catalog, persist_reference_data,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

#[derive(Debug)]
struct SeedWorld {
    temp_dir: TempDir,
    catalog: RefCell<Option<ReferenceCatalog>>,
    summary: RefCell<Option<SeedSummary>>,
    dataset_path: RefCell<Option<Utf8PathBuf>>,
    load_error: RefCell<Option<DatasetError>>,
}

impl SeedWorld {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            catalog: RefCell::new(None),
            summary: RefCell::new(None),
            dataset_path: RefCell::new(None),
            load_error: RefCell::new(None),
        }
    }

    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.temp_dir.path().join(name)).expect("utf-8 path")
    }

    fn database_path(&self) -> Utf8PathBuf {
        self.path("data/reference.db")
    }
}

#[fixture]
fn world() -> SeedWorld {
    SeedWorld::new()
}

#[given("the bundled reference dataset")]
fn given_bundled_dataset(world: &SeedWorld) {
    let catalog = default_dataset()
        .and_then(fuelcost_data::ReferenceDataset::into_catalog)
        .expect("bundled dataset is valid");
    world.catalog.replace(Some(catalog));
}

#[given("a dataset file whose weight bands overlap")]
fn given_overlapping_dataset(world: &SeedWorld) {
    let mut dataset = default_dataset().expect("bundled dataset parses");
    dataset.weight_bands.push(BandRecord {
        min: 0.0,
        max: 20_000.0,
        adjustment: 5.0,
    });
    let path = world.path("overlapping.json");
    let text = serde_json::to_string_pretty(&dataset).expect("serialise dataset");
    std::fs::write(path.as_std_path(), text).expect("write dataset");
    world.dataset_path.replace(Some(path));
}

#[when("I seed a SQLite database with the dataset")]
fn when_seed(world: &SeedWorld) {
    let borrowed = world.catalog.borrow();
    let catalog = borrowed.as_ref().expect("catalogue loaded");
    let summary = persist_reference_data(&world.database_path(), catalog).expect("seed database");
    world.summary.replace(Some(summary));
}

#[when("I load the dataset file")]
fn when_load(world: &SeedWorld) {
    let path = world.dataset_path.borrow().clone().expect("dataset path");
    match load_catalog(&path) {
        Ok(catalog) => {
            world.catalog.replace(Some(catalog));
        }
        Err(err) => {
            world.load_error.replace(Some(err));
        }
    }
}

#[then("the database holds {vehicles} vehicles and {prices} fuel prices")]
fn then_database_counts(world: &SeedWorld, vehicles: i64, prices: i64) {
    let connection =
        rusqlite::Connection::open(world.database_path().as_std_path()).expect("open database");
    let count = |table: &str| -> i64 {
        connection
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count rows")
    };
    assert_eq!(count("vehicle"), vehicles);
    assert_eq!(count("fuel_price"), prices);
    assert!(world.summary.borrow().is_some(), "seed summary recorded");
}

#[then("estimating 6000 kg of gas transport ranks {count} vehicles with vehicle {id} cheapest")]
fn then_estimate(world: &SeedWorld, count: usize, id: u64) {
    let store = SqliteReferenceStore::open(world.database_path().as_std_path()).expect("open store");
    let request = EstimateRequest {
        weight: 6000.0,
        distance: 100.0,
        road_type: RoadType::Average,
        vehicle_class: VehicleClassFilter::Only(VehicleClass::Gas),
        fuel_type: Some("Gas Licuado (GLP)".to_owned()),
        temperature: 0.0,
        priority: Priority::Cost,
        as_of: NaiveDate::from_ymd_opt(2024, 1, 1),
    };
    let response = FuelCostEstimator::new(store)
        .estimate(&request)
        .expect("estimate succeeds");
    assert_eq!(response.estimates.len(), count);
    let cheapest = response.estimates.first().expect("at least one estimate");
    assert_eq!(cheapest.vehicle_id(), id);
}

#[then("loading fails with a weight band error")]
fn then_band_error(world: &SeedWorld) {
    let error = world.load_error.borrow();
    assert!(matches!(
        error.as_ref(),
        Some(DatasetError::Band {
            table: "weight",
            ..
        })
    ));
}

#[scenario(path = "tests/features/seed.feature", index = 0)]
fn bundled_dataset_seeds(world: SeedWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/seed.feature", index = 1)]
fn reseeding_is_idempotent(world: SeedWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/seed.feature", index = 2)]
fn overlapping_bands_rejected(world: SeedWorld) {
    let _ = world;
}
