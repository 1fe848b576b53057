//! Test helpers for writing CLI inputs and reference databases.

use camino::{Utf8Path, Utf8PathBuf};
use fuelcost_core::test_support::sample_catalog;
use fuelcost_core::{EstimateRequest, Priority, RoadType, VehicleClass, VehicleClassFilter};
use tempfile::TempDir;

pub(super) const GLP: &str = "Gas Licuado (GLP)";

pub(super) fn write_utf8(path: &Utf8Path, bytes: &[u8]) {
    std::fs::write(path.as_std_path(), bytes).expect("write test file");
}

pub(super) fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace")
}

/// The 6000 kg, 100 km gas request whose cheapest vehicle costs 1894.2857.
pub(super) fn reference_request() -> EstimateRequest {
    EstimateRequest {
        weight: 6000.0,
        distance: 100.0,
        road_type: RoadType::Average,
        vehicle_class: VehicleClassFilter::Only(VehicleClass::Gas),
        fuel_type: Some(GLP.to_owned()),
        temperature: 0.0,
        priority: Priority::Cost,
        as_of: None,
    }
}

pub(super) fn write_request(path: &Utf8Path, request: &EstimateRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialise request");
    write_utf8(path, payload.as_bytes());
}

pub(super) fn write_sample_database(path: &Utf8Path) {
    fuelcost_data::persist_reference_data(path, &sample_catalog()).expect("seed sample database");
}
