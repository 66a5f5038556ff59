mod common;

use approx::assert_abs_diff_eq;
use ndarray::array;

use thermal_core::calibration::{
    correct, corrector, CalibrationStore, CalibrationTable, CorrectionParams, ProductFamily,
    TransmissionGrid,
};
use thermal_core::header::{FrameHeader, GainStatus};

use common::flat_table;

fn params(radiation: f32, distance: f32, environment: f32) -> CorrectionParams {
    CorrectionParams {
        radiation,
        ambient: environment,
        reflected: environment,
        distance,
        humidity: 0.8,
        gain_status: GainStatus::Low,
    }
}

fn ramp_grid() -> TransmissionGrid {
    TransmissionGrid::new(0.0, 10.0, 0.0, 1.0, array![[0.2, 0.4], [0.6, 0.8]]).unwrap()
}

// ---------------------------------------------------------------------------
// Pass-through rules
// ---------------------------------------------------------------------------

#[test]
fn test_zero_distance_passes_through() {
    let table = flat_table(0.9);
    for raw in [-20.0f32, 2.85, 36.6, 350.0] {
        assert_eq!(correct(raw, &params(0.95, 0.0, 20.0), Some(&table)), raw);
    }
}

#[test]
fn test_zero_radiation_passes_through() {
    let table = flat_table(0.9);
    assert_eq!(correct(36.6, &params(0.0, 2.0, 20.0), Some(&table)), 36.6);
    assert_eq!(correct(36.6, &params(-0.5, 2.0, 20.0), Some(&table)), 36.6);
}

#[test]
fn test_missing_table_passes_through() {
    assert_eq!(correct(36.6, &params(0.95, 2.0, 20.0), None), 36.6);
}

#[test]
fn test_ideal_conditions_are_identity() {
    let table = flat_table(1.0);
    let out = correct(55.0, &params(1.0, 2.0, 20.0), Some(&table));
    assert_abs_diff_eq!(out, 55.0, epsilon = 1e-3);
}

// ---------------------------------------------------------------------------
// Radiometric correction
// ---------------------------------------------------------------------------

#[test]
fn test_cold_target_in_warm_room_reads_colder() {
    let table = flat_table(0.9);
    let raw = 2.85;
    let out = correct(raw, &params(0.95, 2.0, 20.0), Some(&table));
    assert!(out.is_finite());
    assert!(out < raw, "expected correction below raw, got {out}");
    assert!(out > raw - 5.0, "correction too large: {out}");
}

#[test]
fn test_hot_low_emissivity_target_reads_hotter() {
    let table = flat_table(0.95);
    let out = correct(80.0, &params(0.8, 1.0, 22.0), Some(&table));
    assert!(out > 80.0, "expected correction above raw, got {out}");
}

#[test]
fn test_correction_is_deterministic() {
    let table = flat_table(0.9);
    let p = params(0.95, 2.0, 20.0);
    let a = correct(2.85, &p, Some(&table));
    let b = correct(2.85, &p, Some(&table));
    assert_eq!(a.to_bits(), b.to_bits());
    let f = corrector(&p, Some(&table));
    assert_eq!(f(2.85).to_bits(), a.to_bits());
}

#[test]
fn test_non_physical_result_falls_back_to_raw() {
    let table = flat_table(0.9);
    // far below the background: the solved radiance goes negative
    let out = correct(-250.0, &params(0.1, 2.0, 40.0), Some(&table));
    assert_eq!(out, -250.0);
}

#[test]
fn test_gain_selects_grid() {
    let table = CalibrationTable {
        high_gain: TransmissionGrid::new(0.0, 10.0, 0.0, 1.0, array![[0.5]]).unwrap(),
        low_gain: TransmissionGrid::new(0.0, 10.0, 0.0, 1.0, array![[0.95]]).unwrap(),
    };
    let mut p = params(0.95, 2.0, 20.0);
    let low = correct(60.0, &p, Some(&table));
    p.gain_status = GainStatus::High;
    let high = correct(60.0, &p, Some(&table));
    assert!((high - low).abs() > 1.0, "gain had no effect: {low} vs {high}");
}

#[test]
fn test_humidity_lowers_transmission() {
    let table = flat_table(0.9);
    let mut p = params(0.95, 2.0, 20.0);
    let reference = correct(60.0, &p, Some(&table));
    p.humidity = 1.6;
    let humid = correct(60.0, &p, Some(&table));
    // less transmission means a larger correction away from ambient
    assert!(humid > reference, "{humid} should exceed {reference}");
}

#[test]
fn test_params_from_header() {
    let mut h = FrameHeader::default();
    h.environment = 18.0;
    h.distance = 3.0;
    h.radiation = 0.9;
    h.gain_status = GainStatus::High;
    let p = CorrectionParams::from_header(&h, 0.6);
    assert_eq!(p.ambient, 18.0);
    assert_eq!(p.reflected, 18.0);
    assert_eq!(p.distance, 3.0);
    assert_eq!(p.humidity, 0.6);
    assert_eq!(p.gain_status, GainStatus::High);
    assert!(!p.is_identity());
}

// ---------------------------------------------------------------------------
// Transmission grid
// ---------------------------------------------------------------------------

#[test]
fn test_grid_lookup_bilinear() {
    let g = ramp_grid();
    assert_abs_diff_eq!(g.lookup(0.0, 0.0), 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(g.lookup(10.0, 1.0), 0.8, epsilon = 1e-6);
    assert_abs_diff_eq!(g.lookup(5.0, 0.5), 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(g.lookup(0.0, 0.5), 0.3, epsilon = 1e-6);
}

#[test]
fn test_grid_lookup_clamps() {
    let g = ramp_grid();
    assert_abs_diff_eq!(g.lookup(-100.0, -3.0), 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(g.lookup(100.0, 30.0), 0.8, epsilon = 1e-6);
    assert_abs_diff_eq!(g.lookup(f32::NAN, 0.0), 0.2, epsilon = 1e-6);
}

#[test]
fn test_grid_bytes_round_trip() {
    let g = ramp_grid();
    let parsed = TransmissionGrid::parse(&g.to_bytes()).unwrap();
    assert_eq!(parsed.values.dim(), (2, 2));
    for (a, b) in parsed.values.iter().zip(g.values.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
    }
    assert_eq!(parsed.ambient_step, 10.0);
}

#[test]
fn test_grid_parse_rejects_bad_input() {
    assert!(TransmissionGrid::parse(&[0u8; 4]).is_err());
    let mut bytes = ramp_grid().to_bytes();
    bytes.pop();
    assert!(TransmissionGrid::parse(&bytes).is_err());
    assert!(TransmissionGrid::new(0.0, 0.0, 0.0, 1.0, array![[0.5, 0.5], [0.5, 0.5]]).is_err());
}

// ---------------------------------------------------------------------------
// Product families and the store
// ---------------------------------------------------------------------------

#[test]
fn test_family_from_name() {
    assert_eq!(ProductFamily::from_name("TS001"), Some(ProductFamily::Ts001));
    assert_eq!(ProductFamily::from_name("ts004 plus"), Some(ProductFamily::Ts001));
    assert_eq!(ProductFamily::from_name("TC001 Lite"), Some(ProductFamily::Tc001Lite));
    assert_eq!(ProductFamily::from_name("TC001"), None);
    assert_eq!(ProductFamily::from_name(""), None);
}

#[test]
fn test_store_load_dir() {
    let dir = tempfile::tempdir().unwrap();
    let grid = ramp_grid().to_bytes();
    std::fs::write(dir.path().join("TS001_H.bin"), &grid).unwrap();
    std::fs::write(dir.path().join("TS001_L.bin"), &grid).unwrap();
    // only half of the Lite pair present
    std::fs::write(dir.path().join("TC001_LITE_H.bin"), &grid).unwrap();

    let store = CalibrationStore::load_dir(dir.path()).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.for_device("TS001 Pro").is_some());
    assert!(store.for_device("TC001 Lite").is_none());
}

#[test]
fn test_store_load_dir_rejects_malformed_table() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("TS001_H.bin"), [1u8, 2, 3]).unwrap();
    std::fs::write(dir.path().join("TS001_L.bin"), ramp_grid().to_bytes()).unwrap();
    assert!(CalibrationStore::load_dir(dir.path()).is_err());
}
