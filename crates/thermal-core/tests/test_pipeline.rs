mod common;

use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;

use thermal_core::calibration::{CalibrationStore, ProductFamily};
use thermal_core::color::{ColorSource, DisplayRange, StandardPalette};
use thermal_core::error::ThermalError;
use thermal_core::frame::{Point, RawFrame};
use thermal_core::header::{AlarmConfig, FrameHeader, MarkType, RotationMode};
use thermal_core::pipeline::{
    CancelToken, ConfigSnapshot, DisplayMode, EngineConfig, NoOpReporter, PipelineStage,
    ProgressReporter, SharedConfig, ThermalEngine,
};

use common::{black_red_white, code64, flat_table, make_hotspot_frame, make_raw_frame, make_uniform_frame};

fn calibrated_store() -> Arc<CalibrationStore> {
    let mut store = CalibrationStore::new();
    store.insert(ProductFamily::Ts001, flat_table(0.9));
    Arc::new(store)
}

fn engine() -> ThermalEngine {
    ThermalEngine::new(EngineConfig::default(), calibrated_store())
}

fn header(width: u16, height: u16) -> FrameHeader {
    let mut h = FrameHeader::default();
    h.name = "TS001".into();
    h.width = width;
    h.height = height;
    h.radiation = 0.95;
    h.distance = 2.0;
    h.environment = 20.0;
    h
}

fn uncorrected_header(width: u16, height: u16) -> FrameHeader {
    let mut h = header(width, height);
    h.distance = 0.0;
    h
}

fn pixels(rgba: &[u8]) -> Vec<[u8; 4]> {
    rgba.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]).collect()
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_uniform_frame_end_to_end() {
    let raw = make_uniform_frame(4, 4, 17664);
    let snapshot = ConfigSnapshot::new(header(4, 4));
    assert_eq!(snapshot.mode, DisplayMode::Auto);

    let out = engine().render_frame(&raw, &snapshot).unwrap();
    assert_eq!((out.width, out.height), (4, 4));

    let raw_celsius = 17664.0 / 64.0 - 273.15;
    let t = out.temperatures.data[[0, 0]];
    assert!(t.is_finite());
    assert!(t < raw_celsius, "corrected {t} should be below raw {raw_celsius}");
    assert!(t > raw_celsius - 5.0, "corrected {t} too far from raw");
    assert!(out.temperatures.data.iter().all(|&v| v == t));

    // a single unique temperature renders as the palette's first color
    let [r, g, b] = StandardPalette::default().lut()[0];
    assert!(pixels(&out.rgba).iter().all(|&p| p == [r, g, b, 255]));
}

#[test]
fn test_correction_disabled_keeps_raw_values() {
    let mut config = EngineConfig::default();
    config.correction.enabled = false;
    let engine = ThermalEngine::new(config, calibrated_store());
    let raw = make_uniform_frame(4, 4, 17664);
    let out = engine.render_frame(&raw, &ConfigSnapshot::new(header(4, 4))).unwrap();
    assert_abs_diff_eq!(out.temperatures.data[[2, 2]], 2.85, epsilon = 1e-4);
}

#[test]
fn test_unknown_device_left_uncorrected() {
    let raw = make_uniform_frame(4, 4, 17664);
    let mut h = header(4, 4);
    h.name = "Mystery cam".into();
    let out = engine().render_frame(&raw, &ConfigSnapshot::new(h)).unwrap();
    assert_abs_diff_eq!(out.temperatures.data[[0, 0]], 2.85, epsilon = 1e-4);
}

#[test]
fn test_wrong_plane_length_skips_frame() {
    let mut raw = make_uniform_frame(4, 4, 17664);
    raw.temp_plane.truncate(30);
    let err = engine()
        .render_frame(&raw, &ConfigSnapshot::new(header(4, 4)))
        .unwrap_err();
    assert!(matches!(
        err,
        ThermalError::InvalidFrameLength { expected: 32, actual: 30, .. }
    ));
}

#[test]
fn test_scale16_config() {
    let mut config = EngineConfig::default();
    config.decode.scale = thermal_core::temperature::FixedPointScale::Scale16;
    let engine = ThermalEngine::new(config, calibrated_store());
    let raw = make_uniform_frame(2, 2, 4416);
    let out = engine.render_frame(&raw, &ConfigSnapshot::new(uncorrected_header(2, 2))).unwrap();
    assert_abs_diff_eq!(out.temperatures.data[[0, 0]], 2.85, epsilon = 1e-4);
}

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

#[test]
fn test_rotated_output_keeps_sensor_field() {
    let codes: Vec<u16> = (0..8).map(|i| code64(10.0 + i as f32)).collect();
    let raw = make_raw_frame(4, 2, &codes);
    let mut h = uncorrected_header(4, 2);
    h.rotate = RotationMode::Deg90;
    let out = engine().render_frame(&raw, &ConfigSnapshot::new(h)).unwrap();

    assert_eq!((out.width, out.height), (2, 4));
    assert_eq!(out.rgba.len(), 8 * 4);
    assert_eq!((out.temperatures.width(), out.temperatures.height()), (4, 2));

    // display (0, 0) shows sensor (0, 1): the first pixel of the second row
    let s = out.temperature_at_display(Point::new(0, 0)).unwrap();
    assert_abs_diff_eq!(s.max, 14.0, epsilon = 0.02);
    // display (1, 3) shows sensor (3, 0)
    let s = out.temperature_at_display(Point::new(1, 3)).unwrap();
    assert_abs_diff_eq!(s.max, 13.0, epsilon = 0.02);
}

// ---------------------------------------------------------------------------
// Display modes
// ---------------------------------------------------------------------------

#[test]
fn test_locked_range_survives_new_frames() {
    let engine = engine();
    let shared = SharedConfig::new(ConfigSnapshot::new(uncorrected_header(4, 1)));

    let first = make_raw_frame(4, 1, &[code64(10.0), code64(15.0), code64(25.0), code64(30.0)]);
    let out = engine.render_frame(&first, &shared.snapshot()).unwrap();
    let locked = out.frame_range.unwrap();
    shared.transition(|m| m.lock(locked)).unwrap();

    let second = make_raw_frame(4, 1, &[code64(0.0), code64(20.0), code64(40.0), code64(40.0)]);
    let out = engine.render_frame(&second, &shared.snapshot()).unwrap();
    assert_abs_diff_eq!(out.range.min, 10.0, epsilon = 0.02);
    assert_abs_diff_eq!(out.range.max, 30.0, epsilon = 0.02);

    let px = pixels(&out.rgba);
    // outside the locked range: grayscale of the frame's own range
    assert_eq!(px[0], [0, 0, 0, 255]);
    assert_eq!(px[3], [255, 255, 255, 255]);
    // inside: palette color at the middle of the locked range
    let [r, g, b] = StandardPalette::default().color(0.5);
    let [pr, pg, pb, _] = px[1];
    assert!((pr as i32 - r as i32).abs() <= 2 && (pg as i32 - g as i32).abs() <= 2 && (pb as i32 - b as i32).abs() <= 2);

    shared.transition(|m| m.unlock()).unwrap();
    let out = engine.render_frame(&second, &shared.snapshot()).unwrap();
    assert_abs_diff_eq!(out.range.min, 0.0, epsilon = 0.02);
    assert_abs_diff_eq!(out.range.max, 40.0, epsilon = 0.02);
}

#[test]
fn test_custom_mode_from_header() {
    let mut h = uncorrected_header(2, 1);
    h.pseudo_mode = 0xFF;
    h.custom_pseudo = Some(black_red_white(10.0, 40.0, false));
    let snapshot = ConfigSnapshot::new(h);
    assert!(matches!(snapshot.mode, DisplayMode::Custom(_)));

    let raw = make_raw_frame(2, 1, &[code64(17.5), code64(100.0)]);
    let out = engine().render_frame(&raw, &snapshot).unwrap();
    assert_eq!(out.range, DisplayRange::new(10.0, 40.0));
    let px = pixels(&out.rgba);
    assert_eq!(px[0], [128, 0, 0, 255]);
    assert_eq!(px[1], [255, 255, 255, 255]);
}

#[test]
fn test_mode_transitions() {
    let custom = black_red_white(0.0, 50.0, false);
    let range = DisplayRange::new(1.0, 2.0);

    let locked = DisplayMode::Auto.lock(range).unwrap();
    assert_eq!(locked, DisplayMode::Locked(range));
    assert_eq!(locked.unlock().unwrap(), DisplayMode::Auto);

    let from_auto = DisplayMode::Auto.enter_custom(custom.clone()).unwrap();
    let from_locked = locked.enter_custom(custom.clone()).unwrap();
    assert_eq!(from_auto, from_locked);
    assert_eq!(from_auto.exit_custom().unwrap(), DisplayMode::Auto);
}

#[test]
fn test_invalid_mode_transitions() {
    let custom = black_red_white(0.0, 50.0, false);
    let range = DisplayRange::new(1.0, 2.0);
    let in_custom = DisplayMode::Custom(custom.clone());

    assert!(matches!(
        DisplayMode::Auto.unlock(),
        Err(ThermalError::InvalidTransition { from: "auto", to: "auto" })
    ));
    assert!(DisplayMode::Locked(range).lock(range).is_err());
    assert!(in_custom.lock(range).is_err());
    assert!(in_custom.unlock().is_err());
    assert!(in_custom.enter_custom(custom).is_err());
    assert!(DisplayMode::Auto.exit_custom().is_err());
    assert!(DisplayMode::Locked(range).exit_custom().is_err());
}

#[test]
fn test_mode_resolve() {
    let frame = Some(DisplayRange::new(3.0, 9.0));
    assert_eq!(DisplayMode::Auto.resolve(frame), frame);
    assert_eq!(DisplayMode::Auto.resolve(None), None);
    let locked = DisplayRange::new(0.0, 1.0);
    assert_eq!(DisplayMode::Locked(locked).resolve(frame), Some(locked));
    let custom = DisplayMode::Custom(black_red_white(-5.0, 5.0, true));
    assert_eq!(custom.resolve(frame), Some(DisplayRange::new(-5.0, 5.0)));
}

// ---------------------------------------------------------------------------
// Config snapshots
// ---------------------------------------------------------------------------

#[test]
fn test_snapshot_isolated_from_updates() {
    let shared = SharedConfig::new(ConfigSnapshot::new(header(4, 4)));
    let before = shared.snapshot();
    assert_eq!(before.version, 0);

    let mut h = header(4, 4);
    h.rotate = RotationMode::Deg180;
    let after = shared.set_header(h);

    assert_eq!(before.header.rotate, RotationMode::Deg0);
    assert_eq!(after.header.rotate, RotationMode::Deg180);
    assert_eq!(after.version, 1);
    assert_eq!(shared.snapshot().version, 1);
}

#[test]
fn test_transition_mirrors_custom_into_header() {
    let shared = SharedConfig::new(ConfigSnapshot::new(header(4, 4)));
    let custom = black_red_white(0.0, 50.0, true);

    let snap = shared.transition(|m| m.enter_custom(custom.clone())).unwrap();
    assert_eq!(snap.header.active_custom(), Some(&custom));

    let snap = shared.transition(|m| m.exit_custom()).unwrap();
    assert_eq!(snap.mode, DisplayMode::Auto);
    assert!(snap.header.active_custom().is_none());
    assert_eq!(snap.header.pseudo_mode, StandardPalette::default().id());
    assert_eq!(snap.version, 2);
}

#[test]
fn test_failed_transition_leaves_config() {
    let shared = SharedConfig::new(ConfigSnapshot::new(header(4, 4)));
    assert!(shared.transition(|m| m.unlock()).is_err());
    let snap = shared.snapshot();
    assert_eq!(snap.version, 0);
    assert_eq!(snap.mode, DisplayMode::Auto);
}

// ---------------------------------------------------------------------------
// Render options
// ---------------------------------------------------------------------------

#[test]
fn test_image_plane_source() {
    let mut config = EngineConfig::default();
    config.render.source = ColorSource::ImagePlane;
    let engine = ThermalEngine::new(config, calibrated_store());

    let raw = make_uniform_frame(4, 1, code64(25.0));
    let mut h = uncorrected_header(4, 1);
    h.pseudo_mode = StandardPalette::WhiteHot.id();
    let out = engine.render_frame(&raw, &ConfigSnapshot::new(h)).unwrap();
    // luminance ramp 0, 1, 2, 3 in the image plane
    let px = pixels(&out.rgba);
    assert_eq!(px[0], [0, 0, 0, 255]);
    assert_eq!(px[3], [255, 255, 255, 255]);
    assert_eq!(out.range, DisplayRange::new(0.0, 3.0));
}

#[test]
fn test_alarm_overlay_in_pipeline() {
    let mut config = EngineConfig::default();
    config.alarm.min_area = 4;
    let engine = ThermalEngine::new(config, calibrated_store());

    let raw = make_hotspot_frame(8, 8, 20.0, 90.0, 2..5, 2..5);
    let mut h = uncorrected_header(8, 8);
    h.alarm = AlarmConfig {
        high_temp: 60.0,
        high_color: 0xFF00_FF00,
        mark_type: MarkType::Fill,
        is_mark_open: true,
        ..AlarmConfig::default()
    };
    let out = engine.render_frame(&raw, &ConfigSnapshot::new(h)).unwrap();
    assert_eq!(out.alarm_regions, 1);
    let green = pixels(&out.rgba).iter().filter(|&&p| p == [0, 255, 0, 255]).count();
    assert_eq!(green, 9);
}

// ---------------------------------------------------------------------------
// Cancellation and progress
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<PipelineStage>>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }
}

struct CancelAfter {
    stage: PipelineStage,
    token: CancelToken,
}

impl ProgressReporter for CancelAfter {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        if stage == self.stage {
            self.token.cancel();
        }
    }
}

#[test]
fn test_stages_reported_in_order() {
    let reporter = RecordingReporter::default();
    let raw = make_uniform_frame(4, 4, 17664);
    engine()
        .render_frame_with(&raw, &ConfigSnapshot::new(header(4, 4)), &CancelToken::new(), &reporter)
        .unwrap();
    assert_eq!(
        *reporter.stages.lock().unwrap(),
        vec![
            PipelineStage::DecodingTemperature,
            PipelineStage::Correcting,
            PipelineStage::ColorMapping,
            PipelineStage::Highlighting,
            PipelineStage::Orienting,
        ]
    );
}

#[test]
fn test_cancelled_before_start() {
    let token = CancelToken::new();
    token.cancel();
    let raw = make_uniform_frame(4, 4, 17664);
    let err = engine()
        .render_frame_with(&raw, &ConfigSnapshot::new(header(4, 4)), &token, &NoOpReporter)
        .unwrap_err();
    assert!(matches!(err, ThermalError::Cancelled));
}

#[test]
fn test_cancelled_between_stages() {
    let token = CancelToken::new();
    let reporter = CancelAfter {
        stage: PipelineStage::Correcting,
        token: token.clone(),
    };
    let raw = make_uniform_frame(4, 4, 17664);
    let err = engine()
        .render_frame_with(&raw, &ConfigSnapshot::new(header(4, 4)), &token, &reporter)
        .unwrap_err();
    assert!(matches!(err, ThermalError::Cancelled));
}

#[test]
fn test_raw_frame_split() {
    let raw = make_uniform_frame(3, 2, 17664);
    let bytes = raw.to_bytes();
    assert_eq!(RawFrame::from_bytes(3, 2, &bytes).unwrap(), raw);
    assert!(RawFrame::from_bytes(3, 3, &bytes).is_err());
}
