#![allow(dead_code)]

use ndarray::Array2;

use thermal_core::calibration::{CalibrationTable, TransmissionGrid};
use thermal_core::frame::{RawFrame, TemperatureField};
use thermal_core::header::{AlarmConfig, ColorStop, CustomPseudo, FrameHeader, MarkType};

/// Raw 1/64 K code for a Celsius temperature.
pub fn code64(celsius: f32) -> u16 {
    ((celsius + 273.15) * 64.0).round() as u16
}

/// Build a frame from per-pixel raw codes. The image plane carries a
/// luminance ramp in its Y bytes and neutral chroma.
pub fn make_raw_frame(width: u16, height: u16, codes: &[u16]) -> RawFrame {
    assert_eq!(codes.len(), width as usize * height as usize);
    let mut image = Vec::with_capacity(codes.len() * 2);
    for i in 0..codes.len() {
        image.push((i % 256) as u8);
        image.push(128);
    }
    let mut temp = Vec::with_capacity(codes.len() * 2);
    for c in codes {
        temp.extend_from_slice(&c.to_le_bytes());
    }
    RawFrame::new(width, height, image, temp)
}

/// Frame where every pixel has the same raw code.
pub fn make_uniform_frame(width: u16, height: u16, code: u16) -> RawFrame {
    make_raw_frame(width, height, &vec![code; width as usize * height as usize])
}

/// Frame at `background` °C with a `hot` °C block over `rows` x `cols`.
pub fn make_hotspot_frame(
    width: u16,
    height: u16,
    background: f32,
    hot: f32,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> RawFrame {
    let mut codes = vec![code64(background); width as usize * height as usize];
    for r in rows {
        for c in cols.clone() {
            codes[r * width as usize + c] = code64(hot);
        }
    }
    make_raw_frame(width, height, &codes)
}

pub fn field_from_rows(rows: &[&[f32]]) -> TemperatureField {
    let h = rows.len();
    let w = rows[0].len();
    let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    TemperatureField::new(Array2::from_shape_vec((h, w), flat).unwrap())
}

/// Calibration table with the same transmission everywhere.
pub fn flat_table(tau: f32) -> CalibrationTable {
    let grid = TransmissionGrid::new(-20.0, 10.0, 0.0, 1.0, Array2::from_elem((8, 6), tau)).unwrap();
    CalibrationTable {
        high_gain: grid.clone(),
        low_gain: grid,
    }
}

pub fn black_red_white(min_temp: f32, max_temp: f32, use_gray: bool) -> CustomPseudo {
    CustomPseudo::new(
        vec![
            ColorStop::new(0.0, 0x000000),
            ColorStop::new(0.5, 0xFF0000),
            ColorStop::new(1.0, 0xFFFFFF),
        ],
        min_temp,
        max_temp,
        use_gray,
    )
    .unwrap()
}

/// Header with every block populated.
pub fn full_header() -> FrameHeader {
    let mut h = FrameHeader::default();
    h.name = "TS001-A7".into();
    h.width = 4;
    h.height = 3;
    h.rotate = thermal_core::header::RotationMode::Deg90;
    h.init_rotate = thermal_core::header::RotationMode::Deg270;
    h.correct_rotate = thermal_core::header::RotationMode::Deg180;
    h.pseudo_mode = 0xFF;
    h.custom_pseudo = Some(black_red_white(10.0, 40.0, true));
    h.alarm = AlarmConfig {
        high_temp: 60.5,
        low_temp: -5.25,
        high_color: 0xFFFF_0000,
        low_color: 0xFF00_FF00,
        mark_type: MarkType::Rectangle,
        is_mark_open: true,
    };
    h.watermark.title = "Boiler room".into();
    h.watermark.address = "Level 2".into();
    h.watermark.is_open = true;
    h.watermark.is_add_time = true;
    h.gain_status = thermal_core::header::GainStatus::High;
    h.text_color = 0xFF12_3456;
    h.text_size = 18;
    h.environment = 21.5;
    h.distance = 1.75;
    h.radiation = 0.92;
    h.is_show_pseudo_bar = true;
    h
}

/// Write bytes to a temporary file and return the temp file handle.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_temp_file(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write data");
    f.flush().expect("flush");
    f
}
