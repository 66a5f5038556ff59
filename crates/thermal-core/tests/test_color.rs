mod common;

use ndarray::{array, Array2};

use thermal_core::color::{
    argb_to_rgba, color_bar, render_rgba, sample_stops, DisplayRange, RenderMode, RenderOptions,
    StandardPalette,
};
use thermal_core::header::ColorStop;

use common::black_red_white;

fn pixel(rgba: &[u8], i: usize) -> [u8; 4] {
    [rgba[i * 4], rgba[i * 4 + 1], rgba[i * 4 + 2], rgba[i * 4 + 3]]
}

fn stops() -> Vec<ColorStop> {
    black_red_white(0.0, 1.0, false).stops().to_vec()
}

// ---------------------------------------------------------------------------
// Gradient interpolation
// ---------------------------------------------------------------------------

#[test]
fn test_gradient_quarter_point() {
    assert_eq!(sample_stops(&stops(), 0.25), [128, 0, 0]);
}

#[test]
fn test_gradient_endpoints_and_stops() {
    let s = stops();
    assert_eq!(sample_stops(&s, 0.0), [0, 0, 0]);
    assert_eq!(sample_stops(&s, 0.5), [255, 0, 0]);
    assert_eq!(sample_stops(&s, 0.75), [255, 128, 128]);
    assert_eq!(sample_stops(&s, 1.0), [255, 255, 255]);
}

#[test]
fn test_gradient_clamps_ratio() {
    let s = stops();
    assert_eq!(sample_stops(&s, -3.0), [0, 0, 0]);
    assert_eq!(sample_stops(&s, 7.0), [255, 255, 255]);
    assert_eq!(sample_stops(&s, f32::NAN), [0, 0, 0]);
}

#[test]
fn test_argb_alpha_forced_opaque() {
    assert_eq!(argb_to_rgba(0x80FF_8000), [255, 128, 0, 255]);
    assert_eq!(argb_to_rgba(0x0000_00FF), [0, 0, 255, 255]);
}

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

#[test]
fn test_palette_ids() {
    assert_eq!(StandardPalette::from_id(1), Some(StandardPalette::WhiteHot));
    assert_eq!(StandardPalette::from_id(0), None);
    assert_eq!(StandardPalette::from_id(0xFF), None);
    assert_eq!(StandardPalette::from_id_or_default(200), StandardPalette::Iron);
    for p in StandardPalette::ALL {
        assert_eq!(StandardPalette::from_id(p.id()), Some(p));
    }
}

#[test]
fn test_white_hot_lut() {
    let lut = StandardPalette::WhiteHot.lut();
    assert_eq!(lut.len(), 256);
    assert_eq!(lut[0], [0, 0, 0]);
    assert_eq!(lut[128], [128, 128, 128]);
    assert_eq!(lut[255], [255, 255, 255]);
    assert_eq!(StandardPalette::WhiteHot.color(0.5), [128, 128, 128]);
}

#[test]
fn test_black_hot_is_inverted() {
    assert_eq!(StandardPalette::BlackHot.color(0.0), [255, 255, 255]);
    assert_eq!(StandardPalette::BlackHot.color(1.0), [0, 0, 0]);
}

// ---------------------------------------------------------------------------
// Standard rendering
// ---------------------------------------------------------------------------

#[test]
fn test_render_standard_auto_range() {
    let t = array![[0.0f32, 5.0, 10.0]];
    let mode = RenderMode::Standard {
        palette: StandardPalette::WhiteHot,
        range: DisplayRange::new(0.0, 10.0),
    };
    let out = render_rgba(&t, &t, mode, &RenderOptions::default());
    assert_eq!(out.len(), 12);
    assert_eq!(pixel(&out, 0), [0, 0, 0, 255]);
    assert_eq!(pixel(&out, 1), [128, 128, 128, 255]);
    assert_eq!(pixel(&out, 2), [255, 255, 255, 255]);
}

#[test]
fn test_render_mismatched_intensity_uses_temperatures() {
    let t = array![[0.0f32, 10.0]];
    let wrong = array![[0.0f32], [10.0]];
    let mode = RenderMode::Standard {
        palette: StandardPalette::WhiteHot,
        range: DisplayRange::new(0.0, 10.0),
    };
    let out = render_rgba(&t, &wrong, mode, &RenderOptions::default());
    assert_eq!(out.len(), 8);
    assert_eq!(out, render_rgba(&t, &t, mode, &RenderOptions::default()));
}

#[test]
fn test_render_flat_range_uses_first_entry() {
    let t = Array2::from_elem((2, 2), 21.0f32);
    let mode = RenderMode::Standard {
        palette: StandardPalette::Iron,
        range: DisplayRange::new(21.0, 21.0),
    };
    let out = render_rgba(&t, &t, mode, &RenderOptions::default());
    let [r, g, b] = StandardPalette::Iron.lut()[0];
    for i in 0..4 {
        assert_eq!(pixel(&out, i), [r, g, b, 255]);
    }
}

#[test]
fn test_render_locked_range_grays_outside() {
    let t = array![[0.0f32, 5.0, 10.0]];
    let mode = RenderMode::Standard {
        palette: StandardPalette::Iron,
        range: DisplayRange::new(4.0, 6.0),
    };
    let out = render_rgba(&t, &t, mode, &RenderOptions::default());
    assert_eq!(pixel(&out, 0), [0, 0, 0, 255]);
    let [r, g, b] = StandardPalette::Iron.color(0.5);
    assert_eq!(pixel(&out, 1), [r, g, b, 255]);
    assert_eq!(pixel(&out, 2), [255, 255, 255, 255]);
}

#[test]
fn test_render_locked_range_clamps_without_graying() {
    let t = array![[0.0f32, 5.0, 10.0]];
    let mode = RenderMode::Standard {
        palette: StandardPalette::Iron,
        range: DisplayRange::new(4.0, 6.0),
    };
    let options = RenderOptions {
        gray_out_of_range: false,
        ..RenderOptions::default()
    };
    let out = render_rgba(&t, &t, mode, &options);
    let [r, g, b] = StandardPalette::Iron.color(0.0);
    assert_eq!(pixel(&out, 0), [r, g, b, 255]);
    let [r, g, b] = StandardPalette::Iron.color(1.0);
    assert_eq!(pixel(&out, 2), [r, g, b, 255]);
}

#[test]
fn test_render_parallel_path_matches() {
    let t = Array2::from_shape_fn((300, 300), |(r, c)| ((r * 300 + c) % 1000) as f32 / 10.0);
    let mode = RenderMode::Standard {
        palette: StandardPalette::Rainbow,
        range: DisplayRange::new(0.0, 99.9),
    };
    let out = render_rgba(&t, &t, mode, &RenderOptions::default());
    assert_eq!(out.len(), 300 * 300 * 4);
    for i in (0..300 * 300).step_by(7919) {
        let v = (i % 1000) as f32 / 10.0;
        let [r, g, b] = StandardPalette::Rainbow.color(DisplayRange::new(0.0, 99.9).normalize(v));
        assert_eq!(pixel(&out, i), [r, g, b, 255], "pixel {i}");
    }
}

// ---------------------------------------------------------------------------
// Custom gradient rendering
// ---------------------------------------------------------------------------

#[test]
fn test_render_custom_in_and_out_of_range() {
    let custom = black_red_white(10.0, 40.0, false);
    let t = array![[5.0f32, 10.0, 17.5, 40.0, 50.0]];
    let out = render_rgba(&t, &t, RenderMode::Custom(&custom), &RenderOptions::default());
    assert_eq!(pixel(&out, 0), [0, 0, 0, 255]);
    assert_eq!(pixel(&out, 1), [0, 0, 0, 255]);
    assert_eq!(pixel(&out, 2), [128, 0, 0, 255]);
    assert_eq!(pixel(&out, 3), [255, 255, 255, 255]);
    assert_eq!(pixel(&out, 4), [255, 255, 255, 255]);
}

#[test]
fn test_render_custom_use_gray_keeps_base() {
    let custom = black_red_white(10.0, 40.0, true);
    let t = array![[5.0f32, 25.0, 50.0]];
    // grayscale base comes from the intensity plane, not the temperatures
    let intensity = array![[200.0f32, 0.0, 100.0]];
    let out = render_rgba(&t, &intensity, RenderMode::Custom(&custom), &RenderOptions::default());
    assert_eq!(pixel(&out, 0), [255, 255, 255, 255]);
    assert_eq!(pixel(&out, 1), [255, 0, 0, 255]);
    assert_eq!(pixel(&out, 2), [128, 128, 128, 255]);
}

// ---------------------------------------------------------------------------
// Color bar
// ---------------------------------------------------------------------------

#[test]
fn test_color_bar_standard() {
    let mode = RenderMode::Standard {
        palette: StandardPalette::WhiteHot,
        range: DisplayRange::new(0.0, 1.0),
    };
    let bar = color_bar(mode, DisplayRange::new(0.0, 1.0), 256);
    assert_eq!(bar.len(), 256);
    assert_eq!(bar[0], [0, 0, 0, 255]);
    assert_eq!(bar[255], [255, 255, 255, 255]);
}

#[test]
fn test_color_bar_custom_end_colors() {
    let custom = black_red_white(10.0, 40.0, false);
    let bar = color_bar(RenderMode::Custom(&custom), DisplayRange::new(0.0, 50.0), 6);
    assert_eq!(
        bar,
        vec![
            [0, 0, 0, 255],
            [0, 0, 0, 255],
            [170, 0, 0, 255],
            [255, 85, 85, 255],
            [255, 255, 255, 255],
            [255, 255, 255, 255],
        ]
    );
}

#[test]
fn test_color_bar_custom_gray_ramps() {
    let custom = black_red_white(10.0, 40.0, true);
    let bar = color_bar(RenderMode::Custom(&custom), DisplayRange::new(0.0, 50.0), 11);
    assert_eq!(bar[0], [0, 0, 0, 255]);
    assert_eq!(bar[1], [67, 67, 67, 255]);
    assert_eq!(bar[9], [194, 194, 194, 255]);
    assert_eq!(bar[10], [255, 255, 255, 255]);
}

#[test]
fn test_color_bar_degenerate_lengths() {
    let mode = RenderMode::Standard {
        palette: StandardPalette::WhiteHot,
        range: DisplayRange::new(0.0, 1.0),
    };
    assert!(color_bar(mode, DisplayRange::new(0.0, 1.0), 0).is_empty());
    assert_eq!(color_bar(mode, DisplayRange::new(0.0, 1.0), 1), vec![[0, 0, 0, 255]]);
}
