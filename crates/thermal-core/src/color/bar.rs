use crate::consts::COLOR_BAR_MID_GRAY;

use super::gradient::{rgb_bytes, sample_stops};
use super::render::{DisplayRange, RenderMode};

/// Legend strip for the on-screen pseudo-color bar, coldest entry first.
///
/// For a custom gradient the strip spans `frame_range`; portions of the frame
/// colder or hotter than the gradient's bounds either repeat the end colors or,
/// with `use_gray`, show gray ramps that darken toward the frame minimum and
/// brighten toward the frame maximum.
pub fn color_bar(mode: RenderMode<'_>, frame_range: DisplayRange, len: usize) -> Vec<[u8; 4]> {
    let step = |i: usize| {
        if len > 1 {
            i as f32 / (len - 1) as f32
        } else {
            0.0
        }
    };

    match mode {
        RenderMode::Standard { palette, .. } => (0..len)
            .map(|i| {
                let [r, g, b] = palette.color(step(i));
                [r, g, b, 255]
            })
            .collect(),
        RenderMode::Custom(custom) => {
            let stops = custom.stops();
            let lo = frame_range.min;
            let hi = frame_range.max;
            (0..len)
                .map(|i| {
                    let t = lo + (hi - lo) * step(i);
                    let rgb = if t < custom.min_temp {
                        if custom.use_gray {
                            let frac = ramp_fraction(t, lo, custom.min_temp);
                            let g = (COLOR_BAR_MID_GRAY as f32 * frac).round() as u8;
                            [g, g, g]
                        } else {
                            rgb_bytes(stops[0].rgb)
                        }
                    } else if t > custom.max_temp {
                        if custom.use_gray {
                            let frac = ramp_fraction(t, custom.max_temp, hi);
                            let mid = COLOR_BAR_MID_GRAY as f32;
                            let g = (mid + (255.0 - mid) * frac).round() as u8;
                            [g, g, g]
                        } else {
                            rgb_bytes(stops[stops.len() - 1].rgb)
                        }
                    } else {
                        let ratio = (t - custom.min_temp) / (custom.max_temp - custom.min_temp);
                        sample_stops(stops, ratio)
                    };
                    [rgb[0], rgb[1], rgb[2], 255]
                })
                .collect()
        }
    }
}

fn ramp_fraction(t: f32, from: f32, to: f32) -> f32 {
    DisplayRange::new(from, to).normalize(t)
}
