use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{EPSILON, PARALLEL_PIXEL_THRESHOLD};
use crate::header::CustomPseudo;

use super::gradient::{rgb_bytes, sample_stops};
use super::palette::StandardPalette;

/// Closed value interval mapped onto a palette.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f32,
    pub max: f32,
}

impl DisplayRange {
    /// Range with the bounds put in order.
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Min/max over finite values; `None` if there are none.
    pub fn of_values<'a>(values: impl IntoIterator<Item = &'a f32>) -> Option<Self> {
        let mut range: Option<Self> = None;
        for &v in values.into_iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                Some(r) => Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
                None => Self { min: v, max: v },
            });
        }
        range
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    /// Position of `v` in the range, clamped to `[0, 1]`; 0 for a flat range.
    pub fn normalize(&self, v: f32) -> f32 {
        let span = self.span();
        if span.abs() < EPSILON || !span.is_finite() {
            return 0.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Which plane drives the palette lookup and the grayscale base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSource {
    #[default]
    Temperature,
    /// Luminance of the YUYV image plane.
    ImagePlane,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub source: ColorSource,
    /// Show pixels outside a locked range as grayscale instead of clamping.
    pub gray_out_of_range: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            source: ColorSource::Temperature,
            gray_out_of_range: true,
        }
    }
}

/// How values become colors for one frame.
#[derive(Clone, Copy, Debug)]
pub enum RenderMode<'a> {
    /// Built-in LUT over a display range of intensity values.
    Standard {
        palette: StandardPalette,
        range: DisplayRange,
    },
    /// User gradient over its own temperature bounds.
    Custom(&'a CustomPseudo),
}

/// Map a frame to RGBA bytes (row-major, alpha always 255).
///
/// `temperatures` classify pixels against custom gradient bounds. `intensity`
/// drives standard palettes and the white-hot grayscale base that out-of-range
/// pixels fall back to; pass the temperatures again when rendering from them.
/// An `intensity` plane whose shape differs from `temperatures` is ignored and
/// the temperatures are used instead.
pub fn render_rgba(
    temperatures: &Array2<f32>,
    intensity: &Array2<f32>,
    mode: RenderMode<'_>,
    options: &RenderOptions,
) -> Vec<u8> {
    let intensity = if intensity.dim() == temperatures.dim() {
        intensity
    } else {
        warn!(
            temperatures = ?temperatures.dim(),
            intensity = ?intensity.dim(),
            "intensity plane does not match temperatures, coloring from temperatures"
        );
        temperatures
    };
    let base_range = DisplayRange::of_values(intensity.iter()).unwrap_or(DisplayRange::new(0.0, 0.0));
    let gray = |v: f32| -> [u8; 4] {
        let g = (base_range.normalize(v) * 255.0).round() as u8;
        [g, g, g, 255]
    };

    let pixel = |&t: &f32, &v: &f32| -> [u8; 4] {
        match mode {
            RenderMode::Standard { palette, range } => {
                if options.gray_out_of_range && !range.contains(v) && v.is_finite() {
                    gray(v)
                } else {
                    let [r, g, b] = palette.color(range.normalize(v));
                    [r, g, b, 255]
                }
            }
            RenderMode::Custom(custom) => {
                let stops = custom.stops();
                let out_of_range = |rgb: u32| {
                    if custom.use_gray {
                        gray(v)
                    } else {
                        let [r, g, b] = rgb_bytes(rgb);
                        [r, g, b, 255]
                    }
                };
                if t > custom.max_temp {
                    out_of_range(stops[stops.len() - 1].rgb)
                } else if t < custom.min_temp {
                    out_of_range(stops[0].rgb)
                } else {
                    let ratio = (t - custom.min_temp) / (custom.max_temp - custom.min_temp);
                    let [r, g, b] = sample_stops(stops, ratio);
                    [r, g, b, 255]
                }
            }
        }
    };

    let zip = Zip::from(temperatures).and(intensity);
    let colors = if temperatures.len() >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_map_collect(pixel)
    } else {
        zip.map_collect(pixel)
    };

    let mut out = Vec::with_capacity(colors.len() * 4);
    for px in colors.iter() {
        out.extend_from_slice(px);
    }
    out
}
