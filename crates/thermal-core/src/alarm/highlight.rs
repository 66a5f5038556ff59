use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::argb_to_rgba;
use crate::consts::DEFAULT_ALARM_MIN_AREA;
use crate::frame::TemperatureField;
use crate::header::{AlarmConfig, MarkType};

use super::components::{connected_components, Component, Connectivity, Labeling};

/// Region extraction settings for alarm highlighting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlarmOptions {
    /// Regions with fewer pixels than this are treated as noise.
    #[serde(default = "default_min_area")]
    pub min_area: usize,
    #[serde(default)]
    pub connectivity: Connectivity,
}

fn default_min_area() -> usize {
    DEFAULT_ALARM_MIN_AREA
}

impl Default for AlarmOptions {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_ALARM_MIN_AREA,
            connectivity: Connectivity::Four,
        }
    }
}

/// Mark regions above `high_temp` / below `low_temp` on a sensor-space RGBA buffer.
///
/// Does nothing when the alarm is closed, both thresholds are disabled, or the
/// buffer does not match the field. Returns the number of regions drawn.
pub fn apply_alarm(
    rgba: &mut [u8],
    field: &TemperatureField,
    alarm: &AlarmConfig,
    options: &AlarmOptions,
) -> usize {
    if !alarm.is_active() {
        return 0;
    }
    let (h, w) = field.data.dim();
    if rgba.len() != w * h * 4 {
        warn!(
            buffer = rgba.len(),
            width = w,
            height = h,
            "alarm overlay skipped, buffer does not match field"
        );
        return 0;
    }

    let mut drawn = 0;
    if alarm.high_enabled() {
        let mask = field.data.mapv(|v| v > alarm.high_temp);
        drawn += mark_regions(rgba, &mask, alarm.high_color, alarm.mark_type, options);
    }
    if alarm.low_enabled() {
        let mask = field.data.mapv(|v| v < alarm.low_temp);
        drawn += mark_regions(rgba, &mask, alarm.low_color, alarm.mark_type, options);
    }
    debug!(regions = drawn, "alarm regions marked");
    drawn
}

fn mark_regions(
    rgba: &mut [u8],
    mask: &Array2<bool>,
    argb: u32,
    mark: MarkType,
    options: &AlarmOptions,
) -> usize {
    let labeling = connected_components(mask, options.connectivity);
    let color = argb_to_rgba(argb);
    let width = mask.ncols();
    let mut paint = |row: usize, col: usize| {
        let i = (row * width + col) * 4;
        rgba[i..i + 4].copy_from_slice(&color);
    };

    let mut drawn = 0;
    for comp in labeling
        .components
        .iter()
        .filter(|c| c.area >= options.min_area.max(1))
    {
        let (r0, r1, c0, c1) = comp.bbox;
        match mark {
            MarkType::Fill => {
                for row in r0..=r1 {
                    for col in c0..=c1 {
                        if labeling.is(row, col, comp.label) {
                            paint(row, col);
                        }
                    }
                }
            }
            MarkType::Outline => {
                for row in r0..=r1 {
                    for col in c0..=c1 {
                        if labeling.is(row, col, comp.label) && on_boundary(&labeling, comp, row, col) {
                            paint(row, col);
                        }
                    }
                }
            }
            MarkType::Rectangle => {
                for col in c0..=c1 {
                    paint(r0, col);
                    paint(r1, col);
                }
                for row in r0..=r1 {
                    paint(row, c0);
                    paint(row, c1);
                }
            }
        }
        drawn += 1;
    }
    drawn
}

/// A component pixel is on the boundary when an edge neighbor lies outside the
/// component or outside the image.
fn on_boundary(labeling: &Labeling, comp: &Component, row: usize, col: usize) -> bool {
    let (h, w) = labeling.labels.dim();
    if row == 0 || col == 0 || row + 1 == h || col + 1 == w {
        return true;
    }
    !(labeling.is(row - 1, col, comp.label)
        && labeling.is(row + 1, col, comp.label)
        && labeling.is(row, col - 1, comp.label)
        && labeling.is(row, col + 1, comp.label))
}
