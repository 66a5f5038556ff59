use tracing::debug;

use crate::consts::{KELVIN_OFFSET, MIN_TRANSMISSION, REFERENCE_HUMIDITY};
use crate::header::{FrameHeader, GainStatus};

use super::table::CalibrationTable;

/// Inputs to the distance/emissivity correction for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrectionParams {
    /// Emissivity.
    pub radiation: f32,
    /// Ambient (atmosphere) temperature, °C.
    pub ambient: f32,
    /// Reflected apparent temperature, °C.
    pub reflected: f32,
    /// Target distance, m.
    pub distance: f32,
    /// Relative humidity in `[0, 1]`.
    pub humidity: f32,
    pub gain_status: GainStatus,
}

impl CorrectionParams {
    /// Parameters stored in a header. The reflected temperature is taken to be
    /// the ambient one.
    pub fn from_header(header: &FrameHeader, humidity: f32) -> Self {
        Self {
            radiation: header.radiation,
            ambient: header.environment,
            reflected: header.environment,
            distance: header.distance,
            humidity,
            gain_status: header.gain_status,
        }
    }

    /// Whether these parameters ask for any correction at all.
    pub fn is_identity(&self) -> bool {
        !(self.distance > 0.0 && self.radiation > 0.0)
    }
}

/// Precomputed radiance balance: `W_obj = (W_meas - offset) / gain`.
struct RadianceBalance {
    offset: f64,
    gain: f64,
}

impl RadianceBalance {
    fn new(params: &CorrectionParams, table: Option<&CalibrationTable>) -> Option<Self> {
        if params.is_identity() {
            return None;
        }
        let Some(table) = table else {
            debug!(
                distance = params.distance,
                radiation = params.radiation,
                "no calibration table, temperatures pass through uncorrected"
            );
            return None;
        };
        let grid = table.grid(params.gain_status);

        let humidity = if params.humidity.is_finite() && params.humidity > 0.0 {
            params.humidity
        } else {
            REFERENCE_HUMIDITY
        };
        let tau = grid
            .lookup(params.ambient, params.distance)
            .powf(humidity / REFERENCE_HUMIDITY)
            .clamp(MIN_TRANSMISSION, 1.0) as f64;
        let emissivity = params.radiation.min(1.0) as f64;

        let w_reflected = radiance(params.reflected);
        let w_atmosphere = radiance(params.ambient);
        let offset = (1.0 - emissivity) * tau * w_reflected + (1.0 - tau) * w_atmosphere;
        let gain = emissivity * tau;
        if !offset.is_finite() || !gain.is_finite() || gain <= 0.0 {
            return None;
        }
        Some(Self { offset, gain })
    }

    fn solve(&self, raw: f32) -> f32 {
        let w_obj = (radiance(raw) - self.offset) / self.gain;
        if !w_obj.is_finite() || w_obj <= 0.0 {
            return raw;
        }
        let t = (w_obj.powf(0.25) - KELVIN_OFFSET as f64) as f32;
        if t.is_finite() {
            t
        } else {
            raw
        }
    }
}

/// Total radiance proxy for a Celsius temperature (Stefan-Boltzmann, unscaled).
#[inline]
fn radiance(celsius: f32) -> f64 {
    (celsius as f64 + KELVIN_OFFSET as f64).powi(4)
}

/// Build the per-pixel correction for one frame.
///
/// Returns the identity when `distance <= 0`, `radiation <= 0`, or no table is
/// available. Non-physical per-pixel results also fall back to the raw value.
pub fn corrector(
    params: &CorrectionParams,
    table: Option<&CalibrationTable>,
) -> impl Fn(f32) -> f32 + Send + Sync {
    let balance = RadianceBalance::new(params, table);
    move |raw| match &balance {
        Some(b) => b.solve(raw),
        None => raw,
    }
}

/// Correct a single reading.
pub fn correct(raw: f32, params: &CorrectionParams, table: Option<&CalibrationTable>) -> f32 {
    corrector(params, table)(raw)
}
