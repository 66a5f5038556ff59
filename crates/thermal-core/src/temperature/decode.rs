use byteorder::{ByteOrder, LittleEndian};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consts::{KELVIN_OFFSET, PARALLEL_PIXEL_THRESHOLD, PLANE_BYTES_PER_PIXEL};
use crate::error::{Result, ThermalError};
use crate::frame::TemperatureField;

/// Fixed-point scale of the raw temperature codes, in codes per Kelvin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FixedPointScale {
    /// ISP off: 1/64 K per code.
    #[default]
    Scale64,
    /// ISP pre-scaling active: 1/16 K per code.
    Scale16,
}

impl FixedPointScale {
    pub fn divisor(self) -> f32 {
        match self {
            Self::Scale64 => 64.0,
            Self::Scale16 => 16.0,
        }
    }

    pub fn from_divisor(divisor: u32) -> Option<Self> {
        match divisor {
            64 => Some(Self::Scale64),
            16 => Some(Self::Scale16),
            _ => None,
        }
    }
}

impl std::fmt::Display for FixedPointScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "1/{} K", self.divisor())
    }
}

#[inline]
fn code_to_celsius(code: u16, divisor: f32) -> f32 {
    code as f32 / divisor - KELVIN_OFFSET
}

/// Convert a little-endian u16 temperature plane to Celsius.
///
/// A trailing odd byte is ignored.
pub fn decode_celsius(plane: &[u8], scale: FixedPointScale) -> Vec<f32> {
    let divisor = scale.divisor();
    let samples = plane.len() / PLANE_BYTES_PER_PIXEL;
    let plane = &plane[..samples * PLANE_BYTES_PER_PIXEL];

    if samples >= PARALLEL_PIXEL_THRESHOLD {
        plane
            .par_chunks_exact(PLANE_BYTES_PER_PIXEL)
            .map(|c| code_to_celsius(LittleEndian::read_u16(c), divisor))
            .collect()
    } else {
        plane
            .chunks_exact(PLANE_BYTES_PER_PIXEL)
            .map(|c| code_to_celsius(LittleEndian::read_u16(c), divisor))
            .collect()
    }
}

/// Decode a plane that must hold exactly `width * height` samples.
pub fn decode_field(
    plane: &[u8],
    width: usize,
    height: usize,
    scale: FixedPointScale,
) -> Result<TemperatureField> {
    let expected = width * height * PLANE_BYTES_PER_PIXEL;
    if plane.len() != expected {
        return Err(ThermalError::InvalidFrameLength {
            plane: "temperature",
            expected,
            actual: plane.len(),
        });
    }
    TemperatureField::from_vec(width, height, decode_celsius(plane, scale))
}

/// Convert Celsius values back to raw little-endian codes.
///
/// Codes are rounded to nearest and saturate at the u16 range; NaN maps to 0.
pub fn encode_celsius(values: &[f32], scale: FixedPointScale) -> Vec<u8> {
    let divisor = scale.divisor();
    let mut out = Vec::with_capacity(values.len() * PLANE_BYTES_PER_PIXEL);
    for &t in values {
        // `as` saturates and maps NaN to 0.
        let code = ((t + KELVIN_OFFSET) * divisor).round() as u16;
        out.extend_from_slice(&code.to_le_bytes());
    }
    out
}
