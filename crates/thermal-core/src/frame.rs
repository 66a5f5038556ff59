use ndarray::Array2;

use crate::consts::PLANE_BYTES_PER_PIXEL;
use crate::error::{Result, ThermalError};

/// A pixel position in sensor (or display) space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One capture tick as delivered by the device: a YUYV image plane followed by
/// a 16-bit little-endian raw temperature plane, both `width * height * 2` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    pub width: u16,
    pub height: u16,
    pub image_plane: Vec<u8>,
    pub temp_plane: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u16, height: u16, image_plane: Vec<u8>, temp_plane: Vec<u8>) -> Self {
        Self {
            width,
            height,
            image_plane,
            temp_plane,
        }
    }

    /// Split a concatenated `image ‖ temperature` buffer into its two planes.
    pub fn from_bytes(width: u16, height: u16, bytes: &[u8]) -> Result<Self> {
        let plane = plane_len(width, height);
        if bytes.len() != plane * 2 {
            return Err(ThermalError::InvalidFrameLength {
                plane: "frame",
                expected: plane * 2,
                actual: bytes.len(),
            });
        }
        let (image, temp) = bytes.split_at(plane);
        Ok(Self::new(width, height, image.to_vec(), temp.to_vec()))
    }

    /// Concatenate the planes back into the on-disk layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.image_plane.len() + self.temp_plane.len());
        out.extend_from_slice(&self.image_plane);
        out.extend_from_slice(&self.temp_plane);
        out
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check both planes against the declared dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ThermalError::InvalidDimensions {
                width: self.width as u32,
                height: self.height as u32,
            });
        }
        let expected = plane_len(self.width, self.height);
        if self.image_plane.len() != expected {
            return Err(ThermalError::InvalidFrameLength {
                plane: "image",
                expected,
                actual: self.image_plane.len(),
            });
        }
        if self.temp_plane.len() != expected {
            return Err(ThermalError::InvalidFrameLength {
                plane: "temperature",
                expected,
                actual: self.temp_plane.len(),
            });
        }
        Ok(())
    }

    /// Luminance (Y) samples of the YUYV image plane, one per pixel.
    pub fn luminance(&self) -> Array2<f32> {
        let (w, h) = (self.width as usize, self.height as usize);
        let luma: Vec<f32> = self
            .image_plane
            .chunks_exact(PLANE_BYTES_PER_PIXEL)
            .take(w * h)
            .map(|px| px[0] as f32)
            .collect();
        Array2::from_shape_vec((h, w), luma).unwrap_or_else(|_| Array2::zeros((h, w)))
    }
}

/// Size in bytes of one plane for the given dimensions.
pub fn plane_len(width: u16, height: u16) -> usize {
    width as usize * height as usize * PLANE_BYTES_PER_PIXEL
}

/// Per-pixel Celsius temperatures in sensor space, indexed `[[row, col]]`.
///
/// Produced once per frame and never mutated afterwards; share it behind an
/// `Arc` when several consumers need it.
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureField {
    pub data: Array2<f32>,
}

impl TemperatureField {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Build from a row-major vector; `values.len()` must equal `width * height`.
    pub fn from_vec(width: usize, height: usize, values: Vec<f32>) -> Result<Self> {
        let actual = values.len();
        Array2::from_shape_vec((height, width), values)
            .map(Self::new)
            .map_err(|_| ThermalError::InvalidFrameLength {
                plane: "temperature",
                expected: width * height,
                actual,
            })
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, p: Point) -> Option<f32> {
        self.data.get([p.y, p.x]).copied()
    }
}
