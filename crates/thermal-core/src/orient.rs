//! Sensor-space to display-space rotation.
//!
//! Every processing stage works in sensor space; buffers are rotated only when
//! they are handed to the display, and hit-testing maps display points back.
//! All rotations are clockwise.

use ndarray::{s, Array2};
use tracing::warn;

use crate::frame::{Point, TemperatureField};
use crate::header::RotationMode;

/// Display dimensions `(width, height)` of a `width x height` sensor image.
pub fn display_dims(width: usize, height: usize, rotation: RotationMode) -> (usize, usize) {
    if rotation.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Where sensor pixel `p` lands on the display.
pub fn sensor_to_display(p: Point, width: usize, height: usize, rotation: RotationMode) -> Point {
    match rotation {
        RotationMode::Deg0 => p,
        RotationMode::Deg90 => Point::new(height - 1 - p.y, p.x),
        RotationMode::Deg180 => Point::new(width - 1 - p.x, height - 1 - p.y),
        RotationMode::Deg270 => Point::new(p.y, width - 1 - p.x),
    }
}

/// Sensor pixel shown at display point `p`. `width`/`height` are sensor dimensions.
pub fn display_to_sensor(p: Point, width: usize, height: usize, rotation: RotationMode) -> Point {
    match rotation {
        RotationMode::Deg0 => p,
        RotationMode::Deg90 => Point::new(p.y, height - 1 - p.x),
        RotationMode::Deg180 => Point::new(width - 1 - p.x, height - 1 - p.y),
        RotationMode::Deg270 => Point::new(width - 1 - p.y, p.x),
    }
}

/// Rotate a row-major buffer of `width * height` pixels.
///
/// Returns the rotated buffer with its new width and height. A buffer of the
/// wrong length is returned unrotated.
pub fn orient<T: Copy>(
    buf: &[T],
    width: usize,
    height: usize,
    rotation: RotationMode,
) -> (Vec<T>, usize, usize) {
    orient_chunks(buf, 1, width, height, rotation)
}

/// [`orient`] for byte buffers with `bytes_per_pixel` bytes per pixel (4 for RGBA).
pub fn orient_bytes(
    buf: &[u8],
    bytes_per_pixel: usize,
    width: usize,
    height: usize,
    rotation: RotationMode,
) -> (Vec<u8>, usize, usize) {
    orient_chunks(buf, bytes_per_pixel, width, height, rotation)
}

fn orient_chunks<T: Copy>(
    buf: &[T],
    pixel_len: usize,
    width: usize,
    height: usize,
    rotation: RotationMode,
) -> (Vec<T>, usize, usize) {
    if buf.len() != width * height * pixel_len {
        warn!(
            len = buf.len(),
            width, height, "orientation skipped, buffer does not match dimensions"
        );
        return (buf.to_vec(), width, height);
    }
    if rotation == RotationMode::Deg0 {
        return (buf.to_vec(), width, height);
    }

    let (dw, dh) = display_dims(width, height, rotation);
    let mut out = Vec::with_capacity(buf.len());
    for dy in 0..dh {
        for dx in 0..dw {
            let src = display_to_sensor(Point::new(dx, dy), width, height, rotation);
            let i = (src.y * width + src.x) * pixel_len;
            out.extend_from_slice(&buf[i..i + pixel_len]);
        }
    }
    (out, dw, dh)
}

/// Rotate a temperature field into display space.
pub fn orient_field(field: &TemperatureField, rotation: RotationMode) -> TemperatureField {
    let data = &field.data;
    let rotated: Array2<f32> = match rotation {
        RotationMode::Deg0 => data.clone(),
        RotationMode::Deg90 => data.t().slice(s![.., ..;-1]).to_owned(),
        RotationMode::Deg180 => data.slice(s![..;-1, ..;-1]).to_owned(),
        RotationMode::Deg270 => data.t().slice(s![..;-1, ..]).to_owned(),
    };
    TemperatureField::new(rotated)
}
