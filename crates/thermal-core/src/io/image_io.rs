use std::path::Path;

use image::{ImageFormat, RgbImage, RgbaImage};

use crate::error::{Result, ThermalError};

fn rgba_image(rgba: &[u8], width: usize, height: usize) -> Result<RgbaImage> {
    RgbaImage::from_raw(width as u32, height as u32, rgba.to_vec()).ok_or(
        ThermalError::InvalidDimensions {
            width: width as u32,
            height: height as u32,
        },
    )
}

/// Save an RGBA buffer as 8-bit PNG.
pub fn save_rgba_png(rgba: &[u8], width: usize, height: usize, path: &Path) -> Result<()> {
    rgba_image(rgba, width, height)?.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save an RGBA buffer as 8-bit RGB BMP (alpha dropped).
pub fn save_rgba_bmp(rgba: &[u8], width: usize, height: usize, path: &Path) -> Result<()> {
    let rgb: RgbImage = image::DynamicImage::ImageRgba8(rgba_image(rgba, width, height)?).to_rgb8();
    rgb.save_with_format(path, ImageFormat::Bmp)?;
    Ok(())
}

/// Save an RGBA buffer, choosing format from file extension.
pub fn save_rgba_image(rgba: &[u8], width: usize, height: usize, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("bmp") => save_rgba_bmp(rgba, width, height, path),
        _ => save_rgba_png(rgba, width, height, path),
    }
}
