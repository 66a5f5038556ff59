use crate::header::ColorStop;

#[inline]
fn channel(rgb: u32, shift: u32) -> u8 {
    ((rgb >> shift) & 0xFF) as u8
}

/// Split `0x??RRGGBB` into RGB bytes.
pub fn rgb_bytes(rgb: u32) -> [u8; 3] {
    [channel(rgb, 16), channel(rgb, 8), channel(rgb, 0)]
}

/// `0xAARRGGBB` to RGBA bytes with alpha forced opaque.
pub fn argb_to_rgba(argb: u32) -> [u8; 4] {
    let [r, g, b] = rgb_bytes(argb);
    [r, g, b, 255]
}

/// Color at `ratio` along a stop list that spans `[0, 1]`.
///
/// `ratio` is clamped to `[0, 1]` (NaN reads as 0). Between the bracketing
/// stops each channel is interpolated linearly and rounded to nearest; a ratio
/// at or past the last stop yields that stop exactly.
pub fn sample_stops(stops: &[ColorStop], ratio: f32) -> [u8; 3] {
    let Some(last) = stops.last() else {
        return [0, 0, 0];
    };
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    if ratio >= last.position {
        return rgb_bytes(last.rgb);
    }
    if ratio <= stops[0].position {
        return rgb_bytes(stops[0].rgb);
    }

    // First stop strictly above the ratio; its predecessor brackets from below.
    let upper = stops
        .iter()
        .position(|s| s.position > ratio)
        .unwrap_or(stops.len() - 1);
    let lo = &stops[upper - 1];
    let hi = &stops[upper];
    let t = (ratio - lo.position) / (hi.position - lo.position);

    let a = rgb_bytes(lo.rgb);
    let b = rgb_bytes(hi.rgb);
    let mut out = [0u8; 3];
    for c in 0..3 {
        let v = a[c] as f32 + (b[c] as f32 - a[c] as f32) * t;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}
