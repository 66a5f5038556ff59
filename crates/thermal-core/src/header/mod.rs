pub mod codec;

pub use codec::{decode_header, decode_header_or_default, encode_header, DecodedHeader, HEADER_SIZE};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DISTANCE, DEFAULT_ENVIRONMENT, DEFAULT_RADIATION, DEFAULT_SENSOR_HEIGHT,
    DEFAULT_SENSOR_WIDTH, MAX_CUSTOM_STOPS, PSEUDO_MODE_CUSTOM,
};
use crate::error::{Result, ThermalError};

/// Clockwise rotation applied between sensor space and display space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RotationMode {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl RotationMode {
    pub fn from_quarter_turns(turns: u8) -> Option<Self> {
        match turns {
            0 => Some(Self::Deg0),
            1 => Some(Self::Deg90),
            2 => Some(Self::Deg180),
            3 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Self::from_quarter_turns(((degrees / 90) % 4) as u8)
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Whether width and height trade places under this rotation.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl std::fmt::Display for RotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Sensor gain selected on the device; chooses which calibration grid applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GainStatus {
    High,
    #[default]
    Low,
}

impl GainStatus {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Low),
            1 => Some(Self::High),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }
}

/// One gradient control point; `rgb` is `0xRRGGBB` (any alpha byte is ignored).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub position: f32,
    pub rgb: u32,
}

impl ColorStop {
    pub fn new(position: f32, rgb: u32) -> Self {
        Self { position, rgb }
    }
}

/// User-defined multi-stop gradient with its own temperature bounds.
///
/// Stops are always strictly increasing and span exactly `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomPseudo {
    stops: Vec<ColorStop>,
    pub max_temp: f32,
    pub min_temp: f32,
    /// Out-of-range pixels keep the grayscale base instead of the end colors.
    pub use_gray: bool,
}

impl CustomPseudo {
    /// Validate the stops and rescale their positions onto `[0, 1]`.
    pub fn new(stops: Vec<ColorStop>, min_temp: f32, max_temp: f32, use_gray: bool) -> Result<Self> {
        let stops = normalize_stops(stops)?;
        if !min_temp.is_finite() || !max_temp.is_finite() || max_temp <= min_temp {
            return Err(ThermalError::InvalidGradient(format!(
                "temperature bounds [{min_temp}, {max_temp}] are not an increasing finite range"
            )));
        }
        Ok(Self {
            stops,
            max_temp,
            min_temp,
            use_gray,
        })
    }

    /// Gradient from colors alone, spaced evenly from 0 to 1.
    pub fn from_colors(colors: &[u32], min_temp: f32, max_temp: f32, use_gray: bool) -> Result<Self> {
        if colors.len() < 2 {
            return Err(ThermalError::InvalidGradient(format!(
                "need at least 2 colors, got {}",
                colors.len()
            )));
        }
        let last = (colors.len() - 1) as f32;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, &rgb)| ColorStop::new(i as f32 / last, rgb))
            .collect();
        Self::new(stops, min_temp, max_temp, use_gray)
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }
}

fn normalize_stops(stops: Vec<ColorStop>) -> Result<Vec<ColorStop>> {
    if stops.len() < 2 || stops.len() > MAX_CUSTOM_STOPS {
        return Err(ThermalError::InvalidGradient(format!(
            "stop count {} outside 2..={MAX_CUSTOM_STOPS}",
            stops.len()
        )));
    }
    if stops.iter().any(|s| !s.position.is_finite()) {
        return Err(ThermalError::InvalidGradient("non-finite stop position".into()));
    }
    if stops.windows(2).any(|w| w[1].position <= w[0].position) {
        return Err(ThermalError::InvalidGradient(
            "stop positions must be strictly increasing".into(),
        ));
    }

    let first = stops[0].position;
    let last = stops[stops.len() - 1].position;
    if first == 0.0 && last == 1.0 {
        return Ok(stops
            .into_iter()
            .map(|s| ColorStop::new(s.position, s.rgb & 0x00FF_FFFF))
            .collect());
    }
    let span = last - first;
    let count = stops.len();
    Ok(stops
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            // Pin the ends so rounding cannot leave the gradient short of 0 or 1.
            let position = if i == 0 {
                0.0
            } else if i == count - 1 {
                1.0
            } else {
                (s.position - first) / span
            };
            ColorStop::new(position, s.rgb & 0x00FF_FFFF)
        })
        .collect())
}

/// How an alarm region is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarkType {
    /// 1 px stroke along the region boundary.
    #[default]
    Outline,
    /// Every pixel of the region.
    Fill,
    /// Stroke of the region's bounding box.
    Rectangle,
}

impl MarkType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Outline),
            1 => Some(Self::Fill),
            2 => Some(Self::Rectangle),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Outline => 0,
            Self::Fill => 1,
            Self::Rectangle => 2,
        }
    }
}

/// High/low temperature alarm. A non-finite threshold disables that side.
#[derive(Clone, Debug, PartialEq)]
pub struct AlarmConfig {
    pub high_temp: f32,
    pub low_temp: f32,
    /// ARGB.
    pub high_color: u32,
    /// ARGB.
    pub low_color: u32,
    pub mark_type: MarkType,
    pub is_mark_open: bool,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            high_temp: f32::INFINITY,
            low_temp: f32::NEG_INFINITY,
            high_color: 0xFFFF_0000,
            low_color: 0xFF00_00FF,
            mark_type: MarkType::Outline,
            is_mark_open: false,
        }
    }
}

impl AlarmConfig {
    pub fn high_enabled(&self) -> bool {
        self.high_temp.is_finite()
    }

    pub fn low_enabled(&self) -> bool {
        self.low_temp.is_finite()
    }

    /// True when highlighting would change anything.
    pub fn is_active(&self) -> bool {
        self.is_mark_open && (self.high_enabled() || self.low_enabled())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WatermarkConfig {
    pub title: String,
    pub address: String,
    pub is_open: bool,
    pub is_add_time: bool,
}

/// Persisted per-capture configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameHeader {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub rotate: RotationMode,
    /// Rotation reported by the device.
    pub init_rotate: RotationMode,
    /// Rotation applied by the user on top of `init_rotate`.
    pub correct_rotate: RotationMode,
    /// Standard palette id, or [`PSEUDO_MODE_CUSTOM`].
    pub pseudo_mode: u8,
    pub custom_pseudo: Option<CustomPseudo>,
    pub alarm: AlarmConfig,
    pub watermark: WatermarkConfig,
    pub gain_status: GainStatus,
    /// ARGB.
    pub text_color: u32,
    pub text_size: u16,
    /// Ambient temperature, °C.
    pub environment: f32,
    /// Target distance, m.
    pub distance: f32,
    /// Emissivity in `(0, 1]`.
    pub radiation: f32,
    pub is_show_pseudo_bar: bool,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: DEFAULT_SENSOR_WIDTH,
            height: DEFAULT_SENSOR_HEIGHT,
            rotate: RotationMode::Deg0,
            init_rotate: RotationMode::Deg0,
            correct_rotate: RotationMode::Deg0,
            pseudo_mode: 0,
            custom_pseudo: None,
            alarm: AlarmConfig::default(),
            watermark: WatermarkConfig::default(),
            gain_status: GainStatus::Low,
            text_color: 0xFFFF_FFFF,
            text_size: 14,
            environment: DEFAULT_ENVIRONMENT,
            distance: DEFAULT_DISTANCE,
            radiation: DEFAULT_RADIATION,
            is_show_pseudo_bar: false,
        }
    }
}

impl FrameHeader {
    /// The custom gradient, if one is stored and selected.
    pub fn active_custom(&self) -> Option<&CustomPseudo> {
        if self.pseudo_mode == PSEUDO_MODE_CUSTOM {
            self.custom_pseudo.as_ref()
        } else {
            None
        }
    }

    /// Number of pixels the payload planes must hold.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
