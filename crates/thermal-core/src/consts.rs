/// Minimum pixel count (h*w) to use Rayon parallelism for per-pixel work.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;

/// Bytes per pixel in both the YUYV image plane and the raw temperature plane.
pub const PLANE_BYTES_PER_PIXEL: usize = 2;

/// `pseudo_mode` value meaning "custom gradient active".
pub const PSEUDO_MODE_CUSTOM: u8 = 0xFF;

/// Maximum number of custom gradient stops the header can persist.
pub const MAX_CUSTOM_STOPS: usize = 8;

/// Number of entries in every built-in palette lookup table.
pub const PALETTE_SIZE: usize = 256;

/// Mid-gray used at the inner end of the color bar's out-of-range ramps.
pub const COLOR_BAR_MID_GRAY: u8 = 0x85;

/// Default length (entries) of a generated pseudo-color bar.
pub const DEFAULT_COLOR_BAR_LENGTH: usize = 256;

/// Components smaller than this many pixels are not highlighted.
pub const DEFAULT_ALARM_MIN_AREA: usize = 50;

/// Relative humidity the transmission tables were measured at.
pub const REFERENCE_HUMIDITY: f32 = 0.8;

/// Transmission is clamped to at least this value before inverting it.
pub const MIN_TRANSMISSION: f32 = 0.05;

/// Sensor width of the supported camera family.
pub const DEFAULT_SENSOR_WIDTH: u16 = 256;

/// Sensor height of the supported camera family.
pub const DEFAULT_SENSOR_HEIGHT: u16 = 192;

/// Default ambient temperature (°C) used when the header carries none.
pub const DEFAULT_ENVIRONMENT: f32 = 25.0;

/// Default target distance (m) used when the header carries none.
pub const DEFAULT_DISTANCE: f32 = 0.25;

/// Default emissivity used when the header carries none.
pub const DEFAULT_RADIATION: f32 = 0.95;
