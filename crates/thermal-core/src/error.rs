use thiserror::Error;

/// Problems found while decoding a persisted frame header.
///
/// Truncation is never an error; only values that cannot be interpreted are.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Invalid rotation byte {value} at offset {offset}")]
    InvalidRotation { value: u8, offset: usize },

    #[error("Invalid gain status byte: {0}")]
    InvalidGainStatus(u8),

    #[error("Invalid alarm mark type byte: {0}")]
    InvalidMarkType(u8),

    #[error("Invalid custom gradient stop count: {0}")]
    InvalidStopCount(u8),

    #[error("Invalid custom gradient: {0}")]
    InvalidGradient(String),
}

#[derive(Error, Debug)]
pub enum ThermalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Header codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid {plane} plane length: expected {expected} bytes, got {actual}")]
    InvalidFrameLength {
        plane: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid calibration table: {0}")]
    InvalidCalibration(String),

    #[error("Invalid gradient: {0}")]
    InvalidGradient(String),

    #[error("Invalid display mode transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Invalid capture file: {0}")]
    InvalidCapture(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ThermalError>;
