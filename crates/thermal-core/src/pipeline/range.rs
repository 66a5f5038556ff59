use crate::color::DisplayRange;
use crate::error::{Result, ThermalError};
use crate::header::{CustomPseudo, FrameHeader};

/// How the temperature range mapped onto the palette is chosen.
///
/// Valid transitions:
/// `Auto -> Locked`, `Locked -> Auto`, `Auto | Locked -> Custom`, `Custom -> Auto`.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum DisplayMode {
    /// Range follows each frame's min/max.
    #[default]
    Auto,
    /// Range frozen at the moment of locking.
    Locked(DisplayRange),
    /// Range and colors come from a user gradient.
    Custom(CustomPseudo),
}

impl DisplayMode {
    /// Initial mode for a persisted header.
    pub fn from_header(header: &FrameHeader) -> Self {
        match header.active_custom() {
            Some(custom) => Self::Custom(custom.clone()),
            None => Self::Auto,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Locked(_) => "locked",
            Self::Custom(_) => "custom",
        }
    }

    /// Freeze the range currently on screen.
    pub fn lock(&self, current: DisplayRange) -> Result<Self> {
        match self {
            Self::Auto => Ok(Self::Locked(current)),
            other => Err(other.invalid("locked")),
        }
    }

    /// Drop a locked range and follow frames again.
    pub fn unlock(&self) -> Result<Self> {
        match self {
            Self::Locked(_) => Ok(Self::Auto),
            other => Err(other.invalid("auto")),
        }
    }

    pub fn enter_custom(&self, custom: CustomPseudo) -> Result<Self> {
        match self {
            Self::Auto | Self::Locked(_) => Ok(Self::Custom(custom)),
            other => Err(other.invalid("custom")),
        }
    }

    pub fn exit_custom(&self) -> Result<Self> {
        match self {
            Self::Custom(_) => Ok(Self::Auto),
            other => Err(other.invalid("auto")),
        }
    }

    /// Range to map for a frame whose own range is `frame_range`.
    pub fn resolve(&self, frame_range: Option<DisplayRange>) -> Option<DisplayRange> {
        match self {
            Self::Auto => frame_range,
            Self::Locked(range) => Some(*range),
            Self::Custom(custom) => Some(DisplayRange::new(custom.min_temp, custom.max_temp)),
        }
    }

    fn invalid(&self, to: &'static str) -> ThermalError {
        ThermalError::InvalidTransition {
            from: self.name(),
            to,
        }
    }
}
