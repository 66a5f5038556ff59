use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::consts::PALETTE_SIZE;
use crate::header::ColorStop;

use super::gradient::sample_stops;

/// Built-in false-color palettes, selected by the header's `pseudo_mode` id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StandardPalette {
    WhiteHot,
    BlackHot,
    #[default]
    Iron,
    Rainbow,
    RedHot,
    Lava,
    Arctic,
    Medical,
}

pub type Lut = [[u8; 3]; PALETTE_SIZE];

const WHITE_HOT: &[(f32, u32)] = &[(0.0, 0x000000), (1.0, 0xFFFFFF)];
const BLACK_HOT: &[(f32, u32)] = &[(0.0, 0xFFFFFF), (1.0, 0x000000)];
const IRON: &[(f32, u32)] = &[
    (0.0, 0x000010),
    (0.2, 0x30007A),
    (0.4, 0x9A0096),
    (0.6, 0xE43C1A),
    (0.8, 0xFCA400),
    (1.0, 0xFFFFD8),
];
const RAINBOW: &[(f32, u32)] = &[
    (0.0, 0x00007F),
    (0.2, 0x0000FF),
    (0.4, 0x00FFFF),
    (0.6, 0x00FF00),
    (0.8, 0xFFFF00),
    (1.0, 0xFF0000),
];
const RED_HOT: &[(f32, u32)] = &[(0.0, 0x000000), (0.5, 0x800000), (0.8, 0xFF2000), (1.0, 0xFFFFFF)];
const LAVA: &[(f32, u32)] = &[
    (0.0, 0x000000),
    (0.25, 0x1E1E78),
    (0.5, 0x8C1E50),
    (0.75, 0xF06414),
    (1.0, 0xFFF0A0),
];
const ARCTIC: &[(f32, u32)] = &[
    (0.0, 0x00004B),
    (0.35, 0x0064C8),
    (0.65, 0x96DCFF),
    (0.85, 0xFFC800),
    (1.0, 0xFFFFFF),
];
const MEDICAL: &[(f32, u32)] = &[
    (0.0, 0x000000),
    (0.3, 0x0000C8),
    (0.5, 0x00C800),
    (0.7, 0xFFFF00),
    (0.9, 0xFF0000),
    (1.0, 0xFFFFFF),
];

impl StandardPalette {
    pub const ALL: [StandardPalette; 8] = [
        StandardPalette::WhiteHot,
        StandardPalette::BlackHot,
        StandardPalette::Iron,
        StandardPalette::Rainbow,
        StandardPalette::RedHot,
        StandardPalette::Lava,
        StandardPalette::Arctic,
        StandardPalette::Medical,
    ];

    /// Palette for a header id (ids start at 1).
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get((id as usize).checked_sub(1)?).copied()
    }

    /// Like [`StandardPalette::from_id`], falling back to the default palette.
    pub fn from_id_or_default(id: u8) -> Self {
        Self::from_id(id).unwrap_or_default()
    }

    pub fn id(self) -> u8 {
        Self::ALL.iter().position(|&p| p == self).unwrap_or(0) as u8 + 1
    }

    fn stops(self) -> &'static [(f32, u32)] {
        match self {
            Self::WhiteHot => WHITE_HOT,
            Self::BlackHot => BLACK_HOT,
            Self::Iron => IRON,
            Self::Rainbow => RAINBOW,
            Self::RedHot => RED_HOT,
            Self::Lava => LAVA,
            Self::Arctic => ARCTIC,
            Self::Medical => MEDICAL,
        }
    }

    /// The 256-entry lookup table, built on first use.
    pub fn lut(self) -> &'static Lut {
        static LUTS: [OnceLock<Lut>; 8] = [const { OnceLock::new() }; 8];
        LUTS[self.id() as usize - 1].get_or_init(|| build_lut(self.stops()))
    }

    /// LUT entry for a normalized value in `[0, 1]`.
    pub fn color(self, t: f32) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.lut()[(t * (PALETTE_SIZE - 1) as f32).round() as usize]
    }
}

impl std::fmt::Display for StandardPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WhiteHot => write!(f, "White hot"),
            Self::BlackHot => write!(f, "Black hot"),
            Self::Iron => write!(f, "Iron"),
            Self::Rainbow => write!(f, "Rainbow"),
            Self::RedHot => write!(f, "Red hot"),
            Self::Lava => write!(f, "Lava"),
            Self::Arctic => write!(f, "Arctic"),
            Self::Medical => write!(f, "Medical"),
        }
    }
}

fn build_lut(stops: &[(f32, u32)]) -> Lut {
    let stops: Vec<ColorStop> = stops.iter().map(|&(p, rgb)| ColorStop::new(p, rgb)).collect();
    let mut lut = [[0u8; 3]; PALETTE_SIZE];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = sample_stops(&stops, i as f32 / (PALETTE_SIZE - 1) as f32);
    }
    lut
}
