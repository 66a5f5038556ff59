use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use ndarray::Array2;
use tracing::{debug, info};

use crate::error::{Result, ThermalError};
use crate::header::GainStatus;

/// Size of the grid header: two u16 counts followed by four f32 axis values.
const GRID_HEADER_SIZE: usize = 20;

/// Atmospheric transmission sampled over ambient temperature and distance.
#[derive(Clone, Debug, PartialEq)]
pub struct TransmissionGrid {
    pub ambient_start: f32,
    pub ambient_step: f32,
    pub distance_start: f32,
    pub distance_step: f32,
    /// `[[ambient_index, distance_index]]`, each value in `[0, 1]`.
    pub values: Array2<f32>,
}

impl TransmissionGrid {
    pub fn new(
        ambient_start: f32,
        ambient_step: f32,
        distance_start: f32,
        distance_step: f32,
        values: Array2<f32>,
    ) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows == 0 || cols == 0 {
            return Err(ThermalError::InvalidCalibration("empty grid".into()));
        }
        let axis_ok = |start: f32, step: f32, count: usize| {
            start.is_finite() && (count == 1 || (step.is_finite() && step > 0.0))
        };
        if !axis_ok(ambient_start, ambient_step, rows) {
            return Err(ThermalError::InvalidCalibration(format!(
                "bad ambient axis: start {ambient_start}, step {ambient_step}"
            )));
        }
        if !axis_ok(distance_start, distance_step, cols) {
            return Err(ThermalError::InvalidCalibration(format!(
                "bad distance axis: start {distance_start}, step {distance_step}"
            )));
        }
        Ok(Self {
            ambient_start,
            ambient_step,
            distance_start,
            distance_step,
            values,
        })
    }

    /// Parse the persisted table layout.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < GRID_HEADER_SIZE {
            return Err(ThermalError::InvalidCalibration(format!(
                "table too small: {} bytes",
                bytes.len()
            )));
        }
        let mut cur = Cursor::new(bytes);
        let ambient_count = cur.read_u16::<LittleEndian>()? as usize;
        let distance_count = cur.read_u16::<LittleEndian>()? as usize;
        let ambient_start = cur.read_f32::<LittleEndian>()?;
        let ambient_step = cur.read_f32::<LittleEndian>()?;
        let distance_start = cur.read_f32::<LittleEndian>()?;
        let distance_step = cur.read_f32::<LittleEndian>()?;

        let expected = GRID_HEADER_SIZE + ambient_count * distance_count * 2;
        if bytes.len() != expected {
            return Err(ThermalError::InvalidCalibration(format!(
                "expected {expected} bytes for a {ambient_count}x{distance_count} grid, got {}",
                bytes.len()
            )));
        }

        let mut values = Vec::with_capacity(ambient_count * distance_count);
        for _ in 0..ambient_count * distance_count {
            values.push(cur.read_u16::<LittleEndian>()? as f32 / u16::MAX as f32);
        }
        let values = Array2::from_shape_vec((ambient_count, distance_count), values)
            .map_err(|e| ThermalError::InvalidCalibration(e.to_string()))?;

        Self::new(ambient_start, ambient_step, distance_start, distance_step, values)
    }

    /// Serialize into the layout read by [`TransmissionGrid::parse`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let (rows, cols) = self.values.dim();
        let mut buf = Vec::with_capacity(GRID_HEADER_SIZE + rows * cols * 2);
        buf.extend_from_slice(&(rows as u16).to_le_bytes());
        buf.extend_from_slice(&(cols as u16).to_le_bytes());
        buf.extend_from_slice(&self.ambient_start.to_le_bytes());
        buf.extend_from_slice(&self.ambient_step.to_le_bytes());
        buf.extend_from_slice(&self.distance_start.to_le_bytes());
        buf.extend_from_slice(&self.distance_step.to_le_bytes());
        for &v in self.values.iter() {
            let code = (v.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16;
            buf.extend_from_slice(&code.to_le_bytes());
        }
        buf
    }

    /// Bilinear transmission lookup, clamped to the sampled range.
    pub fn lookup(&self, ambient: f32, distance: f32) -> f32 {
        let (rows, cols) = self.values.dim();
        let (a0, a1, fa) = axis_position(ambient, self.ambient_start, self.ambient_step, rows);
        let (d0, d1, fd) = axis_position(distance, self.distance_start, self.distance_step, cols);

        let top = lerp(self.values[[a0, d0]], self.values[[a0, d1]], fd);
        let bottom = lerp(self.values[[a1, d0]], self.values[[a1, d1]], fd);
        lerp(top, bottom, fa)
    }
}

/// Bracketing indices and fraction for `v` on an evenly sampled axis.
fn axis_position(v: f32, start: f32, step: f32, count: usize) -> (usize, usize, f32) {
    if count <= 1 {
        return (0, 0, 0.0);
    }
    let pos = ((v - start) / step).clamp(0.0, (count - 1) as f32);
    let pos = if pos.is_nan() { 0.0 } else { pos };
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(count - 1);
    (i0, i1, pos - i0 as f32)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Per-product transmission tables for both gain modes.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationTable {
    pub high_gain: TransmissionGrid,
    pub low_gain: TransmissionGrid,
}

impl CalibrationTable {
    pub fn from_bytes(high_gain: &[u8], low_gain: &[u8]) -> Result<Self> {
        Ok(Self {
            high_gain: TransmissionGrid::parse(high_gain)?,
            low_gain: TransmissionGrid::parse(low_gain)?,
        })
    }

    pub fn grid(&self, gain: GainStatus) -> &TransmissionGrid {
        match gain {
            GainStatus::High => &self.high_gain,
            GainStatus::Low => &self.low_gain,
        }
    }
}

/// Camera product line; each has its own calibration tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductFamily {
    Ts001,
    Tc001Lite,
}

impl ProductFamily {
    pub const ALL: [ProductFamily; 2] = [ProductFamily::Ts001, ProductFamily::Tc001Lite];

    /// Family from the device name stored in the header.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_uppercase();
        if name.starts_with("TS") {
            Some(Self::Ts001)
        } else if name.starts_with("TC001 LITE") || name.starts_with("TC001LITE") {
            Some(Self::Tc001Lite)
        } else {
            None
        }
    }

    /// File name prefix of this family's tables.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Ts001 => "TS001",
            Self::Tc001Lite => "TC001_LITE",
        }
    }
}

impl std::fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ts001 => write!(f, "TS001"),
            Self::Tc001Lite => write!(f, "TC001 Lite"),
        }
    }
}

/// Calibration tables loaded once and shared read-only by every frame.
#[derive(Clone, Debug, Default)]
pub struct CalibrationStore {
    tables: HashMap<ProductFamily, CalibrationTable>,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: ProductFamily, table: CalibrationTable) {
        self.tables.insert(family, table);
    }

    pub fn get(&self, family: ProductFamily) -> Option<&CalibrationTable> {
        self.tables.get(&family)
    }

    /// Table for the device named in a header, if its family is known and loaded.
    pub fn for_device(&self, name: &str) -> Option<&CalibrationTable> {
        ProductFamily::from_name(name).and_then(|f| self.get(f))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Load `<STEM>_H.bin` / `<STEM>_L.bin` pairs from a directory.
    ///
    /// Families without both files are skipped; a present but malformed file
    /// is an error.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        for family in ProductFamily::ALL {
            let high = dir.join(format!("{}_H.bin", family.file_stem()));
            let low = dir.join(format!("{}_L.bin", family.file_stem()));
            if !high.is_file() || !low.is_file() {
                debug!(%family, dir = %dir.display(), "calibration tables not found");
                continue;
            }
            let table = CalibrationTable::from_bytes(&std::fs::read(&high)?, &std::fs::read(&low)?)?;
            store.insert(family, table);
        }
        info!(families = store.len(), dir = %dir.display(), "Loaded calibration tables");
        Ok(store)
    }
}
