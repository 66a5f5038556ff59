pub mod config;
pub mod info;
pub mod query;
pub mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use thermal_core::calibration::CalibrationStore;
use thermal_core::pipeline::{EngineConfig, ThermalEngine};

/// Options shared by every command that processes frames.
#[derive(Args)]
pub struct EngineArgs {
    /// Engine config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding <FAMILY>_H.bin / <FAMILY>_L.bin calibration tables
    #[arg(long)]
    pub calibration_dir: Option<PathBuf>,

    /// Skip distance and emissivity correction
    #[arg(long)]
    pub no_correction: bool,
}

impl EngineArgs {
    pub fn build(&self) -> Result<ThermalEngine> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if self.no_correction {
            config.correction.enabled = false;
        }
        let calibration = match &self.calibration_dir {
            Some(dir) => load_calibration(dir)?,
            None => CalibrationStore::new(),
        };
        Ok(ThermalEngine::new(config, Arc::new(calibration)))
    }
}

fn load_calibration(dir: &Path) -> Result<CalibrationStore> {
    CalibrationStore::load_dir(dir)
        .with_context(|| format!("Failed to load calibration tables from {}", dir.display()))
}

/// Parse comma-separated integers, e.g. `"3,4"`.
pub fn parse_coords(s: &str, count: usize) -> Result<Vec<i64>> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<i64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid coordinates '{s}'"))?;
    anyhow::ensure!(
        values.len() == count,
        "Expected {count} comma-separated values, got '{s}'"
    );
    Ok(values)
}
