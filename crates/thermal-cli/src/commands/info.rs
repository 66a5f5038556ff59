use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use thermal_core::frame::RawFrame;
use thermal_core::header::decode_header_or_default;
use thermal_core::io::capture::CaptureReader;

use super::EngineArgs;
use crate::summary::print_header_summary;

#[derive(Args)]
pub struct InfoArgs {
    /// Input capture file
    pub file: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = CaptureReader::open(&args.file)?;
    let parts = reader.parts()?;
    let decoded = decode_header_or_default(parts.header);
    let header = &decoded.header;

    print_header_summary(&args.file, header, decoded.truncated);

    let engine = args.engine.build()?;
    let raw = RawFrame::from_bytes(header.width, header.height, parts.frame)?;
    let field = engine.temperature_field(&raw, header)?;
    if let Some(stats) = field.stats() {
        println!("Max:         {:.2} °C at ({}, {})", stats.max, stats.max_pos.x, stats.max_pos.y);
        println!("Min:         {:.2} °C at ({}, {})", stats.min, stats.min_pos.x, stats.min_pos.y);
        println!("Average:     {:.2} °C", stats.avg);
    } else {
        println!("Temperatures: no finite values");
    }

    let total_kb = reader.bytes().len() as f64 / 1024.0;
    println!("File size:   {:.1} KB", total_kb);

    Ok(())
}
