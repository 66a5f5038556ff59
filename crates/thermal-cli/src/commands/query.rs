use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use thermal_core::frame::RawFrame;
use thermal_core::header::decode_header_or_default;
use thermal_core::io::capture::CaptureReader;
use thermal_core::temperature::{query_line, query_point, query_rect, TempStats};

use super::{parse_coords, EngineArgs};

#[derive(Args)]
pub struct QueryArgs {
    /// Input capture file
    pub file: PathBuf,

    /// Sensor pixel "x,y"
    #[arg(long)]
    pub point: Option<String>,

    /// Line "x0,y0,x1,y1"
    #[arg(long)]
    pub line: Option<String>,

    /// Rectangle corners "x0,y0,x1,y1" (inclusive)
    #[arg(long)]
    pub rect: Option<String>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: &QueryArgs) -> Result<()> {
    if args.point.is_none() && args.line.is_none() && args.rect.is_none() {
        bail!("Nothing to query: pass --point, --line or --rect");
    }

    let reader = CaptureReader::open(&args.file)?;
    let parts = reader.parts()?;
    let header = decode_header_or_default(parts.header).header;
    let raw = RawFrame::from_bytes(header.width, header.height, parts.frame)?;
    let field = args.engine.build()?.temperature_field(&raw, &header)?;

    if let Some(ref p) = args.point {
        let c = parse_coords(p, 2)?;
        print_stats("Point", query_point(&field, c[0], c[1]));
    }
    if let Some(ref l) = args.line {
        let c = parse_coords(l, 4)?;
        print_stats("Line", query_line(&field, (c[0], c[1]), (c[2], c[3])));
    }
    if let Some(ref r) = args.rect {
        let c = parse_coords(r, 4)?;
        print_stats("Rect", query_rect(&field, (c[0], c[1]), (c[2], c[3])));
    }

    Ok(())
}

fn print_stats(label: &str, stats: Option<TempStats>) {
    let Some(s) = stats else {
        println!("{label:<6} no data");
        return;
    };
    if s.count == 1 {
        println!("{label:<6} {:.2} °C at ({}, {})", s.max, s.max_pos.x, s.max_pos.y);
        return;
    }
    println!(
        "{label:<6} max {:.2} °C ({}, {})  min {:.2} °C ({}, {})  avg {:.2} °C  [{} px]",
        s.max, s.max_pos.x, s.max_pos.y, s.min, s.min_pos.x, s.min_pos.y, s.avg, s.count
    );
}
