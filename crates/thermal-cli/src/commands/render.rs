use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use thermal_core::color::{color_bar, DisplayRange, RenderMode, StandardPalette};
use thermal_core::consts::DEFAULT_COLOR_BAR_LENGTH;
use thermal_core::io::capture::CaptureReader;
use thermal_core::io::image_io::save_rgba_image;
use thermal_core::pipeline::{CancelToken, DecodedCapture, NoOpReporter, ThermalEngine};
use tracing::debug;

use super::EngineArgs;
use crate::summary::{print_render_summary, RenderedFile};

/// Width in pixels of the legend strip.
const BAR_WIDTH: usize = 16;

#[derive(Clone, Copy, ValueEnum)]
pub enum ImageFormatArg {
    Png,
    Bmp,
}

impl ImageFormatArg {
    fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Input capture files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output directory (defaults to next to each input)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Output image format
    #[arg(long, value_enum, default_value = "png")]
    pub format: ImageFormatArg,

    /// Also write the color bar legend as <name>_bar.<format>
    #[arg(long)]
    pub bar: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let engine = args.engine.build()?;
    if let Some(ref dir) = args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let pb = ProgressBar::new(args.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Rendering");

    let results = Mutex::new(Vec::with_capacity(args.files.len()));
    args.files.par_iter().for_each(|file| {
        let outcome = render_one(&engine, file, args);
        results
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((file.clone(), outcome));
        pb.inc(1);
    });
    pb.finish_with_message("Done");

    let mut results = results
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    print_render_summary(&results);
    if failed > 0 {
        anyhow::bail!("{failed} of {} captures failed", results.len());
    }
    Ok(())
}

fn render_one(engine: &ThermalEngine, file: &Path, args: &RenderArgs) -> Result<RenderedFile> {
    let reader = CaptureReader::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let decoded = engine.decode_capture(reader.bytes(), &CancelToken::new(), &NoOpReporter)?;
    let frame = &decoded.frame;

    let output = output_path(file, args, "");
    save_rgba_image(&frame.rgba, frame.width, frame.height, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if args.bar {
        let bar_path = output_path(file, args, "_bar");
        let (rgba, w, h) = legend(&decoded);
        save_rgba_image(&rgba, w, h, &bar_path)
            .with_context(|| format!("Failed to write {}", bar_path.display()))?;
    }

    debug!(input = %file.display(), output = %output.display(), "capture rendered");
    Ok(RenderedFile {
        output,
        width: frame.width,
        height: frame.height,
        range: frame.range,
        max: frame.temperatures.stats().map(|s| s.max),
        alarm_regions: frame.alarm_regions,
    })
}

fn output_path(file: &Path, args: &RenderArgs, suffix: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".into());
    let name = format!("{stem}{suffix}.{}", args.format.extension());
    match &args.out_dir {
        Some(dir) => dir.join(name),
        None => file.with_file_name(name),
    }
}

/// Vertical legend strip, hottest color at the top.
fn legend(decoded: &DecodedCapture) -> (Vec<u8>, usize, usize) {
    let frame = &decoded.frame;
    let frame_range = frame.frame_range.unwrap_or(DisplayRange::new(0.0, 0.0));
    let mode = match decoded.header.active_custom() {
        Some(custom) => RenderMode::Custom(custom),
        None => RenderMode::Standard {
            palette: StandardPalette::from_id_or_default(decoded.header.pseudo_mode),
            range: frame.range,
        },
    };
    let colors = color_bar(mode, frame_range, DEFAULT_COLOR_BAR_LENGTH);

    let mut rgba = Vec::with_capacity(colors.len() * BAR_WIDTH * 4);
    for c in colors.iter().rev() {
        for _ in 0..BAR_WIDTH {
            rgba.extend_from_slice(c);
        }
    }
    (rgba, BAR_WIDTH, colors.len())
}
