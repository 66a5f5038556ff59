use std::path::{Path, PathBuf};

use console::Style;
use thermal_core::color::{DisplayRange, StandardPalette};
use thermal_core::header::FrameHeader;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red().bold(),
        }
    }
}

/// One capture written by the render command.
pub struct RenderedFile {
    pub output: PathBuf,
    pub width: usize,
    pub height: usize,
    pub range: DisplayRange,
    pub max: Option<f32>,
    pub alarm_regions: usize,
}

pub fn print_header_summary(file: &Path, h: &FrameHeader, truncated: bool) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Thermal Capture"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("File"), s.path.apply_to(file.display()));
    println!("  {:<14}{}", s.label.apply_to("Device"), s.value.apply_to(&h.name));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Dimensions"),
        s.value.apply_to(format!("{}x{}", h.width, h.height))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Rotation"),
        s.value.apply_to(h.rotate)
    );
    println!("  {:<14}{:?}", s.label.apply_to("Gain"), h.gain_status);
    if truncated {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Header"),
            s.disabled.apply_to("older layout, missing fields defaulted")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Palette"));
    match h.active_custom() {
        Some(custom) => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Mode"),
                s.method.apply_to(format!("custom, {} stops", custom.stops().len()))
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Range"),
                s.value.apply_to(format!("{:.1} .. {:.1} °C", custom.min_temp, custom.max_temp))
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Outside"),
                s.value.apply_to(if custom.use_gray { "grayscale" } else { "end colors" })
            );
        }
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Mode"),
            s.method.apply_to(StandardPalette::from_id_or_default(h.pseudo_mode))
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Measurement"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Emissivity"),
        s.value.apply_to(format!("{:.2}", h.radiation))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Distance"),
        s.value.apply_to(format!("{:.2} m", h.distance))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Ambient"),
        s.value.apply_to(format!("{:.1} °C", h.environment))
    );
    println!();

    if h.alarm.is_active() {
        println!("  {}", s.header.apply_to("Alarm"));
        if h.alarm.high_enabled() {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Above"),
                s.value.apply_to(format!("{:.1} °C", h.alarm.high_temp))
            );
        }
        if h.alarm.low_enabled() {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Below"),
                s.value.apply_to(format!("{:.1} °C", h.alarm.low_temp))
            );
        }
        println!("    {:<12}{:?}", s.label.apply_to("Mark"), h.alarm.mark_type);
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Alarm"),
            s.disabled.apply_to("off")
        );
    }
    println!();
}

pub fn print_render_summary(results: &[(PathBuf, anyhow::Result<RenderedFile>)]) {
    let s = Styles::new();

    println!();
    for (input, result) in results {
        match result {
            Ok(r) => {
                let max = r
                    .max
                    .map(|m| format!("max {m:.1} °C"))
                    .unwrap_or_else(|| "no data".into());
                println!(
                    "  {}  {}x{}  {} .. {} °C  {}  {}",
                    s.path.apply_to(r.output.display()),
                    r.width,
                    r.height,
                    s.value.apply_to(format!("{:.1}", r.range.min)),
                    s.value.apply_to(format!("{:.1}", r.range.max)),
                    s.method.apply_to(max),
                    if r.alarm_regions > 0 {
                        s.error.apply_to(format!("{} alarm region(s)", r.alarm_regions))
                    } else {
                        s.label.apply_to(String::new())
                    }
                );
            }
            Err(err) => println!(
                "  {}  {}",
                s.path.apply_to(input.display()),
                s.error.apply_to(format!("{err:#}"))
            ),
        }
    }
    println!();
}
