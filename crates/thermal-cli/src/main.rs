mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thermal", about = "Thermal capture decoding and rendering tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show capture header and temperature summary
    Info(commands::info::InfoArgs),
    /// Render captures to color images
    Render(commands::render::RenderArgs),
    /// Query temperatures at a point, along a line or over a rectangle
    Query(commands::query::QueryArgs),
    /// Print or save the default engine config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Query(args) => commands::query::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
