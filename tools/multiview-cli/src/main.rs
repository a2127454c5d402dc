//! Multiview CLI: inspect configurations and drive the composer offline.
//!
//! Usage:
//!   multiview validate <CONFIG>    Load and validate a viewer configuration
//!   multiview layout <CONFIG>      Show computed layout and target sizes
//!   multiview render <CONFIG>      Render one frame per layout from test patterns
//!   multiview bench <CONFIG>       Measure frame generation throughput

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use multiview_common::logging::init_logging;
use multiview_common::{AppConfig, LoggingConfig};

mod commands;
mod synthetic;

#[derive(Parser)]
#[command(
    name = "multiview",
    about = "Multi-camera layout compositor with templated overlays",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a viewer configuration
    Validate {
        /// Path to the configuration file
        config: PathBuf,
    },

    /// Print each layout's output size and camera target sizes
    Layout {
        /// Path to the configuration file
        config: PathBuf,
    },

    /// Render one PNG per layout from synthetic camera images
    Render {
        /// Path to the configuration file
        config: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TrueType/OpenType font for overlay text
        #[arg(long)]
        font: Option<PathBuf>,

        /// Sensor value override, as name=value (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
    },

    /// Generate frames with randomized sensor data and report throughput
    Bench {
        /// Path to the configuration file
        config: PathBuf,

        /// Number of ticks to run
        #[arg(short = 'n', long)]
        frames: Option<u32>,

        /// Tick rate in Hz (0 = as fast as possible)
        #[arg(long)]
        fps: Option<u32>,

        /// Seed for the sensor value generator
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = AppConfig::load();

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        app_config.logging.level.clone()
    };
    init_logging(&LoggingConfig {
        level,
        json: app_config.logging.json,
    });

    let defaults = app_config.render;
    match cli.command {
        Commands::Validate { config } => commands::validate::run(config),
        Commands::Layout { config } => commands::layout::run(config),
        Commands::Render {
            config,
            output,
            font,
            set,
        } => commands::render::run(
            config,
            output.unwrap_or(defaults.output_dir),
            font.or(defaults.font),
            set,
        ),
        Commands::Bench {
            config,
            frames,
            fps,
            seed,
        } => commands::bench::run(
            config,
            frames.unwrap_or(defaults.bench_frames),
            fps.unwrap_or(defaults.target_fps),
            seed,
        ),
    }
}
