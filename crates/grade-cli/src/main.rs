//! grade - photo color grading from the command line
//!
//! Applies color plans (tone adjustments, 3D LUTs, sharpening) to single
//! images or whole batches, and inspects images and LUT libraries.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use grade_pipeline::PipelineConfig;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "grade")]
#[command(author, version, about = "Photo color grading with 3D LUTs")]
#[command(long_about = "
Grades photos with 3D LUTs and tone adjustments driven by a color plan.

Examples:
  grade apply beach.jpg -l Kodak_Portra -i 0.8      # Apply a LUT at 80%
  grade apply beach.jpg --plan plan.json -o out.jpg  # Apply a planner's color plan
  grade batch -i 'shoot/*.jpg' --plan plan.json      # Grade a folder in parallel
  grade classify a.jpg b.jpg                         # Log or standard profile?
  grade analyze a.jpg --json                         # Brightness, contrast, WB, saturation
  grade luts list                                    # Indexed LUTs
  grade luts resolve portra                          # Which file would be used
  grade luts filter --image flat.jpg                 # LUTs safe for this image
  grade luts identity id.cube -s 17                  # Write an identity LUT
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Worker threads for batch processing (0 = all cores)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Pipeline configuration (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// LUT library directory (overrides the config file)
    #[arg(long, global = true)]
    lut_root: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one image
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// Grade every image matching a glob pattern
    #[command(visible_alias = "b")]
    Batch(BatchArgs),

    /// Classify images as log or standard profile
    Classify(ClassifyArgs),

    /// Print image statistics
    Analyze(AnalyzeArgs),

    /// Inspect the LUT library
    Luts(LutsArgs),
}

/// Color plan source and per-field overrides.
#[derive(Args, Clone, Default)]
struct PlanArgs {
    /// Color plan file (JSON or YAML)
    #[arg(short, long)]
    plan: Option<PathBuf>,

    /// Primary LUT name or path
    #[arg(short, long)]
    lut: Option<String>,

    /// Secondary LUT name or path
    #[arg(long)]
    secondary: Option<String>,

    /// Weight of the secondary LUT [0, 1]
    #[arg(long)]
    mix: Option<f32>,

    /// Blend of the LUT result over the original [0, 1]
    #[arg(short, long)]
    intensity: Option<f32>,

    /// Brightness multiplier
    #[arg(long)]
    brightness: Option<f32>,

    /// Contrast multiplier
    #[arg(long)]
    contrast: Option<f32>,

    /// Saturation multiplier
    #[arg(long)]
    saturation: Option<f32>,

    /// Temperature shift (positive = warmer)
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f32>,

    /// Tint shift (positive = magenta)
    #[arg(long, allow_hyphen_values = true)]
    tint: Option<f32>,

    /// Curve preset (linear, s_curve_soft, lifted_shadows, hard_contrast)
    #[arg(long, conflicts_with = "curve_points")]
    curve: Option<String>,

    /// Curve control points, e.g. "0:0,64:50,192:210,255:255"
    #[arg(long)]
    curve_points: Option<String>,

    /// Curve preset strength [0, 1]
    #[arg(long)]
    curve_intensity: Option<f32>,

    /// Sharpness factor (1.0 = unchanged)
    #[arg(long)]
    sharpness: Option<f32>,

    /// Simulate a flat log profile before grading
    #[arg(long)]
    log_sim: bool,
}

#[derive(Args)]
struct ApplyArgs {
    /// Input image
    input: PathBuf,

    /// Output image (default: <output_dir>/<output_prefix><name>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reject out-of-range plan values instead of clamping them
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    plan: PlanArgs,
}

#[derive(Args)]
struct BatchArgs {
    /// Input pattern (glob)
    #[arg(short = 'I', long)]
    input: String,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output file prefix (overrides the config file)
    #[arg(long)]
    prefix: Option<String>,

    #[command(flatten)]
    plan: PlanArgs,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Input images
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Input images
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct LutsArgs {
    #[command(subcommand)]
    command: LutsCommand,
}

#[derive(Subcommand)]
enum LutsCommand {
    /// List indexed LUTs
    #[command(visible_alias = "ls")]
    List {
        /// Print full paths instead of names
        #[arg(long)]
        paths: bool,
    },

    /// Show which file a name resolves to
    Resolve {
        /// LUT name, approximate name or path
        name: String,
    },

    /// Keep only LUTs that are safe for an image profile
    Filter {
        /// Classify this image to pick the profile
        #[arg(long, required_unless_present = "class", conflicts_with = "class")]
        image: Option<PathBuf>,

        /// Profile to filter for (log or standard)
        #[arg(long)]
        class: Option<String>,

        /// Candidate names (default: every indexed LUT)
        names: Vec<String>,
    },

    /// Write an identity LUT
    Identity {
        /// Output .cube file
        output: PathBuf,

        /// Grid size per axis
        #[arg(short, long, default_value_t = 33, value_parser = clap::value_parser!(u16).range(2..=256))]
        size: u16,

        /// TITLE line
        #[arg(short, long)]
        title: Option<String>,
    },
}

/// Installs the stderr subscriber, plus a file layer when `log_file` is set.
///
/// The returned guard flushes the file writer on drop and must outlive
/// every log call.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let Some(path) = log_file else {
        tracing_subscriber::registry().with(filter).with(stderr).init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("Invalid log file: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = &cli.lut_root {
        config.lut_root = root.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Apply(args) => commands::apply::run(args, config, cli.verbose),
        Commands::Batch(args) => commands::batch::run(args, config, cli.verbose),
        Commands::Classify(args) => commands::classify::run(args, config),
        Commands::Analyze(args) => commands::analyze::run(args, config),
        Commands::Luts(args) => commands::luts::run(args.command, config, cli.verbose),
    }
}
