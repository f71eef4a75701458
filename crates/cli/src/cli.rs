//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::SplitKind;
use std::path::PathBuf;

/// KITTI Seq - fixed-length multi-sensor windows over KITTI raw recordings
#[derive(Parser, Debug)]
#[command(
    name = "kitti-seq",
    author,
    version,
    about = "KITTI raw sequence windowing toolkit",
    long_about = "Serves temporally aligned windows of range images, inertial readings \n\
                  and reference poses from KITTI raw recordings.\n\n\
                  Validates dataset configuration, summarizes splits, prints and \n\
                  exports windows, and benchmarks concurrent window access."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "KITTI_SEQ_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "KITTI_SEQ_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Expose Prometheus metrics on this port
    #[arg(long, global = true, env = "KITTI_SEQ_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file without touching the dataset
    Validate(ValidateArgs),

    /// Display the session layout of one or all splits
    Info(InfoArgs),

    /// Print shapes and counts of consecutive windows
    Sample(SampleArgs),

    /// Write one window as 16-bit PNG channels plus a JSON sidecar
    Export(ExportArgs),

    /// Request windows from several threads and report timing
    Bench(BenchArgs),
}

/// Configuration file argument shared by all commands
#[derive(Parser, Debug, Clone)]
pub struct ConfigArg {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "KITTI_SEQ_CONFIG"
    )]
    pub config: PathBuf,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Also load every configured split from disk
    #[arg(long)]
    pub check_files: bool,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Split to describe (default: every configured split)
    #[arg(short, long)]
    pub split: Option<SplitKind>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `sample` command
#[derive(Parser, Debug)]
pub struct SampleArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Split to read from
    #[arg(short, long, default_value = "train")]
    pub split: SplitKind,

    /// First global index
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// Number of windows to print
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,

    /// Print one JSON object per window
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `export` command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Split to read from
    #[arg(short, long, default_value = "train")]
    pub split: SplitKind,

    /// Global index of the window
    #[arg(short, long, default_value = "0")]
    pub index: usize,

    /// Output directory
    #[arg(short, long, default_value = "./export")]
    pub output: PathBuf,
}

/// Arguments for the `bench` command
#[derive(Parser, Debug)]
pub struct BenchArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Split to read from
    #[arg(short, long, default_value = "train")]
    pub split: SplitKind,

    /// Worker threads
    #[arg(short, long, default_value = "4")]
    pub threads: usize,

    /// Maximum number of windows to request (0 = whole split)
    #[arg(long, default_value = "0")]
    pub limit: usize,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
