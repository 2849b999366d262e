//! CLI argument definitions for the diffusion parameter viewer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use dpv_model::{MAX_REGION_COUNT, REGION_COUNT};

#[derive(Parser)]
#[command(
    name = "dpv",
    version,
    about = "Diffusion parameter viewer - per-patient and cohort summaries",
    long_about = "Summarize diffusion parameters of patient folders.\n\n\
                  Each patient folder holds one exported parameter table with a\n\
                  region label per voxel. Regions are numbered from 1 on the\n\
                  command line."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load patient folders and print their summaries.
    Summarize(SummarizeArgs),

    /// Run an interactive session reading commands from stdin or a script.
    Session(SessionArgs),

    /// List patient folders found under a root directory.
    Scan(ScanArgs),
}

/// Where and how patient tables are read.
#[derive(Args, Clone)]
pub struct LoaderArgs {
    /// Table path relative to each patient folder.
    #[arg(long = "data-file", value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Name of the voxel region column.
    #[arg(long = "region-column", value_name = "NAME")]
    pub region_column: Option<String>,

    /// Region labels in the table start at 1 instead of 0.
    #[arg(long = "one-based-regions")]
    pub one_based_regions: bool,

    /// Number of selectable regions.
    #[arg(
        long = "region-count",
        value_name = "N",
        default_value_t = REGION_COUNT,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_REGION_COUNT))
    )]
    pub region_count: u32,
}

#[derive(Parser)]
pub struct SummarizeArgs {
    /// Patient folders to load.
    #[arg(value_name = "PATIENT_DIR", required = true)]
    pub patient_dirs: Vec<PathBuf>,

    /// Regions selected for every patient, e.g. "1,3,5-7" or "all".
    #[arg(long = "regions", value_name = "LABELS")]
    pub regions: Option<String>,

    /// Add every loaded patient to the combined summary.
    #[arg(long = "combine")]
    pub combine: bool,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Maximum number of folders loaded at once.
    #[arg(long = "jobs", short = 'j', value_name = "N", default_value_t = 4)]
    pub jobs: usize,

    #[command(flatten)]
    pub loader: LoaderArgs,
}

#[derive(Parser)]
pub struct SessionArgs {
    /// Read commands from a file instead of stdin.
    #[arg(long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Maximum number of folders one `add` loads at once.
    #[arg(long = "jobs", short = 'j', value_name = "N", default_value_t = 4)]
    pub jobs: usize,

    #[command(flatten)]
    pub loader: LoaderArgs,
}

#[derive(Parser)]
pub struct ScanArgs {
    /// Directory whose subfolders are patient folders.
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    #[command(flatten)]
    pub loader: LoaderArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Tsv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
