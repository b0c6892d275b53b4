//! CLI argument definitions for the report runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use hsr_cli::config::{DEFAULT_FILES_CONFIG, DEFAULT_REPORTS_CONFIG};

#[derive(Parser)]
#[command(
    name = "hsr",
    version,
    about = "Career services appointment reports",
    long_about = "Load appointment, referral, enrollment and survey exports and produce\n\
                  followup, referral outcome and survey matching reports as CSV files."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the configured exports, run every report and write results.
    Run(RunArgs),

    /// Load the configured exports and list them.
    Datasets(DatasetsArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Files configuration.
    #[arg(long = "files-config", value_name = "PATH", default_value = DEFAULT_FILES_CONFIG)]
    pub files_config: PathBuf,

    /// Reports configuration.
    #[arg(long = "reports-config", value_name = "PATH", default_value = DEFAULT_REPORTS_CONFIG)]
    pub reports_config: PathBuf,

    /// Run reports without writing any files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct DatasetsArgs {
    /// Files configuration.
    #[arg(long = "files-config", value_name = "PATH", default_value = DEFAULT_FILES_CONFIG)]
    pub files_config: PathBuf,
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
