//! CLI argument definitions for lazycsv.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use lazycsv_ingest::DEFAULT_SAMPLE_SIZE;

#[derive(Parser)]
#[command(
    name = "lazycsv",
    version,
    about = "Validate and import CSV files row by row",
    long_about = "Validate and import CSV files row by row.\n\n\
                  The delimiter and quoting are detected from the start of the file.\n\
                  Rows with missing or extra fields stop the import; rows that fail\n\
                  conversion are reported and skipped."
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

    /// Log output format.
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

    /// Allow cell values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import a CSV file and report each row's outcome.
    Import(ImportArgs),

    /// Print the dialect detected for a CSV file.
    Sniff(SniffArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field names bound to the columns, in order.
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    pub fields: Vec<String>,

    /// Fields that must hold integers. Repeatable.
    #[arg(long = "integer", value_name = "FIELD")]
    pub integer: Vec<String>,

    /// FILE contains base64-encoded CSV text.
    #[arg(long)]
    pub base64: bool,

    /// Treat the first row as data instead of a header.
    #[arg(long = "no-skip-header")]
    pub no_skip_header: bool,

    /// Characters sampled for dialect detection.
    #[arg(long = "sample-size", value_name = "N", default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample_size: usize,

    /// Result output format.
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputArg,
}

#[derive(Args)]
pub struct SniffArgs {
    /// CSV file to inspect.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Characters sampled for dialect detection.
    #[arg(long = "sample-size", value_name = "N", default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample_size: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputArg {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
