//! lazycsv command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use lazycsv_cli::commands::{ImportRequest, run_import, run_sniff};
use lazycsv_cli::logging::{LogConfig, LogFormat, init_logging};
use lazycsv_cli::report::{dialect_table, print_import_summary};
use lazycsv_ingest::ParseOptions;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, ImportArgs, LogFormatArg, LogLevelArg, OutputArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Import(args) => match import(&args) {
            Ok(has_failures) => i32::from(has_failures),
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Sniff(args) => match run_sniff(&args.file, args.sample_size) {
            Ok(dialect) => {
                println!("{}", dialect_table(&dialect));
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Run an import and print its result. Returns whether any row failed.
fn import(args: &ImportArgs) -> anyhow::Result<bool> {
    let request = ImportRequest {
        path: args.file.clone(),
        fields: args.fields.clone(),
        integer_fields: args.integer.clone(),
        base64: args.base64,
        options: ParseOptions::default()
            .with_skip_header(!args.no_skip_header)
            .with_sample_size(args.sample_size),
    };
    let report = run_import(&request)?;
    match args.output {
        OutputArg::Table => print_import_summary(&report),
        OutputArg::Json => println!("{}", report.to_json()?),
    }
    Ok(report.has_failures())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data)
        .with_ansi(with_ansi)
}
