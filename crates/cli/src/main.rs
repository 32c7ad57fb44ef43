// countmate CLI - pick fixed-size groups of records whose weights hit a target sum

mod exit_codes;
mod inspect;
mod job;
mod logging;
mod report;
mod run;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use countmate_io::IoError;
use countmate_matcher::MatchError;

use exit_codes::{io_exit_code, job_exit_code, match_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS};
use job::JobError;
use logging::{init_logging, LogConfig, LogFormat};
use run::RunArgs;

#[derive(Parser)]
#[command(name = "countmate")]
#[command(about = "Extract groups of k records whose weights round to a target sum")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only errors; also silences the summary line
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import records, extract groups, write the result
    #[command(after_help = "\
Examples:
  countmate run goods.xlsx
  countmate run goods.csv -k 3 -t 15.5 --precision 1 -o matches.csv
  countmate run goods.xlsx --sheet Stock --weight-column kg --id-column index
  countmate run goods.csv --deviation 2.5 --json
  countmate run --config pallets.toml --fail-on-empty")]
    Run(RunArgs),

    /// List sheets, column headers and data-row counts of an input file
    #[command(after_help = "\
Examples:
  countmate inspect goods.xlsx
  countmate inspect goods.csv --json")]
    Inspect {
        /// Input table (csv, tsv, xlsx, xls, xlsb, ods)
        input: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a job file without running it
    #[command(after_help = "\
Examples:
  countmate validate pallets.toml")]
    Validate {
        /// Path to the job TOML file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  countmate-matcher ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  countmate-matcher ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_flags(cli.verbose, cli.quiet)
        .with_format(cli.log_format)
        .with_ansi(std::io::stderr().is_terminal());
    init_logging(&log_config);

    let result = match cli.command {
        Commands::Run(args) => run::cmd_run(args, cli.quiet),
        Commands::Inspect { input, json } => inspect::cmd_inspect(input, json),
        Commands::Validate { config } => run::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::MissingColumn { .. } => {
                Some("choose columns with --weight-column / --id-column or [input.columns]".to_string())
            }
            IoError::SheetNotFound { .. } => Some("choose a sheet with --sheet or [input] sheet".to_string()),
            IoError::UnsupportedFormat(_) => {
                Some("inputs: csv, tsv, txt, xlsx, xlsm, xls, xlsb, ods; outputs: csv, tsv, xlsx, json".to_string())
            }
            IoError::DuplicateId { .. } => Some("ids must be unique; omit --id-column to number rows".to_string()),
            _ => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<MatchError> for CliError {
    fn from(err: MatchError) -> Self {
        Self::new(match_exit_code(&err), err.to_string())
    }
}

impl From<JobError> for CliError {
    fn from(err: JobError) -> Self {
        match err {
            // Extension problems in a job are configuration errors, not usage errors
            JobError::Format(io) => CliError { code: EXIT_CONFIG, ..CliError::from(io) },
            other => Self::new(job_exit_code(&other), other.to_string()),
        }
    }
}
