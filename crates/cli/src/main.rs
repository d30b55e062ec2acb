// abgrid CLI - headless balanced A/B label assignment

mod assign;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "abgrid")]
#[command(about = "Balanced Adam Milo / Manpower label assignment over requirement tables")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log progress to stderr (-v info, -vv debug). RUST_LOG is used when absent.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign a label to every requirement row, balanced per group
    #[command(after_help = "\
Without --output the labelled table is printed to stdout as CSV.
Warnings and the summary go to stderr.

Examples:
  abgrid assign --clusters clusters.xlsx --requirements rq.xlsx
  abgrid assign --clusters clusters.csv --requirements rq.csv -o resultado.xlsx
  abgrid assign --clusters c.xlsx --requirements rq.xlsx --history previo.xlsx
  abgrid assign --clusters c.xlsx --requirements rq.xlsx --weighted 70
  abgrid assign --clusters c.xlsx --requirements rq.xlsx --group-by extended --json")]
    Assign(assign::AssignArgs),

    /// Validate an assignment config without running
    #[command(after_help = "\
Examples:
  abgrid validate assign.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_tracing(cli.verbose).and_then(|()| match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: abgrid <command> [options]");
            eprintln!("       abgrid --help for more information");
            Ok(())
        }
        Some(Commands::Assign(args)) => assign::cmd_assign(args),
        Some(Commands::Validate { config }) => assign::cmd_validate(config),
    });

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

/// Logs go to stderr so stdout stays a single CSV table or JSON document.
fn init_tracing(verbose: u8) -> Result<(), CliError> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("cannot initialise logging: {e}"),
            hint: None,
        })
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with its registered exit code.
    pub fn assign(err: abgrid_assign::AssignError) -> Self {
        let code = exit_codes::assign_exit_code(&err);
        let hint = match &err {
            abgrid_assign::AssignError::MissingColumn { .. } => {
                Some("column names are matched exactly after trimming; see [columns] in the config".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
