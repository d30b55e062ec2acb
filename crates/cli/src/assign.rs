//! `abgrid assign` and `abgrid validate`.

use std::io::Write;
use std::path::{Path, PathBuf};

use abgrid_assign::config::{GroupBy, WeightedConfig};
use abgrid_assign::engine::output_table;
use abgrid_assign::{AssignConfig, AssignInput, AssignResult, Table};
use abgrid_io::TableFormat;
use clap::Args;
use tracing::{debug, info};

use crate::exit_codes::EXIT_ASSIGN_RUNTIME;
use crate::CliError;

#[derive(Args)]
pub struct AssignArgs {
    /// Cost center to cluster mapping table
    #[arg(long, value_name = "FILE")]
    clusters: PathBuf,

    /// Requirement rows to label
    #[arg(long, value_name = "FILE")]
    requirements: PathBuf,

    /// Output of a previous run; seeds per-group prior counts
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// TOML config (seed, grouping, weighting, column names)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Weighted policy: percentage of Adam Milo labels (0-100)
    #[arg(long, value_name = "PCT", value_parser = clap::value_parser!(u8).range(0..=100))]
    weighted: Option<u8>,

    /// Grouping key: cluster, or commercial force + position + cluster
    #[arg(long, value_name = "cluster|extended")]
    group_by: Option<GroupBy>,

    /// Seed for the per-group shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore --history and the config's history setting
    #[arg(long)]
    no_history: bool,

    /// Sheet to read from the requirements workbook (first sheet otherwise)
    #[arg(long)]
    sheet: Option<String>,

    /// Write the labelled table (.xlsx, .csv or .tsv)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Print the full result as JSON to stdout instead of the CSV table
    #[arg(long)]
    json: bool,

    /// Suppress the summary and warnings on stderr
    #[arg(long, short = 'q')]
    quiet: bool,
}

pub fn cmd_assign(args: AssignArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;

    let requirements = load_table("requirements", &args.requirements, args.sheet.as_deref())?;
    let clusters = load_table("clusters", &args.clusters, None)?;
    let history = match &args.history {
        Some(path) if config.history.enabled => Some(load_table("history", path, None)?),
        Some(path) => {
            debug!(path = %path.display(), "history disabled, file not read");
            None
        }
        None => None,
    };

    let input = AssignInput {
        requirements,
        clusters,
        history,
    };

    let result = abgrid_assign::run(&config, &input).map_err(CliError::assign)?;
    let table = output_table(&result, &config.columns);

    if let Some(ref path) = args.output {
        abgrid_io::write_table(&table, path).map_err(CliError::io)?;
        info!(path = %path.display(), rows = table.rows.len(), "result written");
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        let json_str = serde_json::to_string_pretty(&result).map_err(|e| CliError {
            code: EXIT_ASSIGN_RUNTIME,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json_str}");
    } else if args.output.is_none() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        abgrid_io::csv::write_to(&table, &mut out, b',').map_err(CliError::io)?;
        out.flush().map_err(|e| CliError::io(e.to_string()))?;
    }

    if !args.quiet {
        print_summary(&result);
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let policy = match config.weighted {
        Some(w) => format!("weighted {}% Adam Milo", w.pct_adam),
        None if config.history.enabled => "historical when history is supplied, else even".to_string(),
        None => "even".to_string(),
    };
    eprintln!(
        "valid: '{}' grouping by {}, policy {}, seed {}",
        config.name, config.group_by, policy, config.seed,
    );
    Ok(())
}

/// Config file (or defaults), then command-line overrides.
fn resolve_config(args: &AssignArgs) -> Result<AssignConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => AssignConfig::default(),
    };

    if let Some(pct_adam) = args.weighted {
        config.weighted = Some(WeightedConfig { pct_adam });
    }
    if let Some(group_by) = args.group_by {
        config.group_by = group_by;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.no_history {
        config.history.enabled = false;
    }

    Ok(config)
}

fn read_config(path: &Path) -> Result<AssignConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    AssignConfig::from_toml(&config_str).map_err(CliError::assign)
}

fn load_table(role: &str, path: &Path, sheet: Option<&str>) -> Result<Table, CliError> {
    TableFormat::from_path(path).map_err(|e| {
        CliError::args(format!("--{role}: {e}")).with_hint("inputs must be .csv, .tsv, .xlsx, .xlsm, .xls or .ods")
    })?;

    if !path.exists() {
        return Err(CliError::io(format!("--{role}: {}: file not found", path.display())));
    }

    let table = abgrid_io::read_table(path, sheet)
        .map_err(|e| CliError::parse(format!("--{role}: {e}")))?;
    debug!(role, rows = table.rows.len(), columns = table.headers.len(), "table loaded");
    Ok(table)
}

fn print_summary(result: &AssignResult) {
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    let s = &result.summary;
    eprintln!(
        "{} rows in {} groups ({} policy, seed {}): {} Adam Milo, {} Manpower",
        s.total_rows,
        s.total_groups,
        result.meta.policy,
        result.meta.seed,
        s.adam,
        s.manpower,
    );
    if s.filtered_rows > 0 {
        eprintln!("filtered: {} rows with other positions", s.filtered_rows);
    }
    if let Some(prior) = s.history_totals {
        eprintln!(
            "history: {} Adam Milo, {} Manpower carried over",
            prior.adam, prior.manpower,
        );
    }
}
