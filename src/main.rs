//! SDE to CSV converter
//!
//! Converts the JSON Lines static data export into the legacy CSV tables.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use regex::Regex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use sde_csv::driver::{self, Converter};
use sde_csv::{ConvertOptions, CsvSink, Registry, SdeSource, SqliteSink, TableSink};

#[derive(Parser)]
#[command(name = "sde-csv")]
#[command(about = "Convert the EVE Online JSON Lines SDE into legacy CSV tables")]
struct Cli {
    /// Directory holding the SDE *.jsonl files
    #[arg(env = "SDE_PATH", required_unless_present = "list")]
    sde_path: Option<PathBuf>,

    /// Output directory for CSV files
    #[arg(default_value = "csv")]
    output_path: PathBuf,

    /// Only convert these tables
    #[arg(long, num_args = 1.., value_name = "TABLE", conflicts_with = "matching")]
    only: Option<Vec<String>>,

    /// Only convert tables whose name matches this regular expression
    #[arg(long, value_name = "REGEX")]
    matching: Option<String>,

    /// Write tables into this SQLite database instead of CSV files
    #[arg(long, value_name = "PATH")]
    sqlite: Option<PathBuf>,

    /// Language used for localized names
    #[arg(long, default_value = "en")]
    language: String,

    /// List the available tables and their input files
    #[arg(long)]
    list: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug detail, including skipped records
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let registry = Registry::standard();

    if cli.list {
        println!("{:<32} Inputs", "Table");
        println!("{}", "-".repeat(60));
        for c in registry.converters() {
            let inputs = if c.inputs.is_empty() {
                "(built in)".to_string()
            } else {
                c.inputs.join(", ")
            };
            println!("{:<32} {}", c.name, inputs);
        }
        return Ok(());
    }

    let Some(sde_path) = cli.sde_path else {
        bail!("no SDE path given");
    };

    let selected: Vec<&Converter> = match (&cli.only, &cli.matching) {
        (Some(names), _) => registry.select(names.as_slice())?,
        (None, Some(pattern)) => {
            let re = Regex::new(pattern).with_context(|| format!("Invalid --matching pattern {pattern}"))?;
            let matched = registry.matching(&re);
            if matched.is_empty() {
                bail!("no table matches '{}' (valid: {})", pattern, registry.names().join(", "));
            }
            matched
        }
        (None, None) => registry.converters().iter().collect(),
    };

    let source = SdeSource::open(&sde_path)?;
    let options = ConvertOptions {
        language: cli.language,
    };

    let mut sink: Box<dyn TableSink> = match &cli.sqlite {
        Some(path) => Box::new(
            SqliteSink::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(CsvSink::new(&cli.output_path)),
    };

    let report = driver::run_all(&selected, &source, sink.as_mut(), &options);
    if report.log_level() == Level::WARN {
        tracing::warn!("{}", report);
    } else {
        tracing::info!("{}", report);
    }

    if !report.is_success() {
        bail!(
            "{} of {} tables failed",
            report.failed.len(),
            report.failed.len() + report.written.len()
        );
    }
    tracing::info!("Done!");
    Ok(())
}

fn init_logging(quiet: bool, verbose: bool) {
    let default = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
