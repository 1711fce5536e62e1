//! `prorata` - command-line front end for the allocation engine.
//!
//! ```text
//! prorata allocate request.json --format csv
//! prorata fixtures --dir fixtures
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use prorata_allocator::engine::{AllocationEngine, AllocationOutcome, EngineConfig};
use prorata_allocator::export::{export_filename, write_csv, write_json, ExportRecord};
use prorata_allocator::fixtures::{discover, load_case, run_case};
use prorata_allocator::trace::Trace;
use prorata_allocator::types::amount::format_amount;
use prorata_allocator::types::AllocationRequest;
use prorata_allocator::validation::validate;

/// Capped pro-rata allocation with penny-exact totals
#[derive(Parser)]
#[command(name = "prorata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate the capacity in a request file
    Allocate {
        /// Request file (JSON)
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Human)]
        format: Format,

        /// Skip pass records
        #[arg(long)]
        no_trace: bool,

        /// Also write timestamped JSON and CSV exports into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Run every fixture in a directory against its expected output
    Fixtures {
        /// Fixture directory
        #[arg(short, long, env = "PRORATA_FIXTURES", default_value = "fixtures")]
        dir: PathBuf,
    },
}

/// File name stem for `--export`
const EXPORT_STEM: &str = "allocation_results";

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Json,
    Csv,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    record: ExportRecord<'a>,

    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a Trace>,
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Allocate {
            input,
            format,
            no_trace,
            export,
        } => {
            allocate_file(&input, format, no_trace, export.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fixtures { dir } => run_fixtures(&dir),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn allocate_file(input: &Path, format: Format, no_trace: bool, export: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("read request: {}", input.display()))?;
    let request: AllocationRequest = serde_json::from_str(&text)
        .with_context(|| format!("parse request: {}", input.display()))?;

    let report = validate(&request);
    for warning in &report.warnings {
        warn!("{warning}");
    }
    if !report.is_valid() {
        for error in &report.errors {
            eprintln!("error: {error}");
        }
        bail!("request has {} invalid value(s)", report.errors.len());
    }

    let config = if no_trace {
        EngineConfig::without_trace()
    } else {
        EngineConfig::default()
    };
    let outcome = AllocationEngine::new(config).allocate(&request)?;
    info!(claimants = request.len(), digest = %outcome.receipt.digest_hex(), "allocated");

    let calculated_at = Utc::now();
    match format {
        Format::Human => print_human(&request, &outcome),
        Format::Json => {
            let report = JsonReport {
                record: ExportRecord::new(&request, &outcome, calculated_at),
                trace: outcome.trace.as_ref(),
            };
            serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
            println!();
        }
        Format::Csv => write_csv(io::stdout().lock(), &request, &outcome.allocations)?,
    }

    if let Some(dir) = export {
        export_files(dir, &request, &outcome, calculated_at)?;
    }
    Ok(())
}

fn export_files(
    dir: &Path,
    request: &AllocationRequest,
    outcome: &AllocationOutcome,
    calculated_at: DateTime<Utc>,
) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let json_path = dir.join(export_filename(EXPORT_STEM, "json", calculated_at));
    let file = File::create(&json_path).with_context(|| format!("create {}", json_path.display()))?;
    write_json(BufWriter::new(file), &ExportRecord::new(request, outcome, calculated_at))?;

    let csv_path = dir.join(export_filename(EXPORT_STEM, "csv", calculated_at));
    let file = File::create(&csv_path).with_context(|| format!("create {}", csv_path.display()))?;
    write_csv(BufWriter::new(file), request, &outcome.allocations)?;

    info!(json = %json_path.display(), csv = %csv_path.display(), "exported");
    Ok(())
}

fn print_human(request: &AllocationRequest, outcome: &AllocationOutcome) {
    println!("Capacity: {}", format_amount(request.capacity));
    println!();

    if let Some(trace) = &outcome.trace {
        for pass in &trace.passes {
            print!("{pass}");
        }
        if !trace.passes.is_empty() {
            println!();
        }
    }

    println!("Allocations:");
    for (claimant, allocation) in request.claimants.iter().zip(&outcome.allocations) {
        println!(
            "  {:<24} {:>14}  (requested {})",
            allocation.name,
            format_amount(allocation.amount),
            format_amount(claimant.requested)
        );
    }
    println!("  {:<24} {:>14}", "Total", format_amount(outcome.allocations.total()));
    println!();

    if let Some(trace) = &outcome.trace {
        println!("{}", trace.summary);
    }
    println!("Digest: {}", outcome.receipt.digest_hex());
}

fn run_fixtures(dir: &Path) -> Result<ExitCode> {
    let ids = discover(dir).with_context(|| format!("list fixtures in {}", dir.display()))?;
    if ids.is_empty() {
        bail!("no fixtures found in {}", dir.display());
    }

    let engine = AllocationEngine::new(EngineConfig::without_trace());
    let mut failed = 0usize;

    for id in &ids {
        let result = load_case(dir, id).and_then(|case| run_case(&engine, &case));
        match result {
            Ok(report) if report.passed() => println!("PASS  {id}"),
            Ok(report) => {
                failed += 1;
                println!("FAIL  {id}");
                for difference in &report.differences {
                    println!("      {difference}");
                }
            }
            Err(err) => {
                failed += 1;
                println!("FAIL  {id}");
                println!("      {err}");
            }
        }
    }

    println!();
    println!("Total: {}  Passed: {}  Failed: {}", ids.len(), ids.len() - failed, failed);

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
