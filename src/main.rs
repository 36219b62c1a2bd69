use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use tempora_io::{ResultWriter, RunName, TableReader, TableSummary};
use tempora_match::{Collocated, CollocationConfig, Timestamp, TzKind, Window};

#[derive(Parser)]
#[command(name = "tempora")]
#[command(about = "Nearest-neighbor temporal collocation of irregularly sampled time series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Matching options shared by the collocation pipeline.
#[derive(Args, Debug, Clone)]
struct MatchingArgs {
    /// Symmetric matching window in days, inclusive on both sides
    #[arg(long)]
    window_days: f64,

    /// Drop reference rows that found no in-window partner
    #[arg(long, default_value_t = false)]
    dropna: bool,

    /// Collapse duplicate candidate timestamps to their first occurrence
    /// instead of treating them as ambiguous
    #[arg(long, default_value_t = false)]
    dropduplicates: bool,

    /// Candidate column holding validity flags (nonzero or NaN = invalid)
    #[arg(long)]
    flag: Option<String>,

    /// Match flagged candidates too instead of masking them out
    #[arg(long, default_value_t = false)]
    use_invalid: bool,

    /// Add a column with the matched candidate timestamps
    #[arg(long, default_value_t = false)]
    return_index: bool,

    /// Add a column with signed candidate-minus-reference time distances
    #[arg(long, default_value_t = false)]
    return_distance: bool,

    /// Warn when a candidate table produces no matches at all
    #[arg(long, default_value_t = false)]
    checkna: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Collocate one or more candidate tables onto a reference time axis
    Collocate {
        /// Path to the reference CSV file (first column holds timestamps)
        #[arg(long)]
        reference: PathBuf,

        /// Path to a candidate CSV file (repeat the flag for several tables)
        #[arg(long = "other", required = true)]
        others: Vec<PathBuf>,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        run: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        matching: MatchingArgs,
    },

    /// Print diagnostics for a time-indexed CSV file
    Inspect {
        /// Path to the CSV file
        #[arg(long)]
        data: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct CollocateOutput {
    run: String,
    window_days: f64,
    n_reference: usize,
    tables: Vec<TableSummary>,
    summary: String,
}

#[derive(Serialize)]
struct InspectOutput {
    path: String,
    n_rows: usize,
    n_columns: usize,
    columns: Vec<String>,
    timezone: String,
    first: String,
    last: String,
    sorted: bool,
    n_duplicates: usize,
}

/// Ordering diagnostics for an axis: whether it is sorted ascending and how
/// many stamps repeat their predecessor's instant. Zoned stamps compare by
/// instant, naive stamps by wall clock.
fn axis_order(stamps: &[Timestamp]) -> (bool, usize) {
    let mut sorted = true;
    let mut duplicates = 0;
    for pair in stamps.windows(2) {
        match (pair[0], pair[1]) {
            (Timestamp::Naive(a), Timestamp::Naive(b)) => {
                if a > b {
                    sorted = false;
                }
                if a == b {
                    duplicates += 1;
                }
            }
            (Timestamp::Zoned(a), Timestamp::Zoned(b)) => {
                if a > b {
                    sorted = false;
                }
                if a == b {
                    duplicates += 1;
                }
            }
            // A TimeIndex is homogeneous; mixed pairs cannot occur.
            _ => {}
        }
    }
    (sorted, duplicates)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Collocate {
            reference,
            others,
            run,
            output_dir,
            matching,
        } => {
            let run_name = RunName::new(run.clone())?;
            let window = Window::from_days(matching.window_days)?;

            // 1. Read the reference axis
            let reference_table = TableReader::new(&reference)
                .read()
                .context("failed to read reference CSV")?;
            info!(n_rows = reference_table.n_rows(), "reference loaded");

            let mut config = CollocationConfig::new(window)
                .with_dropna(matching.dropna)
                .with_dropduplicates(matching.dropduplicates)
                .with_use_invalid(matching.use_invalid)
                .with_return_index(matching.return_index)
                .with_return_distance(matching.return_distance)
                .with_checkna(matching.checkna);
            if let Some(flag) = &matching.flag {
                config = config.with_flag(flag.as_str());
            }

            // 2. Read and collocate candidate tables in parallel
            let collocated: Vec<(String, usize, Collocated)> = others
                .par_iter()
                .map(|path| {
                    let label = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("table")
                        .to_string();
                    let candidates = TableReader::new(path).read().with_context(|| {
                        format!("failed to read candidate CSV {}", path.display())
                    })?;
                    let result = config
                        .collocate(&reference_table, &candidates)
                        .with_context(|| format!("collocation failed for {label}"))?;
                    Ok((label, candidates.n_rows(), result))
                })
                .collect::<Result<Vec<_>>>()?;

            // 3. Write per-table CSVs and the run summary
            let writer = ResultWriter::new(&output_dir, run_name)?;
            let mut tables = Vec::with_capacity(collocated.len());
            for (label, n_candidates, result) in &collocated {
                let path = writer.write_collocated(label, result)?;
                tables.push(TableSummary {
                    label: label.clone(),
                    n_reference: reference_table.n_rows(),
                    n_candidates: *n_candidates,
                    n_matched: result.match_count(),
                    n_rows: result.n_rows(),
                    output: path.display().to_string(),
                });
            }
            let summary_path = writer.write_summary(&tables)?;

            // 4. Print stdout summary
            let output = CollocateOutput {
                run,
                window_days: matching.window_days,
                n_reference: reference_table.n_rows(),
                tables,
                summary: summary_path.display().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Inspect { data } => {
            let table = TableReader::new(&data)
                .read()
                .context("failed to read input CSV")?;
            let stamps = table.index().stamps();
            let (sorted, n_duplicates) = axis_order(stamps);

            let output = InspectOutput {
                path: data.display().to_string(),
                n_rows: table.n_rows(),
                n_columns: table.n_columns(),
                columns: table.names().to_vec(),
                timezone: match table.index().kind() {
                    TzKind::Naive => "naive".to_string(),
                    TzKind::Zoned => "zoned".to_string(),
                },
                first: stamps[0].to_string(),
                last: stamps[stamps.len() - 1].to_string(),
                sorted,
                n_duplicates,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
