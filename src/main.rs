//! Overcalc CLI - compute overload pay from course roster spreadsheets
//!
//! # Main Commands
//!
//! ```bash
//! overcalc process roster.xlsx          # Single roster -> Processed_roster.xlsx
//! overcalc batch a.xlsx b.csv -o out.xlsx   # Many rosters -> one workbook
//! overcalc serve                        # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! overcalc parse roster.csv             # Just parse the roster to JSON
//! overcalc rules                        # Show capacity tiers and pay factors
//! ```

use clap::{Parser, Subcommand};
use overcalc::rules::{
    BILLING_UNITS_PER_MONTH, CAPACITY_TIERS, GRACE_BAND, PAY_PERIOD_DIVISOR, PREMIUM_MULTIPLIER,
    PRUNE_COLUMNS, TITLE_KEYWORDS,
};
use overcalc::transform::pipeline::{process_batch, process_file, NamedInput};
use overcalc::{
    batch_workbook_bytes, load_table_file, write_workbook_file, BatchResponse, SourceInfo,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "overcalc")]
#[command(about = "Compute overload pay from course roster spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a roster file and output its rows as JSON
    Parse {
        /// Input roster file (xlsx or csv)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline for one roster: filter, compute, group, export
    Process {
        /// Input roster file (xlsx or csv)
        input: PathBuf,

        /// Output workbook (default: Processed_<input>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Process several rosters into one workbook, isolating failures
    Batch {
        /// Input roster files
        inputs: Vec<PathBuf>,

        /// Combined output workbook
        #[arg(short, long, default_value = "Processed_batch.xlsx")]
        output: PathBuf,

        /// Also write a JSON report of per-file outcomes
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Show the capacity tiers and pay factors
    Rules,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Process { input, output } => cmd_process(&input, output.as_deref()),

        Commands::Batch {
            inputs,
            output,
            report,
        } => cmd_batch(&inputs, &output, report.as_deref()),

        Commands::Rules => cmd_rules(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("✗ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let table = load_table_file(input)?;

    match &table.source {
        SourceInfo::Csv {
            encoding,
            delimiter,
        } => {
            eprintln!("   Encoding: {}", encoding);
            eprintln!(
                "   Delimiter: '{}'",
                match delimiter {
                    '\t' => "\\t".to_string(),
                    c => c.to_string(),
                }
            );
        }
        SourceInfo::Workbook { sheet } => {
            eprintln!("   Worksheet: {}", sheet);
        }
    }
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Parsed {} records", table.records.len());

    let json = serde_json::to_string_pretty(&table.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_process(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let table = process_file(input)?;

    eprintln!("   Rows in: {}", table.stats.rows_in);
    eprintln!("   Rows kept: {}", table.stats.rows_kept);
    if table.stats.unclassified > 0 {
        eprintln!("   ⚠ Unclassified: {}", table.stats.unclassified);
    }
    eprintln!("   Staff members: {}", table.stats.staff_count);

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_name(input),
    };

    write_workbook_file(&output_path, &table)?;
    eprintln!("💾 Workbook written to: {}", output_path.display());

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output: &Path,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if inputs.is_empty() {
        return Err("No input files given".into());
    }

    eprintln!("📄 Batch: {} file(s)", inputs.len());

    let mut named = Vec::with_capacity(inputs.len());
    for path in inputs {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("input.csv")
            .to_string();
        // Unreadable files become per-file failures below, not a batch abort.
        match fs::read(path) {
            Ok(bytes) => named.push(NamedInput { name, bytes }),
            Err(e) => {
                eprintln!("   ✗ {}: {}", name, e);
                named.push(NamedInput {
                    name,
                    bytes: Vec::new(),
                });
            }
        }
    }

    let outcome = process_batch(named);

    for (name, error) in outcome.failures() {
        eprintln!("   ✗ {}: {}", name, error);
    }

    let successes: Vec<_> = outcome.successes().collect();
    if successes.is_empty() {
        return Err("All input files failed".into());
    }

    let bytes = batch_workbook_bytes(&successes)?;
    fs::write(output, &bytes)?;
    eprintln!(
        "💾 {} sheet(s) written to: {}",
        successes.len(),
        output.display()
    );

    if let Some(report_path) = report_path {
        let report = BatchResponse::from_outcome(&outcome, None);
        fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
        eprintln!("💾 Report written to: {}", report_path.display());
    }

    Ok(())
}

fn cmd_rules() -> Result<(), Box<dyn std::error::Error>> {
    println!("Qualifying title keywords: {}", TITLE_KEYWORDS.join(", "));
    println!("Pruned columns: {}", PRUNE_COLUMNS.join(", "));
    println!();
    println!("Capacity tiers (first match wins):");
    for tier in CAPACITY_TIERS {
        println!("  {:<14} base {:>2}, max {:>2}", tier.name, tier.base, tier.max);
    }
    println!();
    println!("Grace band: {} students absorbed at base rate", GRACE_BAND);
    println!("Premium multiplier: {}x", PREMIUM_MULTIPLIER);
    println!(
        "Monthly conversion: x {} / {}",
        BILLING_UNITS_PER_MONTH, PAY_PERIOD_DIVISOR
    );
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    overcalc::server::start_server(port).await
}

/// `Processed_<stem>.xlsx` next to the input file.
fn default_output_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("roster");
    input.with_file_name(format!("Processed_{}.xlsx", stem))
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
