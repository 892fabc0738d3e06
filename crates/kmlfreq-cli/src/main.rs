//! kmlfreq - KML frequency folder aggregator
//!
//! Merges KML folders whose display names round to the same frequency and
//! optionally drops frequencies listed in a CSV exclusion table.

use anyhow::{Context, Result};
use clap::Parser;
use kmlfreq_core::{transform, Event};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "kmlfreq",
    version,
    about = "Merge duplicate frequency folders in a KML document"
)]
struct Args {
    /// Input KML file
    input: PathBuf,

    /// Output file (defaults to <input>_processed.kml)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// CSV exclusion table; first column lists frequencies to drop, header row skipped
    #[arg(long, value_name = "FILE")]
    exclude_csv: Option<PathBuf>,

    /// Decimal places to round frequencies to
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=10))]
    decimals: u32,

    /// Print the run report as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Print each grouping decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let kml = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let exclusion = match &args.exclude_csv {
        Some(path) => Some(
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let result = transform(&kml, args.decimals, exclusion.as_deref())
        .with_context(|| format!("failed to transform {}", args.input.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    fs::write(&output, &result.kml)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
        return Ok(());
    }

    if args.verbose {
        for event in &result.report.events {
            match event {
                Event::GroupCreated { key } => println!("created folder for {key} MHz"),
                Event::GroupMerged { key, moved_lobs } => {
                    println!("merged duplicate of {key} MHz ({moved_lobs} LOBs moved)");
                }
                Event::GroupExcluded { key } => println!("removed (CSV match): {key} MHz"),
                Event::ExclusionSkipped => println!("no CSV provided; skipping exclusion pass"),
            }
        }
    }
    println!(
        "Grouped into {} unique frequencies ({} merged, {} excluded)",
        result.report.unique_frequencies, result.report.merged, result.report.excluded
    );
    println!("Wrote {}", output.display());
    Ok(())
}

/// "sites.kml" -> "sites_processed.kml", in the input's directory
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    input.with_file_name(format!("{}_processed.kml", stem.to_string_lossy()))
}
