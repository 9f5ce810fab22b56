//! # Play Store Meta
//!
//! A single-pass scraping pipeline that fetches public metadata (rating,
//! download range, category, name) for mobile applications from their Google
//! Play detail pages and appends the results to a CSV table, skipping
//! packages that already have a row.
//!
//! ## Usage
//!
//! ```sh
//! play_store_meta -o apps.csv com.newsblur com.spotify.music
//! play_store_meta -o apps.csv -i packages.txt
//! ```
//!
//! ## Architecture
//!
//! The pipeline is sequential and synchronous:
//! 1. **Gather**: collect package identifiers from the CLI and input file
//! 2. **Filter**: skip identifiers that already have a table row
//! 3. **Fetch & extract**: one blocking GET per remaining identifier, field
//!    extraction via CSS selectors; failures degrade to an all-null row
//! 4. **Append**: one CSV row per identifier, header written on first use

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod entry;
mod error;
mod models;
mod store;

use cli::Cli;
use store::RecordStore;

#[instrument]
fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("play_store_meta starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output, ?args.input, count = args.packages.len(), "Parsed CLI arguments");

    let packages = gather_packages(&args)?;
    if packages.is_empty() {
        warn!("No package identifiers given; nothing to do");
        return Ok(());
    }
    info!(count = packages.len(), "Gathered package identifiers");

    // A bad table destination fails the whole run: no progress is possible
    // without a valid store.
    let store = RecordStore::new(&args.output)?;

    let summary = store.bulk_process(&packages)?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        recorded = summary.recorded,
        null = summary.null,
        skipped = summary.skipped,
        table = %args.output,
        "Execution complete"
    );

    Ok(())
}

/// Collect package identifiers from the input file (if any) followed by the
/// positional arguments, preserving order.
fn gather_packages(args: &Cli) -> Result<Vec<String>, std::io::Error> {
    let mut packages = Vec::new();
    if let Some(ref path) = args.input {
        let contents = std::fs::read_to_string(path)?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            packages.push(line.to_string());
        }
        info!(count = packages.len(), path = %path, "Loaded packages from input file");
    }
    packages.extend(args.packages.iter().cloned());
    Ok(packages)
}
