//! Command-line interface definitions for the Play store metadata scraper.
//!
//! This module defines the CLI arguments and options using the `clap` crate.

use clap::Parser;

/// Command-line arguments for the scraper.
///
/// Package identifiers come from positional arguments, a newline-delimited
/// file, or both; file entries are processed first, in file order.
///
/// # Examples
///
/// ```sh
/// # Scrape two packages into the default table
/// play_store_meta com.newsblur com.spotify.music
///
/// # Read packages from a file and append to a chosen table
/// play_store_meta --input packages.txt --output apps.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the CSV table rows are appended to
    #[arg(short, long, default_value = "apps.csv")]
    pub output: String,

    /// Newline-delimited file of package identifiers (blank lines and
    /// lines starting with '#' are skipped)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Package identifiers to process, e.g. com.newsblur
    pub packages: Vec<String>,
}
