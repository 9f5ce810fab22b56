//! Error types for page scraping and the record table.
//!
//! Scraping errors ([`ScrapeError`]) are recoverable at the batch level:
//! the store converts them to an all-null row and moves on. Table errors
//! ([`StoreError`]) mean the destination itself is broken and abort the run.

use thiserror::Error;

/// Error type for fetching a store page and extracting fields from it.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure or non-success HTTP status.
    #[error("page fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    /// A field was found but its text is not in the expected numeric form.
    #[error("malformed {field} value '{value}'")]
    Parse { field: &'static str, value: String },
    /// An expected node or attribute is missing from the page markup.
    #[error("no {field} element in page markup")]
    Extraction { field: &'static str },
}

/// Error type for reading or writing the CSV record table.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("table read/write failed: {0}")]
    Csv(#[from] csv::Error),
}
