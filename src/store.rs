//! Append-only CSV record store with duplicate skipping.
//!
//! [`RecordStore`] owns one table on disk. Construction guarantees the table
//! exists with the right header; processing appends one row per package and
//! never touches existing rows. A package that already has a row is skipped,
//! so re-running a batch only does the leftover work.
//!
//! The file is opened per operation and the key scan is linear over the
//! whole table. Tables here are small-to-moderate; no index is kept.
//! Single-writer assumption: concurrent processes appending to the same
//! table may interleave rows.

use crate::entry::{AppEntry, STORE_BASE};
use crate::error::{ScrapeError, StoreError};
use crate::models::{AppFields, AppRecord};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Column header of the record table.
const HEADER: [&str; 4] = ["package", "rating_value", "rating_count", "downloads"];

/// Terminal state of one `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A row with extracted data was appended.
    Recorded,
    /// Extraction failed; an all-null row was appended.
    RecordedNull,
    /// The package already had a row; nothing was written.
    Skipped,
}

/// Row counts for one `bulk_process` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BulkSummary {
    pub recorded: usize,
    pub null: usize,
    pub skipped: usize,
}

/// The append-only table plus the duplicate-skip policy.
pub struct RecordStore {
    path: PathBuf,
    base_url: Url,
}

impl RecordStore {
    /// Open a store at `path`, creating the table with its header if absent.
    ///
    /// An existing table is left exactly as it is. Failure here means the
    /// destination is unusable and the whole run should stop.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_base_url(path, STORE_BASE.clone())
    }

    /// Store whose fetches target an explicit base URL instead of the live
    /// storefront. Used by tests.
    pub fn with_base_url(path: impl AsRef<Path>, base_url: Url) -> Result<Self, StoreError> {
        let store = RecordStore {
            path: path.as_ref().to_path_buf(),
            base_url,
        };
        store.ensure_table()?;
        Ok(store)
    }

    fn ensure_table(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "Opened existing record table");
            return Ok(());
        }
        let file = File::create(&self.path)?;
        let mut writer = WriterBuilder::new().from_writer(file);
        writer.write_record(HEADER)?;
        writer.flush()?;
        info!(path = %self.path.display(), "Created record table");
        Ok(())
    }

    /// Whether `package` already has a row in the table.
    ///
    /// Linear scan of the key column; called once per candidate package.
    pub fn already_processed(&self, package: &str) -> Result<bool, StoreError> {
        let mut reader = ReaderBuilder::new().from_path(&self.path)?;
        for row in reader.records() {
            let row = row?;
            if row.get(0) == Some(package) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Fetch, extract, and append one row for `package`.
    ///
    /// No-op if the package is already recorded. Any [`ScrapeError`] during
    /// the fetch-and-extract pass degrades the row to all-null fields so
    /// one bad package never halts a batch; only table I/O failures
    /// propagate.
    #[instrument(level = "info", skip(self))]
    pub fn process(&self, package: &str) -> Result<Outcome, StoreError> {
        if self.already_processed(package)? {
            debug!(package, "Already recorded; skipping");
            return Ok(Outcome::Skipped);
        }
        match self.scrape(package) {
            Ok(fields) => {
                info!(
                    package,
                    name = %fields.name,
                    category = %fields.category,
                    rating_value = fields.rating_value,
                    rating_count = fields.rating_count,
                    downloads = %fields.downloads,
                    "Extracted app metadata"
                );
                self.append(&AppRecord::with_fields(package, &fields))?;
                Ok(Outcome::Recorded)
            }
            Err(e) => {
                warn!(package, error = %e, "Extraction failed; recording null row");
                self.append(&AppRecord::null(package))?;
                Ok(Outcome::RecordedNull)
            }
        }
    }

    /// Process an ordered list of packages sequentially.
    ///
    /// No early termination: extraction failures become null rows and the
    /// batch keeps going.
    #[instrument(level = "info", skip_all, fields(count = packages.len()))]
    pub fn bulk_process(&self, packages: &[String]) -> Result<BulkSummary, StoreError> {
        let mut summary = BulkSummary::default();
        for package in packages {
            match self.process(package)? {
                Outcome::Recorded => summary.recorded += 1,
                Outcome::RecordedNull => summary.null += 1,
                Outcome::Skipped => summary.skipped += 1,
            }
        }
        info!(
            recorded = summary.recorded,
            null = summary.null,
            skipped = summary.skipped,
            "Bulk processing complete"
        );
        Ok(summary)
    }

    fn scrape(&self, package: &str) -> Result<AppFields, ScrapeError> {
        let mut entry = AppEntry::with_base_url(package, &self.base_url)?;
        entry.collect_fields()
    }

    fn append(&self, record: &AppRecord) -> Result<(), StoreError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}
