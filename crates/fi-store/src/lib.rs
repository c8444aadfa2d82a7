//! Storage boundary for the record table.
//!
//! The dataset is one externally owned CSV file. This crate reads it into
//! [`Record`]s and writes it back; it is deliberately not a database.
//!
//! # Loading
//!
//! Rows are matched to fields by header name, so column order is the
//! file owner's business. A row that cannot be deserialized at all (an
//! unknown `record_type`, a ragged row) is skipped and counted rather
//! than failing the load: the dataset is hand-maintained and a single
//! bad row must not take the toolkit down. Malformed *optional* fields
//! degrade to absent values inside `fi-core`'s lenient deserializers
//! before they ever become row errors.
//!
//! # Saving
//!
//! Enrichment appends records logically, but the file is rewritten whole:
//! the table is small and a rewrite sidesteps header-order drift between
//! the existing file and freshly serialized rows.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use fi_core::Record;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The dataset file does not exist.
    #[error("dataset not found: {path}")]
    NotFound { path: PathBuf },
    /// An error from the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// An error from the CSV layer.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result of loading the dataset.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub records: Vec<Record>,
    /// Rows that could not be deserialized and were dropped.
    pub skipped: usize,
}

/// Loads the record table from `path`.
///
/// Returns [`StoreError::NotFound`] when the file is absent; otherwise
/// malformed rows are skipped, warned about, and counted in the outcome.
pub fn load_records(path: &Path) -> Result<LoadOutcome, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    let mut skipped = 0;

    for (index, row) in reader.deserialize::<Record>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(error) => {
                skipped += 1;
                // Header is line 1, so data row N is line N + 1.
                tracing::warn!(line = index + 2, %error, "skipping malformed record");
            }
        }
    }

    tracing::debug!(
        count = records.len(),
        skipped,
        path = %path.display(),
        "dataset loaded"
    );
    Ok(LoadOutcome { records, skipped })
}

/// Writes the full record table to `path`, creating parent directories.
pub fn save_records(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::debug!(count = records.len(), path = %path.display(), "dataset saved");
    Ok(())
}
