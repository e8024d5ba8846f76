//! Reconciliation of local rows with the remote collection file
//!
//! Every write is a read-modify-write guarded only by the revision token
//! returned from the read. A writer that loses the race gets a failed
//! [`WriteOutcome`]; nothing is retried.

use std::collections::HashSet;

use chrono::Utc;

use crate::api::github::GitHubStore;
use crate::error::{Result, SyncError};
use crate::io::{parse_records, record_line, write_records};
use crate::models::CardRecord;

/// Result of a write, reported to the user as-is
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub success: bool,
    pub message: String,
    /// Rows in the file after a successful write
    pub rows: usize,
}

impl WriteOutcome {
    fn saved(rows: usize) -> Self {
        Self {
            success: true,
            message: "File saved successfully".to_string(),
            rows,
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("Write failed: {message}");
        Self {
            success: false,
            message,
            rows: 0,
        }
    }
}

/// Appends `new_rows` to `existing`, dropping rows that serialize
/// byte-identically to an earlier row. Rows sharing a key but differing in
/// any column are all kept.
pub fn merge_rows(existing: Vec<CardRecord>, new_rows: &[CardRecord]) -> Result<Vec<CardRecord>> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len() + new_rows.len());

    for row in existing.into_iter().chain(new_rows.iter().cloned()) {
        if seen.insert(record_line(&row)?) {
            merged.push(row);
        }
    }
    Ok(merged)
}

fn commit_message(action: &str) -> String {
    format!(
        "{} via collection_sync ({})",
        action,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Reads and writes the collection through a [`GitHubStore`]
pub struct Reconciler<'a> {
    store: &'a GitHubStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a GitHubStore) -> Self {
        Self { store }
    }

    /// Loads the remote collection; a missing file is an error here
    pub fn load(&self) -> Result<Vec<CardRecord>> {
        let snapshot = self
            .store
            .fetch()?
            .ok_or_else(|| SyncError::MissingRemote(self.store.path().to_string()))?;
        let records = parse_records(&snapshot.content)?;
        log::info!("Loaded {} rows from remote collection", records.len());
        Ok(records)
    }

    /// Incremental merge: snapshot rows followed by `new_rows`, exact
    /// duplicates removed, written conditioned on the snapshot's revision.
    pub fn merge_incremental(&self, new_rows: &[CardRecord]) -> WriteOutcome {
        let (existing, sha) = match self.store.fetch() {
            Ok(Some(snapshot)) => match parse_records(&snapshot.content) {
                Ok(records) => (records, Some(snapshot.sha)),
                Err(e) => return WriteOutcome::failed(format!("Failed to read existing CSV: {e}")),
            },
            Ok(None) => (Vec::new(), None),
            Err(e) => return WriteOutcome::failed(format!("Failed to read remote file: {e}")),
        };

        let prior = existing.len();
        let merged = match merge_rows(existing, new_rows) {
            Ok(merged) => merged,
            Err(e) => return WriteOutcome::failed(format!("Failed to merge rows: {e}")),
        };
        log::info!(
            "Incremental merge: {} existing + {} new -> {} rows",
            prior,
            new_rows.len(),
            merged.len()
        );

        self.write(&merged, &commit_message("Incremental update"), sha.as_deref())
    }

    /// Full replace: the file afterwards holds exactly `rows`
    pub fn replace_all(&self, rows: &[CardRecord]) -> WriteOutcome {
        let sha = match self.store.fetch() {
            Ok(snapshot) => snapshot.map(|s| s.sha),
            Err(e) => return WriteOutcome::failed(format!("Failed to read remote file: {e}")),
        };
        log::info!("Full replace with {} rows", rows.len());
        self.write(rows, &commit_message("Full replace"), sha.as_deref())
    }

    fn write(&self, rows: &[CardRecord], message: &str, sha: Option<&str>) -> WriteOutcome {
        let content = match write_records(rows) {
            Ok(content) => content,
            Err(e) => return WriteOutcome::failed(format!("Failed to serialize CSV: {e}")),
        };
        match self.store.put(&content, message, sha) {
            Ok(()) => WriteOutcome::saved(rows.len()),
            Err(SyncError::Store { message, .. }) => WriteOutcome::failed(message),
            Err(e) => WriteOutcome::failed(e.to_string()),
        }
    }
}
