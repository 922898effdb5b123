//! Checkpoint/Resume Controller
//!
//! The durable output tables double as the progress state: a work unit is
//! complete exactly when its keyed row exists in the output file. Before any
//! oracle call, the completed-unit sets are rebuilt from the files alone, so
//! a restarted run performs zero redundant calls and appends new rows to the
//! same column schema (header written only on file creation).

use crate::errors::{PipelineError, Result};
use crate::types::{ClassifiedRow, RecordKey, SuggestionRow};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Append-only CSV writer shared by both stage drivers.
///
/// Rows are flushed to disk every `save_frequency` appends (default 1) and on
/// [`OutputLog::flush`]; a crash between units loses at most the unflushed
/// tail, never previously flushed rows.
pub struct OutputLog {
    writer: csv::Writer<File>,
    save_frequency: usize,
    pending: usize,
}

impl OutputLog {
    /// Open (or create) the output file for appending.
    ///
    /// Fails fatally when the path is not writable, before any oracle call.
    pub fn open(path: &Path, save_frequency: usize) -> Result<Self> {
        let has_rows = path
            .metadata()
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                PipelineError::InputError(format!(
                    "output path not writable: {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let writer = csv::WriterBuilder::new()
            .has_headers(!has_rows)
            .from_writer(file);

        Ok(Self {
            writer,
            save_frequency: save_frequency.max(1),
            pending: 0,
        })
    }

    /// Append one completed unit's row
    pub fn append<T: Serialize>(&mut self, row: &T) -> Result<()> {
        self.writer.serialize(row)?;
        self.pending += 1;
        if self.pending >= self.save_frequency {
            self.flush()?;
        }
        Ok(())
    }

    /// Force pending rows to disk
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.pending = 0;
        Ok(())
    }
}

fn corrupt(path: &Path, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::InputError(format!(
        "existing output {} is unreadable ({}); move it aside or repair it before resuming",
        path.display(),
        e
    ))
}

/// Keys of classification units already persisted.
///
/// Rows with the failure marker (empty enrichment cells) count as complete:
/// the unit was attempted to exhaustion and is not redone on resume.
pub fn completed_classifications(path: &Path) -> Result<HashSet<RecordKey>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| corrupt(path, e))?;
    let mut done = HashSet::new();
    for row in reader.deserialize::<ClassifiedRow>() {
        let row = row.map_err(|e| corrupt(path, e))?;
        done.insert(row.key());
    }
    Ok(done)
}

/// `(course_url, target_aim)` units already persisted in the suggestion table
pub fn completed_suggestions(path: &Path) -> Result<HashSet<(String, String)>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| corrupt(path, e))?;
    let mut done = HashSet::new();
    for row in reader.deserialize::<SuggestionRow>() {
        let row = row.map_err(|e| corrupt(path, e))?;
        done.insert(row.key());
    }
    Ok(done)
}
