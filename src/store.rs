//! Record Store: input table loading and validation
//!
//! Loads the cleaned outcome table (classification stage) or the classified
//! table (suggestion stage), verifies the required columns exist, and filters
//! out placeholder rows the upstream scraper emits for courses without
//! outcomes. Rows with empty title and details are retained; the
//! classification driver handles their empty `full_text` explicitly.

use crate::errors::{PipelineError, Result};
use crate::types::{ClassifiedRow, OutcomeRecord};
use std::path::Path;

/// Columns every input table must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "course_name",
    "course_url",
    "course_title",
    "department",
    "college",
    "learning_outcome_id",
    "learning_outcome_title",
    "learning_outcome_details",
];

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(PipelineError::InputError(format!(
            "input file not found: {}",
            path.display()
        )));
    }
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?)
}

/// Enrichment columns the classified table must carry on top of the base set
pub const CLASSIFIED_COLUMNS: [&str; 5] = [
    "confidence_Spiritually_Strengthening",
    "confidence_Intellectually_Enlarging",
    "confidence_Character_Building",
    "confidence_Lifelong_Learning_and_Service",
    "best_aim",
];

fn check_columns(
    reader: &mut csv::Reader<std::fs::File>,
    path: &Path,
    required: &[&str],
) -> Result<()> {
    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::InputError(format!(
            "{} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        )));
    }
    Ok(())
}

/// True when the outcome text is one of the scraper's placeholder sentences
fn is_placeholder(details: &str, patterns: &[String]) -> bool {
    let details = details.to_lowercase();
    patterns
        .iter()
        .any(|p| !p.is_empty() && details.contains(&p.to_lowercase()))
}

/// Load the cleaned outcome table for the classification stage.
///
/// Placeholder rows are dropped; input row order is preserved.
pub fn load_outcomes(path: &Path, placeholder_patterns: &[String]) -> Result<Vec<OutcomeRecord>> {
    let mut reader = open_reader(path)?;
    check_columns(&mut reader, path, &REQUIRED_COLUMNS)?;

    let mut records = Vec::new();
    for row in reader.deserialize::<OutcomeRecord>() {
        let record = row.map_err(|e| {
            PipelineError::InputError(format!("unreadable row in {}: {}", path.display(), e))
        })?;
        if is_placeholder(&record.learning_outcome_details, placeholder_patterns) {
            continue;
        }
        records.push(record);
    }
    Ok(records)
}

/// Load the classified table that feeds the suggestion stage.
///
/// Placeholder rows are dropped here as well; all-zero and failed rows stay
/// in the table (they still contribute to `all_existing_outcomes_text`) and
/// the aggregator excludes them from modal computation.
pub fn load_classified(path: &Path, placeholder_patterns: &[String]) -> Result<Vec<ClassifiedRow>> {
    let mut reader = open_reader(path)?;
    check_columns(&mut reader, path, &REQUIRED_COLUMNS)?;
    check_columns(&mut reader, path, &CLASSIFIED_COLUMNS)?;

    let mut rows = Vec::new();
    for row in reader.deserialize::<ClassifiedRow>() {
        let row = row.map_err(|e| {
            PipelineError::InputError(format!("unreadable row in {}: {}", path.display(), e))
        })?;
        if is_placeholder(&row.learning_outcome_details, placeholder_patterns) {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}
