//! Classification Driver
//!
//! For each outcome record not already in the checkpoint, issues one oracle
//! request, validates the response against the per-aim score contract, and
//! persists the result (or a terminal failure marker) before moving to the
//! next record. A single unclassifiable record never aborts the batch.

pub mod prompts;

use crate::aims::Aim;
use crate::checkpoint::OutputLog;
use crate::errors::{PipelineError, Result};
use crate::oracle::{Oracle, OracleRequest, RateLimiter, RetryManager};
use crate::types::{AimScores, ClassifiedRow, OutcomeRecord, RecordKey, StageSummary};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;

/// Strict parser for the classification response contract.
///
/// The oracle must return a JSON object with one numeric field per aim.
/// A missing aim field is treated as a zero score (documented fallback);
/// any other shape is a recoverable error, never coerced.
pub fn parse_scores(raw: &str) -> Result<AimScores> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| PipelineError::MalformedResponse(format!("invalid JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| PipelineError::MalformedResponse("response is not an object".to_string()))?;

    let mut scores = AimScores::zero();
    for aim in Aim::ALL {
        match object.get(aim.name()) {
            None | Some(serde_json::Value::Null) => {
                // Missing aim field counts as zero confidence
            }
            Some(value) => {
                let score = value.as_f64().ok_or_else(|| {
                    PipelineError::MalformedResponse(format!(
                        "non-numeric score for '{}': {}",
                        aim.name(),
                        value
                    ))
                })?;
                scores.set(aim, score.round().clamp(0.0, 100.0) as u8);
            }
        }
    }
    Ok(scores)
}

/// Drives the classification stage over one run
pub struct ClassificationDriver<O: Oracle> {
    oracle: O,
    retry: RetryManager,
    limiter: Mutex<RateLimiter>,
    temperature: f32,
    system_prompt: String,
}

impl<O: Oracle> ClassificationDriver<O> {
    pub fn new(oracle: O, retry: RetryManager, min_call_spacing: Duration, temperature: f32) -> Self {
        Self {
            oracle,
            retry,
            limiter: Mutex::new(RateLimiter::new(min_call_spacing)),
            temperature,
            system_prompt: prompts::system_prompt(),
        }
    }

    /// Classify one record's text via the oracle, with bounded retries.
    ///
    /// The rate limiter is acquired inside the retry loop so the call-spacing
    /// floor holds across retries as well as across units.
    async fn classify_text(&self, outcome_text: &str) -> Result<AimScores> {
        let request = OracleRequest {
            system: self.system_prompt.clone(),
            user: prompts::user_prompt(outcome_text),
            temperature: self.temperature,
            max_tokens: None,
        };

        let oracle = &self.oracle;
        let limiter = &self.limiter;
        let request = &request;
        self.retry
            .execute_with_retry(move || async move {
                limiter.lock().await.acquire().await;
                let raw = oracle.complete(request).await?;
                parse_scores(&raw)
            })
            .await
    }

    /// Process every record not already in `done`, appending each result to
    /// `log` and updating `done` before the next unit.
    ///
    /// Only credential rejection escapes as an error; per-unit failures are
    /// persisted as markers and counted in the summary.
    pub async fn run(
        &self,
        records: &[OutcomeRecord],
        done: &mut HashSet<RecordKey>,
        log: &mut OutputLog,
        progress: &ProgressBar,
    ) -> Result<StageSummary> {
        let mut summary = StageSummary::default();

        for record in records {
            let key = record.key();
            if done.contains(&key) {
                summary.already_done += 1;
                progress.inc(1);
                continue;
            }

            let full_text = record.full_text();
            let row = if full_text.is_empty() {
                // No oracle call for empty text: zero scores, fixed fallback aim
                summary.skipped_empty += 1;
                ClassifiedRow::from_scores(record, &AimScores::zero(), Aim::FALLBACK)
            } else {
                match self.classify_text(&full_text).await {
                    Ok(scores) => {
                        let best = scores.best_aim();
                        progress.set_message(format!("{} -> {}", record.learning_outcome_id, best));
                        summary.succeeded += 1;
                        ClassifiedRow::from_scores(record, &scores, best)
                    }
                    Err(e @ PipelineError::CredentialError(_)) => {
                        log.flush()?;
                        return Err(e);
                    }
                    Err(_) => {
                        summary.failed += 1;
                        ClassifiedRow::from_failure(record)
                    }
                }
            };

            log.append(&row)?;
            done.insert(key);
            progress.inc(1);
        }

        log.flush()?;
        Ok(summary)
    }
}
