//! Suggestion Driver
//!
//! For each course with a defined modal aim, for each of the three non-modal
//! aims, generates three candidate learning outcomes via the oracle and
//! persists one row per `(course_url, target_aim)` unit. Retry, rate-limit,
//! and failure-marker behavior mirror the classification driver.

pub mod prompts;

use crate::aggregate::CourseGroup;
use crate::aims::Aim;
use crate::checkpoint::OutputLog;
use crate::errors::{PipelineError, Result};
use crate::oracle::{Oracle, OracleRequest, RateLimiter, RetryManager};
use crate::types::{StageSummary, SuggestionRow, STATUS_FAILED, STATUS_OK};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;

/// Strict parser for the suggestion response contract.
///
/// The oracle must return `{"suggested_outcomes": [s1, s2, s3]}` with exactly
/// three strings. Fewer or more than three, or any non-string entry, is a
/// recoverable error.
pub fn parse_suggestions(raw: &str) -> Result<[String; 3]> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| PipelineError::MalformedResponse(format!("invalid JSON: {}", e)))?;
    let list = value
        .get("suggested_outcomes")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            PipelineError::MalformedResponse(
                "response has no 'suggested_outcomes' array".to_string(),
            )
        })?;

    if list.len() != 3 {
        return Err(PipelineError::MalformedResponse(format!(
            "expected exactly 3 suggestions, got {}",
            list.len()
        )));
    }

    let mut suggestions: [String; 3] = Default::default();
    for (i, entry) in list.iter().enumerate() {
        let text = entry.as_str().ok_or_else(|| {
            PipelineError::MalformedResponse(format!("suggestion {} is not a string", i + 1))
        })?;
        suggestions[i] = text.trim().to_string();
    }
    Ok(suggestions)
}

/// Count of suggestion work units across all qualifying courses.
///
/// Each course with a defined modal aim contributes one unit per non-modal
/// aim (three in total); courses without a modal aim contribute none.
pub fn unit_count(groups: &[CourseGroup]) -> usize {
    groups
        .iter()
        .filter(|g| g.modal_aim().is_some())
        .count()
        * (Aim::ALL.len() - 1)
}

/// Drives the suggestion stage over one run
pub struct SuggestionDriver<O: Oracle> {
    oracle: O,
    retry: RetryManager,
    limiter: Mutex<RateLimiter>,
    temperature: f32,
    max_tokens: u32,
}

impl<O: Oracle> SuggestionDriver<O> {
    pub fn new(
        oracle: O,
        retry: RetryManager,
        min_call_spacing: Duration,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            oracle,
            retry,
            limiter: Mutex::new(RateLimiter::new(min_call_spacing)),
            temperature,
            max_tokens,
        }
    }

    /// Generate three suggestions for one (course, target aim) unit
    async fn suggest_for_target(
        &self,
        group: &CourseGroup,
        concatenated_text: &str,
        target: Aim,
    ) -> Result<[String; 3]> {
        let request = OracleRequest {
            system: prompts::system_prompt(target),
            user: prompts::user_prompt(group, concatenated_text, target),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        };

        let oracle = &self.oracle;
        let limiter = &self.limiter;
        let request = &request;
        self.retry
            .execute_with_retry(move || async move {
                limiter.lock().await.acquire().await;
                let raw = oracle.complete(request).await?;
                parse_suggestions(&raw)
            })
            .await
    }

    fn row(
        group: &CourseGroup,
        modal: Aim,
        concatenated_text: &str,
        target: Aim,
        result: Option<[String; 3]>,
    ) -> SuggestionRow {
        let (status, suggestions) = match result {
            Some(suggestions) => (STATUS_OK, suggestions),
            None => (STATUS_FAILED, Default::default()),
        };
        let [suggested_1, suggested_2, suggested_3] = suggestions;
        SuggestionRow {
            course_url: group.course_url.clone(),
            course_name: group.course_name.clone(),
            course_title: group.course_title.clone(),
            department: group.department.clone(),
            college: group.college.clone(),
            modal_aim: modal.name().to_string(),
            all_existing_outcomes_text: concatenated_text.to_string(),
            target_aim: target.name().to_string(),
            status: status.to_string(),
            suggested_1,
            suggested_2,
            suggested_3,
        }
    }

    /// Process every `(course, target aim)` unit not already in `done`,
    /// appending each result to `log` before the next unit
    pub async fn run(
        &self,
        groups: &[CourseGroup],
        done: &mut HashSet<(String, String)>,
        log: &mut OutputLog,
        progress: &ProgressBar,
    ) -> Result<StageSummary> {
        let mut summary = StageSummary::default();

        for group in groups {
            let Some(modal) = group.modal_aim() else {
                // No qualifying classified record: excluded from suggestion work
                continue;
            };
            let concatenated_text = group.concatenated_text();

            for target in Aim::others(modal) {
                let key = (group.course_url.clone(), target.name().to_string());
                if done.contains(&key) {
                    summary.already_done += 1;
                    progress.inc(1);
                    continue;
                }

                progress.set_message(format!("{} -> {}", group.course_name, target));
                let result = match self.suggest_for_target(group, &concatenated_text, target).await
                {
                    Ok(suggestions) => {
                        summary.succeeded += 1;
                        Some(suggestions)
                    }
                    Err(e @ PipelineError::CredentialError(_)) => {
                        log.flush()?;
                        return Err(e);
                    }
                    Err(_) => {
                        summary.failed += 1;
                        None
                    }
                };

                log.append(&Self::row(group, modal, &concatenated_text, target, result))?;
                done.insert(key);
                progress.inc(1);
            }
        }

        log.flush()?;
        Ok(summary)
    }
}
