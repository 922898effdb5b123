//! End-to-end driver tests over temp-file checkpoints and a scripted oracle
//!
//! These exercise the run-level properties: every unit persisted before the
//! next begins, exact resumption with zero redundant calls, failure markers
//! that never abort the batch, and the classify -> aggregate -> suggest
//! hand-off through the CSV tables.

use async_trait::async_trait;
use indicatif::ProgressBar;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use aimalign::aggregate::group_courses;
use aimalign::aims::Aim;
use aimalign::checkpoint::{self, OutputLog};
use aimalign::classify::ClassificationDriver;
use aimalign::errors::{PipelineError, Result};
use aimalign::oracle::{Oracle, OracleRequest, RetryManager};
use aimalign::store;
use aimalign::suggest::{self, SuggestionDriver};
use aimalign::types::{OutcomeRecord, StageSummary, STATUS_FAILED, STATUS_OK};

/// Oracle that returns the same reply for every call
struct FixedOracle {
    reply: String,
    calls: Arc<AtomicUsize>,
}

impl FixedOracle {
    fn new(reply: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reply: reply.to_string(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Oracle for FixedOracle {
    async fn complete(&self, _request: &OracleRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// One scripted oracle interaction
enum Step {
    Reply(&'static str),
    TransientError,
}

/// Oracle that replays a fixed script, then repeats its last step
struct ScriptedOracle {
    steps: Mutex<VecDeque<Step>>,
    last: Step,
    calls: Arc<AtomicUsize>,
}

impl ScriptedOracle {
    fn new(steps: Vec<Step>, last: Step) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                steps: Mutex::new(steps.into()),
                last,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, _request: &OracleRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        let step = step.as_ref().unwrap_or(&self.last);
        match step {
            Step::Reply(reply) => Ok(reply.to_string()),
            Step::TransientError => Err(PipelineError::OracleApiError(
                "scripted HTTP 500".to_string(),
            )),
        }
    }
}

const ENLARGING_REPLY: &str = r#"{
    "Spiritually Strengthening": 10,
    "Intellectually Enlarging": 90,
    "Character Building": 30,
    "Lifelong Learning and Service": 20
}"#;

const CHARACTER_REPLY: &str = r#"{
    "Spiritually Strengthening": 10,
    "Intellectually Enlarging": 20,
    "Character Building": 85,
    "Lifelong Learning and Service": 15
}"#;

const SUGGEST_REPLY: &str =
    r#"{"suggested_outcomes": ["First idea.", "Second idea.", "Third idea."]}"#;

fn record(url: &str, id: &str, title: &str) -> OutcomeRecord {
    OutcomeRecord {
        course_name: "CS 101".to_string(),
        course_url: url.to_string(),
        course_title: "Intro".to_string(),
        department: "CS".to_string(),
        college: "Eng".to_string(),
        learning_outcome_id: id.to_string(),
        learning_outcome_title: title.to_string(),
        learning_outcome_details: String::new(),
    }
}

fn fast_retry() -> RetryManager {
    RetryManager::with_config(3, 1, 4)
}

fn no_spacing() -> Duration {
    Duration::from_millis(0)
}

async fn classify<O: Oracle>(
    oracle: O,
    records: &[OutcomeRecord],
    output: &Path,
) -> StageSummary {
    let driver = ClassificationDriver::new(oracle, fast_retry(), no_spacing(), 0.2);
    let mut done = checkpoint::completed_classifications(output).unwrap();
    let mut log = OutputLog::open(output, 1).unwrap();
    driver
        .run(records, &mut done, &mut log, &ProgressBar::hidden())
        .await
        .unwrap()
}

async fn suggest_over<O: Oracle>(oracle: O, classified: &Path, output: &Path) -> StageSummary {
    let rows = store::load_classified(classified, &[]).unwrap();
    let groups = group_courses(rows);
    let driver = SuggestionDriver::new(oracle, fast_retry(), no_spacing(), 0.6, 300);
    let mut done = checkpoint::completed_suggestions(output).unwrap();
    let mut log = OutputLog::open(output, 1).unwrap();
    driver
        .run(&groups, &mut done, &mut log, &ProgressBar::hidden())
        .await
        .unwrap()
}

#[tokio::test]
async fn classification_persists_one_row_per_record() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("classified.csv");
    let records = vec![
        record("u1", "1", "Reason about algorithms"),
        record("u1", "2", "Write rigorous proofs"),
        record("u2", "1", "Serve the community"),
    ];

    let (oracle, calls) = FixedOracle::new(ENLARGING_REPLY);
    let summary = classify(oracle, &records, &output).await;

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let rows = store::load_classified(&output, &[]).unwrap();
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.parsed_best_aim(), Some(Aim::IntellectuallyEnlarging));
    }
}

#[tokio::test]
async fn interrupted_run_resumes_without_redundant_calls() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("classified.csv");
    let records = vec![
        record("u1", "1", "Reason about algorithms"),
        record("u1", "2", "Write rigorous proofs"),
        record("u2", "1", "Serve the community"),
    ];

    // First run stops after two units
    let (oracle, calls) = FixedOracle::new(ENLARGING_REPLY);
    classify(oracle, &records[..2], &output).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Restarted run sees the checkpoint and only processes the remainder
    let (oracle, calls) = FixedOracle::new(ENLARGING_REPLY);
    let summary = classify(oracle, &records, &output).await;
    assert_eq!(summary.already_done, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let rows = store::load_classified(&output, &[]).unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn second_full_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("classified.csv");
    let records = vec![record("u1", "1", "Reason"), record("u1", "2", "Prove")];

    let (oracle, _) = FixedOracle::new(ENLARGING_REPLY);
    classify(oracle, &records, &output).await;
    let first = std::fs::read_to_string(&output).unwrap();

    let (oracle, calls) = FixedOracle::new(ENLARGING_REPLY);
    let summary = classify(oracle, &records, &output).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.already_done, 2);
    assert_eq!(summary.processed(), 0);
    // Byte-for-byte unchanged output
    assert_eq!(std::fs::read_to_string(&output).unwrap(), first);
}

#[tokio::test]
async fn empty_text_resolves_without_oracle_call() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("classified.csv");
    let records = vec![record("u1", "1", "")];

    let (oracle, calls) = FixedOracle::new(ENLARGING_REPLY);
    let summary = classify(oracle, &records, &output).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.skipped_empty, 1);

    let rows = store::load_classified(&output, &[]).unwrap();
    assert_eq!(rows[0].parsed_best_aim(), Some(Aim::LifelongLearningAndService));
    assert!(rows[0].scores().unwrap().is_all_zero());
}

#[tokio::test]
async fn malformed_responses_exhaust_retries_then_mark_failure() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("classified.csv");
    let records = vec![record("u1", "1", "Reason"), record("u1", "2", "Prove")];

    // First unit: malformed on every attempt. Second unit: valid.
    let (oracle, calls) = ScriptedOracle::new(
        vec![
            Step::Reply("not json at all"),
            Step::Reply("not json at all"),
            Step::Reply("not json at all"),
            Step::Reply(ENLARGING_REPLY),
        ],
        Step::Reply(ENLARGING_REPLY),
    );
    let summary = classify(oracle, &records, &output).await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);

    let rows = store::load_classified(&output, &[]).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].scores().is_none());
    assert!(rows[0].best_aim.is_empty());
    assert!(rows[1].scores().is_some());

    // Failure-marker units are checkpointed: nothing is redone on resume
    let (oracle, calls) = FixedOracle::new(ENLARGING_REPLY);
    let summary = classify(oracle, &records, &output).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.already_done, 2);
}

#[tokio::test]
async fn transient_errors_recover_within_the_bound() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("classified.csv");
    let records = vec![record("u1", "1", "Reason")];

    let (oracle, calls) = ScriptedOracle::new(
        vec![Step::TransientError, Step::TransientError],
        Step::Reply(ENLARGING_REPLY),
    );
    let summary = classify(oracle, &records, &output).await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn suggestions_cover_exactly_the_non_modal_aims() {
    let dir = TempDir::new().unwrap();
    let classified = dir.path().join("classified.csv");
    let output = dir.path().join("suggestions.csv");

    // Course u1: best aims {Enlarging, Enlarging, Character} -> modal Enlarging
    let records = vec![
        record("u1", "1", "Reason about algorithms"),
        record("u1", "2", "Write rigorous proofs"),
        record("u1", "3", "Act with integrity"),
    ];
    let (oracle, _) = ScriptedOracle::new(
        vec![
            Step::Reply(ENLARGING_REPLY),
            Step::Reply(ENLARGING_REPLY),
            Step::Reply(CHARACTER_REPLY),
        ],
        Step::Reply(ENLARGING_REPLY),
    );
    classify(oracle, &records, &classified).await;

    let (oracle, calls) = FixedOracle::new(SUGGEST_REPLY);
    let summary = suggest_over(oracle, &classified, &output).await;

    assert_eq!(summary.succeeded, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let rows: Vec<aimalign::types::SuggestionRow> =
        reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    let targets: HashSet<String> = rows.iter().map(|r| r.target_aim.clone()).collect();
    assert!(!targets.contains(Aim::IntellectuallyEnlarging.name()));
    assert_eq!(targets.len(), 3);
    for row in &rows {
        assert_eq!(row.modal_aim, Aim::IntellectuallyEnlarging.name());
        assert_eq!(row.status, STATUS_OK);
        assert_eq!(row.suggested_1, "First idea.");
        assert_eq!(row.suggested_3, "Third idea.");
        assert!(row
            .all_existing_outcomes_text
            .contains("Reason about algorithms"));
    }
}

#[tokio::test]
async fn failed_suggestion_units_persist_with_empty_slots() {
    let dir = TempDir::new().unwrap();
    let classified = dir.path().join("classified.csv");
    let output = dir.path().join("suggestions.csv");

    let records = vec![record("u1", "1", "Reason about algorithms")];
    let (oracle, _) = FixedOracle::new(ENLARGING_REPLY);
    classify(oracle, &records, &classified).await;

    // First unit succeeds; wrong-arity responses fail the remaining two
    let (oracle, calls) = ScriptedOracle::new(
        vec![Step::Reply(SUGGEST_REPLY)],
        Step::Reply(r#"{"suggested_outcomes": ["only one"]}"#),
    );
    let summary = suggest_over(oracle, &classified, &output).await;

    // 1 success + 2 failed units at 3 attempts each
    assert_eq!(calls.load(Ordering::SeqCst), 7);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 2);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let rows: Vec<aimalign::types::SuggestionRow> =
        reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    for row in rows.iter().filter(|r| r.status == STATUS_FAILED) {
        assert!(row.suggested_1.is_empty());
        assert!(row.suggested_2.is_empty());
        assert!(row.suggested_3.is_empty());
    }

    // Failed units are complete: the rerun makes no further calls
    let (oracle, calls) = FixedOracle::new(SUGGEST_REPLY);
    let summary = suggest_over(oracle, &classified, &output).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.already_done, 3);
}

#[tokio::test]
async fn courses_without_qualifying_records_are_skipped() {
    let dir = TempDir::new().unwrap();
    let classified = dir.path().join("classified.csv");
    let output = dir.path().join("suggestions.csv");

    // Only record has empty text -> zero scores -> no modal aim
    let records = vec![record("u1", "1", "")];
    let (oracle, _) = FixedOracle::new(ENLARGING_REPLY);
    classify(oracle, &records, &classified).await;

    let (oracle, calls) = FixedOracle::new(SUGGEST_REPLY);
    let summary = suggest_over(oracle, &classified, &output).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.processed(), 0);
    assert!(!output.exists() || checkpoint::completed_suggestions(&output).unwrap().is_empty());
}

#[tokio::test]
async fn partial_suggestion_run_resumes_per_unit() {
    let dir = TempDir::new().unwrap();
    let classified = dir.path().join("classified.csv");
    let output = dir.path().join("suggestions.csv");

    let records = vec![record("u1", "1", "Reason about algorithms")];
    let (oracle, _) = FixedOracle::new(ENLARGING_REPLY);
    classify(oracle, &records, &classified).await;

    // Simulate an interruption by pre-seeding one completed unit
    let rows = store::load_classified(&classified, &[]).unwrap();
    let groups = group_courses(rows);
    let (oracle, calls) = FixedOracle::new(SUGGEST_REPLY);
    let driver = SuggestionDriver::new(oracle, fast_retry(), no_spacing(), 0.6, 300);
    let mut done = HashSet::new();
    done.insert((
        "u1".to_string(),
        Aim::SpirituallyStrengthening.name().to_string(),
    ));
    let mut log = OutputLog::open(&output, 1).unwrap();
    let summary = driver
        .run(&groups, &mut done, &mut log, &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(summary.already_done, 1);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unit_count_matches_qualifying_courses() {
    let dir = TempDir::new().unwrap();
    let classified = dir.path().join("classified.csv");

    let records = vec![
        record("u1", "1", "Reason"),
        record("u2", "1", ""),
        record("u3", "1", "Serve"),
    ];
    let (oracle, _) = FixedOracle::new(ENLARGING_REPLY);
    classify(oracle, &records, &classified).await;

    let rows = store::load_classified(&classified, &[]).unwrap();
    let groups = group_courses(rows);
    // u2 has only a zero-score record and contributes no units
    assert_eq!(suggest::unit_count(&groups), 6);
}
