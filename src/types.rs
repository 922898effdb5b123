//! Core data model: outcome records, score vectors, and output row schemas
//!
//! The output row structs double as the checkpoint schema: the resume
//! controller reconstructs completed work from these rows alone, so their
//! field order and names define the durable CSV column layout.

use crate::aims::Aim;
use serde::{Deserialize, Serialize};

/// Identity of one outcome record: `(course_url, learning_outcome_id)`
pub type RecordKey = (String, String);

/// Suggestion row status: generation completed with three suggestions
pub const STATUS_OK: &str = "ok";
/// Suggestion row status: generation failed after exhausting retries
pub const STATUS_FAILED: &str = "failed";

/// One learning outcome as loaded from the cleaned input table.
///
/// Immutable once loaded; field names mirror the input CSV columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub course_name: String,
    pub course_url: String,
    pub course_title: String,
    pub department: String,
    pub college: String,
    pub learning_outcome_id: String,
    pub learning_outcome_title: String,
    pub learning_outcome_details: String,
}

impl OutcomeRecord {
    /// Unique key identifying this record across runs
    pub fn key(&self) -> RecordKey {
        (self.course_url.clone(), self.learning_outcome_id.clone())
    }

    /// Title and details joined with a space, empty parts omitted.
    ///
    /// Returns an empty string when both parts are empty; the classification
    /// driver handles that case without an oracle call.
    pub fn full_text(&self) -> String {
        let title = self.learning_outcome_title.trim();
        let details = self.learning_outcome_details.trim();
        match (title.is_empty(), details.is_empty()) {
            (true, true) => String::new(),
            (false, true) => title.to_string(),
            (true, false) => details.to_string(),
            (false, false) => format!("{} {}", title, details),
        }
    }
}

/// Confidence scores (0-100) for all four aims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AimScores {
    scores: [u8; 4],
}

impl AimScores {
    /// All-zero score vector (used for empty outcome text)
    pub fn zero() -> Self {
        Self::default()
    }

    fn idx(aim: Aim) -> usize {
        Aim::ALL.iter().position(|a| *a == aim).unwrap()
    }

    /// Set the score for one aim, clamped to [0, 100]
    pub fn set(&mut self, aim: Aim, score: u8) {
        self.scores[Self::idx(aim)] = score.min(100);
    }

    /// Score for one aim
    pub fn get(&self, aim: Aim) -> u8 {
        self.scores[Self::idx(aim)]
    }

    /// True when every aim scored zero.
    ///
    /// All-zero records are excluded from modal-aim computation.
    pub fn is_all_zero(&self) -> bool {
        self.scores.iter().all(|s| *s == 0)
    }

    /// Highest-scoring aim; ties broken by the fixed aim priority order.
    ///
    /// Deterministic: a later aim must strictly exceed the running best to
    /// displace it, so equal scores resolve to the higher-priority aim.
    pub fn best_aim(&self) -> Aim {
        let mut best = Aim::ALL[0];
        for aim in Aim::ALL.iter().copied().skip(1) {
            if self.get(aim) > self.get(best) {
                best = aim;
            }
        }
        best
    }
}

/// Per-stage counts reported in the final run summary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    /// Units found complete in the checkpoint before any oracle call
    pub already_done: usize,
    /// Units classified/generated successfully this run
    pub succeeded: usize,
    /// Units persisted with a failure marker after exhausting retries
    pub failed: usize,
    /// Units resolved without an oracle call (empty outcome text)
    pub skipped_empty: usize,
}

impl StageSummary {
    /// Units processed this run (excluding checkpointed ones)
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed + self.skipped_empty
    }
}

/// One row of the classification output table.
///
/// Input columns plus one confidence column per aim and `best_aim`. A record
/// that terminally failed classification keeps its input columns and leaves
/// all five enrichment cells empty; the presence of the keyed row is the
/// checkpoint either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRow {
    pub course_name: String,
    pub course_url: String,
    pub course_title: String,
    pub department: String,
    pub college: String,
    pub learning_outcome_id: String,
    pub learning_outcome_title: String,
    pub learning_outcome_details: String,
    #[serde(rename = "confidence_Spiritually_Strengthening")]
    pub confidence_spiritually_strengthening: Option<u8>,
    #[serde(rename = "confidence_Intellectually_Enlarging")]
    pub confidence_intellectually_enlarging: Option<u8>,
    #[serde(rename = "confidence_Character_Building")]
    pub confidence_character_building: Option<u8>,
    #[serde(rename = "confidence_Lifelong_Learning_and_Service")]
    pub confidence_lifelong_learning_and_service: Option<u8>,
    pub best_aim: String,
}

impl ClassifiedRow {
    fn base(record: &OutcomeRecord) -> Self {
        Self {
            course_name: record.course_name.clone(),
            course_url: record.course_url.clone(),
            course_title: record.course_title.clone(),
            department: record.department.clone(),
            college: record.college.clone(),
            learning_outcome_id: record.learning_outcome_id.clone(),
            learning_outcome_title: record.learning_outcome_title.clone(),
            learning_outcome_details: record.learning_outcome_details.clone(),
            confidence_spiritually_strengthening: None,
            confidence_intellectually_enlarging: None,
            confidence_character_building: None,
            confidence_lifelong_learning_and_service: None,
            best_aim: String::new(),
        }
    }

    /// Row for a successfully classified record
    pub fn from_scores(record: &OutcomeRecord, scores: &AimScores, best_aim: Aim) -> Self {
        let mut row = Self::base(record);
        row.confidence_spiritually_strengthening = Some(scores.get(Aim::SpirituallyStrengthening));
        row.confidence_intellectually_enlarging = Some(scores.get(Aim::IntellectuallyEnlarging));
        row.confidence_character_building = Some(scores.get(Aim::CharacterBuilding));
        row.confidence_lifelong_learning_and_service =
            Some(scores.get(Aim::LifelongLearningAndService));
        row.best_aim = best_aim.name().to_string();
        row
    }

    /// Row for a record whose classification failed after exhausting retries
    pub fn from_failure(record: &OutcomeRecord) -> Self {
        Self::base(record)
    }

    /// Unique key identifying this row across runs
    pub fn key(&self) -> RecordKey {
        (self.course_url.clone(), self.learning_outcome_id.clone())
    }

    /// The input-table portion of this row
    pub fn record(&self) -> OutcomeRecord {
        OutcomeRecord {
            course_name: self.course_name.clone(),
            course_url: self.course_url.clone(),
            course_title: self.course_title.clone(),
            department: self.department.clone(),
            college: self.college.clone(),
            learning_outcome_id: self.learning_outcome_id.clone(),
            learning_outcome_title: self.learning_outcome_title.clone(),
            learning_outcome_details: self.learning_outcome_details.clone(),
        }
    }

    /// Score vector, or None when any confidence cell is empty (failed row)
    pub fn scores(&self) -> Option<AimScores> {
        let mut scores = AimScores::zero();
        scores.set(
            Aim::SpirituallyStrengthening,
            self.confidence_spiritually_strengthening?,
        );
        scores.set(
            Aim::IntellectuallyEnlarging,
            self.confidence_intellectually_enlarging?,
        );
        scores.set(Aim::CharacterBuilding, self.confidence_character_building?);
        scores.set(
            Aim::LifelongLearningAndService,
            self.confidence_lifelong_learning_and_service?,
        );
        Some(scores)
    }

    /// Persisted best aim, or None for failed rows or unknown labels
    pub fn parsed_best_aim(&self) -> Option<Aim> {
        Aim::from_name(&self.best_aim)
    }
}

/// One row of the suggestion output table.
///
/// One row per `(course_url, target_aim)` work unit, so resumption is exact
/// at the granularity of a single oracle call. `status` is the explicit
/// failure marker; failed rows leave the three suggestion cells empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRow {
    pub course_url: String,
    pub course_name: String,
    pub course_title: String,
    pub department: String,
    pub college: String,
    pub modal_aim: String,
    pub all_existing_outcomes_text: String,
    pub target_aim: String,
    pub status: String,
    pub suggested_1: String,
    pub suggested_2: String,
    pub suggested_3: String,
}

impl SuggestionRow {
    /// Unique key identifying this work unit across runs
    pub fn key(&self) -> (String, String) {
        (self.course_url.clone(), self.target_aim.clone())
    }

    /// True when generation completed with three suggestions
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
