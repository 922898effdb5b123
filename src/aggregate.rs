//! Aggregator: per-course modal aim and concatenated outcome text
//!
//! Pure functions over classified rows. Deterministic regardless of
//! processing order: the modal tie-break is the fixed aim priority order, a
//! total order over aims, never arrival order.

use crate::aims::Aim;
use crate::types::ClassifiedRow;
use std::collections::HashMap;

/// All classified rows of one course, keyed by `course_url`.
///
/// Representative metadata comes from the first row encountered for the
/// course; these fields are assumed constant within a course_url and are not
/// re-validated.
#[derive(Debug, Clone)]
pub struct CourseGroup {
    pub course_url: String,
    pub course_name: String,
    pub course_title: String,
    pub department: String,
    pub college: String,
    pub rows: Vec<ClassifiedRow>,
}

impl CourseGroup {
    /// Mode of the persisted `best_aim` across qualifying rows.
    ///
    /// Rows without scores (failure markers), with all-zero scores, or with
    /// an unrecognized aim label do not qualify. Returns None when no row
    /// qualifies; such courses are excluded from suggestion work entirely.
    /// Count ties resolve to the higher-priority aim.
    pub fn modal_aim(&self) -> Option<Aim> {
        let mut counts = [0usize; 4];
        for row in &self.rows {
            let Some(scores) = row.scores() else { continue };
            if scores.is_all_zero() {
                continue;
            }
            let Some(aim) = row.parsed_best_aim() else { continue };
            let idx = Aim::ALL.iter().position(|a| *a == aim).unwrap();
            counts[idx] += 1;
        }

        let mut modal: Option<(Aim, usize)> = None;
        for (idx, aim) in Aim::ALL.iter().enumerate() {
            if counts[idx] == 0 {
                continue;
            }
            match modal {
                // Strictly-greater keeps the higher-priority aim on ties
                Some((_, best_count)) if counts[idx] <= best_count => {}
                _ => modal = Some((*aim, counts[idx])),
            }
        }
        modal.map(|(aim, _)| aim)
    }

    /// All outcome texts of the course, newline-joined in original row order.
    ///
    /// Zero-score and failed rows are included; rows with empty text are
    /// skipped.
    pub fn concatenated_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.record().full_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Group classified rows by `course_url`, preserving input row order within
/// each group and first-encounter order across groups
pub fn group_courses(rows: Vec<ClassifiedRow>) -> Vec<CourseGroup> {
    let mut groups: Vec<CourseGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        match index.get(&row.course_url) {
            Some(&i) => groups[i].rows.push(row),
            None => {
                index.insert(row.course_url.clone(), groups.len());
                groups.push(CourseGroup {
                    course_url: row.course_url.clone(),
                    course_name: row.course_name.clone(),
                    course_title: row.course_title.clone(),
                    department: row.department.clone(),
                    college: row.college.clone(),
                    rows: vec![row],
                });
            }
        }
    }
    groups
}
