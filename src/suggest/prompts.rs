//! Prompts for the suggestion stage
//!
//! The system instruction carries the full taxonomy plus the definition of
//! the specific target aim; the user instruction carries the course metadata
//! and every existing outcome so the oracle can avoid duplicating coverage
//! the course already has.

use crate::aggregate::CourseGroup;
use crate::aims::Aim;

/// Build the suggestion system instruction for one target aim
pub fn system_prompt(target: Aim) -> String {
    let mut definitions = String::new();
    for aim in Aim::ALL {
        definitions.push_str(&format!("{}\n{}\n\n", aim.name(), aim.definition()));
    }

    format!(
        "You are an expert in curriculum design at BYU, helping courses better reflect the \
         Aims of a BYU Education.\n\n\
         The four BYU Aims are:\n\n{}\
         Your task: write NEW learning outcomes for the aim \"{}\".\n\
         As a reminder, that aim is defined as follows:\n{}\n\n\
         The user will provide a course and its existing learning outcomes. Propose exactly \
         three new learning outcomes that would strengthen the course's coverage of \
         \"{}\" without duplicating what the existing outcomes already cover. Each \
         suggestion must be a single, complete learning-outcome sentence appropriate for the \
         course's subject matter.\n\n\
         Respond ONLY with a valid JSON object of this exact shape:\n\
         {{\n\
         \x20 \"suggested_outcomes\": [\"first outcome\", \"second outcome\", \"third outcome\"]\n\
         }}",
        definitions,
        target.name(),
        target.definition(),
        target.name()
    )
}

/// Build the per-course user instruction for one target aim
pub fn user_prompt(group: &CourseGroup, concatenated_text: &str, target: Aim) -> String {
    format!(
        "Course: {} ({})\n\
         Department: {}\n\
         College: {}\n\n\
         Existing learning outcomes:\n{}\n\n\
         Suggest three new learning outcomes for this course targeting the aim \"{}\".",
        group.course_name,
        group.course_title,
        group.department,
        group.college,
        concatenated_text,
        target.name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> CourseGroup {
        CourseGroup {
            course_url: "u1".to_string(),
            course_name: "CS 101".to_string(),
            course_title: "Intro to CS".to_string(),
            department: "Computer Science".to_string(),
            college: "Engineering".to_string(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn test_system_prompt_highlights_target() {
        let prompt = system_prompt(Aim::CharacterBuilding);
        assert!(prompt.contains("\"Character Building\""));
        assert!(prompt.contains("suggested_outcomes"));
        // Full taxonomy still present for contrast
        for aim in Aim::ALL {
            assert!(prompt.contains(aim.name()));
        }
    }

    #[test]
    fn test_user_prompt_carries_course_and_outcomes() {
        let prompt = user_prompt(&group(), "Reason about code\nWrite proofs", Aim::SpirituallyStrengthening);
        assert!(prompt.contains("CS 101"));
        assert!(prompt.contains("Engineering"));
        assert!(prompt.contains("Reason about code\nWrite proofs"));
        assert!(prompt.contains("Spiritually Strengthening"));
    }
}
