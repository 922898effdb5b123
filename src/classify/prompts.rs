//! Prompts for the classification stage
//!
//! The system instruction (taxonomy and scoring rubric) is invariant across
//! calls; the user instruction carries one record's outcome text.

use crate::aims::Aim;

/// Build the classification system instruction.
///
/// Lists all four aims with their definitions and pins the response shape to
/// a JSON object with one 0-100 confidence field per aim.
pub fn system_prompt() -> String {
    let mut sections = String::new();
    for (i, aim) in Aim::ALL.iter().enumerate() {
        sections.push_str(&format!(
            "{}. {}\n   {}\n\n",
            i + 1,
            aim.name().to_uppercase(),
            aim.definition().replace('\n', "\n   ")
        ));
    }

    format!(
        "You are an expert classifier tasked with aligning university learning outcomes \
         with the Aims of a BYU Education.\n\n\
         The BYU Aims are:\n\n{}\
         Given the learning outcome provided by the user, determine how well it aligns with \
         EACH of these four aims.\n\
         Respond ONLY with a valid JSON object containing confidence scores (0-100) for each \
         aim, where 100 means complete confidence that the outcome aligns with that aim, and \
         0 means no alignment at all.\n\n\
         Example JSON format:\n\
         {{\n\
         \x20 \"Spiritually Strengthening\": 25,\n\
         \x20 \"Intellectually Enlarging\": 90,\n\
         \x20 \"Character Building\": 40,\n\
         \x20 \"Lifelong Learning and Service\": 60\n\
         }}",
        sections
    )
}

/// Build the per-record user instruction
pub fn user_prompt(outcome_text: &str) -> String {
    format!(
        "Analyze the following learning outcome and provide confidence scores for how well \
         it aligns with each BYU Aim:\n\n{}",
        outcome_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_every_aim() {
        let prompt = system_prompt();
        for aim in Aim::ALL {
            assert!(prompt.contains(&aim.name().to_uppercase()));
            assert!(prompt.contains(&format!("\"{}\"", aim.name())));
        }
    }

    #[test]
    fn test_user_prompt_embeds_text() {
        let prompt = user_prompt("Students will reason about algorithms");
        assert!(prompt.contains("Students will reason about algorithms"));
    }
}
