//! The fixed four-aim classification taxonomy
//!
//! Every outcome is scored against these four aims. The declaration order is
//! the priority order used for every deterministic tie-break in the pipeline
//! (argmax over scores, modal aim over a course). It is defined once here and
//! never inferred at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four Aims of a BYU Education
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aim {
    SpirituallyStrengthening,
    IntellectuallyEnlarging,
    CharacterBuilding,
    LifelongLearningAndService,
}

impl Aim {
    /// All aims in fixed priority order (highest priority first)
    pub const ALL: [Aim; 4] = [
        Aim::SpirituallyStrengthening,
        Aim::IntellectuallyEnlarging,
        Aim::CharacterBuilding,
        Aim::LifelongLearningAndService,
    ];

    /// Fallback aim assigned to records with empty outcome text.
    ///
    /// Fixed to the lowest-priority aim; never inferred from an empty prompt.
    pub const FALLBACK: Aim = Aim::LifelongLearningAndService;

    /// Human-readable name, as it appears in oracle responses and output tables
    pub fn name(&self) -> &'static str {
        match self {
            Aim::SpirituallyStrengthening => "Spiritually Strengthening",
            Aim::IntellectuallyEnlarging => "Intellectually Enlarging",
            Aim::CharacterBuilding => "Character Building",
            Aim::LifelongLearningAndService => "Lifelong Learning and Service",
        }
    }

    /// Name with spaces replaced by underscores, used in CSV column names
    pub fn column_key(&self) -> &'static str {
        match self {
            Aim::SpirituallyStrengthening => "Spiritually_Strengthening",
            Aim::IntellectuallyEnlarging => "Intellectually_Enlarging",
            Aim::CharacterBuilding => "Character_Building",
            Aim::LifelongLearningAndService => "Lifelong_Learning_and_Service",
        }
    }

    /// Parse an aim from its human-readable name
    pub fn from_name(name: &str) -> Option<Aim> {
        Aim::ALL.iter().copied().find(|a| a.name() == name.trim())
    }

    /// Detailed definition used in both stage prompts
    pub fn definition(&self) -> &'static str {
        match self {
            Aim::SpirituallyStrengthening => {
                "This aim focuses on building testimonies of the restored gospel of Jesus Christ. Learning outcomes that:\n\
                 - Encourage learning by both study and faith\n\
                 - Integrate gospel perspectives with academic subjects\n\
                 - Help students develop personal testimonies\n\
                 - Enable students to frame questions in faithful ways\n\
                 - Connect academic disciplines with spiritual insights\n\
                 - Strengthen religious understanding and commitment"
            }
            Aim::IntellectuallyEnlarging => {
                "This aim focuses on expanding intellectual capabilities and academic excellence. Learning outcomes that:\n\
                 - Develop critical thinking, reasoning, and analytical skills\n\
                 - Build effective written and oral communication abilities\n\
                 - Foster quantitative reasoning and research methodology\n\
                 - Promote understanding of broad areas of human knowledge\n\
                 - Develop depth and competence in a specific area or discipline\n\
                 - Integrate theory with practice and abstract concepts with real-world applications\n\
                 - Build academic skills like writing, analysis, laboratory techniques, research methods"
            }
            Aim::CharacterBuilding => {
                "This aim focuses on developing moral virtues and Christlike attributes. Learning outcomes that:\n\
                 - Foster integrity, honesty, and ethical behavior\n\
                 - Develop self-discipline, self-control, and personal responsibility\n\
                 - Cultivate compassion, service, and respect for others\n\
                 - Build courage to defend truth and righteous principles\n\
                 - Promote modesty, reverence, and other moral virtues\n\
                 - Encourage personal wholeness and integration of knowledge with conduct"
            }
            Aim::LifelongLearningAndService => {
                "This aim focuses on preparing students for ongoing learning and contribution. Learning outcomes that:\n\
                 - Instill a love of learning that continues beyond formal education\n\
                 - Prepare students to continue self-education throughout life\n\
                 - Develop a desire to use knowledge and skills to serve others\n\
                 - Foster commitment to family, community, church, and society\n\
                 - Promote an ethic of service rather than self-interest\n\
                 - Prepare students to apply their education to solve real-world problems"
            }
        }
    }

    /// Aims other than `modal`, in priority order.
    ///
    /// These are the suggestion targets for a course whose modal aim is `modal`.
    pub fn others(modal: Aim) -> Vec<Aim> {
        Aim::ALL.iter().copied().filter(|a| *a != modal).collect()
    }
}

impl fmt::Display for Aim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
