//! The response stream handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::check::SkillCheckOutcome;
use crate::node::DialogueOption;

/// An option as presented to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedOption {
    /// Option id, passed back on selection.
    pub id: String,
    /// Player-facing text.
    pub text: String,
    /// Primary skill of the option's check, unless the check is hidden.
    pub skill_check: Option<String>,
}

impl PresentedOption {
    /// Build the player-facing view of an option.
    pub fn from_option(option: &DialogueOption) -> Self {
        Self {
            id: option.id.clone(),
            text: option.text.clone(),
            skill_check: option
                .skill_check
                .as_ref()
                .filter(|c| !c.hidden)
                .map(|c| c.primary_skill.clone()),
        }
    }
}

/// One record in the ordered response stream.
///
/// The stream is already fully resolved; the presentation layer animates
/// it however it likes, there is no suspension point in here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DialogueResponse {
    /// A character speaking.
    Speech {
        /// Speaker id.
        speaker: String,
        /// Spoken text.
        text: String,
        /// Emotional tone of the line.
        emotion: String,
    },
    /// An inner voice interjecting.
    InnerVoice {
        /// The voice speaking.
        voice_type: String,
        /// What it says.
        text: String,
    },
    /// The options available to the player.
    Options {
        /// Selectable options in authored order.
        options: Vec<PresentedOption>,
    },
    /// The verdict of a resolved skill check.
    SkillCheck(SkillCheckOutcome),
}

impl DialogueResponse {
    /// A system-voiced speech line, used for fallbacks.
    pub fn system(text: impl Into<String>) -> Self {
        Self::Speech {
            speaker: "system".to_string(),
            text: text.into(),
            emotion: "neutral".to_string(),
        }
    }
}
