//! Error types for quest operations.

use thiserror::Error;

/// Result type for quest operations.
pub type QuestResult<T> = Result<T, QuestError>;

/// Errors that can occur during quest progression.
///
/// All of these are recoverable: a rejected operation leaves quest state
/// untouched and the session continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestError {
    /// The quest id is known neither to the state nor to the catalog.
    #[error("unknown quest: {0}")]
    UnknownQuest(String),

    /// The quest is already in a terminal state.
    #[error("quest '{0}' is already {1}")]
    AlreadyTerminal(String, String),

    /// The quest is not in progress.
    #[error("quest '{0}' is not in progress")]
    NotInProgress(String),

    /// The objective id is not declared in any stage of the quest.
    #[error("objective '{objective_id}' is not declared in quest '{quest_id}'")]
    UndeclaredObjective {
        /// Quest id.
        quest_id: String,
        /// Rejected objective id.
        objective_id: String,
    },

    /// The target stage does not exist in the quest.
    #[error("stage '{stage_id}' not found in quest '{quest_id}'")]
    UnknownStage {
        /// Quest id.
        quest_id: String,
        /// Rejected stage id.
        stage_id: String,
    },

    /// Stage advancement must be strictly forward in authored order.
    #[error("stage '{stage_id}' is not forward of the active stage in quest '{quest_id}'")]
    NonForwardStage {
        /// Quest id.
        quest_id: String,
        /// Rejected stage id.
        stage_id: String,
    },

    /// The quest has no stages to start.
    #[error("quest '{0}' has no stages")]
    NoStages(String),
}
