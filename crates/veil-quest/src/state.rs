//! Per-session quest progression state.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Quest;
use crate::error::{QuestError, QuestResult};

/// Status of a quest in the progression state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuestStatus {
    /// Registered but not yet started.
    #[default]
    NotStarted,
    /// Started and not yet concluded.
    InProgress,
    /// Concluded successfully. Terminal.
    Completed,
    /// Concluded unsuccessfully. Terminal.
    Failed,
}

impl QuestStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "Not Started"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Progression record for one quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestRecord {
    /// Authored definition, copied from the catalog when the quest is added.
    quest: Quest,
    status: QuestStatus,
    active_stage: Option<String>,
    completed_objectives: BTreeSet<String>,
    taken_branches: BTreeSet<String>,
    quest_items: BTreeSet<String>,
}

impl QuestRecord {
    fn new(quest: Quest) -> Self {
        Self {
            quest,
            status: QuestStatus::NotStarted,
            active_stage: None,
            completed_objectives: BTreeSet::new(),
            taken_branches: BTreeSet::new(),
            quest_items: BTreeSet::new(),
        }
    }
}

/// The arena of quest progression records, keyed by quest id.
///
/// All mutation goes through these methods so the declared-objective
/// invariant cannot be bypassed by writing into the collections directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestState {
    records: BTreeMap<String, QuestRecord>,
}

impl QuestState {
    /// Create an empty quest state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quest, copying its authored definition.
    ///
    /// A new id initializes status to NotStarted and all collections to
    /// empty. Re-adding an existing id refreshes the authored copy but
    /// never resets progress.
    pub fn add_quest(&mut self, quest: &Quest) {
        match self.records.get_mut(&quest.id) {
            Some(record) => record.quest = quest.clone(),
            None => {
                self.records
                    .insert(quest.id.clone(), QuestRecord::new(quest.clone()));
            }
        }
    }

    /// Whether a quest is registered.
    pub fn contains(&self, quest_id: &str) -> bool {
        self.records.contains_key(quest_id)
    }

    /// The authored definition held for a quest.
    pub fn quest(&self, quest_id: &str) -> Option<&Quest> {
        self.records.get(quest_id).map(|r| &r.quest)
    }

    /// A quest's status, if registered.
    pub fn status(&self, quest_id: &str) -> Option<QuestStatus> {
        self.records.get(quest_id).map(|r| r.status)
    }

    /// Set a quest's status.
    pub fn set_status(&mut self, quest_id: &str, status: QuestStatus) -> QuestResult<()> {
        let record = self
            .records
            .get_mut(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;
        record.status = status;
        Ok(())
    }

    /// The active stage id for a quest, if one is set.
    pub fn active_stage(&self, quest_id: &str) -> Option<&str> {
        self.records
            .get(quest_id)
            .and_then(|r| r.active_stage.as_deref())
    }

    /// Set the active stage for a quest.
    pub fn set_active_stage(&mut self, quest_id: &str, stage_id: &str) -> QuestResult<()> {
        let record = self
            .records
            .get_mut(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;
        record.active_stage = Some(stage_id.to_string());
        Ok(())
    }

    /// Whether a specific stage is the quest's active stage.
    pub fn is_stage_active(&self, quest_id: &str, stage_id: &str) -> bool {
        self.active_stage(quest_id) == Some(stage_id)
    }

    /// Mark an objective complete.
    ///
    /// Rejected unless the objective id is declared in some stage of the
    /// quest. Idempotent once accepted.
    pub fn add_completed_objective(
        &mut self,
        quest_id: &str,
        objective_id: &str,
    ) -> QuestResult<()> {
        let record = self
            .records
            .get_mut(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;
        if !record.quest.declares_objective(objective_id) {
            return Err(QuestError::UndeclaredObjective {
                quest_id: quest_id.to_string(),
                objective_id: objective_id.to_string(),
            });
        }
        record.completed_objectives.insert(objective_id.to_string());
        Ok(())
    }

    /// Whether an objective is complete.
    pub fn is_objective_completed(&self, quest_id: &str, objective_id: &str) -> bool {
        self.records
            .get(quest_id)
            .is_some_and(|r| r.completed_objectives.contains(objective_id))
    }

    /// Completed objective ids for a quest, in sorted order.
    pub fn completed_objectives(&self, quest_id: &str) -> impl Iterator<Item = &str> {
        self.records
            .get(quest_id)
            .into_iter()
            .flat_map(|r| r.completed_objectives.iter().map(String::as_str))
    }

    /// Record a branch as taken.
    pub fn add_branch(&mut self, quest_id: &str, branch_id: &str) -> QuestResult<()> {
        let record = self
            .records
            .get_mut(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;
        record.taken_branches.insert(branch_id.to_string());
        Ok(())
    }

    /// Whether a branch has been taken.
    pub fn has_taken_branch(&self, quest_id: &str, branch_id: &str) -> bool {
        self.records
            .get(quest_id)
            .is_some_and(|r| r.taken_branches.contains(branch_id))
    }

    /// Associate an item with a quest.
    pub fn add_quest_item(&mut self, quest_id: &str, item_id: &str) -> QuestResult<()> {
        let record = self
            .records
            .get_mut(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;
        record.quest_items.insert(item_id.to_string());
        Ok(())
    }

    /// Remove an item association. Returns true if it was present.
    pub fn remove_quest_item(&mut self, quest_id: &str, item_id: &str) -> QuestResult<bool> {
        let record = self
            .records
            .get_mut(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;
        Ok(record.quest_items.remove(item_id))
    }

    /// Whether an item is associated with a quest.
    pub fn has_quest_item(&self, quest_id: &str, item_id: &str) -> bool {
        self.records
            .get(quest_id)
            .is_some_and(|r| r.quest_items.contains(item_id))
    }

    /// Ids of quests with a given status, in id order.
    pub fn quests_with_status(&self, status: QuestStatus) -> Vec<&str> {
        self.records
            .iter()
            .filter(|(_, r)| r.status == status)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Ids of in-progress quests, in id order.
    pub fn active_quests(&self) -> Vec<&str> {
        self.quests_with_status(QuestStatus::InProgress)
    }

    /// Ids of completed quests, in id order.
    pub fn completed_quests(&self) -> Vec<&str> {
        self.quests_with_status(QuestStatus::Completed)
    }

    /// Ids of failed quests, in id order.
    pub fn failed_quests(&self) -> Vec<&str> {
        self.quests_with_status(QuestStatus::Failed)
    }

    /// Number of registered quests.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no quests are registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
