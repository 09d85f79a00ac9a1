//! The quest state machine.
//!
//! `QuestManager` owns the static catalog and the notification queue, and
//! drives every status transition through a `QuestState` passed in by the
//! caller. Transitions are explicit: the re-evaluation scan reports
//! progress but never advances or completes a quest on its own.

use serde::{Deserialize, Serialize};

use veil_core::Effect;

use crate::catalog::{Quest, QuestCatalog, QuestStage};
use crate::error::{QuestError, QuestResult};
use crate::notification::{NotificationKind, NotificationQueue};
use crate::state::{QuestState, QuestStatus};

/// Progress summary for one in-progress quest, produced by
/// [`QuestManager::check_all_updates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgressReport {
    /// Quest id.
    pub quest_id: String,
    /// All required objectives of the active stage are complete.
    pub stage_complete: bool,
    /// All required objectives of every stage are complete.
    pub quest_complete: bool,
}

/// Drives quest transitions and emits notifications.
#[derive(Debug, Clone, Default)]
pub struct QuestManager {
    catalog: QuestCatalog,
    notifications: NotificationQueue,
}

impl QuestManager {
    /// Create a manager over a static quest catalog.
    pub fn new(catalog: QuestCatalog) -> Self {
        Self {
            catalog,
            notifications: NotificationQueue::new(),
        }
    }

    /// The static catalog.
    pub fn catalog(&self) -> &QuestCatalog {
        &self.catalog
    }

    /// The notification queue.
    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Mutable access to the notification queue, for polling and eviction.
    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    /// Main-story quests in the catalog, in id order.
    pub fn main_quests(&self) -> Vec<&Quest> {
        self.catalog.all().filter(|q| q.is_main_quest).collect()
    }

    /// Side quests in the catalog, in id order.
    pub fn side_quests(&self) -> Vec<&Quest> {
        self.catalog.all().filter(|q| !q.is_main_quest).collect()
    }

    /// Non-hidden quests in the catalog, in id order.
    pub fn visible_quests(&self) -> Vec<&Quest> {
        self.catalog.all().filter(|q| !q.is_hidden).collect()
    }

    /// Register a quest in the progression state without starting it.
    pub fn add_quest(&mut self, quest_id: &str, state: &mut QuestState) -> QuestResult<()> {
        let quest = self.lookup(quest_id, state)?;
        state.add_quest(&quest);
        Ok(())
    }

    /// Start a quest: materialize it from the catalog if absent, set it
    /// InProgress with the first stage active, and emit QuestStarted.
    ///
    /// Starting an already-InProgress quest is a no-op; terminal quests
    /// are rejected.
    pub fn start_quest(&mut self, quest_id: &str, state: &mut QuestState) -> QuestResult<()> {
        let quest = self.lookup(quest_id, state)?;
        match state.status(quest_id) {
            Some(status) if status.is_terminal() => {
                return Err(QuestError::AlreadyTerminal(
                    quest_id.to_string(),
                    status.to_string(),
                ));
            }
            Some(QuestStatus::InProgress) => return Ok(()),
            _ => {}
        }

        let first_stage = quest
            .stages
            .first()
            .map(|s| s.id.clone())
            .ok_or_else(|| QuestError::NoStages(quest_id.to_string()))?;

        state.add_quest(&quest);
        state.set_status(quest_id, QuestStatus::InProgress)?;
        state.set_active_stage(quest_id, &first_stage)?;

        self.notifications.push(
            quest_id,
            &quest.title,
            format!("New quest started: {}", quest.title),
            NotificationKind::QuestStarted,
        );
        Ok(())
    }

    /// Advance a quest to a later stage.
    ///
    /// The target stage's index must be strictly greater than the active
    /// stage's index in authored order; anything else is rejected. Emits
    /// QuestUpdated, plus ObjectiveAdded when the new stage carries
    /// notification text announcing its objectives.
    pub fn advance_stage(
        &mut self,
        quest_id: &str,
        stage_id: &str,
        state: &mut QuestState,
    ) -> QuestResult<()> {
        self.require_in_progress(quest_id, state)?;
        let quest = state
            .quest(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;

        let target_idx = quest
            .stage_index(stage_id)
            .ok_or_else(|| QuestError::UnknownStage {
                quest_id: quest_id.to_string(),
                stage_id: stage_id.to_string(),
            })?;

        if let Some(active) = state.active_stage(quest_id)
            && let Some(active_idx) = quest.stage_index(active)
            && target_idx <= active_idx
        {
            return Err(QuestError::NonForwardStage {
                quest_id: quest_id.to_string(),
                stage_id: stage_id.to_string(),
            });
        }

        let title = quest.title.clone();
        let stage = &quest.stages[target_idx];
        let message = if stage.notification_text.is_empty() {
            format!("Quest updated: {}", stage.title)
        } else {
            format!("Quest updated: {}", stage.notification_text)
        };
        let objective_note = (!stage.notification_text.is_empty())
            .then(|| format!("New objective: {}", stage.notification_text));

        state.set_active_stage(quest_id, stage_id)?;
        self.notifications
            .push(quest_id, title.clone(), message, NotificationKind::QuestUpdated);
        if let Some(note) = objective_note {
            self.notifications
                .push(quest_id, title, note, NotificationKind::ObjectiveAdded);
        }
        Ok(())
    }

    /// Complete an objective, returning its completion events for the
    /// caller to dispatch.
    ///
    /// Rejected when the quest is not in progress or the objective id is
    /// not declared in any stage of the quest.
    pub fn complete_objective(
        &mut self,
        quest_id: &str,
        objective_id: &str,
        state: &mut QuestState,
    ) -> QuestResult<Vec<Effect>> {
        self.require_in_progress(quest_id, state)?;
        state.add_completed_objective(quest_id, objective_id)?;

        let quest = state
            .quest(quest_id)
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))?;
        let title = quest.title.clone();
        let (description, events) = quest
            .objective(objective_id)
            .map(|o| (o.description.clone(), o.completion_events.clone()))
            .unwrap_or_default();

        self.notifications.push(
            quest_id,
            title,
            format!("Objective completed: {description}"),
            NotificationKind::ObjectiveCompleted,
        );
        Ok(events)
    }

    /// Complete a quest and emit QuestCompleted.
    ///
    /// Reward application is left to an external collaborator reacting to
    /// the transition.
    pub fn complete_quest(&mut self, quest_id: &str, state: &mut QuestState) -> QuestResult<()> {
        self.conclude(quest_id, state, QuestStatus::Completed)
    }

    /// Fail a quest and emit QuestFailed.
    pub fn fail_quest(&mut self, quest_id: &str, state: &mut QuestState) -> QuestResult<()> {
        self.conclude(quest_id, state, QuestStatus::Failed)
    }

    /// Record a branch as taken, materializing the quest from the catalog
    /// if it is not yet in the state. No notification is emitted.
    pub fn unlock_branch(
        &mut self,
        quest_id: &str,
        branch_id: &str,
        state: &mut QuestState,
    ) -> QuestResult<()> {
        if !state.contains(quest_id) {
            let quest = self.lookup(quest_id, state)?;
            state.add_quest(&quest);
        }
        state.add_branch(quest_id, branch_id)
    }

    /// The state-wide progress re-evaluation: a read-only scan of every
    /// in-progress quest. It reports which active stages (and which whole
    /// quests) have all required objectives complete, and performs no
    /// transitions itself.
    pub fn check_all_updates(&self, state: &QuestState) -> Vec<QuestProgressReport> {
        let mut reports = Vec::new();
        for quest_id in state.active_quests() {
            let Some(quest) = state.quest(quest_id) else {
                continue;
            };
            let stage_complete = state
                .active_stage(quest_id)
                .and_then(|stage_id| quest.stage(stage_id))
                .is_some_and(|stage| stage_required_complete(stage, state, quest_id));
            let quest_complete = quest
                .stages
                .iter()
                .all(|stage| stage_required_complete(stage, state, quest_id));
            reports.push(QuestProgressReport {
                quest_id: quest_id.to_string(),
                stage_complete,
                quest_complete,
            });
        }
        reports
    }

    fn conclude(
        &mut self,
        quest_id: &str,
        state: &mut QuestState,
        status: QuestStatus,
    ) -> QuestResult<()> {
        match state.status(quest_id) {
            None => return Err(QuestError::UnknownQuest(quest_id.to_string())),
            Some(current @ (QuestStatus::Completed | QuestStatus::Failed)) => {
                return Err(QuestError::AlreadyTerminal(
                    quest_id.to_string(),
                    current.to_string(),
                ));
            }
            Some(QuestStatus::NotStarted) => {
                return Err(QuestError::NotInProgress(quest_id.to_string()));
            }
            Some(QuestStatus::InProgress) => {}
        }

        let title = state
            .quest(quest_id)
            .map(|q| q.title.clone())
            .unwrap_or_default();
        state.set_status(quest_id, status)?;

        let (message, kind) = match status {
            QuestStatus::Completed => (
                format!("Quest completed: {title}"),
                NotificationKind::QuestCompleted,
            ),
            _ => (
                format!("Quest failed: {title}"),
                NotificationKind::QuestFailed,
            ),
        };
        self.notifications.push(quest_id, title, message, kind);
        Ok(())
    }

    fn require_in_progress(&self, quest_id: &str, state: &QuestState) -> QuestResult<()> {
        match state.status(quest_id) {
            None => Err(QuestError::UnknownQuest(quest_id.to_string())),
            Some(QuestStatus::InProgress) => Ok(()),
            Some(_) => Err(QuestError::NotInProgress(quest_id.to_string())),
        }
    }

    /// Resolve a quest definition: the state's copy if registered, else
    /// the catalog's.
    fn lookup(&self, quest_id: &str, state: &QuestState) -> QuestResult<Quest> {
        state
            .quest(quest_id)
            .or_else(|| self.catalog.get(quest_id))
            .cloned()
            .ok_or_else(|| QuestError::UnknownQuest(quest_id.to_string()))
    }
}

fn stage_required_complete(stage: &QuestStage, state: &QuestState, quest_id: &str) -> bool {
    stage
        .objectives
        .iter()
        .filter(|o| !o.is_optional)
        .all(|o| state.is_objective_completed(quest_id, &o.id))
}
