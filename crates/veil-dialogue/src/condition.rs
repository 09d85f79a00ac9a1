//! The condition gate on dialogue nodes, options, and inner voices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use veil_core::{TimeOfDay, WorldState};
use veil_quest::{QuestState, QuestStatus};

/// A conjunctive set of optional predicates over the session state.
///
/// Unset fields are always satisfied, so the default value is vacuously
/// true. Every populated field must pass; there is no "any of" form —
/// disjunction is expressed as sibling options in the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueConditions {
    /// Item ids that must all be held.
    pub required_items: Vec<String>,
    /// Clue ids that must all be discovered.
    pub required_clues: Vec<String>,
    /// Required status per quest id.
    pub quest_statuses: BTreeMap<String, QuestStatus>,
    /// Minimum value per skill name.
    pub min_skills: BTreeMap<String, i32>,
    /// Thought ids that must all be internalized.
    pub required_thoughts: Vec<String>,
    /// Required ambient emotional state.
    pub required_emotion: Option<String>,
    /// Times of day during which the gate passes. Empty means any time.
    pub allowed_times: Vec<TimeOfDay>,
    /// A (quest id, stage id) pair that must be the quest's active stage.
    pub active_stage: Option<(String, String)>,
    /// A (quest id, objective id) pair that must be completed.
    pub completed_objective: Option<(String, String)>,
    /// A (quest id, branch id) pair that must have been taken.
    pub taken_branch: Option<(String, String)>,
}

impl DialogueConditions {
    /// Create a vacuously true gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a held item.
    pub fn with_item(mut self, item_id: impl Into<String>) -> Self {
        self.required_items.push(item_id.into());
        self
    }

    /// Require a discovered clue.
    pub fn with_clue(mut self, clue_id: impl Into<String>) -> Self {
        self.required_clues.push(clue_id.into());
        self
    }

    /// Require a quest to have a specific status.
    pub fn with_quest_status(mut self, quest_id: impl Into<String>, status: QuestStatus) -> Self {
        self.quest_statuses.insert(quest_id.into(), status);
        self
    }

    /// Require a minimum skill value.
    pub fn with_min_skill(mut self, skill: impl Into<String>, minimum: i32) -> Self {
        self.min_skills.insert(skill.into(), minimum);
        self
    }

    /// Require an internalized thought.
    pub fn with_thought(mut self, thought_id: impl Into<String>) -> Self {
        self.required_thoughts.push(thought_id.into());
        self
    }

    /// Require an ambient emotional state.
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.required_emotion = Some(emotion.into());
        self
    }

    /// Allow a time of day. The first call narrows the gate from "any time".
    pub fn with_allowed_time(mut self, time: TimeOfDay) -> Self {
        self.allowed_times.push(time);
        self
    }

    /// Require a quest stage to be active.
    pub fn with_active_stage(
        mut self,
        quest_id: impl Into<String>,
        stage_id: impl Into<String>,
    ) -> Self {
        self.active_stage = Some((quest_id.into(), stage_id.into()));
        self
    }

    /// Require a completed objective.
    pub fn with_completed_objective(
        mut self,
        quest_id: impl Into<String>,
        objective_id: impl Into<String>,
    ) -> Self {
        self.completed_objective = Some((quest_id.into(), objective_id.into()));
        self
    }

    /// Require a taken branch.
    pub fn with_taken_branch(
        mut self,
        quest_id: impl Into<String>,
        branch_id: impl Into<String>,
    ) -> Self {
        self.taken_branch = Some((quest_id.into(), branch_id.into()));
        self
    }

    /// Whether no field is populated.
    pub fn is_empty(&self) -> bool {
        self.required_items.is_empty()
            && self.required_clues.is_empty()
            && self.quest_statuses.is_empty()
            && self.min_skills.is_empty()
            && self.required_thoughts.is_empty()
            && self.required_emotion.is_none()
            && self.allowed_times.is_empty()
            && self.active_stage.is_none()
            && self.completed_objective.is_none()
            && self.taken_branch.is_none()
    }

    /// Evaluate the full conjunction. `emotion` is the ambient emotional
    /// state of the conversation, if one is established.
    pub fn evaluate(
        &self,
        world: &WorldState,
        quests: &QuestState,
        emotion: Option<&str>,
    ) -> bool {
        self.clauses(world, quests, emotion)
            .into_iter()
            .all(|satisfied| satisfied)
    }

    /// The number of populated clauses that individually pass, used by
    /// entry-point selection to prefer the most specific true gate.
    pub fn specificity(
        &self,
        world: &WorldState,
        quests: &QuestState,
        emotion: Option<&str>,
    ) -> usize {
        self.clauses(world, quests, emotion)
            .into_iter()
            .filter(|satisfied| *satisfied)
            .count()
    }

    /// Evaluate each populated clause in isolation.
    fn clauses(
        &self,
        world: &WorldState,
        quests: &QuestState,
        emotion: Option<&str>,
    ) -> Vec<bool> {
        let mut results = Vec::new();

        if !self.required_items.is_empty() {
            results.push(self.required_items.iter().all(|i| world.has_item(i)));
        }
        if !self.required_clues.is_empty() {
            results.push(self.required_clues.iter().all(|c| world.has_clue(c)));
        }
        if !self.quest_statuses.is_empty() {
            results.push(self.quest_statuses.iter().all(|(quest_id, required)| {
                match quests.status(quest_id) {
                    Some(status) => status == *required,
                    // An unregistered quest has not been started
                    None => *required == QuestStatus::NotStarted,
                }
            }));
        }
        if !self.min_skills.is_empty() {
            results.push(
                self.min_skills
                    .iter()
                    .all(|(skill, minimum)| world.skill(skill) >= *minimum),
            );
        }
        if !self.required_thoughts.is_empty() {
            results.push(self.required_thoughts.iter().all(|t| world.has_thought(t)));
        }
        if let Some(required) = &self.required_emotion {
            results.push(emotion == Some(required.as_str()));
        }
        if !self.allowed_times.is_empty() {
            results.push(self.allowed_times.contains(&world.time_of_day()));
        }
        if let Some((quest_id, stage_id)) = &self.active_stage {
            results.push(quests.is_stage_active(quest_id, stage_id));
        }
        if let Some((quest_id, objective_id)) = &self.completed_objective {
            results.push(quests.is_objective_completed(quest_id, objective_id));
        }
        if let Some((quest_id, branch_id)) = &self.taken_branch {
            results.push(quests.has_taken_branch(quest_id, branch_id));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_quest::{Quest, QuestStage};

    fn world() -> WorldState {
        let mut world = WorldState::new();
        world.set_skill("empathy", 4);
        world.add_item("blue_tie");
        world.add_clue("boot_prints");
        world.add_thought("bad_cop");
        world.set_time_of_day(TimeOfDay::Evening);
        world
    }

    fn quests() -> QuestState {
        let mut quests = QuestState::new();
        quests.add_quest(
            &Quest::new("hanged_man", "The Hanged Man")
                .with_stage(QuestStage::new("s1", "The Body")),
        );
        quests
            .set_status("hanged_man", QuestStatus::InProgress)
            .unwrap();
        quests.set_active_stage("hanged_man", "s1").unwrap();
        quests
    }

    #[test]
    fn empty_gate_is_true() {
        let conditions = DialogueConditions::new();
        assert!(conditions.is_empty());
        assert!(conditions.evaluate(&world(), &quests(), None));
        assert_eq!(conditions.specificity(&world(), &quests(), None), 0);
    }

    #[test]
    fn conjunction_requires_all() {
        let conditions = DialogueConditions::new()
            .with_item("blue_tie")
            .with_min_skill("empathy", 3);
        assert!(conditions.evaluate(&world(), &quests(), None));

        let conditions = conditions.with_min_skill("authority", 1);
        assert!(!conditions.evaluate(&world(), &quests(), None));
        // The failing clause still leaves two satisfied
        assert_eq!(conditions.specificity(&world(), &quests(), None), 2);
    }

    #[test]
    fn missing_skill_counts_as_zero() {
        let conditions = DialogueConditions::new().with_min_skill("savoir_faire", 0);
        assert!(conditions.evaluate(&world(), &quests(), None));
        let conditions = DialogueConditions::new().with_min_skill("savoir_faire", 1);
        assert!(!conditions.evaluate(&world(), &quests(), None));
    }

    #[test]
    fn quest_clauses() {
        let conditions = DialogueConditions::new()
            .with_quest_status("hanged_man", QuestStatus::InProgress)
            .with_active_stage("hanged_man", "s1");
        assert!(conditions.evaluate(&world(), &quests(), None));

        let conditions =
            DialogueConditions::new().with_active_stage("hanged_man", "s2");
        assert!(!conditions.evaluate(&world(), &quests(), None));
    }

    #[test]
    fn unregistered_quest_counts_as_not_started() {
        let conditions =
            DialogueConditions::new().with_quest_status("side_job", QuestStatus::NotStarted);
        assert!(conditions.evaluate(&world(), &quests(), None));

        let conditions =
            DialogueConditions::new().with_quest_status("side_job", QuestStatus::InProgress);
        assert!(!conditions.evaluate(&world(), &quests(), None));
    }

    #[test]
    fn emotion_clause_needs_ambient_state() {
        let conditions = DialogueConditions::new().with_emotion("hostile");
        assert!(!conditions.evaluate(&world(), &quests(), None));
        assert!(conditions.evaluate(&world(), &quests(), Some("hostile")));
        assert!(!conditions.evaluate(&world(), &quests(), Some("calm")));
    }

    #[test]
    fn time_of_day_clause() {
        let conditions = DialogueConditions::new()
            .with_allowed_time(TimeOfDay::Evening)
            .with_allowed_time(TimeOfDay::Night);
        assert!(conditions.evaluate(&world(), &quests(), None));

        let conditions = DialogueConditions::new().with_allowed_time(TimeOfDay::Morning);
        assert!(!conditions.evaluate(&world(), &quests(), None));
    }

    #[test]
    fn specificity_counts_satisfied_clauses() {
        let conditions = DialogueConditions::new()
            .with_item("blue_tie")
            .with_clue("boot_prints")
            .with_thought("bad_cop")
            .with_min_skill("empathy", 4);
        assert_eq!(conditions.specificity(&world(), &quests(), None), 4);
    }
}
