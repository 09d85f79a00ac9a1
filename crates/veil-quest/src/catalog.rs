//! Authored quest definitions.
//!
//! These types are produced by the content loader and treated as
//! read-only by the narrative core. Progression lives in
//! [`crate::state::QuestState`], never here.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use veil_core::Effect;

/// How prominently a quest features in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Importance {
    /// The story cannot conclude without it.
    Critical,
    /// A substantial optional arc.
    Major,
    /// A small diversion.
    #[default]
    Minor,
}

/// Rewards granted when a quest completes.
///
/// Pure data: the core emits the Completed transition and leaves
/// application of these to an external collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestRewards {
    /// Item ids granted.
    pub items: Vec<String>,
    /// Skill grants by name.
    pub skill_rewards: HashMap<String, i32>,
    /// Relationship adjustments by npc id.
    pub relationship_changes: HashMap<String, i32>,
    /// Experience points granted.
    pub experience: Option<i32>,
    /// Location ids unlocked.
    pub unlocked_locations: Vec<String>,
    /// Dialogue node ids unlocked.
    pub unlocked_dialogues: Vec<String>,
}

/// An atomic, completable unit of progress scoped to a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    /// Identity, unique within its stage.
    pub id: String,
    /// Player-facing description.
    pub description: String,
    /// Optional objectives do not block stage completion.
    pub is_optional: bool,
    /// Effects fired once when this objective completes.
    pub completion_events: Vec<Effect>,
}

impl Objective {
    /// Create a required objective with no completion events.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            is_optional: false,
            completion_events: Vec::new(),
        }
    }

    /// Mark the objective as optional.
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Add a completion event.
    pub fn with_completion_event(mut self, effect: Effect) -> Self {
        self.completion_events.push(effect);
        self
    }
}

/// An ordered phase of a quest. Only one stage is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestStage {
    /// Identity, unique within its quest.
    pub id: String,
    /// Stage title.
    pub title: String,
    /// Player-facing description.
    pub description: String,
    /// Text used in the QuestUpdated notification when this stage activates.
    pub notification_text: String,
    /// Objectives in authored order.
    pub objectives: Vec<Objective>,
}

impl QuestStage {
    /// Create an empty stage.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            notification_text: String::new(),
            objectives: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the notification text.
    pub fn with_notification_text(mut self, text: impl Into<String>) -> Self {
        self.notification_text = text.into();
        self
    }

    /// Add an objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Look up an objective by id.
    pub fn objective(&self, objective_id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == objective_id)
    }
}

/// An authored quest: identity, presentation text, and ordered stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    /// Quest id.
    pub id: String,
    /// Quest title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// One-line description for list views.
    pub short_description: String,
    /// Importance tier.
    pub importance: Importance,
    /// Whether this is a main-story quest.
    pub is_main_quest: bool,
    /// Hidden quests are excluded from visible listings.
    pub is_hidden: bool,
    /// Stages in authored order.
    pub stages: Vec<QuestStage>,
    /// Completion rewards, applied externally.
    pub rewards: QuestRewards,
    /// Npc ids involved in the quest.
    pub related_npcs: Vec<String>,
    /// Location ids involved in the quest.
    pub related_locations: Vec<String>,
}

impl Quest {
    /// Create a minimal quest with no stages.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            short_description: String::new(),
            importance: Importance::Minor,
            is_main_quest: false,
            is_hidden: false,
            stages: Vec::new(),
            rewards: QuestRewards::default(),
            related_npcs: Vec::new(),
            related_locations: Vec::new(),
        }
    }

    /// Set the full description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the importance tier.
    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// Mark as a main-story quest.
    pub fn main_quest(mut self) -> Self {
        self.is_main_quest = true;
        self
    }

    /// Mark as hidden.
    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    /// Add a stage.
    pub fn with_stage(mut self, stage: QuestStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Set the rewards.
    pub fn with_rewards(mut self, rewards: QuestRewards) -> Self {
        self.rewards = rewards;
        self
    }

    /// Look up a stage by id.
    pub fn stage(&self, stage_id: &str) -> Option<&QuestStage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Index of a stage within the authored order.
    pub fn stage_index(&self, stage_id: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.id == stage_id)
    }

    /// Whether an objective id is declared in any stage of this quest.
    pub fn declares_objective(&self, objective_id: &str) -> bool {
        self.stages.iter().any(|s| s.objective(objective_id).is_some())
    }

    /// Find an objective by id across all stages.
    pub fn objective(&self, objective_id: &str) -> Option<&Objective> {
        self.stages.iter().find_map(|s| s.objective(objective_id))
    }
}

/// Read-only lookup from quest id to its authored definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestCatalog {
    quests: BTreeMap<String, Quest>,
}

impl QuestCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a quest, keyed by its own id.
    pub fn insert(&mut self, quest: Quest) {
        self.quests.insert(quest.id.clone(), quest);
    }

    /// Builder-style insert.
    pub fn with_quest(mut self, quest: Quest) -> Self {
        self.insert(quest);
        self
    }

    /// Look up a quest by id.
    pub fn get(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.get(quest_id)
    }

    /// All quests in id order.
    pub fn all(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Number of quests in the catalog.
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quest() -> Quest {
        Quest::new("hanged_man", "The Hanged Man")
            .with_description("Find out who lynched the man behind the hostel.")
            .with_importance(Importance::Critical)
            .main_quest()
            .with_stage(
                QuestStage::new("s1", "The Body")
                    .with_notification_text("Examine the body")
                    .with_objective(Objective::new("inspect_body", "Inspect the hanged man"))
                    .with_objective(
                        Objective::new("photo", "Photograph the scene").optional(),
                    ),
            )
            .with_stage(
                QuestStage::new("s2", "Witnesses")
                    .with_notification_text("Question the witnesses")
                    .with_objective(Objective::new("talk_garte", "Talk to the cafeteria manager")),
            )
    }

    #[test]
    fn stage_lookup_and_order() {
        let quest = sample_quest();
        assert_eq!(quest.stage_index("s1"), Some(0));
        assert_eq!(quest.stage_index("s2"), Some(1));
        assert!(quest.stage("s3").is_none());
    }

    #[test]
    fn objective_declaration() {
        let quest = sample_quest();
        assert!(quest.declares_objective("inspect_body"));
        assert!(quest.declares_objective("talk_garte"));
        assert!(!quest.declares_objective("unknown"));
    }

    #[test]
    fn optional_flag() {
        let quest = sample_quest();
        assert!(quest.objective("photo").unwrap().is_optional);
        assert!(!quest.objective("inspect_body").unwrap().is_optional);
    }

    #[test]
    fn catalog_lookup() {
        let catalog = QuestCatalog::new().with_quest(sample_quest());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("hanged_man").is_some());
        assert!(catalog.get("missing_quest").is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let catalog = QuestCatalog::new().with_quest(sample_quest());
        let json = serde_json::to_string(&catalog).unwrap();
        let back: QuestCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get("hanged_man").unwrap().stages.len(), 2);
    }
}
