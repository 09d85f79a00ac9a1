//! Authored dialogue graph types.
//!
//! Nodes and options are produced by the content loader and never mutated
//! by the session; traversal position lives in
//! [`crate::session::DialogueSession`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use veil_core::Effect;

use crate::condition::DialogueConditions;

/// A skill check gating a dialogue option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedSkillCheck {
    /// Difficulty before emotional modifiers.
    pub base_difficulty: i32,
    /// Skill whose full value contributes to the bonus.
    pub primary_skill: String,
    /// Secondary skills contributing a weighted fraction of their value.
    pub supporting_skills: Vec<(String, f32)>,
    /// Difficulty delta applied when the node's emotional state matches.
    pub emotional_modifiers: BTreeMap<String, i32>,
    /// White checks are retryable by authoring convention. Not enforced here.
    pub white_check: bool,
    /// Hidden checks are not surfaced in option listings.
    pub hidden: bool,
}

impl EnhancedSkillCheck {
    /// Create a check with no supporting skills or modifiers.
    pub fn new(primary_skill: impl Into<String>, base_difficulty: i32) -> Self {
        Self {
            base_difficulty,
            primary_skill: primary_skill.into(),
            supporting_skills: Vec::new(),
            emotional_modifiers: BTreeMap::new(),
            white_check: false,
            hidden: false,
        }
    }

    /// Add a supporting skill with a contribution weight.
    pub fn with_supporting_skill(mut self, skill: impl Into<String>, weight: f32) -> Self {
        self.supporting_skills.push((skill.into(), weight));
        self
    }

    /// Add an emotional difficulty modifier.
    pub fn with_emotional_modifier(mut self, emotion: impl Into<String>, delta: i32) -> Self {
        self.emotional_modifiers.insert(emotion.into(), delta);
        self
    }

    /// Mark as a white (retryable) check.
    pub fn white(mut self) -> Self {
        self.white_check = true;
        self
    }

    /// Mark as hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// An interjection from one of the player's inner voices.
///
/// Triggers when the named voice's skill value meets the requirement and
/// the condition gate (if any) passes. With neither set it always fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InnerVoiceComment {
    /// The voice speaking, named after the skill it personifies.
    pub voice_type: String,
    /// What the voice says.
    pub text: String,
    /// Minimum value of the voice's skill for the comment to fire.
    pub skill_requirement: Option<i32>,
    /// Additional condition gate.
    pub trigger_condition: Option<DialogueConditions>,
}

impl InnerVoiceComment {
    /// Create an unconditional comment.
    pub fn new(voice_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            voice_type: voice_type.into(),
            text: text.into(),
            skill_requirement: None,
            trigger_condition: None,
        }
    }

    /// Require a minimum skill value.
    pub fn with_skill_requirement(mut self, minimum: i32) -> Self {
        self.skill_requirement = Some(minimum);
        self
    }

    /// Gate on a condition set.
    pub fn with_trigger_condition(mut self, conditions: DialogueConditions) -> Self {
        self.trigger_condition = Some(conditions);
        self
    }
}

/// A selectable reply within a dialogue node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueOption {
    /// Identity, unique within the owning node.
    pub id: String,
    /// Player-facing text.
    pub text: String,
    /// Node shown next when no more specific route applies.
    pub next_node: Option<String>,
    /// Check resolved when the option is selected.
    pub skill_check: Option<EnhancedSkillCheck>,
    /// Emotional shift recorded against the current node on selection.
    pub emotional_impact: BTreeMap<String, i32>,
    /// Gate deciding whether the option is listed at all.
    pub conditions: DialogueConditions,
    /// Effects dispatched in declaration order on selection.
    pub consequences: Vec<Effect>,
    /// Inner-voice reactions emitted after selection.
    pub inner_voice_reactions: Vec<InnerVoiceComment>,
    /// Node shown after a successful check.
    pub success_node: Option<String>,
    /// Node shown after a failed check.
    pub failure_node: Option<String>,
    /// Node shown after a critical success, when declared.
    pub critical_success_node: Option<String>,
    /// Node shown after a critical failure, when declared.
    pub critical_failure_node: Option<String>,
}

impl DialogueOption {
    /// Create a bare option with no routing or consequences.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_node: None,
            skill_check: None,
            emotional_impact: BTreeMap::new(),
            conditions: DialogueConditions::default(),
            consequences: Vec::new(),
            inner_voice_reactions: Vec::new(),
            success_node: None,
            failure_node: None,
            critical_success_node: None,
            critical_failure_node: None,
        }
    }

    /// Set the default next node.
    pub fn with_next_node(mut self, node_id: impl Into<String>) -> Self {
        self.next_node = Some(node_id.into());
        self
    }

    /// Attach a skill check.
    pub fn with_skill_check(mut self, check: EnhancedSkillCheck) -> Self {
        self.skill_check = Some(check);
        self
    }

    /// Record an emotional shift applied to the node on selection.
    pub fn with_emotional_impact(mut self, emotion: impl Into<String>, delta: i32) -> Self {
        self.emotional_impact.insert(emotion.into(), delta);
        self
    }

    /// Set the condition gate.
    pub fn with_conditions(mut self, conditions: DialogueConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Add a consequence effect.
    pub fn with_consequence(mut self, effect: Effect) -> Self {
        self.consequences.push(effect);
        self
    }

    /// Add an inner-voice reaction.
    pub fn with_reaction(mut self, reaction: InnerVoiceComment) -> Self {
        self.inner_voice_reactions.push(reaction);
        self
    }

    /// Set the success route.
    pub fn with_success_node(mut self, node_id: impl Into<String>) -> Self {
        self.success_node = Some(node_id.into());
        self
    }

    /// Set the failure route.
    pub fn with_failure_node(mut self, node_id: impl Into<String>) -> Self {
        self.failure_node = Some(node_id.into());
        self
    }

    /// Set the critical success route.
    pub fn with_critical_success_node(mut self, node_id: impl Into<String>) -> Self {
        self.critical_success_node = Some(node_id.into());
        self
    }

    /// Set the critical failure route.
    pub fn with_critical_failure_node(mut self, node_id: impl Into<String>) -> Self {
        self.critical_failure_node = Some(node_id.into());
        self
    }
}

/// One authored beat of conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Node id, unique within the graph.
    pub id: String,
    /// Spoken text.
    pub text: String,
    /// Speaker id; matched against the npc id at session start.
    pub speaker: String,
    /// Emotional tone of the node, feeding difficulty modifiers.
    pub emotional_state: String,
    /// Inner-voice comments emitted when the node is shown.
    pub inner_voice_comments: Vec<InnerVoiceComment>,
    /// Selectable replies, in authored order.
    pub options: Vec<DialogueOption>,
    /// Gate used only when the node is a conditional entry point.
    pub conditions: DialogueConditions,
    /// Effects dispatched when the node is entered.
    pub effects: Vec<Effect>,
}

impl DialogueNode {
    /// Create a node with neutral emotion and no options.
    pub fn new(
        id: impl Into<String>,
        speaker: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            speaker: speaker.into(),
            emotional_state: "neutral".to_string(),
            inner_voice_comments: Vec::new(),
            options: Vec::new(),
            conditions: DialogueConditions::default(),
            effects: Vec::new(),
        }
    }

    /// Set the emotional state tag.
    pub fn with_emotional_state(mut self, emotion: impl Into<String>) -> Self {
        self.emotional_state = emotion.into();
        self
    }

    /// Add an inner-voice comment.
    pub fn with_comment(mut self, comment: InnerVoiceComment) -> Self {
        self.inner_voice_comments.push(comment);
        self
    }

    /// Add an option.
    pub fn with_option(mut self, option: DialogueOption) -> Self {
        self.options.push(option);
        self
    }

    /// Set the entry-point condition gate.
    pub fn with_conditions(mut self, conditions: DialogueConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Add an entry effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Look up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&DialogueOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// The read-only dialogue graph, keyed by node id.
///
/// Backed by a sorted map so "first node for this speaker" is
/// deterministic across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogueGraph {
    nodes: BTreeMap<String, DialogueNode>,
}

impl DialogueGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, keyed by its own id.
    pub fn insert(&mut self, node: DialogueNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Builder-style insert.
    pub fn with_node(mut self, node: DialogueNode) -> Self {
        self.insert(node);
        self
    }

    /// Look up a node by id.
    pub fn get(&self, node_id: &str) -> Option<&DialogueNode> {
        self.nodes.get(node_id)
    }

    /// Nodes spoken by an npc, in id order.
    pub fn nodes_for_speaker<'a>(
        &'a self,
        speaker: &'a str,
    ) -> impl Iterator<Item = &'a DialogueNode> {
        self.nodes.values().filter(move |n| n.speaker == speaker)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
