//! The dialogue session controller.
//!
//! `DialogueSession` is the only component with a mutable position in the
//! graph. It filters options through the condition gate, resolves skill
//! checks on selection, hands consequences to the dispatcher, and walks
//! to the next node.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use veil_core::WorldState;
use veil_quest::{QuestManager, QuestState};

use crate::check::{CriticalOutcome, SkillCheckOutcome, draw_dice, resolve_check};
use crate::dispatch::EffectDispatcher;
use crate::node::{DialogueGraph, DialogueNode, DialogueOption, InnerVoiceComment};
use crate::response::{DialogueResponse, PresentedOption};

/// Configuration for a dialogue session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for reproducible skill checks.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// An interactive dialogue session for one player.
pub struct DialogueSession {
    graph: DialogueGraph,
    dispatcher: EffectDispatcher,
    current_node: Option<String>,
    history: Vec<String>,
    /// Emotional-state overrides recorded by option impacts, per node id.
    node_emotions: HashMap<String, String>,
    /// One-shot dice override consumed by the next check.
    forced_dice: Option<(u32, u32)>,
    rng: StdRng,
}

impl DialogueSession {
    /// Create a session over a dialogue graph.
    pub fn new(graph: DialogueGraph, dispatcher: EffectDispatcher, config: SessionConfig) -> Self {
        Self {
            graph,
            dispatcher,
            current_node: None,
            history: Vec::new(),
            node_emotions: HashMap::new(),
            forced_dice: None,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// The dialogue graph.
    pub fn graph(&self) -> &DialogueGraph {
        &self.graph
    }

    /// Id of the node currently shown, if a conversation is running.
    pub fn current_node(&self) -> Option<&str> {
        self.current_node.as_deref()
    }

    /// Ids of the options selected so far, in order. Telemetry only;
    /// branching never reads this.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The quest manager behind the dispatcher.
    pub fn quests(&self) -> &QuestManager {
        self.dispatcher.quests()
    }

    /// Mutable access to the quest manager, for polling notifications.
    pub fn quests_mut(&mut self) -> &mut QuestManager {
        self.dispatcher.quests_mut()
    }

    /// Force the dice of the next skill check, for scripted sequences.
    pub fn force_dice(&mut self, d1: u32, d2: u32) {
        self.forced_dice = Some((d1, d2));
    }

    /// Begin a conversation with an npc.
    ///
    /// Picks the npc's entry point: among its nodes with a true condition
    /// gate, the one satisfying the most clauses wins, ties going to the
    /// smaller node id. With no true gate the `{npc_id}_default`
    /// convention applies, then the npc's first node in id order. An npc
    /// with no nodes at all yields a single system line.
    pub fn start(
        &mut self,
        npc_id: &str,
        world: &mut WorldState,
        quests: &mut QuestState,
    ) -> Vec<DialogueResponse> {
        let Some(entry) = self.select_entry_point(npc_id, world, quests) else {
            return vec![DialogueResponse::system(format!(
                "{npc_id} has nothing to say."
            ))];
        };

        world.record_npc_interaction(npc_id);
        self.current_node = Some(entry.clone());
        self.process_node(&entry, world, quests)
    }

    /// Show a node: its speech line, entry effects, triggered inner-voice
    /// comments, and the options whose gates pass.
    ///
    /// A missing node id yields an empty response list.
    pub fn process_node(
        &mut self,
        node_id: &str,
        world: &mut WorldState,
        quests: &mut QuestState,
    ) -> Vec<DialogueResponse> {
        let Some(node) = self.graph.get(node_id).cloned() else {
            return Vec::new();
        };
        self.current_node = Some(node.id.clone());
        let emotion = self.effective_emotion(&node);

        let mut responses = vec![DialogueResponse::Speech {
            speaker: node.speaker.clone(),
            text: node.text.clone(),
            emotion: emotion.clone(),
        }];

        self.dispatcher.apply_all(&node.effects, world, quests);

        for comment in &node.inner_voice_comments {
            if self.comment_triggers(comment, world, quests, &emotion) {
                responses.push(DialogueResponse::InnerVoice {
                    voice_type: comment.voice_type.clone(),
                    text: comment.text.clone(),
                });
            }
        }

        let options: Vec<PresentedOption> = node
            .options
            .iter()
            .filter(|o| o.conditions.evaluate(world, quests, Some(&emotion)))
            .map(PresentedOption::from_option)
            .collect();
        if !options.is_empty() {
            responses.push(DialogueResponse::Options { options });
        }

        responses
    }

    /// Select an option on the current node.
    ///
    /// Resolves the option's skill check if it has one, records emotional
    /// impact against the current node, dispatches consequences in
    /// declaration order, and walks to the next node. An unmatched option
    /// id (or no active node) yields an empty response list and changes
    /// nothing.
    pub fn select_option(
        &mut self,
        option_id: &str,
        world: &mut WorldState,
        quests: &mut QuestState,
    ) -> Vec<DialogueResponse> {
        let Some(node_id) = self.current_node.clone() else {
            return Vec::new();
        };
        let Some(node) = self.graph.get(&node_id) else {
            return Vec::new();
        };
        let Some(option) = node.option(option_id).cloned() else {
            return Vec::new();
        };
        let emotion = self.effective_emotion(node);

        let mut responses = Vec::new();

        let outcome = option.skill_check.as_ref().map(|check| {
            let dice = self
                .forced_dice
                .take()
                .unwrap_or_else(|| draw_dice(&mut self.rng));
            let outcome = resolve_check(check, world, Some(&emotion), dice);
            responses.push(DialogueResponse::SkillCheck(outcome.clone()));
            outcome
        });

        self.record_emotional_impact(&node_id, &option);
        self.dispatcher.apply_all(&option.consequences, world, quests);

        let after_emotion = self
            .node_emotions
            .get(&node_id)
            .cloned()
            .unwrap_or(emotion);
        for reaction in &option.inner_voice_reactions {
            if self.comment_triggers(reaction, world, quests, &after_emotion) {
                responses.push(DialogueResponse::InnerVoice {
                    voice_type: reaction.voice_type.clone(),
                    text: reaction.text.clone(),
                });
            }
        }

        self.history.push(option.id.clone());

        if let Some(next) = next_node(&option, outcome.as_ref()) {
            self.current_node = Some(next.clone());
            responses.extend(self.process_node(&next, world, quests));
        }

        responses
    }

    /// A one-line summary of the session for debugging.
    pub fn debug_state(&self) -> String {
        format!(
            "node: {}, history: {}, emotional overrides: {}",
            self.current_node.as_deref().unwrap_or("<none>"),
            self.history.len(),
            self.node_emotions.len(),
        )
    }

    /// The emotional state in effect for a node: the recorded override if
    /// an option has shifted it, else the authored tag.
    fn effective_emotion(&self, node: &DialogueNode) -> String {
        self.node_emotions
            .get(&node.id)
            .cloned()
            .unwrap_or_else(|| node.emotional_state.clone())
    }

    /// Record the strongest emotional impact of an option against the
    /// node it was selected on. Ties go to the lexicographically smaller
    /// emotion name.
    fn record_emotional_impact(&mut self, node_id: &str, option: &DialogueOption) {
        let mut strongest: Option<(&str, i32)> = None;
        for (emotion, delta) in &option.emotional_impact {
            if strongest.is_none_or(|(_, best)| delta.abs() > best.abs()) {
                strongest = Some((emotion, *delta));
            }
        }
        if let Some((emotion, _)) = strongest {
            self.node_emotions
                .insert(node_id.to_string(), emotion.to_string());
        }
    }

    fn comment_triggers(
        &self,
        comment: &InnerVoiceComment,
        world: &WorldState,
        quests: &QuestState,
        emotion: &str,
    ) -> bool {
        if let Some(minimum) = comment.skill_requirement
            && world.skill(&comment.voice_type) < minimum
        {
            return false;
        }
        if let Some(conditions) = &comment.trigger_condition
            && !conditions.evaluate(world, quests, Some(emotion))
        {
            return false;
        }
        true
    }

    fn select_entry_point(
        &self,
        npc_id: &str,
        world: &WorldState,
        quests: &QuestState,
    ) -> Option<String> {
        let mut best: Option<(usize, &str)> = None;
        let mut first: Option<&str> = None;

        for node in self.graph.nodes_for_speaker(npc_id) {
            first.get_or_insert(node.id.as_str());
            if node.conditions.is_empty()
                || !node.conditions.evaluate(world, quests, None)
            {
                continue;
            }
            let specificity = node.conditions.specificity(world, quests, None);
            // Iteration is in id order, so a strict comparison keeps the
            // smaller id on ties
            if best.is_none_or(|(top, _)| specificity > top) {
                best = Some((specificity, node.id.as_str()));
            }
        }

        if let Some((_, id)) = best {
            return Some(id.to_string());
        }

        let default_id = format!("{npc_id}_default");
        if self.graph.get(&default_id).is_some() {
            return Some(default_id);
        }

        first.map(str::to_string)
    }
}

/// Resolve the next node for a selected option.
///
/// No check means the default route. With a check, a critical outcome
/// takes its dedicated node when one is declared; otherwise success and
/// failure routes apply, each falling back to the default.
fn next_node(option: &DialogueOption, outcome: Option<&SkillCheckOutcome>) -> Option<String> {
    let Some(outcome) = outcome else {
        return option.next_node.clone();
    };

    match outcome.critical {
        Some(CriticalOutcome::Success) if option.critical_success_node.is_some() => {
            return option.critical_success_node.clone();
        }
        Some(CriticalOutcome::Failure) if option.critical_failure_node.is_some() => {
            return option.critical_failure_node.clone();
        }
        _ => {}
    }

    if outcome.success {
        option.success_node.clone().or_else(|| option.next_node.clone())
    } else {
        option.failure_node.clone().or_else(|| option.next_node.clone())
    }
}
