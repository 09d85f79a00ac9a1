//! Player world state: skills, inventory, clues, flags, relationships.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flag::FlagValue;

/// Time of day in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    /// Early hours until midday.
    Morning,
    /// Midday until dusk.
    Afternoon,
    /// Dusk until nightfall.
    Evening,
    /// Nightfall until dawn.
    Night,
}

impl TimeOfDay {
    /// Parse a time of day from a user- or content-supplied string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "morning" => Some(Self::Morning),
            "afternoon" | "midday" | "noon" => Some(Self::Afternoon),
            "evening" | "dusk" => Some(Self::Evening),
            "night" | "midnight" => Some(Self::Night),
            _ => None,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morning => write!(f, "Morning"),
            Self::Afternoon => write!(f, "Afternoon"),
            Self::Evening => write!(f, "Evening"),
            Self::Night => write!(f, "Night"),
        }
    }
}

/// The state of one player session: everything condition evaluation reads
/// and effect dispatch writes, outside of quest progression.
///
/// Identities are authored content strings (item ids, clue ids, npc ids),
/// not generated handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    /// Skill values by name. A skill absent from the table reads as 0.
    skills: HashMap<String, i32>,
    /// Stat values by name (health, morale, and similar).
    stats: HashMap<String, i32>,
    /// Item ids the player holds.
    inventory: BTreeSet<String>,
    /// Clue ids the player has discovered.
    clues: BTreeSet<String>,
    /// Thought ids the player has internalized.
    thoughts: BTreeSet<String>,
    /// Named scalar flags.
    flags: HashMap<String, FlagValue>,
    /// Relationship value per npc id. An absent npc reads as 0.
    relationships: HashMap<String, i32>,
    /// Interaction counter per npc id.
    npc_interactions: HashMap<String, u32>,
    /// Current time of day.
    time_of_day: TimeOfDay,
    /// Current location id.
    current_location: String,
    /// Previous location id, if the player has moved at least once.
    previous_location: Option<String>,
    /// Location ids the player has visited.
    visited_locations: BTreeSet<String>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    /// Create an empty world state starting in the morning.
    pub fn new() -> Self {
        Self {
            skills: HashMap::new(),
            stats: HashMap::new(),
            inventory: BTreeSet::new(),
            clues: BTreeSet::new(),
            thoughts: BTreeSet::new(),
            flags: HashMap::new(),
            relationships: HashMap::new(),
            npc_interactions: HashMap::new(),
            time_of_day: TimeOfDay::Morning,
            current_location: String::new(),
            previous_location: None,
            visited_locations: BTreeSet::new(),
        }
    }

    /// Get a skill value. Missing skills read as 0.
    pub fn skill(&self, name: &str) -> i32 {
        self.skills.get(name).copied().unwrap_or(0)
    }

    /// Set a skill to an absolute value.
    pub fn set_skill(&mut self, name: impl Into<String>, value: i32) {
        self.skills.insert(name.into(), value);
    }

    /// Adjust a skill by a signed delta, creating it at 0 if absent.
    pub fn modify_skill(&mut self, name: impl Into<String>, delta: i32) {
        *self.skills.entry(name.into()).or_insert(0) += delta;
    }

    /// Get a stat value. Missing stats read as 0.
    pub fn stat(&self, name: &str) -> i32 {
        self.stats.get(name).copied().unwrap_or(0)
    }

    /// Adjust a stat by a signed delta, creating it at 0 if absent.
    pub fn modify_stat(&mut self, name: impl Into<String>, delta: i32) {
        *self.stats.entry(name.into()).or_insert(0) += delta;
    }

    /// Check if the player holds an item.
    pub fn has_item(&self, item_id: &str) -> bool {
        self.inventory.contains(item_id)
    }

    /// Add an item to the inventory.
    pub fn add_item(&mut self, item_id: impl Into<String>) {
        self.inventory.insert(item_id.into());
    }

    /// Remove an item from the inventory. Returns true if it was held.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        self.inventory.remove(item_id)
    }

    /// Item ids currently held, in sorted order.
    pub fn inventory(&self) -> impl Iterator<Item = &str> {
        self.inventory.iter().map(String::as_str)
    }

    /// Check if a clue has been discovered.
    pub fn has_clue(&self, clue_id: &str) -> bool {
        self.clues.contains(clue_id)
    }

    /// Record a discovered clue.
    pub fn add_clue(&mut self, clue_id: impl Into<String>) {
        self.clues.insert(clue_id.into());
    }

    /// Check if a thought has been internalized.
    pub fn has_thought(&self, thought_id: &str) -> bool {
        self.thoughts.contains(thought_id)
    }

    /// Record an internalized thought.
    pub fn add_thought(&mut self, thought_id: impl Into<String>) {
        self.thoughts.insert(thought_id.into());
    }

    /// Get a flag value, if set.
    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Set a flag value.
    pub fn set_flag(&mut self, name: impl Into<String>, value: FlagValue) {
        self.flags.insert(name.into(), value);
    }

    /// Get the relationship value with an npc. Unknown npcs read as 0.
    pub fn relationship(&self, npc_id: &str) -> i32 {
        self.relationships.get(npc_id).copied().unwrap_or(0)
    }

    /// Adjust a relationship by a signed delta, creating it at 0 if absent.
    pub fn modify_relationship(&mut self, npc_id: impl Into<String>, delta: i32) {
        *self.relationships.entry(npc_id.into()).or_insert(0) += delta;
    }

    /// Record an interaction with an npc and return the new count.
    pub fn record_npc_interaction(&mut self, npc_id: impl Into<String>) -> u32 {
        let count = self.npc_interactions.entry(npc_id.into()).or_insert(0);
        *count += 1;
        *count
    }

    /// How many times the player has interacted with an npc.
    pub fn npc_interactions(&self, npc_id: &str) -> u32 {
        self.npc_interactions.get(npc_id).copied().unwrap_or(0)
    }

    /// Current time of day.
    pub fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    /// Set the time of day.
    pub fn set_time_of_day(&mut self, time: TimeOfDay) {
        self.time_of_day = time;
    }

    /// Current location id. Empty until the first `change_location`.
    pub fn current_location(&self) -> &str {
        &self.current_location
    }

    /// Previous location id, if any.
    pub fn previous_location(&self) -> Option<&str> {
        self.previous_location.as_deref()
    }

    /// Move the player to a location, recording it as visited.
    pub fn change_location(&mut self, location_id: impl Into<String>) {
        let location_id = location_id.into();
        if !self.current_location.is_empty() {
            self.previous_location = Some(std::mem::take(&mut self.current_location));
        }
        self.visited_locations.insert(location_id.clone());
        self.current_location = location_id;
    }

    /// Check if a location has been visited.
    pub fn has_visited(&self, location_id: &str) -> bool {
        self.visited_locations.contains(location_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_skill_reads_zero() {
        let state = WorldState::new();
        assert_eq!(state.skill("empathy"), 0);
    }

    #[test]
    fn modify_skill_creates_and_accumulates() {
        let mut state = WorldState::new();
        state.modify_skill("logic", 3);
        state.modify_skill("logic", 2);
        assert_eq!(state.skill("logic"), 5);
    }

    #[test]
    fn stats_independent_of_skills() {
        let mut state = WorldState::new();
        state.modify_stat("morale", -10);
        assert_eq!(state.stat("morale"), -10);
        assert_eq!(state.skill("morale"), 0);
    }

    #[test]
    fn inventory_management() {
        let mut state = WorldState::new();
        assert!(!state.has_item("rusted_key"));

        state.add_item("rusted_key");
        assert!(state.has_item("rusted_key"));

        // Adding again does not duplicate
        state.add_item("rusted_key");
        assert_eq!(state.inventory().count(), 1);

        assert!(state.remove_item("rusted_key"));
        assert!(!state.remove_item("rusted_key"));
    }

    #[test]
    fn clues_and_thoughts() {
        let mut state = WorldState::new();
        state.add_clue("bloody_footprint");
        state.add_thought("volumetric_shit_compressor");
        assert!(state.has_clue("bloody_footprint"));
        assert!(!state.has_clue("missing_button"));
        assert!(state.has_thought("volumetric_shit_compressor"));
    }

    #[test]
    fn flags() {
        let mut state = WorldState::new();
        assert!(state.flag("door_open").is_none());
        state.set_flag("door_open", FlagValue::Bool(true));
        assert_eq!(state.flag("door_open"), Some(&FlagValue::Bool(true)));
    }

    #[test]
    fn relationships_default_zero() {
        let mut state = WorldState::new();
        assert_eq!(state.relationship("kim"), 0);
        state.modify_relationship("kim", 2);
        state.modify_relationship("kim", -1);
        assert_eq!(state.relationship("kim"), 1);
    }

    #[test]
    fn npc_interaction_counter() {
        let mut state = WorldState::new();
        assert_eq!(state.record_npc_interaction("garte"), 1);
        assert_eq!(state.record_npc_interaction("garte"), 2);
        assert_eq!(state.npc_interactions("garte"), 2);
        assert_eq!(state.npc_interactions("sylvie"), 0);
    }

    #[test]
    fn location_tracking() {
        let mut state = WorldState::new();
        state.change_location("whirling_lobby");
        assert_eq!(state.current_location(), "whirling_lobby");
        assert!(state.previous_location().is_none());

        state.change_location("backyard");
        assert_eq!(state.previous_location(), Some("whirling_lobby"));
        assert!(state.has_visited("whirling_lobby"));
        assert!(state.has_visited("backyard"));
    }

    #[test]
    fn time_of_day_parse() {
        assert_eq!(TimeOfDay::parse("morning"), Some(TimeOfDay::Morning));
        assert_eq!(TimeOfDay::parse("NOON"), Some(TimeOfDay::Afternoon));
        assert_eq!(TimeOfDay::parse("dusk"), Some(TimeOfDay::Evening));
        assert_eq!(TimeOfDay::parse("midnight"), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::parse("gibberish"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let mut state = WorldState::new();
        state.set_skill("empathy", 4);
        state.add_item("flashlight");
        let json = serde_json::to_string(&state).unwrap();
        let back: WorldState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.skill("empathy"), 4);
        assert!(back.has_item("flashlight"));
    }
}
