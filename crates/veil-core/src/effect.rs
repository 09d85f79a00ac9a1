//! Effect records applied when dialogue options or quest events fire.
//!
//! Each variant is a closed, tag-specific payload; the dispatcher in the
//! dialogue crate matches exhaustively, so adding a kind is a
//! compile-time-checked extension rather than a stringly-typed branch.

use serde::{Deserialize, Serialize};

use crate::flag::FlagValue;

/// A quest progression command carried by a quest effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestAction {
    /// Register the quest in the progression state without starting it.
    Add,
    /// Start the quest (registering it first if needed).
    Start,
    /// Advance the quest to the named stage.
    Advance {
        /// Target stage id.
        stage_id: String,
    },
    /// Mark the named objective complete.
    CompleteObjective {
        /// Objective id within one of the quest's stages.
        objective_id: String,
    },
    /// Fail the quest.
    Fail,
    /// Record the named branch as taken.
    UnlockBranch {
        /// Branch id.
        branch_id: String,
    },
}

/// An inventory command carried by an item effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemAction {
    /// Add the item to the player's inventory.
    Add,
    /// Remove the item from the player's inventory.
    Remove,
}

/// A scene command delegated to the location/scene collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneAction {
    /// Move the player to another location.
    ChangeLocation {
        /// Target location id.
        location_id: String,
    },
    /// Switch to a named scripted scene.
    ChangeScene {
        /// Target scene id.
        scene_id: String,
    },
}

/// A combat command delegated to the combat collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatAction {
    /// Begin combat with the named enemy.
    Start {
        /// Enemy id.
        enemy_id: String,
    },
    /// End the current combat.
    End,
}

/// A tagged effect record.
///
/// Effects are applied eagerly and independently; there is no rollback of
/// earlier effects when a later one in the same list is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// A quest progression command.
    Quest {
        /// Quest id the command targets.
        quest_id: String,
        /// The command itself.
        action: QuestAction,
    },
    /// Adjust a relationship value with an npc.
    Relationship {
        /// Npc id.
        npc_id: String,
        /// Signed adjustment.
        delta: i32,
    },
    /// Add or remove a held item.
    Item {
        /// Item id.
        item_id: String,
        /// Whether to add or remove it.
        action: ItemAction,
    },
    /// Adjust a named skill.
    Skill {
        /// Skill name.
        name: String,
        /// Signed adjustment.
        delta: i32,
    },
    /// Adjust a named stat.
    Stat {
        /// Stat name.
        name: String,
        /// Signed adjustment.
        delta: i32,
    },
    /// Set a named flag.
    Flag {
        /// Flag name.
        name: String,
        /// Value to set.
        value: FlagValue,
    },
    /// Show a presentation-only message via the notifier collaborator.
    Notification {
        /// Message text.
        text: String,
    },
    /// A scene command.
    Scene(SceneAction),
    /// A combat command.
    Combat(CombatAction),
    /// An engine-defined effect routed to the custom hook.
    Custom {
        /// Hook-specific effect name.
        name: String,
        /// Opaque payload interpreted by the hook.
        payload: serde_json::Value,
    },
}
