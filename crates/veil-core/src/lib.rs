//! Core types for Veil: player-facing world state and effect records.
//!
//! This crate defines the state snapshot that condition evaluation reads
//! and effect dispatch writes. It knows nothing about dialogue graphs or
//! quest progression — those live in the crates layered on top.

pub mod effect;
pub mod flag;
pub mod state;

pub use effect::{CombatAction, Effect, ItemAction, QuestAction, SceneAction};
pub use flag::FlagValue;
pub use state::{TimeOfDay, WorldState};
