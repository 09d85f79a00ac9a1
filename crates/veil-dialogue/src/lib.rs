//! Dialogue execution for Veil.
//!
//! Walks a branching conversation graph: filters options through
//! condition gates, resolves 2d6 skill checks with critical rules,
//! dispatches consequence effects into the quest machine and world
//! state, and hands the presentation layer a fully resolved response
//! stream.

pub mod check;
pub mod condition;
pub mod dispatch;
pub mod node;
pub mod response;
pub mod session;

pub use check::{CriticalOutcome, SkillCheckOutcome};
pub use condition::DialogueConditions;
pub use dispatch::{
    CombatService, CustomEffectHook, EffectDispatcher, Notifier, SceneService,
};
pub use node::{
    DialogueGraph, DialogueNode, DialogueOption, EnhancedSkillCheck, InnerVoiceComment,
};
pub use response::{DialogueResponse, PresentedOption};
pub use session::{DialogueSession, SessionConfig};
