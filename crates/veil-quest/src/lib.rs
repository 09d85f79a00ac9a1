//! Quest progression for Veil.
//!
//! Provides the static quest catalog types, the per-session progression
//! state (`QuestState`), the quest state machine (`QuestManager`), and
//! the notification queue the presentation layer polls.

pub mod catalog;
pub mod error;
pub mod manager;
pub mod notification;
pub mod state;

pub use catalog::{Importance, Objective, Quest, QuestCatalog, QuestRewards, QuestStage};
pub use error::{QuestError, QuestResult};
pub use manager::{QuestManager, QuestProgressReport};
pub use notification::{NotificationKind, NotificationQueue, QuestNotification};
pub use state::{QuestState, QuestStatus};
