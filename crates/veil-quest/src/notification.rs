//! Quest notifications and the queue the presentation layer polls.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The kind of quest event a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// A quest was started.
    QuestStarted,
    /// A quest advanced to a new stage.
    QuestUpdated,
    /// A quest completed.
    QuestCompleted,
    /// A quest failed.
    QuestFailed,
    /// An objective was completed.
    ObjectiveCompleted,
    /// A new objective became available.
    ObjectiveAdded,
}

/// A single quest-event announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestNotification {
    /// Quest the event belongs to.
    pub quest_id: String,
    /// Quest title at the time of the event.
    pub title: String,
    /// Player-facing message.
    pub message: String,
    /// Kind of event.
    pub kind: NotificationKind,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Whether the presentation layer has not yet seen this entry.
    pub is_new: bool,
}

/// Append-only log of quest notifications with age-based eviction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQueue {
    entries: Vec<QuestNotification>,
}

impl NotificationQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification, stamped now and flagged new.
    pub fn push(
        &mut self,
        quest_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) {
        self.entries.push(QuestNotification {
            quest_id: quest_id.into(),
            title: title.into(),
            message: message.into(),
            kind,
            created_at: Utc::now(),
            is_new: true,
        });
    }

    /// Return the entries still flagged new, marking them seen.
    pub fn active(&mut self) -> Vec<QuestNotification> {
        let fresh: Vec<QuestNotification> = self
            .entries
            .iter()
            .filter(|n| n.is_new)
            .cloned()
            .collect();
        for entry in &mut self.entries {
            entry.is_new = false;
        }
        fresh
    }

    /// Evict entries older than `max_age` and mark the survivors seen,
    /// so the next poll starts clean. A zero duration evicts all.
    pub fn clear_older_than(&mut self, max_age: Duration) {
        if max_age.is_zero() {
            self.entries.clear();
            return;
        }
        let now = Utc::now();
        self.entries.retain(|n| now - n.created_at < max_age);
        for entry in &mut self.entries {
            entry.is_new = false;
        }
    }

    /// All entries in insertion order, seen or not.
    pub fn entries(&self) -> &[QuestNotification] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
