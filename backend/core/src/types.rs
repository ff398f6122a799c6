use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a contact, assigned by the store that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a contact sits in the retry state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Waiting for its next attempt.
    #[default]
    Pending,
    /// An attempt was started on the last tick and resolves on the next one.
    InProgress,
    /// An attempt succeeded. Terminal.
    Completed,
    /// All attempts were used without success. Terminal.
    Failed,
}

impl ContactStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ContactStatus::Completed | ContactStatus::Failed)
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContactStatus::Pending => "pending",
            ContactStatus::InProgress => "in_progress",
            ContactStatus::Completed => "completed",
            ContactStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One retry target.
///
/// `name` and `destination` are opaque to the scheduler; only `attempts`,
/// `status` and `last_attempt_at` are driven by ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub destination: String,
    pub attempts: u32,
    pub status: ContactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn new(id: ContactId, name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            destination: destination.into(),
            attempts: 0,
            status: ContactStatus::Pending,
            last_attempt_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Per-status counts over a contact snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

impl ContactStats {
    pub fn from_contacts<'a>(contacts: impl IntoIterator<Item = &'a Contact>) -> Self {
        let mut stats = Self::default();
        for contact in contacts {
            stats.total += 1;
            match contact.status {
                ContactStatus::Pending => stats.pending += 1,
                ContactStatus::InProgress => stats.in_progress += 1,
                ContactStatus::Completed => stats.completed += 1,
                ContactStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    /// Number of contacts that reached `Completed` or `Failed`.
    pub fn terminal(&self) -> usize {
        self.completed + self.failed
    }

    /// True when there is at least one contact and all of them are terminal.
    pub fn all_terminal(&self) -> bool {
        self.total > 0 && self.terminal() == self.total
    }
}
