use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ContactStats;

/// Why a run ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The operator called `stop()`.
    UserRequested,
    /// Every contact reached `Completed` or `Failed`.
    AllTerminal,
    /// The policy's tick budget ran out before the terminal condition.
    TickBudgetExhausted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

/// A lifecycle record for one run, suitable for structured logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: RunEventKind,
}

/// What happened in a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEventKind {
    Started { contact_count: usize },
    Tick { tick: u64, stats: ContactStats },
    Stopped { reason: StopReason },
}

impl RunEvent {
    pub fn new(run_id: Uuid, kind: RunEventKind) -> Self {
        Self {
            run_id,
            timestamp: Utc::now(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reason_display() {
        assert_eq!(StopReason::AllTerminal.to_string(), "all_terminal");
        assert_eq!(StopReason::UserRequested.to_string(), "user_requested");
    }

    #[test]
    fn run_event_is_tagged() {
        let event = RunEvent::new(
            Uuid::new_v4(),
            RunEventKind::Stopped {
                reason: StopReason::TickBudgetExhausted,
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"]["type"], "stopped");
        assert_eq!(value["kind"]["reason"], "tick_budget_exhausted");
    }
}
