//! Run Event Logger
//!
//! A [`RunObserver`] that turns scheduler lifecycle notifications into
//! structured [`RunEvent`] records on the `run_events` tracing target.

use redial_core::{ContactStats, RunEvent, RunEventKind, RunObserver, StopReason};
use tracing::{debug, info};
use uuid::Uuid;

/// Writes every run notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        Self
    }

    fn encode(event: &RunEvent) -> String {
        serde_json::to_string(event).unwrap_or_else(|e| format!("{event:?} ({e})"))
    }
}

impl RunObserver for LoggingObserver {
    fn on_started(&self, run_id: Uuid, contact_count: usize) {
        let event = RunEvent::new(run_id, RunEventKind::Started { contact_count });
        info!(target: "run_events", event = %Self::encode(&event), "Run started");
    }

    fn on_stopped(&self, run_id: Uuid, reason: StopReason) {
        let event = RunEvent::new(run_id, RunEventKind::Stopped { reason });
        info!(target: "run_events", event = %Self::encode(&event), "Run stopped");
    }

    fn on_tick(&self, run_id: Uuid, tick: u64, stats: &ContactStats) {
        let event = RunEvent::new(
            run_id,
            RunEventKind::Tick {
                tick,
                stats: *stats,
            },
        );
        debug!(target: "run_events", event = %Self::encode(&event), "Run tick");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_stop_reason() {
        let event = RunEvent::new(
            Uuid::new_v4(),
            RunEventKind::Stopped {
                reason: StopReason::AllTerminal,
            },
        );
        let line = LoggingObserver::encode(&event);
        assert!(line.contains("\"reason\":\"all_terminal\""));
    }

    #[test]
    fn observer_accepts_every_notification() {
        let observer = LoggingObserver::new();
        let run_id = Uuid::new_v4();
        observer.on_started(run_id, 2);
        observer.on_tick(run_id, 1, &ContactStats::default());
        observer.on_stopped(run_id, StopReason::UserRequested);
    }
}
