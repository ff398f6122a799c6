use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event::StopReason;
use crate::types::ContactStats;

/// Produces one "did this attempt succeed" answer per call.
///
/// The scheduler draws exactly one outcome for every contact that is
/// `InProgress` at the start of a tick, in store order. A closure works as a
/// source too.
pub trait OutcomeSource: Send {
    fn next_outcome(&mut self) -> bool;
}

impl<F> OutcomeSource for F
where
    F: FnMut() -> bool + Send,
{
    fn next_outcome(&mut self) -> bool {
        self()
    }
}

/// Receives scheduler lifecycle notifications.
///
/// Called synchronously from the scheduler; implementations should return
/// quickly and must not call back into the scheduler.
pub trait RunObserver: Send + Sync {
    /// A run began with `contact_count` contacts in the store.
    fn on_started(&self, run_id: Uuid, contact_count: usize);

    /// A run ended.
    fn on_stopped(&self, run_id: Uuid, reason: StopReason);

    /// A tick finished. `stats` reflects the store right after the tick.
    fn on_tick(&self, _run_id: Uuid, _tick: u64, _stats: &ContactStats) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_started(&self, _run_id: Uuid, _contact_count: usize) {}
    fn on_stopped(&self, _run_id: Uuid, _reason: StopReason) {}
}

/// Wall-clock source used to stamp attempts.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
