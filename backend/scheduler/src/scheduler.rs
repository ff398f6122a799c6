use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info};
use uuid::Uuid;

use redial_core::{
    Contact, ContactStats, NoopObserver, OutcomeSource, RedialError, Result, RetryPolicy,
    RunObserver, StopReason,
};

use crate::store::ContactStore;

/// Externally visible scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running { run_id: Uuid },
}

struct ActiveRun {
    run_id: Uuid,
    cancel: CancellationToken,
    /// Cancelled by the tick loop when it exits, for whatever reason.
    finished: CancellationToken,
    /// Resolves to the reason the loop stopped on its own, or `None` when it
    /// was cancelled.
    handle: JoinHandle<Option<StopReason>>,
}

impl ActiveRun {
    fn is_live(&self) -> bool {
        !self.finished.is_cancelled()
    }
}

/// Drives a [`ContactStore`] through retry ticks until every contact is
/// terminal or the run is stopped.
///
/// One run at a time; the scheduler can be started again after a run ends.
pub struct RetryScheduler {
    observer: Arc<dyn RunObserver>,
    run: Mutex<Option<ActiveRun>>,
}

impl RetryScheduler {
    pub fn new(observer: Arc<dyn RunObserver>) -> Self {
        Self {
            observer,
            run: Mutex::new(None),
        }
    }

    /// Begin a run over `store`. Fails with `InvalidState` if a run is
    /// already active or the store has no contacts; nothing changes then.
    pub async fn start(
        &self,
        store: Arc<ContactStore>,
        policy: RetryPolicy,
        outcomes: Box<dyn OutcomeSource>,
    ) -> Result<Uuid> {
        let mut slot = self.run.lock().await;

        if let Some(run) = slot.as_ref().filter(|run| run.is_live()) {
            return Err(RedialError::invalid_state(format!(
                "run {} is already in progress",
                run.run_id
            )));
        }

        let contact_count = store.len().await;
        if contact_count == 0 {
            return Err(RedialError::invalid_state(
                "cannot start a run with no contacts",
            ));
        }

        let run_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();

        info!(
            run_id = %run_id,
            contacts = contact_count,
            tick_ms = policy.tick_interval().as_millis() as u64,
            max_attempts = policy.max_attempts(),
            tick_budget = ?policy.tick_budget(),
            "Retry run started"
        );
        self.observer.on_started(run_id, contact_count);

        let tick_loop = TickLoop {
            run_id,
            store,
            policy,
            outcomes,
            observer: Arc::clone(&self.observer),
            cancel: cancel.clone(),
            _finished: finished.clone().drop_guard(),
        };
        let handle = tokio::spawn(tick_loop.run());

        *slot = Some(ActiveRun {
            run_id,
            cancel,
            finished,
            handle,
        });
        Ok(run_id)
    }

    /// Cancel the active run, if any.
    ///
    /// Waits for an in-flight tick to finish; once this returns no further
    /// tick of that run will touch the store. Calling it while idle does
    /// nothing.
    pub async fn stop(&self) {
        let mut slot = self.run.lock().await;
        let Some(run) = slot.take() else {
            debug!("Stop requested while idle");
            return;
        };

        run.cancel.cancel();
        let self_stopped = match run.handle.await {
            Ok(reason) => reason.is_some(),
            Err(e) => {
                error!(run_id = %run.run_id, error = %e, "Tick loop ended abnormally");
                false
            }
        };

        // A loop that already reached its own stop condition has reported it.
        if !self_stopped {
            info!(run_id = %run.run_id, reason = %StopReason::UserRequested, "Retry run stopped");
            self.observer.on_stopped(run.run_id, StopReason::UserRequested);
        }
    }

    pub async fn state(&self) -> SchedulerState {
        match self.run.lock().await.as_ref() {
            Some(run) if run.is_live() => SchedulerState::Running { run_id: run.run_id },
            _ => SchedulerState::Idle,
        }
    }

    /// Wait until the current run ends. Returns immediately when idle.
    pub async fn wait(&self) {
        let finished = match self.run.lock().await.as_ref() {
            Some(run) => run.finished.clone(),
            None => return,
        };
        finished.cancelled().await;
    }
}

impl Default for RetryScheduler {
    fn default() -> Self {
        Self::new(Arc::new(NoopObserver))
    }
}

struct TickLoop {
    run_id: Uuid,
    store: Arc<ContactStore>,
    policy: RetryPolicy,
    outcomes: Box<dyn OutcomeSource>,
    observer: Arc<dyn RunObserver>,
    cancel: CancellationToken,
    _finished: DropGuard,
}

impl TickLoop {
    async fn run(mut self) -> Option<StopReason> {
        let period = self.policy.tick_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;

        let reason = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(run_id = %self.run_id, ticks = tick, "Tick loop cancelled");
                    return None;
                }
                _ = ticker.tick() => {}
            }

            tick += 1;
            let snapshot = self
                .store
                .advance(&self.policy, self.outcomes.as_mut())
                .await;
            let stats = ContactStats::from_contacts(&snapshot);
            debug!(
                run_id = %self.run_id,
                tick,
                pending = stats.pending,
                in_progress = stats.in_progress,
                completed = stats.completed,
                failed = stats.failed,
                "Tick applied"
            );
            self.observer.on_tick(self.run_id, tick, &stats);

            // An emptied store has nothing left to drive.
            if snapshot.iter().all(Contact::is_terminal) {
                break StopReason::AllTerminal;
            }
            if self.policy.tick_budget().is_some_and(|budget| tick >= budget) {
                break StopReason::TickBudgetExhausted;
            }
        };

        info!(
            run_id = %self.run_id,
            ticks = tick,
            reason = %reason,
            "Retry run stopped"
        );
        self.observer.on_stopped(self.run_id, reason);
        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use redial_core::ContactStatus;

    use super::*;
    use crate::outcome::ScriptedOutcomes;

    #[derive(Default)]
    struct Recorder {
        events: StdMutex<Vec<String>>,
    }

    impl RunObserver for Recorder {
        fn on_started(&self, _run_id: Uuid, contact_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("started:{contact_count}"));
        }

        fn on_stopped(&self, _run_id: Uuid, reason: StopReason) {
            self.events.lock().unwrap().push(format!("stopped:{reason}"));
        }
    }

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(5), max_attempts).unwrap()
    }

    #[tokio::test]
    async fn start_on_empty_store_is_rejected() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = RetryScheduler::new(recorder.clone());
        let err = scheduler
            .start(Arc::new(ContactStore::new()), fast(1), Box::new(|| true))
            .await
            .unwrap_err();
        assert!(matches!(err, RedialError::InvalidState(_)));
        assert_eq!(scheduler.state().await, SchedulerState::Idle);
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn runs_to_completion_and_reports_once() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = RetryScheduler::new(recorder.clone());
        let store = Arc::new(ContactStore::new());
        store.add("Alice", "+1 555 0100").await;

        scheduler
            .start(
                store.clone(),
                fast(2),
                Box::new(ScriptedOutcomes::new([false, true])),
            )
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(2), scheduler.wait())
            .await
            .unwrap();

        let contact = &store.list().await[0];
        assert_eq!(contact.status, ContactStatus::Completed);
        assert_eq!(contact.attempts, 2);
        assert_eq!(scheduler.state().await, SchedulerState::Idle);

        // Stopping after a self-stop adds nothing.
        scheduler.stop().await;
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["started:1".to_string(), "stopped:all_terminal".to_string()]
        );
    }

    #[tokio::test]
    async fn stop_while_idle_is_noop() {
        let recorder = Arc::new(Recorder::default());
        let scheduler = RetryScheduler::new(recorder.clone());
        scheduler.stop().await;
        scheduler.stop().await;
        assert!(recorder.events.lock().unwrap().is_empty());
    }
}
