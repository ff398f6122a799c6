//! In-memory contact store.
//!
//! Every mutation goes through one write lock, so a tick's batch transition
//! never interleaves with `add`/`remove`, and readers always see either the
//! state before a tick or the state after it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use redial_core::{
    Clock, Contact, ContactId, ContactStats, ContactStatus, OutcomeSource, RetryPolicy,
    SystemClock,
};
use redial_logging::{redact_destination, redact_phone_numbers};

use crate::transition::{self, Transition};

struct StoreInner {
    contacts: Vec<Contact>,
    next_id: u64,
}

/// Ordered collection of contacts plus their retry state.
pub struct ContactStore {
    inner: RwLock<StoreInner>,
    clock: Arc<dyn Clock>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Use `clock` to stamp `last_attempt_at`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                contacts: Vec::new(),
                next_id: 1,
            }),
            clock,
        }
    }

    /// Append a new `Pending` contact and return it.
    pub async fn add(&self, name: impl Into<String>, destination: impl Into<String>) -> Contact {
        let mut inner = self.inner.write().await;
        let id = ContactId(inner.next_id);
        inner.next_id += 1;
        let contact = Contact::new(id, name, destination);
        inner.contacts.push(contact.clone());
        info!(
            contact_id = %id,
            name = %redact_phone_numbers(&contact.name),
            destination = %redact_destination(&contact.destination),
            "Contact added"
        );
        contact
    }

    /// Remove a contact. Returns `false` if no contact had that id.
    pub async fn remove(&self, id: ContactId) -> bool {
        let mut inner = self.inner.write().await;
        let before = inner.contacts.len();
        inner.contacts.retain(|c| c.id != id);
        let removed = inner.contacts.len() != before;
        if removed {
            info!(contact_id = %id, "Contact removed");
        } else {
            debug!(contact_id = %id, "Remove ignored, no such contact");
        }
        removed
    }

    pub async fn get(&self, id: ContactId) -> Option<Contact> {
        self.inner
            .read()
            .await
            .contacts
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Snapshot of all contacts in insertion order.
    pub async fn list(&self) -> Vec<Contact> {
        self.inner.read().await.contacts.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.contacts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.contacts.is_empty()
    }

    pub async fn stats(&self) -> ContactStats {
        ContactStats::from_contacts(&self.inner.read().await.contacts)
    }

    /// True when the store is non-empty and every contact is terminal.
    pub async fn all_terminal(&self) -> bool {
        self.stats().await.all_terminal()
    }

    /// Put every contact back to `Pending` with no attempts, so a finished
    /// list can be run again.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        for contact in inner.contacts.iter_mut() {
            contact.attempts = 0;
            contact.status = ContactStatus::Pending;
            contact.last_attempt_at = None;
        }
        info!(contacts = inner.contacts.len(), "Contact retry state reset");
    }

    /// Apply one tick to every contact and return the resulting snapshot.
    pub async fn advance(
        &self,
        policy: &RetryPolicy,
        outcomes: &mut dyn OutcomeSource,
    ) -> Vec<Contact> {
        let now = self.clock.now();
        self.advance_at(policy, outcomes, now).await
    }

    /// [`advance`](Self::advance) with an explicit attempt timestamp.
    pub async fn advance_at(
        &self,
        policy: &RetryPolicy,
        outcomes: &mut dyn OutcomeSource,
        now: DateTime<Utc>,
    ) -> Vec<Contact> {
        let mut inner = self.inner.write().await;
        for contact in inner.contacts.iter_mut() {
            let step = transition::apply(contact, policy, outcomes, now);
            if !step.is_change() {
                continue;
            }
            let destination = redact_destination(&contact.destination);
            match step {
                Transition::Dialed => info!(
                    contact_id = %contact.id,
                    destination = %destination,
                    attempt = contact.attempts,
                    max = policy.max_attempts(),
                    "Attempt started"
                ),
                Transition::Completed => info!(
                    contact_id = %contact.id,
                    attempts = contact.attempts,
                    "Contact reached"
                ),
                Transition::Requeued => debug!(
                    contact_id = %contact.id,
                    attempts = contact.attempts,
                    "Attempt failed, contact requeued"
                ),
                Transition::Failed => info!(
                    contact_id = %contact.id,
                    attempts = contact.attempts,
                    "Attempts exhausted, contact failed"
                ),
                Transition::Unchanged => {}
            }
        }
        inner.contacts.clone()
    }
}

impl Default for ContactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(10), max_attempts).unwrap()
    }

    #[tokio::test]
    async fn add_assigns_unique_ids_in_order() {
        let store = ContactStore::new();
        let a = store.add("Alice", "+1 555 0100").await;
        let b = store.add("Bob", "+1 555 0101").await;
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, ContactStatus::Pending);

        let names: Vec<_> = store.list().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_remove() {
        let store = ContactStore::new();
        let a = store.add("Alice", "1").await;
        assert!(store.remove(a.id).await);
        let b = store.add("Bob", "2").await;
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn remove_missing_is_noop() {
        let store = ContactStore::new();
        store.add("Alice", "1").await;
        assert!(!store.remove(ContactId(99)).await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn advance_uses_clock_for_attempt_time() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let store = ContactStore::with_clock(Arc::new(FixedClock(at)));
        let c = store.add("Alice", "1").await;
        store.advance(&policy(3), &mut || true).await;
        let after = store.get(c.id).await.unwrap();
        assert_eq!(after.last_attempt_at, Some(at));
        assert_eq!(after.status, ContactStatus::InProgress);
    }

    #[tokio::test]
    async fn max_attempts_two_false_then_true() {
        let store = ContactStore::new();
        let c = store.add("Alice", "1").await;
        let policy = policy(2);
        let mut outcomes = [false, true].into_iter();
        let mut source = move || outcomes.next().unwrap_or(false);

        let expect = [
            (1, ContactStatus::InProgress),
            (1, ContactStatus::Pending),
            (2, ContactStatus::InProgress),
            (2, ContactStatus::Completed),
        ];
        for (tick, (attempts, status)) in expect.into_iter().enumerate() {
            let snapshot = store.advance(&policy, &mut source).await;
            assert_eq!(snapshot[0].id, c.id);
            assert_eq!(snapshot[0].attempts, attempts, "tick {}", tick + 1);
            assert_eq!(snapshot[0].status, status, "tick {}", tick + 1);
        }
        assert!(store.all_terminal().await);
    }

    #[tokio::test]
    async fn max_attempts_one_fails_on_third_tick() {
        let store = ContactStore::new();
        store.add("Alice", "1").await;
        let policy = policy(1);

        let s1 = store.advance(&policy, &mut || false).await;
        assert_eq!((s1[0].attempts, s1[0].status), (1, ContactStatus::InProgress));
        let s2 = store.advance(&policy, &mut || false).await;
        assert_eq!((s2[0].attempts, s2[0].status), (1, ContactStatus::Pending));
        let s3 = store.advance(&policy, &mut || false).await;
        assert_eq!((s3[0].attempts, s3[0].status), (1, ContactStatus::Failed));
    }

    #[tokio::test]
    async fn one_outcome_per_in_progress_contact() {
        let store = ContactStore::new();
        for i in 0..3 {
            store.add(format!("c{i}"), format!("{i}")).await;
        }
        let policy = policy(3);
        let mut draws = 0usize;
        store
            .advance(&policy, &mut || {
                draws += 1;
                false
            })
            .await;
        assert_eq!(draws, 0);
        store
            .advance(&policy, &mut || {
                draws += 1;
                false
            })
            .await;
        assert_eq!(draws, 3);
    }

    #[tokio::test]
    async fn removed_in_progress_contact_is_not_resolved() {
        let store = ContactStore::new();
        let alice = store.add("Alice", "1").await;
        let policy = policy(3);

        let snapshot = store.advance(&policy, &mut || false).await;
        assert_eq!(snapshot[0].status, ContactStatus::InProgress);
        assert!(store.remove(alice.id).await);

        let mut draws = 0usize;
        let snapshot = store
            .advance(&policy, &mut || {
                draws += 1;
                true
            })
            .await;
        assert_eq!(draws, 0);
        assert!(snapshot.is_empty());
        assert!(store.get(alice.id).await.is_none());
    }

    #[tokio::test]
    async fn stats_and_reset() {
        let store = ContactStore::new();
        store.add("Alice", "1").await;
        store.add("Bob", "2").await;
        let policy = policy(1);
        store.advance(&policy, &mut || true).await;
        store.advance(&policy, &mut || true).await;

        let stats = store.stats().await;
        assert_eq!(stats.completed, 2);
        assert!(stats.all_terminal());

        store.reset().await;
        let stats = store.stats().await;
        assert_eq!(stats.pending, 2);
        assert!(store.list().await.iter().all(|c| c.attempts == 0));
    }

    #[tokio::test]
    async fn empty_store_is_not_all_terminal() {
        assert!(!ContactStore::new().all_terminal().await);
    }
}
