//! Per-tick retry transition for a single contact.
//!
//! Rules are checked in priority order and only the first match fires:
//!
//! 1. `InProgress` resolves: one outcome is drawn, `true` completes the
//!    contact and `false` puts it back to `Pending` (the attempt was already
//!    counted when it started).
//! 2. `Pending` with attempts left starts a new attempt.
//! 3. Out of attempts and not completed: `Failed`.
//! 4. Anything else is left alone.
//!
//! Starting and resolving an attempt therefore always take two separate ticks.

use chrono::{DateTime, Utc};
use redial_core::{Contact, ContactStatus, OutcomeSource, RetryPolicy};

/// What a tick did to one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `Pending` → `InProgress`, attempt counter incremented.
    Dialed,
    /// `InProgress` → `Completed`.
    Completed,
    /// `InProgress` → `Pending`, attempt consumed.
    Requeued,
    /// Attempts exhausted → `Failed`.
    Failed,
    Unchanged,
}

impl Transition {
    pub fn is_change(self) -> bool {
        self != Transition::Unchanged
    }
}

/// Apply one tick to `contact`.
pub fn apply(
    contact: &mut Contact,
    policy: &RetryPolicy,
    outcomes: &mut dyn OutcomeSource,
    now: DateTime<Utc>,
) -> Transition {
    match contact.status {
        ContactStatus::InProgress => {
            if outcomes.next_outcome() {
                contact.status = ContactStatus::Completed;
                Transition::Completed
            } else {
                contact.status = ContactStatus::Pending;
                Transition::Requeued
            }
        }
        ContactStatus::Pending if contact.attempts < policy.max_attempts() => {
            contact.attempts += 1;
            contact.status = ContactStatus::InProgress;
            contact.last_attempt_at = Some(now);
            Transition::Dialed
        }
        ContactStatus::Pending => {
            contact.status = ContactStatus::Failed;
            Transition::Failed
        }
        ContactStatus::Completed | ContactStatus::Failed => Transition::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use redial_core::ContactId;

    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(Duration::from_secs(1), max_attempts).unwrap()
    }

    fn never_called() -> impl FnMut() -> bool + Send {
        || -> bool { panic!("outcome drawn for a contact that is not in progress") }
    }

    #[test]
    fn pending_contact_is_dialed() {
        let now = Utc::now();
        let mut c = Contact::new(ContactId(1), "Alice", "+1 555 0100");
        let t = apply(&mut c, &policy(3), &mut never_called(), now);
        assert_eq!(t, Transition::Dialed);
        assert_eq!(c.status, ContactStatus::InProgress);
        assert_eq!(c.attempts, 1);
        assert_eq!(c.last_attempt_at, Some(now));
    }

    #[test]
    fn in_progress_resolves_without_counting_again() {
        let mut c = Contact::new(ContactId(1), "Alice", "+1 555 0100");
        c.status = ContactStatus::InProgress;
        c.attempts = 1;

        let t = apply(&mut c, &policy(3), &mut || false, Utc::now());
        assert_eq!(t, Transition::Requeued);
        assert_eq!(c.status, ContactStatus::Pending);
        assert_eq!(c.attempts, 1);

        c.status = ContactStatus::InProgress;
        let t = apply(&mut c, &policy(3), &mut || true, Utc::now());
        assert_eq!(t, Transition::Completed);
        assert_eq!(c.status, ContactStatus::Completed);
        assert_eq!(c.attempts, 1);
    }

    #[test]
    fn last_attempt_resolves_before_failing() {
        // Rule 1 wins over rule 3 even when attempts are exhausted.
        let mut c = Contact::new(ContactId(1), "Alice", "+1 555 0100");
        c.status = ContactStatus::InProgress;
        c.attempts = 2;
        let t = apply(&mut c, &policy(2), &mut || true, Utc::now());
        assert_eq!(t, Transition::Completed);
    }

    #[test]
    fn exhausted_pending_contact_fails() {
        let mut c = Contact::new(ContactId(1), "Alice", "+1 555 0100");
        c.attempts = 2;
        let t = apply(&mut c, &policy(2), &mut never_called(), Utc::now());
        assert_eq!(t, Transition::Failed);
        assert_eq!(c.status, ContactStatus::Failed);
        assert_eq!(c.attempts, 2);
    }

    #[test]
    fn terminal_contacts_never_change() {
        for status in [ContactStatus::Completed, ContactStatus::Failed] {
            let mut c = Contact::new(ContactId(1), "Alice", "+1 555 0100");
            c.status = status;
            c.attempts = 1;
            let before = c.clone();
            let t = apply(&mut c, &policy(1), &mut never_called(), Utc::now());
            assert_eq!(t, Transition::Unchanged);
            assert_eq!(c, before);
        }
    }
}
