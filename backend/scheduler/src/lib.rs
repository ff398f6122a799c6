//! Bounded call-retry scheduling.
//!
//! [`ContactStore`] owns the contacts and applies one tick at a time;
//! [`RetryScheduler`] runs ticks on a timer until every contact is terminal
//! or the run is stopped.

pub mod outcome;
pub mod scheduler;
pub mod store;
pub mod transition;

pub use outcome::{CoinFlip, ScriptedOutcomes};
pub use scheduler::{RetryScheduler, SchedulerState};
pub use store::ContactStore;
pub use transition::Transition;
