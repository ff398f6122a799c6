pub mod error;
pub mod event;
pub mod policy;
pub mod traits;
pub mod types;

pub use error::{RedialError, Result};
pub use event::{RunEvent, RunEventKind, StopReason};
pub use policy::{PolicyBounds, PolicySettings, RetryPolicy};
pub use traits::{Clock, NoopObserver, OutcomeSource, RunObserver, SystemClock};
pub use types::{Contact, ContactId, ContactStats, ContactStatus};
