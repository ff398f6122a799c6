//! Telemetry and structured logging for redial.
//!
//! Handles subscriber setup (console plus optional rolling NDJSON file),
//! destination redaction, and logging of scheduler run events.

pub mod logger;
pub mod observer;
pub mod redact;

pub use logger::init_logger;
pub use observer::LoggingObserver;
pub use redact::{redact_destination, redact_phone_numbers};
