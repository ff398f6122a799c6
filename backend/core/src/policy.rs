//! Retry policy: how often the scheduler ticks and how many attempts each
//! contact gets.
//!
//! [`RetryPolicy`] is the immutable per-run value handed to the scheduler.
//! [`PolicySettings`] is the mutable configuration surface in front of it,
//! which range-checks every change against [`PolicyBounds`] and rejects
//! out-of-range values instead of clamping them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RedialError, Result};

/// Default delay between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of attempts per contact.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Run-wide retry configuration. Fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    tick_interval: Duration,
    max_attempts: u32,
    tick_budget: Option<u64>,
}

impl RetryPolicy {
    /// Build a policy. `tick_interval` must be non-zero and `max_attempts`
    /// at least 1.
    pub fn new(tick_interval: Duration, max_attempts: u32) -> Result<Self> {
        if tick_interval.is_zero() {
            return Err(RedialError::invalid_argument(
                "tickInterval",
                "must be greater than zero",
            ));
        }
        if max_attempts == 0 {
            return Err(RedialError::invalid_argument(
                "maxAttempts",
                "must be at least 1",
            ));
        }
        Ok(Self {
            tick_interval,
            max_attempts,
            tick_budget: None,
        })
    }

    /// Stop a run after `ticks` ticks even if some contacts are still live.
    ///
    /// Off by default; the terminal-state check is the normal stop condition.
    pub fn with_tick_budget(mut self, ticks: u64) -> Self {
        self.tick_budget = Some(ticks.max(1));
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn tick_budget(&self) -> Option<u64> {
        self.tick_budget
    }

    /// Upper bound on the ticks needed to drive a contact that is `Pending`
    /// with zero attempts to a terminal state: two ticks per attempt plus the
    /// tick that marks it `Failed`.
    pub fn worst_case_ticks(&self) -> u64 {
        2 * u64::from(self.max_attempts) + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tick_budget: None,
        }
    }
}

/// Inclusive ranges accepted by [`PolicySettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBounds {
    pub min_tick_secs: u64,
    pub max_tick_secs: u64,
    pub min_attempts: u32,
    pub max_attempts: u32,
}

impl Default for PolicyBounds {
    fn default() -> Self {
        Self {
            min_tick_secs: 1,
            max_tick_secs: 30,
            min_attempts: 1,
            max_attempts: 10,
        }
    }
}

impl PolicyBounds {
    /// Reject bounds that are empty or that would admit a zero interval or
    /// zero attempts.
    pub fn validate(&self) -> Result<()> {
        if self.min_tick_secs == 0 || self.min_tick_secs > self.max_tick_secs {
            return Err(RedialError::invalid_argument(
                "bounds.tickSecs",
                format!(
                    "range {}..={} is empty or admits zero",
                    self.min_tick_secs, self.max_tick_secs
                ),
            ));
        }
        if self.min_attempts == 0 || self.min_attempts > self.max_attempts {
            return Err(RedialError::invalid_argument(
                "bounds.attempts",
                format!(
                    "range {}..={} is empty or admits zero",
                    self.min_attempts, self.max_attempts
                ),
            ));
        }
        Ok(())
    }

    pub fn check_tick_secs(&self, secs: u64) -> Result<()> {
        if (self.min_tick_secs..=self.max_tick_secs).contains(&secs) {
            Ok(())
        } else {
            Err(RedialError::invalid_argument(
                "tickIntervalSecs",
                format!(
                    "{secs} is outside {}..={}",
                    self.min_tick_secs, self.max_tick_secs
                ),
            ))
        }
    }

    pub fn check_max_attempts(&self, attempts: u32) -> Result<()> {
        if (self.min_attempts..=self.max_attempts).contains(&attempts) {
            Ok(())
        } else {
            Err(RedialError::invalid_argument(
                "maxAttempts",
                format!(
                    "{attempts} is outside {}..={}",
                    self.min_attempts, self.max_attempts
                ),
            ))
        }
    }
}

/// Operator-facing policy settings with range-checked mutators.
///
/// A rejected mutation leaves the previous value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySettings {
    bounds: PolicyBounds,
    tick_secs: u64,
    max_attempts: u32,
    tick_budget: Option<u64>,
}

impl PolicySettings {
    pub fn new(bounds: PolicyBounds, tick_secs: u64, max_attempts: u32) -> Result<Self> {
        bounds.validate()?;
        bounds.check_tick_secs(tick_secs)?;
        bounds.check_max_attempts(max_attempts)?;
        Ok(Self {
            bounds,
            tick_secs,
            max_attempts,
            tick_budget: None,
        })
    }

    pub fn bounds(&self) -> &PolicyBounds {
        &self.bounds
    }

    pub fn tick_secs(&self) -> u64 {
        self.tick_secs
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn tick_budget(&self) -> Option<u64> {
        self.tick_budget
    }

    pub fn set_tick_secs(&mut self, secs: u64) -> Result<()> {
        self.bounds.check_tick_secs(secs)?;
        self.tick_secs = secs;
        Ok(())
    }

    pub fn set_max_attempts(&mut self, attempts: u32) -> Result<()> {
        self.bounds.check_max_attempts(attempts)?;
        self.max_attempts = attempts;
        Ok(())
    }

    /// `None` disables the safety cutoff. `Some(0)` is rejected.
    pub fn set_tick_budget(&mut self, ticks: Option<u64>) -> Result<()> {
        if ticks == Some(0) {
            return Err(RedialError::invalid_argument(
                "tickBudget",
                "must be at least 1 when set",
            ));
        }
        self.tick_budget = ticks;
        Ok(())
    }

    /// Snapshot the current settings as an immutable run policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            tick_interval: self.tick_interval(),
            max_attempts: self.max_attempts,
            tick_budget: self.tick_budget,
        }
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            bounds: PolicyBounds::default(),
            tick_secs: DEFAULT_TICK_INTERVAL.as_secs(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tick_budget: None,
        }
    }
}
