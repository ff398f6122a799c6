//! Config defaults: applies default values to parsed config.

use redial_core::policy::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TICK_INTERVAL};

use crate::schema::{ContactEntry, LoggingConfig, OutcomeConfig, PolicyConfig, RedialConfig};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default chance that a simulated attempt succeeds.
pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.5;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: RedialConfig) -> RedialConfig {
    let config = apply_policy_defaults(config);
    let config = apply_logging_defaults(config);
    apply_outcome_defaults(config)
}

/// Ensure tick interval and attempt limit are set.
fn apply_policy_defaults(mut config: RedialConfig) -> RedialConfig {
    let policy = config.policy.get_or_insert_with(PolicyConfig::default);
    if policy.tick_interval_secs.is_none() {
        policy.tick_interval_secs = Some(DEFAULT_TICK_INTERVAL.as_secs());
    }
    if policy.max_attempts.is_none() {
        policy.max_attempts = Some(DEFAULT_MAX_ATTEMPTS);
    }
    if config.bounds.is_none() {
        config.bounds = Some(Default::default());
    }
    config
}

fn apply_logging_defaults(mut config: RedialConfig) -> RedialConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    config
}

fn apply_outcome_defaults(mut config: RedialConfig) -> RedialConfig {
    let outcomes = config.outcomes.get_or_insert_with(OutcomeConfig::default);
    if outcomes.success_probability.is_none() {
        outcomes.success_probability = Some(DEFAULT_SUCCESS_PROBABILITY);
    }
    config
}

/// The starter config written by `redial init`: defaults plus two sample
/// contacts.
pub fn starter_config() -> RedialConfig {
    let mut config = apply_all_defaults(RedialConfig::default());
    config.contacts = vec![
        ContactEntry {
            name: "Alexander Petrov".to_string(),
            destination: "+7 (999) 123-45-67".to_string(),
        },
        ContactEntry {
            name: "Maria Ivanova".to_string(),
            destination: "+7 (999) 987-65-43".to_string(),
        },
    ];
    config
}
