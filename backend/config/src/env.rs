//! Environment variable overrides for config values.
//!
//! | variable | field |
//! |---|---|
//! | `REDIAL_TICK_SECS` | `policy.tickIntervalSecs` |
//! | `REDIAL_MAX_ATTEMPTS` | `policy.maxAttempts` |
//! | `REDIAL_LOG_LEVEL` | `logging.level` |
//!
//! Overrides are applied before defaults and validation, so an overridden
//! value is range-checked like one read from the file.

use std::collections::HashMap;
use std::str::FromStr;

use crate::schema::{LoggingConfig, PolicyConfig, RedialConfig};

pub const TICK_SECS_VAR: &str = "REDIAL_TICK_SECS";
pub const MAX_ATTEMPTS_VAR: &str = "REDIAL_MAX_ATTEMPTS";
pub const LOG_LEVEL_VAR: &str = "REDIAL_LOG_LEVEL";

/// Error returned for an override that does not parse.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value {value:?} in env var \"{var_name}\": expected {expected}")]
pub struct InvalidEnvVarError {
    pub var_name: String,
    pub value: String,
    pub expected: &'static str,
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: RedialConfig) -> Result<RedialConfig, InvalidEnvVarError> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(
    mut config: RedialConfig,
    env: &HashMap<String, String>,
) -> Result<RedialConfig, InvalidEnvVarError> {
    if let Some(secs) = parse_var::<u64>(env, TICK_SECS_VAR, "a whole number of seconds")? {
        config
            .policy
            .get_or_insert_with(PolicyConfig::default)
            .tick_interval_secs = Some(secs);
    }
    if let Some(attempts) = parse_var::<u32>(env, MAX_ATTEMPTS_VAR, "a positive integer")? {
        config
            .policy
            .get_or_insert_with(PolicyConfig::default)
            .max_attempts = Some(attempts);
    }
    if let Some(level) = env.get(LOG_LEVEL_VAR).filter(|v| !v.trim().is_empty()) {
        config
            .logging
            .get_or_insert_with(LoggingConfig::default)
            .level = Some(level.trim().to_string());
    }
    Ok(config)
}

fn parse_var<T: FromStr>(
    env: &HashMap<String, String>,
    var_name: &str,
    expected: &'static str,
) -> Result<Option<T>, InvalidEnvVarError> {
    let Some(raw) = env.get(var_name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| InvalidEnvVarError {
        var_name: var_name.to_string(),
        value: raw.to_string(),
        expected,
    })
}
