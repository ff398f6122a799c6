//! Config validation: range and consistency checks with field paths.

use std::collections::HashSet;

use crate::schema::RedialConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &RedialConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_policy(config, &mut report);
    validate_outcomes(config, &mut report);
    validate_logging(config, &mut report);
    validate_contacts(config, &mut report);
    report
}

/// Policy values must sit inside the configured bounds; never clamped.
fn validate_policy(config: &RedialConfig, report: &mut ValidationReport) {
    let bounds = config.bounds();
    if let Err(e) = bounds.validate() {
        report.error("bounds", e.to_string());
        return;
    }
    if let Some(secs) = config.tick_secs() {
        if bounds.check_tick_secs(secs).is_err() {
            report.error(
                "policy.tickIntervalSecs",
                format!(
                    "{secs} is outside {}..={} seconds",
                    bounds.min_tick_secs, bounds.max_tick_secs
                ),
            );
        }
    }
    if let Some(attempts) = config.max_attempts() {
        if bounds.check_max_attempts(attempts).is_err() {
            report.error(
                "policy.maxAttempts",
                format!(
                    "{attempts} is outside {}..={}",
                    bounds.min_attempts, bounds.max_attempts
                ),
            );
        }
    }
    if config.tick_budget() == Some(0) {
        report.error("policy.tickBudget", "tickBudget must be >= 1 when set");
    }
}

fn validate_outcomes(config: &RedialConfig, report: &mut ValidationReport) {
    if let Some(p) = config.success_probability() {
        if !(0.0..=1.0).contains(&p) {
            report.error(
                "outcomes.successProbability",
                format!("{p} is outside 0.0..=1.0"),
            );
        } else if p == 0.0 {
            report.warn(
                "outcomes.successProbability",
                "Every simulated attempt will fail",
            );
        }
    }
}

fn validate_logging(config: &RedialConfig, report: &mut ValidationReport) {
    if let Some(level) = config.log_level() {
        if level.trim().is_empty() {
            report.error("logging.level", "Log level cannot be empty");
        }
    }
}

/// Seed contacts need both fields, as the add-contact form requires.
fn validate_contacts(config: &RedialConfig, report: &mut ValidationReport) {
    if config.contacts.is_empty() {
        report.warn("contacts", "No contacts configured; a run cannot start without any");
    }
    let mut seen = HashSet::new();
    for (i, contact) in config.contacts.iter().enumerate() {
        if contact.name.trim().is_empty() {
            report.error(format!("contacts[{i}].name"), "Contact name cannot be empty");
        }
        if contact.destination.trim().is_empty() {
            report.error(
                format!("contacts[{i}].destination"),
                "Contact destination cannot be empty",
            );
        } else if !seen.insert(contact.destination.trim()) {
            report.warn(
                format!("contacts[{i}].destination"),
                "Destination is listed more than once",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::starter_config;
    use crate::schema::{ContactEntry, OutcomeConfig, PolicyConfig};

    #[test]
    fn starter_config_is_valid() {
        let report = validate(&starter_config());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn attempts_above_bound_is_error() {
        let mut cfg = starter_config();
        cfg.policy = Some(PolicyConfig {
            tick_interval_secs: Some(45),
            max_attempts: Some(12),
            tick_budget: None,
        });
        let report = validate(&cfg);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["policy.tickIntervalSecs", "policy.maxAttempts"]);
    }

    #[test]
    fn probability_out_of_range_is_error() {
        let mut cfg = starter_config();
        cfg.outcomes = Some(OutcomeConfig {
            success_probability: Some(1.2),
            seed: None,
        });
        assert!(!validate(&cfg).is_valid());
    }

    #[test]
    fn blank_contact_fields_are_errors() {
        let mut cfg = starter_config();
        cfg.contacts.push(ContactEntry {
            name: " ".into(),
            destination: String::new(),
        });
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].path.starts_with("contacts[2]"));
    }

    #[test]
    fn duplicate_destination_is_warning() {
        let mut cfg = starter_config();
        let dup = cfg.contacts[0].clone();
        cfg.contacts.push(dup);
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
