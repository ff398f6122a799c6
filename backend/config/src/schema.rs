//! redial configuration schema.
//!
//! Every section is optional in YAML; [`crate::apply_all_defaults`] fills in
//! what the file leaves out.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use redial_core::{PolicyBounds, PolicySettings};

/// Root configuration for redial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedialConfig {
    /// Retry policy for runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyConfig>,

    /// Accepted ranges for the policy values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<PolicyBounds>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Simulated call outcome settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<OutcomeConfig>,

    /// Contacts loaded into the store at startup
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<ContactEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Optional safety cutoff, in ticks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_budget: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directive string, e.g. `info` or `redial_scheduler=debug`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling JSON log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeConfig {
    /// Probability that a simulated attempt succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_probability: Option<f64>,
    /// Fixed RNG seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub name: String,
    pub destination: String,
}

impl RedialConfig {
    pub fn bounds(&self) -> PolicyBounds {
        self.bounds.unwrap_or_default()
    }

    pub fn tick_secs(&self) -> Option<u64> {
        self.policy.as_ref().and_then(|p| p.tick_interval_secs)
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.policy.as_ref().and_then(|p| p.max_attempts)
    }

    pub fn tick_budget(&self) -> Option<u64> {
        self.policy.as_ref().and_then(|p| p.tick_budget)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.logging.as_ref().and_then(|l| l.dir.as_ref())
    }

    pub fn success_probability(&self) -> Option<f64> {
        self.outcomes.as_ref().and_then(|o| o.success_probability)
    }

    pub fn seed(&self) -> Option<u64> {
        self.outcomes.as_ref().and_then(|o| o.seed)
    }

    /// Build the range-checked policy settings. Unset values fall back to
    /// the core defaults.
    pub fn policy_settings(&self) -> redial_core::Result<PolicySettings> {
        let defaults = PolicySettings::default();
        let mut settings = PolicySettings::new(
            self.bounds(),
            self.tick_secs().unwrap_or(defaults.tick_secs()),
            self.max_attempts().unwrap_or(defaults.max_attempts()),
        )?;
        settings.set_tick_budget(self.tick_budget())?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
policy:
  tickIntervalSecs: 2
  maxAttempts: 4
outcomes:
  successProbability: 0.25
  seed: 9
contacts:
  - name: Alice
    destination: "+1 555 0100"
"#;
        let cfg: RedialConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.tick_secs(), Some(2));
        assert_eq!(cfg.max_attempts(), Some(4));
        assert_eq!(cfg.success_probability(), Some(0.25));
        assert_eq!(cfg.seed(), Some(9));
        assert_eq!(cfg.contacts.len(), 1);

        let settings = cfg.policy_settings().unwrap();
        assert_eq!(settings.tick_secs(), 2);
        assert_eq!(settings.max_attempts(), 4);
    }

    #[test]
    fn out_of_bounds_policy_is_rejected() {
        let cfg = RedialConfig {
            policy: Some(PolicyConfig {
                max_attempts: Some(11),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(cfg.policy_settings().is_err());
    }

    #[test]
    fn empty_sections_are_not_serialized() {
        let yaml = serde_yaml::to_string(&RedialConfig::default()).unwrap();
        assert_eq!(yaml.trim(), "{}");
    }
}
