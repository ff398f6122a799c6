//! `redial-config`: redial runtime configuration management.
//!
//! Provides:
//! - Typed config schema (policy, bounds, logging, outcomes, seed contacts)
//! - YAML read/write with an atomic write and a single backup
//! - `REDIAL_*` environment overrides
//! - Default value application
//! - Range and consistency validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::{apply_all_defaults, starter_config};
pub use env::{apply_env_overrides, apply_env_overrides_with, InvalidEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{ContactEntry, RedialConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::Context;
use redial_core::{RedialError, Result};
use std::path::Path;

/// Load a config file, apply env overrides and defaults, and validate it.
///
/// The report comes back untouched, errors included, so the caller decides
/// how to present it.
pub async fn load_with_report(path: &Path) -> Result<(RedialConfig, ValidationReport)> {
    let config = load_config(path).await?;
    let config = apply_env_overrides(config).context("Failed to apply env overrides")?;
    let config = apply_all_defaults(config);
    let report = validate(&config);
    Ok((config, report))
}

/// Load and validate a config for a run.
///
/// Any validation error fails the load with [`RedialError::Config`]. On
/// success the warnings are handed back for the caller to show; they are
/// also logged.
pub async fn load_and_prepare(
    path: &Path,
) -> Result<(RedialConfig, Vec<ConfigValidationError>)> {
    let (config, report) = load_with_report(path).await?;

    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        let details: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        return Err(RedialError::Config(format!(
            "{} has {} invalid value(s): {}",
            path.display(),
            report.errors.len(),
            details.join("; ")
        )));
    }

    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    Ok((config, report.warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_out_of_range_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "policy:\n  maxAttempts: 40\n")
            .await
            .unwrap();
        let err = load_and_prepare(&path).await.unwrap_err();
        assert!(matches!(err, RedialError::Config(_)));
        assert!(err.to_string().contains("policy.maxAttempts"));
    }

    #[tokio::test]
    async fn prepares_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        write_config(&starter_config(), &path).await.unwrap();
        let (cfg, warnings) = load_and_prepare(&path).await.unwrap();
        assert_eq!(cfg.contacts.len(), 2);
        assert!(warnings.is_empty());
        assert!(cfg.policy_settings().is_ok());
    }

    #[tokio::test]
    async fn hands_back_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let yaml = "outcomes:\n  successProbability: 0.0\ncontacts:\n  - name: Alice\n    destination: +1 555 0100\n  - name: Bob\n    destination: +1 555 0100\n";
        tokio::fs::write(&path, yaml).await.unwrap();

        let (_, warnings) = load_and_prepare(&path).await.unwrap();
        let paths: Vec<&str> = warnings.iter().map(|w| w.path.as_str()).collect();
        assert!(paths.contains(&"outcomes.successProbability"));
        assert!(paths.contains(&"contacts[1].destination"));
    }

    #[tokio::test]
    async fn unreadable_file_is_not_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "policy: [not, a, map]\n").await.unwrap();

        let err = load_and_prepare(&path).await.unwrap_err();
        assert!(matches!(err, RedialError::Other(_)));
    }
}
