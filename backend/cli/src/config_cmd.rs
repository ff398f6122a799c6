//! `redial check-config` and `redial init`.

use std::path::Path;

use anyhow::{bail, Result};

use redial_config::{load_with_report, starter_config, write_config};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

/// Print the validation report for `path`. Fails when the config has errors.
pub async fn check(path: &Path) -> Result<()> {
    let (config, report) = load_with_report(path).await?;

    note_info(&format!("Checked {}", path.display()));
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }

    if !report.is_valid() {
        bail!("{} error(s) in config", report.errors.len());
    }

    let settings = config.policy_settings()?;
    note_success(&format!(
        "Config OK: tick every {}s, up to {} attempts, {} contact(s)",
        settings.tick_secs(),
        settings.max_attempts(),
        config.contacts.len()
    ));
    Ok(())
}

/// Write the starter config to `path`.
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    write_config(&starter_config(), path).await?;
    note_success(&format!("Wrote starter config to {}", path.display()));
    Ok(())
}
