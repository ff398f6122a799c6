//! `redial run`: seed a store, run the scheduler, print the outcome.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;
use uuid::Uuid;

use redial_config::load_and_prepare;
use redial_core::{ContactStats, OutcomeSource, RunObserver, StopReason};
use redial_logging::{init_logger, LoggingObserver};
use redial_scheduler::{CoinFlip, ContactStore, RetryScheduler};

use crate::terminal_output::{contacts_table, note_info, note_success, note_warn, stats_line};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Seconds between ticks (overrides the config)
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Attempts per contact (overrides the config)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Stop after this many ticks even if contacts are still live
    #[arg(long)]
    tick_budget: Option<u64>,

    /// Extra contact as NAME=DESTINATION; may be repeated
    #[arg(long = "contact", value_name = "NAME=DESTINATION")]
    contacts: Vec<String>,

    /// Chance that a simulated attempt succeeds (0.0 to 1.0)
    #[arg(long)]
    success_probability: Option<f64>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Do not print a line per tick
    #[arg(short, long)]
    quiet: bool,
}

/// Split `NAME=DESTINATION`. Both halves are required.
fn parse_contact(raw: &str) -> Result<(String, String)> {
    let Some((name, destination)) = raw.split_once('=') else {
        bail!("contact {raw:?} must look like NAME=DESTINATION");
    };
    let (name, destination) = (name.trim(), destination.trim());
    if name.is_empty() || destination.is_empty() {
        bail!("contact {raw:?} needs both a name and a destination");
    }
    Ok((name.to_string(), destination.to_string()))
}

/// Prints progress to the terminal and forwards everything to the log.
struct ConsoleObserver {
    log: LoggingObserver,
    quiet: bool,
}

impl RunObserver for ConsoleObserver {
    fn on_started(&self, run_id: Uuid, contact_count: usize) {
        self.log.on_started(run_id, contact_count);
        note_info(&format!("Calling {contact_count} contact(s)"));
    }

    fn on_stopped(&self, run_id: Uuid, reason: StopReason) {
        self.log.on_stopped(run_id, reason);
        match reason {
            StopReason::AllTerminal => note_success("All contacts settled"),
            StopReason::UserRequested => note_warn("Run stopped"),
            StopReason::TickBudgetExhausted => note_warn("Tick budget used up; run stopped"),
        }
    }

    fn on_tick(&self, run_id: Uuid, tick: u64, stats: &ContactStats) {
        self.log.on_tick(run_id, tick, stats);
        if !self.quiet {
            println!("  tick {tick:>3}  {}", stats_line(stats));
        }
    }
}

pub async fn run(path: &Path, args: RunArgs) -> Result<()> {
    let (config, warnings) = load_and_prepare(path).await?;
    init_logger(
        config.log_dir().map(|p| p.as_path()),
        config.log_level().unwrap_or("info"),
    );
    for warning in &warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }

    let mut settings = config.policy_settings()?;
    if let Some(secs) = args.tick_secs {
        settings.set_tick_secs(secs)?;
    }
    if let Some(attempts) = args.max_attempts {
        settings.set_max_attempts(attempts)?;
    }
    if args.tick_budget.is_some() {
        settings.set_tick_budget(args.tick_budget)?;
    }
    let policy = settings.policy();

    let mut extra = Vec::with_capacity(args.contacts.len());
    for raw in &args.contacts {
        extra.push(parse_contact(raw)?);
    }

    let store = Arc::new(ContactStore::new());
    for entry in &config.contacts {
        store.add(entry.name.clone(), entry.destination.clone()).await;
    }
    for (name, destination) in extra {
        store.add(name, destination).await;
    }

    let probability = args
        .success_probability
        .or(config.success_probability())
        .unwrap_or(0.5);
    let outcomes: Box<dyn OutcomeSource> = match args.seed.or(config.seed()) {
        Some(seed) => Box::new(CoinFlip::seeded(probability, seed)?),
        None => Box::new(CoinFlip::new(probability)?),
    };

    let scheduler = RetryScheduler::new(Arc::new(ConsoleObserver {
        log: LoggingObserver::new(),
        quiet: args.quiet,
    }));

    info!(
        config = %path.display(),
        tick_secs = settings.tick_secs(),
        max_attempts = settings.max_attempts(),
        "Starting run"
    );
    scheduler
        .start(Arc::clone(&store), policy, outcomes)
        .await
        .context("Could not start the run (add contacts with --contact or `redial init`)")?;

    tokio::select! {
        _ = scheduler.wait() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            scheduler.stop().await;
        }
    }

    let contacts = store.list().await;
    println!();
    print!("{}", contacts_table(&contacts, policy.max_attempts()));
    println!();
    println!("  {}", stats_line(&store.stats().await));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_destination() {
        let (name, dest) = parse_contact("Maria Ivanova = +7 (999) 987-65-43").unwrap();
        assert_eq!(name, "Maria Ivanova");
        assert_eq!(dest, "+7 (999) 987-65-43");
    }

    #[test]
    fn rejects_incomplete_contacts() {
        assert!(parse_contact("no separator").is_err());
        assert!(parse_contact("=+1 555 0100").is_err());
        assert!(parse_contact("Alice=").is_err());
    }

    #[test]
    fn destination_may_contain_equals() {
        let (_, dest) = parse_contact("Desk=sip:desk;tag=1").unwrap();
        assert_eq!(dest, "sip:desk;tag=1");
    }
}
