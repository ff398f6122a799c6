mod config_cmd;
mod run_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use redial_config::{config_dir, config_file_path};

use run_cmd::RunArgs;

#[derive(Parser)]
#[command(name = "redial")]
#[command(about = "redial: bounded call-retry scheduler")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.redial/config.yaml, or $REDIAL_CONFIG_DIR/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the retry scheduler over the configured contacts
    Run(RunArgs),
    /// Validate the config file and print the report
    CheckConfig,
    /// Write a starter config file with sample contacts
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));

    let outcome = match cli.command {
        Commands::Run(args) => run_cmd::run(&path, args).await,
        Commands::CheckConfig => config_cmd::check(&path).await,
        Commands::Init { force } => config_cmd::init(&path, force).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            terminal_output::note_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
