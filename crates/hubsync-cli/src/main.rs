//! hubsync CLI
//!
//! The command-line interface for keeping hub configuration and
//! external services aligned with a locally authored desired state.

mod cli;
mod commands;
mod error;
mod snapshot;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;
use hubsync_adapters::DocumentKind;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Devices {
            devices,
            areas,
            items,
            locations,
            rules,
            dry_run,
            force_update,
        } => commands::run_devices(
            &devices,
            &areas,
            &items,
            &locations,
            rules.as_deref(),
            dry_run,
            force_update,
        ),
        Commands::Audiobooks {
            library,
            shelf,
            dry_run,
            force_update,
        } => commands::run_audiobooks(&library, &shelf, dry_run, force_update),
        Commands::Exposure {
            config,
            registry,
            dry_run,
            force_update,
        } => commands::run_exposure(&config, &registry, dry_run, force_update),
        Commands::Homekit {
            config,
            entries,
            dry_run,
            force_update,
        } => commands::run_homekit(&config, &entries, dry_run, force_update),
        Commands::Scenes {
            files,
            server,
            dry_run,
            force_update,
        } => commands::run_documents(DocumentKind::Scene, &files, &server, dry_run, force_update),
        Commands::Automations {
            files,
            server,
            dry_run,
            force_update,
        } => commands::run_documents(
            DocumentKind::Automation,
            &files,
            &server,
            dry_run,
            force_update,
        ),
    }
}
