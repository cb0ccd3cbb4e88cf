//! Homekit command: replace the bridge filter lists

use std::fs;
use std::path::Path;

use colored::Colorize;

use hubsync_adapters::{BridgeEntry, BridgeFilter, HomekitSync};
use hubsync_core::{ApplyMode, DiffOptions, Reconciler};

use super::finish;
use crate::error::Result;
use crate::snapshot::{EntriesStore, SnapshotSource};

/// Run the homekit command
pub fn run_homekit(config: &Path, entries: &Path, dry_run: bool, force_update: bool) -> Result<()> {
    println!(
        "{} Syncing HomeKit bridge filter lists...",
        "=>".blue().bold()
    );

    let desired = BridgeFilter::parse(&fs::read_to_string(config)?)?;
    println!(
        "   include: {} domains, {} entities; exclude: {} domains, {} entities",
        desired.include_domains.len(),
        desired.include_entities.len(),
        desired.exclude_domains.len(),
        desired.exclude_entities.len()
    );

    let mut store = EntriesStore::load(entries)?;
    let bridge_entries: Vec<BridgeEntry> = store.entries()?;
    let mode = if dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::Apply
    };

    let pass = Reconciler::new(HomekitSync).with_options(DiffOptions { force_update });
    let source = SnapshotSource::new(vec![desired], bridge_entries);
    let (plan, result) = pass.run(&source, &mut store, mode)?;
    finish(&plan, &result, dry_run, true)?;
    if !dry_run {
        store.save()?;
    }

    Ok(())
}
