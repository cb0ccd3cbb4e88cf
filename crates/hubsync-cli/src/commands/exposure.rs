//! Exposure command: set assistant exposure flags on the entity registry

use std::fs;
use std::path::Path;

use colored::Colorize;

use hubsync_adapters::{ExposureConfig, ExposureSync, RegistryEntry};
use hubsync_core::{ApplyMode, DiffOptions, Reconciler};

use super::finish;
use crate::error::Result;
use crate::snapshot::{RegistryStore, SnapshotSource};

/// Run the exposure command
pub fn run_exposure(
    config: &Path,
    registry: &Path,
    dry_run: bool,
    force_update: bool,
) -> Result<()> {
    println!(
        "{} Syncing assistant exposure into the entity registry...",
        "=>".blue().bold()
    );

    let exposure = ExposureConfig::parse(&fs::read_to_string(config)?)?;
    println!("   {} entities listed for exposure", exposure.exposed_count());

    let mut store = RegistryStore::load(registry)?;
    let entries: Vec<RegistryEntry> = store.entries()?;
    println!("   {} entities in the registry", entries.len());

    let sync = ExposureSync::default();
    let desired = sync.desired_from_config(&exposure, &entries);
    let mode = if dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::Apply
    };

    let pass = Reconciler::new(sync).with_options(DiffOptions { force_update });
    let source = SnapshotSource::new(desired, entries);
    let (plan, result) = pass.run(&source, &mut store, mode)?;
    finish(&plan, &result, dry_run, true)?;
    if !dry_run {
        store.save()?;
    }

    Ok(())
}
