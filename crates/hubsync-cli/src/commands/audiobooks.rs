//! Audiobooks command: push listening progress onto the shelf

use std::path::Path;

use colored::Colorize;
use serde_json::Value;

use hubsync_adapters::{ListeningRecord, ProgressSync, ShelfItem};
use hubsync_core::{ApplyMode, DiffOptions, Reconciler};

use super::finish;
use crate::error::{CliError, Result};
use crate::snapshot::{ShelfStore, SnapshotSource, load_json_document};

/// Run the audiobooks command
pub fn run_audiobooks(
    library: &Path,
    shelf: &Path,
    dry_run: bool,
    force_update: bool,
) -> Result<()> {
    println!(
        "{} Syncing listening progress to the audiobook shelf...",
        "=>".blue().bold()
    );

    let listening = load_library(library)?;
    println!("   {} library records loaded", listening.len());

    let mut store = ShelfStore::load(shelf)?;
    let shelf_items: Vec<ShelfItem> = store.records()?;
    let mode = if dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::Apply
    };

    let pass = Reconciler::new(ProgressSync).with_options(DiffOptions { force_update });
    let source = SnapshotSource::new(listening, shelf_items);
    let (plan, result) = pass.run(&source, &mut store, mode)?;
    finish(&plan, &result, dry_run, true)?;
    if !dry_run {
        store.save()?;
    }

    Ok(())
}

/// Load the seller library export, wrapped or flat
///
/// Older exports are a bare list; newer ones wrap the list under an
/// `items` key next to extraction stats.
fn load_library(path: &Path) -> Result<Vec<ListeningRecord>> {
    let document = load_json_document(path)?;
    let items = match &document {
        Value::Array(_) => document,
        Value::Object(map) => map
            .get("items")
            .cloned()
            .ok_or_else(|| CliError::user("library export has no items list"))?,
        _ => return Err(CliError::user("library export is not a list")),
    };
    Ok(serde_json::from_value(items)?)
}
