//! Scenes and automations commands: update server documents from files

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;

use hubsync_adapters::{ConfigDocument, DocumentKind, DocumentSync};
use hubsync_core::{ApplyMode, DiffOptions, Reconciler};

use super::finish;
use crate::error::Result;
use crate::snapshot::{DocumentStore, SnapshotSource};

/// Run the scenes or automations command
///
/// Each local file holds one document; malformed files are warned about
/// and skipped while the rest of the batch proceeds.
pub fn run_documents(
    kind: DocumentKind,
    files: &[PathBuf],
    server: &Path,
    dry_run: bool,
    force_update: bool,
) -> Result<()> {
    println!(
        "{} Updating {} from {} local file(s)...",
        "=>".blue().bold(),
        kind.as_str(),
        files.len()
    );

    let mut desired = Vec::new();
    for file in files {
        let content = fs::read_to_string(file)?;
        match ConfigDocument::from_yaml(kind, &content) {
            Ok(document) => desired.push(document),
            Err(err) => {
                println!(
                    "{} {}: {}",
                    "warning".yellow().bold(),
                    file.display(),
                    err
                );
            }
        }
    }

    if desired.is_empty() {
        return Err(crate::error::CliError::user(format!(
            "no valid {} documents to sync",
            kind.as_str()
        )));
    }

    let mut store = DocumentStore::load(server)?;
    let remote: Vec<ConfigDocument> = store
        .raw()
        .iter()
        .cloned()
        .map(ConfigDocument::from_value)
        .collect();
    let mode = if dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::Apply
    };

    let pass = Reconciler::new(DocumentSync::new(kind)).with_options(DiffOptions { force_update });
    let source = SnapshotSource::new(desired, remote);
    let (plan, result) = pass.run(&source, &mut store, mode)?;
    finish(&plan, &result, dry_run, true)?;
    if !dry_run {
        store.save()?;
    }

    Ok(())
}
