//! Command implementations

mod audiobooks;
mod devices;
mod documents;
mod exposure;
mod homekit;

pub use audiobooks::run_audiobooks;
pub use devices::run_devices;
pub use documents::run_documents;
pub use exposure::run_exposure;
pub use homekit::run_homekit;

use colored::Colorize;

use hubsync_core::{Plan, SyncResult};

use crate::error::{CliError, Result};

/// Print the rendered report and enforce the exit policy
///
/// Non-zero exit when any write was rejected, or when a report-only
/// domain had desired records with no remote counterpart.
pub(crate) fn finish<D>(
    plan: &Plan<D>,
    result: &SyncResult,
    dry_run: bool,
    unmatched_is_error: bool,
) -> Result<()> {
    print!("{}", hubsync_core::render(plan, result));

    if !result.is_clean() {
        return Err(CliError::user(format!(
            "{} write(s) rejected by the remote",
            result.errored
        )));
    }
    if unmatched_is_error && plan.unmatched() > 0 {
        return Err(CliError::user(format!(
            "{} desired record(s) not found on remote",
            plan.unmatched()
        )));
    }

    if dry_run {
        println!("{} Dry run. No changes were written.", "OK".green().bold());
    } else {
        println!("{} Sync complete.", "OK".green().bold());
    }
    Ok(())
}
