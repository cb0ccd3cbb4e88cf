//! Field-level diffing of matched record pairs
//!
//! The diff engine turns each (desired, matched-remote) pair into one
//! operation. Repair and force rules widen the update before the
//! equality check runs, never after, so skip decisions are stable and a
//! plan applied once yields only skips on the next pass.

use tracing::{debug, warn};

use crate::domain::Domain;
use crate::record::{MatchKey, Operation, OperationKind, SkipReason, UnmatchedPolicy};

/// Completion percentage above which progress coalesces to finished
pub const FINISHED_THRESHOLD_PCT: f64 = 95.0;

/// A completion value after threshold coalescing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// Fully finished, regardless of the literal stored percentage
    Finished,
    /// Partial completion as a 0.0..=1.0 ratio
    Partial(f64),
}

/// Coalesce a completion percentage and finished flag
///
/// Percentages strictly above [`FINISHED_THRESHOLD_PCT`] count as
/// finished so near-complete records do not produce a fresh update on
/// every pass.
pub fn coalesce_percent(percent: f64, is_finished: bool) -> Completion {
    if is_finished || percent > FINISHED_THRESHOLD_PCT {
        Completion::Finished
    } else {
        Completion::Partial((percent / 100.0).clamp(0.0, 1.0))
    }
}

/// Options widening the diff decision
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Rewrite every matched record, in sync or not
    pub force_update: bool,
}

/// Decide the operation for one desired record
pub fn diff_one<A: Domain>(
    domain: &A,
    key: MatchKey,
    desired: &A::Desired,
    matched: Option<&A::Remote>,
    options: DiffOptions,
) -> Operation<A::Desired> {
    let label = domain.label(desired);

    let Some(remote) = matched else {
        return match domain.unmatched_policy() {
            UnmatchedPolicy::Create => Operation {
                key,
                label,
                kind: OperationKind::Create(desired.clone()),
            },
            UnmatchedPolicy::Report => {
                warn!(
                    domain = domain.name(),
                    key = %key,
                    "desired record not found on remote"
                );
                Operation {
                    key,
                    label,
                    kind: OperationKind::Skip(SkipReason::NotFoundOnRemote),
                }
            }
        };
    };

    // Repair and force rules run before the equality check.
    let changes = if options.force_update || domain.needs_repair(remote) {
        domain.all_fields(desired, remote)
    } else {
        domain.changed_fields(desired, remote)
    };

    if changes.is_empty() {
        debug!(domain = domain.name(), key = %key, "record already in sync");
        return Operation {
            key,
            label,
            kind: OperationKind::Skip(SkipReason::AlreadyInSync),
        };
    }

    Operation {
        key,
        label,
        kind: OperationKind::Update {
            remote_id: domain.remote_id(remote),
            changes,
        },
    }
}
