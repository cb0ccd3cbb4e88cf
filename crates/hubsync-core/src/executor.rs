//! Applying planned operations against a remote writer
//!
//! Operations are processed independently, in the order produced. A
//! rejected write is recorded against its operation and the batch
//! continues: one record's failure never aborts the rest. In dry-run
//! mode the executor degenerates to pure counting and the writer is
//! never invoked.

use serde::Serialize;
use tracing::{debug, error};

use crate::record::{FieldChange, MatchKey, Operation, OperationKind, RemoteId};

/// A write the remote system rejected
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct WriteError {
    /// Reason reported by the writer
    pub message: String,
}

impl WriteError {
    /// Create a write error with the given reason
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The only side-effecting calls the reconciliation core makes
///
/// Implemented by callers; how the calls reach the remote system is out
/// of scope here.
pub trait RecordWriter<D> {
    /// Create a remote record from the desired state
    fn create(&mut self, desired: &D) -> Result<(), WriteError>;

    /// Write the listed field changes to an existing remote record
    fn update(&mut self, remote_id: &RemoteId, changes: &[FieldChange]) -> Result<(), WriteError>;
}

/// Whether operations are dispatched or only counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Dispatch create and update calls to the writer
    #[default]
    Apply,
    /// Classify what each operation would do without invoking the writer
    DryRun,
}

/// One operation the writer rejected
#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    /// Identity key of the failed record
    pub key: MatchKey,
    /// Report label of the failed record
    pub label: String,
    /// Reason reported by the writer
    pub message: String,
}

/// Aggregate outcome of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResult {
    /// Records created on the remote system
    pub created: usize,
    /// Records updated on the remote system
    pub updated: usize,
    /// Records that needed no write
    pub skipped: usize,
    /// Writes the remote system rejected
    pub errored: usize,
    /// Per-record failures, in operation order
    pub failures: Vec<RecordFailure>,
}

impl SyncResult {
    /// Total number of operations accounted for
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.errored
    }

    /// Whether every non-skip operation was applied cleanly
    pub fn is_clean(&self) -> bool {
        self.errored == 0
    }
}

/// Apply operations in order, isolating failures per record
pub fn apply<D, W: RecordWriter<D>>(
    operations: &[Operation<D>],
    writer: &mut W,
    mode: ApplyMode,
) -> SyncResult {
    let mut result = SyncResult::default();

    for op in operations {
        match &op.kind {
            OperationKind::Skip(_) => result.skipped += 1,
            OperationKind::Create(desired) => {
                if mode == ApplyMode::DryRun {
                    result.created += 1;
                    continue;
                }
                match writer.create(desired) {
                    Ok(()) => {
                        debug!(key = %op.key, "created remote record");
                        result.created += 1;
                    }
                    Err(err) => record_failure(&mut result, op, err),
                }
            }
            OperationKind::Update { remote_id, changes } => {
                if mode == ApplyMode::DryRun {
                    result.updated += 1;
                    continue;
                }
                match writer.update(remote_id, changes) {
                    Ok(()) => {
                        debug!(key = %op.key, fields = changes.len(), "updated remote record");
                        result.updated += 1;
                    }
                    Err(err) => record_failure(&mut result, op, err),
                }
            }
        }
    }

    result
}

fn record_failure<D>(result: &mut SyncResult, op: &Operation<D>, err: WriteError) {
    error!(key = %op.key, error = %err, "write rejected");
    result.errored += 1;
    result.failures.push(RecordFailure {
        key: op.key.clone(),
        label: op.label.clone(),
        message: err.message,
    });
}
