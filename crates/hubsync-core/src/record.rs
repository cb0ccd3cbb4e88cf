//! Record and operation types shared across the reconciliation pipeline
//!
//! Desired and remote records are read-only snapshots for the duration of
//! one pass. The pipeline reduces each desired record to exactly one
//! [`Operation`], which is applied (or merely counted, in dry-run mode)
//! and then discarded.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity value used to pair a desired record with its remote counterpart
pub type MatchKey = String;

/// Identifier assigned by the remote system to one of its records
pub type RemoteId = String;

/// One tracked field to be written to a remote record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Remote field name
    pub field: String,
    /// Observed remote value, if the field was present
    pub old: Option<Value>,
    /// Desired value
    pub new: Value,
}

impl FieldChange {
    /// A change with both sides known
    pub fn replace(
        field: impl Into<String>,
        old: impl Into<Value>,
        new: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            old: Some(old.into()),
            new: new.into(),
        }
    }

    /// A change with no observed prior value
    pub fn set(field: impl Into<String>, new: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            old: None,
            new: new.into(),
        }
    }
}

/// Why a desired record produced no write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Every tracked field already matches under the equality policy
    AlreadyInSync,
    /// No remote record carries this key and the domain cannot create one
    NotFoundOnRemote,
    /// The desired record is missing its identity key
    MissingKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::AlreadyInSync => "already in sync",
            SkipReason::NotFoundOnRemote => "not found on remote",
            SkipReason::MissingKey => "missing identity key",
        };
        f.write_str(text)
    }
}

/// Policy for desired records with no remote counterpart
///
/// An explicit per-domain choice: the original scripts disagreed on
/// whether absence means "create it" or "complain", so the decision is
/// named configuration rather than implicit behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnmatchedPolicy {
    /// The remote system supports creation; unmatched records become creates
    Create,
    /// The record must already exist remotely; absence is reported
    Report,
}

/// What the diff engine decided for one desired record
#[derive(Debug, Clone, PartialEq)]
pub enum OperationKind<D> {
    /// Create a new remote record from the desired state
    Create(D),
    /// Write the listed fields to an existing remote record
    Update {
        remote_id: RemoteId,
        /// Only fields that genuinely differ; never empty
        changes: Vec<FieldChange>,
    },
    /// Nothing to write
    Skip(SkipReason),
}

/// A planned action for one desired record
#[derive(Debug, Clone, PartialEq)]
pub struct Operation<D> {
    /// Identity key the record was matched under
    pub key: MatchKey,
    /// Human-readable label for report lines
    pub label: String,
    /// The decided action
    pub kind: OperationKind<D>,
}

impl<D> Operation<D> {
    /// The skip reason, if this operation is a skip
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match &self.kind {
            OperationKind::Skip(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Whether this operation would write when applied
    pub fn is_write(&self) -> bool {
        !matches!(self.kind, OperationKind::Skip(_))
    }
}
