//! The per-domain adapter seam
//!
//! One [`Domain`] implementation per synchronized system. The adapter
//! supplies key extraction and the per-field equality policy; the
//! pipeline supplies everything else. Adapters stay thin: no I/O, no
//! control flow, just field knowledge.

use crate::record::{FieldChange, MatchKey, RemoteId, UnmatchedPolicy};

/// Field knowledge for one synchronized system
pub trait Domain {
    /// Locally authored target state for one entity
    type Desired: Clone;
    /// Observed state held by the external system
    type Remote;

    /// Short name used in logs and report headers
    fn name(&self) -> &'static str;

    /// Identity key of a desired record, if it carries one
    ///
    /// Records without a key are skipped with a warning while the rest of
    /// the batch proceeds.
    fn desired_key(&self, desired: &Self::Desired) -> Option<MatchKey>;

    /// Key a remote record is indexed under
    ///
    /// `None` keeps the record out of matching entirely.
    fn remote_key(&self, remote: &Self::Remote) -> Option<MatchKey>;

    /// Identifier the remote system expects in update calls
    fn remote_id(&self, remote: &Self::Remote) -> RemoteId;

    /// Human-readable label for report lines
    fn label(&self, desired: &Self::Desired) -> String;

    /// Policy for desired records with no remote counterpart
    fn unmatched_policy(&self) -> UnmatchedPolicy;

    /// Tracked fields that genuinely differ between desired and remote
    /// state
    ///
    /// Coalescing rules (progress thresholds and the like) are applied
    /// here, before equality is decided, so skip decisions stay stable
    /// across passes.
    fn changed_fields(&self, desired: &Self::Desired, remote: &Self::Remote) -> Vec<FieldChange>;

    /// The full tracked field set, used when a forced or self-heal update
    /// rewrites the record
    ///
    /// Defaults to the changed fields.
    fn all_fields(&self, desired: &Self::Desired, remote: &Self::Remote) -> Vec<FieldChange> {
        self.changed_fields(desired, remote)
    }

    /// Whether a remote record is in a known-bad state that warrants a
    /// rewrite even when no tracked field differs
    fn needs_repair(&self, _remote: &Self::Remote) -> bool {
        false
    }
}
