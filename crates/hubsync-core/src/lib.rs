//! Reconciliation engine for hubsync
//!
//! This crate implements the logic shared by every hubsync script:
//! given a locally authored desired record set and an observed remote
//! record set, compute and apply the minimal, idempotent change set.
//!
//! - **Scope filter**: deny-list classification of records (virtual,
//!   system and disabled entries stay out of the pass)
//! - **Identity matcher**: exact-equality pairing on a stable key,
//!   last-write-wins on duplicates
//! - **Diff engine**: per-field equality with domain coalescing rules
//!   and self-heal overrides, producing create/update/skip operations
//! - **Sync executor**: applies operations through an injected writer,
//!   isolating failures per record
//! - **Reporter**: deterministic sorted summaries, identical for
//!   dry-run and real runs
//!
//! # Architecture
//!
//! ```text
//!  desired + remote snapshots
//!        |
//!   ScopeFilter ---- ScopeRules (rules.toml)
//!        |
//!   RemoteIndex (matcher)
//!        |
//!   diff_one per desired record ---- Domain adapter
//!        |
//!   Plan -> apply(writer) -> SyncResult -> report
//! ```
//!
//! Per-domain knowledge (key fields, tracked fields, equality policy)
//! lives behind the [`Domain`] trait; concrete adapters are provided by
//! the `hubsync-adapters` crate.

pub mod diff;
pub mod domain;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod reconciler;
pub mod record;
pub mod report;
pub mod scope;

pub use diff::{Completion, DiffOptions, FINISHED_THRESHOLD_PCT, coalesce_percent, diff_one};
pub use domain::Domain;
pub use error::{Error, Result};
pub use executor::{ApplyMode, RecordFailure, RecordWriter, SyncResult, WriteError, apply};
pub use matcher::RemoteIndex;
pub use reconciler::{Plan, Reconciler, Source};
pub use record::{
    FieldChange, MatchKey, Operation, OperationKind, RemoteId, SkipReason, UnmatchedPolicy,
};
pub use report::render;
pub use scope::{ScopeFields, ScopeFilter, ScopeRules};
