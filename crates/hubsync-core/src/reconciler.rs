//! The reconciliation pipeline
//!
//! Ties the scope filter, identity matcher, diff engine and executor
//! into one pass: fetch snapshots, compute the minimal change set,
//! apply it. Execution is single-threaded and blocking; one record is
//! fully diffed and applied before the next begins.

use tracing::{info, warn};

use crate::diff::{self, DiffOptions};
use crate::domain::Domain;
use crate::executor::{self, ApplyMode, RecordWriter, SyncResult};
use crate::matcher::RemoteIndex;
use crate::record::{Operation, OperationKind, SkipReason};
use crate::scope::{ScopeFields, ScopeFilter};
use crate::Result;

/// Supplies the snapshots a pass runs against
///
/// How the snapshots are obtained (file read, API call, remote copy) is
/// the caller's concern. A fetch failure aborts the pass before any
/// write is attempted.
pub trait Source<D, R> {
    /// The locally authored desired record set
    fn list_desired(&self) -> Result<Vec<D>>;

    /// The observed remote record set
    fn list_remote(&self) -> Result<Vec<R>>;
}

/// The ordered change set computed for one pass
#[derive(Debug, Clone)]
pub struct Plan<D> {
    /// Domain name, used in report headers
    pub domain: String,
    /// One operation per valid desired record, in input order
    pub operations: Vec<Operation<D>>,
    /// Duplicate-key and validation warnings collected while planning
    pub warnings: Vec<String>,
}

impl<D> Plan<D> {
    /// Desired records with no remote counterpart under a report-only
    /// policy
    pub fn unmatched(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.skip_reason() == Some(SkipReason::NotFoundOnRemote))
            .count()
    }

    /// Operations that would write when applied
    pub fn pending(&self) -> usize {
        self.operations.iter().filter(|op| op.is_write()).count()
    }
}

/// One-domain reconciliation pass
///
/// The remote set is filtered through a scope filter before matching;
/// an optional second filter classifies the desired side (the device
/// domain installs its deny rules there). Both default to permit-all.
pub struct Reconciler<A: Domain> {
    domain: A,
    remote_filter: ScopeFilter,
    desired_filter: ScopeFilter,
    options: DiffOptions,
}

impl<A: Domain> Reconciler<A>
where
    A::Desired: ScopeFields,
    A::Remote: ScopeFields,
{
    /// Create a pass with permit-all filters and default options
    pub fn new(domain: A) -> Self {
        Self {
            domain,
            remote_filter: ScopeFilter::permit_all(),
            desired_filter: ScopeFilter::permit_all(),
            options: DiffOptions::default(),
        }
    }

    /// Install a deny filter on the remote set
    pub fn with_remote_filter(mut self, filter: ScopeFilter) -> Self {
        self.remote_filter = filter;
        self
    }

    /// Install a deny filter on the desired set
    pub fn with_desired_filter(mut self, filter: ScopeFilter) -> Self {
        self.desired_filter = filter;
        self
    }

    /// Set diff options for the pass
    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// The domain adapter driving this pass
    pub fn domain(&self) -> &A {
        &self.domain
    }

    /// Compute the change set for one snapshot pair
    ///
    /// Each in-scope desired record yields exactly one operation.
    /// Records missing their identity key are skipped with a warning;
    /// the rest of the batch proceeds.
    pub fn plan(&self, desired: &[A::Desired], remote: &[A::Remote]) -> Plan<A::Desired> {
        let in_scope: Vec<&A::Remote> = remote
            .iter()
            .filter(|record| self.remote_filter.is_in_scope(*record))
            .collect();
        let index = RemoteIndex::build(&self.domain, in_scope.iter().copied());
        let mut warnings = index.warnings().to_vec();

        let mut operations = Vec::new();
        for record in desired {
            if !self.desired_filter.is_in_scope(record) {
                continue;
            }

            let Some(key) = self.domain.desired_key(record) else {
                let label = self.domain.label(record);
                warn!(
                    domain = self.domain.name(),
                    label = %label,
                    "desired record is missing its identity key"
                );
                warnings.push(format!("desired record '{label}' is missing its identity key"));
                operations.push(Operation {
                    key: String::new(),
                    label,
                    kind: OperationKind::Skip(SkipReason::MissingKey),
                });
                continue;
            };

            let matched = index.get(&key);
            operations.push(diff::diff_one(
                &self.domain,
                key,
                record,
                matched,
                self.options,
            ));
        }

        info!(
            domain = self.domain.name(),
            desired = desired.len(),
            remote = remote.len(),
            in_scope = in_scope.len(),
            planned = operations.len(),
            "planned reconciliation pass"
        );

        Plan {
            domain: self.domain.name().to_string(),
            operations,
            warnings,
        }
    }

    /// Fetch snapshots, plan, and apply in one pass
    pub fn run<S, W>(
        &self,
        source: &S,
        writer: &mut W,
        mode: ApplyMode,
    ) -> Result<(Plan<A::Desired>, SyncResult)>
    where
        S: Source<A::Desired, A::Remote>,
        W: RecordWriter<A::Desired>,
    {
        let desired = source.list_desired()?;
        let remote = source.list_remote()?;
        let plan = self.plan(&desired, &remote);
        let result = executor::apply(&plan.operations, writer, mode);
        Ok((plan, result))
    }
}
