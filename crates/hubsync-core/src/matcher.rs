//! Identity matching between desired and remote record sets
//!
//! Matching is a single exact-equality lookup on the identity key. No
//! fuzzy or partial matching: either a remote record carries the same
//! key, or the desired record is unmatched.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::Domain;
use crate::record::MatchKey;

/// Index of in-scope remote records by identity key
///
/// Key uniqueness is assumed, not enforced: duplicates resolve
/// deterministically (the last record seen wins) and are logged and
/// surfaced as warnings rather than failing the run.
pub struct RemoteIndex<'a, R> {
    by_key: HashMap<MatchKey, &'a R>,
    warnings: Vec<String>,
}

impl<'a, R> RemoteIndex<'a, R> {
    /// Build the index from the in-scope remote set
    pub fn build<A>(domain: &A, remote: impl IntoIterator<Item = &'a R>) -> Self
    where
        A: Domain<Remote = R>,
    {
        let mut by_key = HashMap::new();
        let mut warnings = Vec::new();

        for record in remote {
            let Some(key) = domain.remote_key(record) else {
                continue;
            };
            if by_key.insert(key.clone(), record).is_some() {
                warn!(
                    domain = domain.name(),
                    key = %key,
                    "duplicate remote key, last record wins"
                );
                warnings.push(format!("duplicate remote key '{key}', last record wins"));
            }
        }

        Self { by_key, warnings }
    }

    /// Look up the remote record paired with a key
    pub fn get(&self, key: &str) -> Option<&'a R> {
        self.by_key.get(key).copied()
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Warnings collected while building the index
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
