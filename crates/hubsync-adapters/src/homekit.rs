//! HomeKit bridge filter synchronization
//!
//! Replaces the include/exclude filter lists of the hub's HomeKit
//! bridge entry with locally authored ones. A degenerate single-record
//! domain: only the bridge-mode entry is matchable, and every list
//! compares as a set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::json;

use hubsync_core::{Domain, FieldChange, MatchKey, RemoteId, ScopeFields, UnmatchedPolicy};

use crate::Result;

/// Identity key the bridge entry is matched under
pub const BRIDGE_KEY: &str = "homekit-bridge";

/// The four filter lists a bridge entry carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeFilter {
    #[serde(default)]
    pub include_domains: Vec<String>,
    #[serde(default)]
    pub include_entities: Vec<String>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    #[serde(default)]
    pub exclude_entities: Vec<String>,
}

impl BridgeFilter {
    /// Parse the desired filter from YAML content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn lists(&self) -> [(&'static str, &Vec<String>); 4] {
        [
            ("include_domains", &self.include_domains),
            ("include_entities", &self.include_entities),
            ("exclude_domains", &self.exclude_domains),
            ("exclude_entities", &self.exclude_entities),
        ]
    }
}

impl ScopeFields for BridgeFilter {
    fn name(&self) -> &str {
        BRIDGE_KEY
    }
}

/// Option block of a bridge config entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeOptions {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub filter: BridgeFilter,
}

/// A config entry as stored by the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEntry {
    pub entry_id: String,
    #[serde(default)]
    pub title: String,
    pub domain: String,
    #[serde(default)]
    pub options: BridgeOptions,
}

impl BridgeEntry {
    /// Whether this is the bridge-mode entry (not accessory mode)
    pub fn is_bridge(&self) -> bool {
        self.domain == "homekit"
            && (self.options.mode.as_deref() == Some("bridge") || self.title.contains("Bridge"))
    }
}

impl ScopeFields for BridgeEntry {
    fn name(&self) -> &str {
        if self.title.is_empty() {
            &self.domain
        } else {
            &self.title
        }
    }
}

/// HomeKit filter domain adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct HomekitSync;

impl Domain for HomekitSync {
    type Desired = BridgeFilter;
    type Remote = BridgeEntry;

    fn name(&self) -> &'static str {
        "homekit"
    }

    fn desired_key(&self, _desired: &BridgeFilter) -> Option<MatchKey> {
        Some(BRIDGE_KEY.to_string())
    }

    fn remote_key(&self, remote: &BridgeEntry) -> Option<MatchKey> {
        remote.is_bridge().then(|| BRIDGE_KEY.to_string())
    }

    fn remote_id(&self, remote: &BridgeEntry) -> RemoteId {
        remote.entry_id.clone()
    }

    fn label(&self, _desired: &BridgeFilter) -> String {
        "HomeKit bridge filter".to_string()
    }

    fn unmatched_policy(&self) -> UnmatchedPolicy {
        // The bridge entry must already exist; absence is reported.
        UnmatchedPolicy::Report
    }

    fn changed_fields(&self, desired: &BridgeFilter, remote: &BridgeEntry) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        for ((field, desired_list), (_, remote_list)) in
            desired.lists().into_iter().zip(remote.options.filter.lists())
        {
            let desired_set: BTreeSet<&String> = desired_list.iter().collect();
            let remote_set: BTreeSet<&String> = remote_list.iter().collect();
            if desired_set != remote_set {
                changes.push(FieldChange {
                    field: format!("filter.{field}"),
                    old: Some(json!(remote_set)),
                    new: json!(desired_set),
                });
            }
        }

        changes
    }
}
