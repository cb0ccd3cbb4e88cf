//! Location synchronization
//!
//! Mirrors the hub's areas into tracker locations. Existence-only: a
//! matched location is always in sync, an unmatched area becomes a new
//! location.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use hubsync_core::{Domain, FieldChange, MatchKey, RemoteId, ScopeFields, UnmatchedPolicy};

/// An area as reported by the hub's area registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubArea {
    pub area_id: String,
    #[serde(default)]
    pub name: String,
}

impl ScopeFields for HubArea {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A location as stored by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ScopeFields for Location {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Area-to-location domain adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationSync;

impl LocationSync {
    /// Map area ids to the tracker location ids they resolve to
    ///
    /// Input for the device pass: every area whose name matches an
    /// existing location contributes a mapping.
    pub fn area_mapping(areas: &[HubArea], locations: &[Location]) -> HashMap<String, String> {
        let by_name: HashMap<&str, &str> = locations
            .iter()
            .map(|location| (location.name.as_str(), location.id.as_str()))
            .collect();

        areas
            .iter()
            .filter(|area| !area.name.is_empty())
            .filter_map(|area| {
                by_name
                    .get(area.name.as_str())
                    .map(|id| (area.area_id.clone(), (*id).to_string()))
            })
            .collect()
    }
}

impl Domain for LocationSync {
    type Desired = HubArea;
    type Remote = Location;

    fn name(&self) -> &'static str {
        "locations"
    }

    fn desired_key(&self, desired: &HubArea) -> Option<MatchKey> {
        (!desired.name.is_empty()).then(|| desired.name.clone())
    }

    fn remote_key(&self, remote: &Location) -> Option<MatchKey> {
        (!remote.name.is_empty()).then(|| remote.name.clone())
    }

    fn remote_id(&self, remote: &Location) -> RemoteId {
        remote.id.clone()
    }

    fn label(&self, desired: &HubArea) -> String {
        desired.name.clone()
    }

    fn unmatched_policy(&self) -> UnmatchedPolicy {
        UnmatchedPolicy::Create
    }

    fn changed_fields(&self, _desired: &HubArea, _remote: &Location) -> Vec<FieldChange> {
        // Existence is the only tracked property.
        Vec::new()
    }
}
