//! Conversation exposure synchronization
//!
//! Sets the voice-assistant exposure flag on entity registry entries
//! from a locally authored allow map. Only entities in the managed
//! domains are touched; everything else in the registry is left alone.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hubsync_core::{Domain, FieldChange, MatchKey, RemoteId, ScopeFields, UnmatchedPolicy};

use crate::Result;

/// Domains whose entities the hub exposes to assistants by default
pub const DEFAULT_MANAGED_DOMAINS: &[&str] = &[
    "assist_satellite",
    "binary_sensor",
    "climate",
    "cover",
    "fan",
    "humidifier",
    "light",
    "media_player",
    "scene",
    "script",
    "sensor",
    "switch",
    "todo",
    "vacuum",
    "water_heater",
];

/// Locally authored exposure map: entity id to expose flag
///
/// Parsed from YAML; entries set to anything but `true` count as not
/// exposed, matching the authoring convention of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExposureConfig {
    entries: BTreeMap<String, bool>,
}

impl ExposureConfig {
    /// Parse the exposure map from YAML content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Whether an entity is listed for exposure
    pub fn is_exposed(&self, entity_id: &str) -> bool {
        self.entries.get(entity_id).copied().unwrap_or(false)
    }

    /// Number of entities listed for exposure
    pub fn exposed_count(&self) -> usize {
        self.entries.values().filter(|exposed| **exposed).count()
    }
}

impl<const N: usize> From<[(&str, bool); N]> for ExposureConfig {
    fn from(entries: [(&str, bool); N]) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, exposed)| (id.to_string(), exposed))
                .collect(),
        }
    }
}

/// Desired exposure for one managed entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureSetting {
    pub entity_id: String,
    pub should_expose: bool,
}

impl ScopeFields for ExposureSetting {
    fn name(&self) -> &str {
        &self.entity_id
    }
}

/// Conversation options nested inside a registry entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_expose: Option<bool>,
}

/// Option blocks a registry entry carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityOptions {
    #[serde(default)]
    pub conversation: ConversationOptions,
}

/// An entity registry entry as stored by the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub entity_id: String,
    #[serde(default)]
    pub disabled_by: Option<String>,
    #[serde(default)]
    pub options: EntityOptions,
}

impl RegistryEntry {
    /// The domain part of the entity id
    pub fn domain(&self) -> &str {
        self.entity_id.split('.').next().unwrap_or("")
    }
}

impl ScopeFields for RegistryEntry {
    fn name(&self) -> &str {
        &self.entity_id
    }

    fn is_disabled(&self) -> bool {
        self.disabled_by.is_some()
    }
}

/// Exposure domain adapter
#[derive(Debug, Clone)]
pub struct ExposureSync {
    managed_domains: BTreeSet<String>,
}

impl Default for ExposureSync {
    fn default() -> Self {
        Self {
            managed_domains: DEFAULT_MANAGED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl ExposureSync {
    /// Create the adapter with an explicit managed-domain set
    pub fn with_domains(domains: impl IntoIterator<Item = String>) -> Self {
        Self {
            managed_domains: domains.into_iter().collect(),
        }
    }

    /// Whether an entity falls under exposure management
    pub fn is_managed(&self, entity_id: &str) -> bool {
        entity_id
            .split('.')
            .next()
            .is_some_and(|domain| self.managed_domains.contains(domain))
    }

    /// Build the desired set from the exposure map and the registry
    ///
    /// Every enabled, managed registry entity gets a desired setting:
    /// exposed when listed `true` in the config, hidden otherwise.
    pub fn desired_from_config(
        &self,
        config: &ExposureConfig,
        remote: &[RegistryEntry],
    ) -> Vec<ExposureSetting> {
        remote
            .iter()
            .filter(|entry| entry.disabled_by.is_none() && self.is_managed(&entry.entity_id))
            .map(|entry| ExposureSetting {
                entity_id: entry.entity_id.clone(),
                should_expose: config.is_exposed(&entry.entity_id),
            })
            .collect()
    }
}

impl Domain for ExposureSync {
    type Desired = ExposureSetting;
    type Remote = RegistryEntry;

    fn name(&self) -> &'static str {
        "exposure"
    }

    fn desired_key(&self, desired: &ExposureSetting) -> Option<MatchKey> {
        (!desired.entity_id.is_empty()).then(|| desired.entity_id.clone())
    }

    fn remote_key(&self, remote: &RegistryEntry) -> Option<MatchKey> {
        (!remote.entity_id.is_empty()).then(|| remote.entity_id.clone())
    }

    fn remote_id(&self, remote: &RegistryEntry) -> RemoteId {
        remote.entity_id.clone()
    }

    fn label(&self, desired: &ExposureSetting) -> String {
        desired.entity_id.clone()
    }

    fn unmatched_policy(&self) -> UnmatchedPolicy {
        UnmatchedPolicy::Report
    }

    fn changed_fields(
        &self,
        desired: &ExposureSetting,
        remote: &RegistryEntry,
    ) -> Vec<FieldChange> {
        let current = remote.options.conversation.should_expose;
        if current == Some(desired.should_expose) {
            return Vec::new();
        }
        // An unset flag is never equal to an explicit setting: the first
        // pass writes the explicit value, later passes see it as equal.
        vec![FieldChange {
            field: "should_expose".to_string(),
            old: current.map(Value::from),
            new: Value::from(desired.should_expose),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubsync_core::{DiffOptions, OperationKind, SkipReason, diff_one};
    use pretty_assertions::assert_eq;

    fn entry(entity_id: &str, should_expose: Option<bool>) -> RegistryEntry {
        RegistryEntry {
            entity_id: entity_id.to_string(),
            disabled_by: None,
            options: EntityOptions {
                conversation: ConversationOptions { should_expose },
            },
        }
    }

    fn setting(entity_id: &str, should_expose: bool) -> ExposureSetting {
        ExposureSetting {
            entity_id: entity_id.to_string(),
            should_expose,
        }
    }

    fn diff(
        desired: &ExposureSetting,
        remote: &RegistryEntry,
    ) -> hubsync_core::Operation<ExposureSetting> {
        diff_one(
            &ExposureSync::default(),
            desired.entity_id.clone(),
            desired,
            Some(remote),
            DiffOptions::default(),
        )
    }

    #[test]
    fn config_parses_a_yaml_map() {
        let config = ExposureConfig::parse(
            "light.kitchen: true\nswitch.heater: false\nlight.hall: true\n",
        )
        .unwrap();

        assert!(config.is_exposed("light.kitchen"));
        assert!(!config.is_exposed("switch.heater"));
        assert!(!config.is_exposed("light.unlisted"));
        assert_eq!(config.exposed_count(), 2);
    }

    #[test]
    fn managed_domains_gate_the_desired_set() {
        let sync = ExposureSync::default();
        let config = ExposureConfig::from([("light.kitchen", true)]);
        let remote = vec![
            entry("light.kitchen", None),
            entry("device_tracker.phone", None),
        ];

        let desired = sync.desired_from_config(&config, &remote);

        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].entity_id, "light.kitchen");
        assert!(desired[0].should_expose);
    }

    #[test]
    fn disabled_entities_are_left_alone() {
        let sync = ExposureSync::default();
        let config = ExposureConfig::from([("light.kitchen", true)]);
        let remote = vec![RegistryEntry {
            disabled_by: Some("user".to_string()),
            ..entry("light.kitchen", None)
        }];

        assert!(sync.desired_from_config(&config, &remote).is_empty());
    }

    #[test]
    fn unlisted_managed_entities_are_hidden() {
        let sync = ExposureSync::default();
        let config = ExposureConfig::from([("light.kitchen", true)]);
        let remote = vec![entry("light.hall", None)];

        let desired = sync.desired_from_config(&config, &remote);
        assert_eq!(desired.len(), 1);
        assert!(!desired[0].should_expose);
    }

    #[test]
    fn matching_flag_is_in_sync() {
        let op = diff(&setting("light.kitchen", true), &entry("light.kitchen", Some(true)));
        assert_eq!(op.skip_reason(), Some(SkipReason::AlreadyInSync));
    }

    #[test]
    fn differing_flag_produces_a_single_change() {
        let op = diff(&setting("light.kitchen", true), &entry("light.kitchen", Some(false)));

        match op.kind {
            OperationKind::Update { remote_id, changes } => {
                assert_eq!(remote_id, "light.kitchen");
                assert_eq!(changes.len(), 1);
                assert_eq!(changes[0].field, "should_expose");
                assert_eq!(changes[0].old, Some(Value::from(false)));
                assert_eq!(changes[0].new, Value::from(true));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn unset_flag_is_written_explicitly() {
        let op = diff(&setting("light.kitchen", false), &entry("light.kitchen", None));

        match op.kind {
            OperationKind::Update { changes, .. } => {
                assert_eq!(changes[0].old, None);
                assert_eq!(changes[0].new, Value::from(false));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn custom_domain_set_narrows_management() {
        let sync = ExposureSync::with_domains(["light".to_string()]);
        assert!(sync.is_managed("light.kitchen"));
        assert!(!sync.is_managed("sensor.kitchen"));
    }

    #[test]
    fn registry_entry_domain_extraction() {
        assert_eq!(entry("light.kitchen", None).domain(), "light");
        assert_eq!(entry("weird", None).domain(), "weird");
    }
}
