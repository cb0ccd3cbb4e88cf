//! Device inventory synchronization
//!
//! Mirrors the hub's device registry into an inventory tracker. Devices
//! match inventory items by display name; unmatched devices become new
//! items. An item stored with zero quantity is a leftover from a partial
//! write and is rewritten on sight.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hubsync_core::{Domain, FieldChange, MatchKey, RemoteId, ScopeFields, UnmatchedPolicy};

/// A device as reported by the hub's device registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubDevice {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// User-assigned name, preferred over the integration name
    #[serde(default)]
    pub name_by_user: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub area_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub disabled_by: Option<String>,
}

impl HubDevice {
    /// The name the device is known by
    pub fn display_name(&self) -> &str {
        self.name_by_user
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }

    /// Inventory notes recording where the item came from
    pub fn notes(&self) -> String {
        let mut parts = vec![format!("Device id: {}", self.id)];
        if !self.labels.is_empty() {
            parts.push(format!("Labels: {}", self.labels.join(", ")));
        }
        parts.join("\n")
    }

    /// Inventory description assembled from manufacturer and model
    pub fn description(&self) -> String {
        let manufacturer = self.manufacturer.as_deref().unwrap_or("");
        let model = self.model.as_deref().unwrap_or("");
        format!("{manufacturer} {model}").trim().to_string()
    }
}

impl ScopeFields for HubDevice {
    fn name(&self) -> &str {
        self.display_name()
    }

    fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    fn is_disabled(&self) -> bool {
        self.disabled_by.is_some()
    }
}

/// An inventory item as stored by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
}

impl ScopeFields for InventoryItem {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Device-to-inventory domain adapter
///
/// Carries the area-to-location mapping produced by the location pass so
/// desired locations resolve to tracker location ids.
#[derive(Debug, Clone, Default)]
pub struct DeviceSync {
    area_locations: HashMap<String, String>,
}

impl DeviceSync {
    /// Create the adapter with an area-to-location mapping
    pub fn new(area_locations: HashMap<String, String>) -> Self {
        Self { area_locations }
    }

    /// The tracker location id for a device, if its area is mapped
    pub fn location_for(&self, device: &HubDevice) -> Option<&str> {
        device
            .area_id
            .as_deref()
            .and_then(|area| self.area_locations.get(area))
            .map(String::as_str)
    }
}

impl Domain for DeviceSync {
    type Desired = HubDevice;
    type Remote = InventoryItem;

    fn name(&self) -> &'static str {
        "devices"
    }

    fn desired_key(&self, desired: &HubDevice) -> Option<MatchKey> {
        let name = desired.display_name();
        (!name.is_empty()).then(|| name.to_string())
    }

    fn remote_key(&self, remote: &InventoryItem) -> Option<MatchKey> {
        (!remote.name.is_empty()).then(|| remote.name.clone())
    }

    fn remote_id(&self, remote: &InventoryItem) -> RemoteId {
        remote.id.clone()
    }

    fn label(&self, desired: &HubDevice) -> String {
        desired.display_name().to_string()
    }

    fn unmatched_policy(&self) -> UnmatchedPolicy {
        UnmatchedPolicy::Create
    }

    fn changed_fields(&self, desired: &HubDevice, remote: &InventoryItem) -> Vec<FieldChange> {
        // Location is the only routinely tracked field; everything else
        // is rewritten through all_fields on create, repair or force.
        match self.location_for(desired) {
            Some(location) if remote.location_id.as_deref() != Some(location) => {
                vec![FieldChange {
                    field: "location_id".to_string(),
                    old: remote.location_id.clone().map(Value::from),
                    new: Value::from(location),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn all_fields(&self, desired: &HubDevice, remote: &InventoryItem) -> Vec<FieldChange> {
        let mut changes = self.changed_fields(desired, remote);
        changes.push(FieldChange::replace(
            "description",
            remote.description.clone(),
            desired.description(),
        ));
        changes.push(FieldChange::replace(
            "manufacturer",
            remote.manufacturer.clone(),
            desired.manufacturer.clone().unwrap_or_default(),
        ));
        changes.push(FieldChange::replace(
            "model",
            remote.model.clone(),
            desired.model.clone().unwrap_or_default(),
        ));
        changes.push(FieldChange::replace(
            "notes",
            remote.notes.clone(),
            desired.notes(),
        ));
        if remote.quantity == 0 {
            changes.push(FieldChange::replace("quantity", remote.quantity, 1));
        }
        changes
    }

    fn needs_repair(&self, remote: &InventoryItem) -> bool {
        remote.quantity == 0
    }
}
