//! File-backed snapshot store
//!
//! Stands where the transport layer would plug in: snapshots are local
//! JSON/YAML documents equivalent to what a fetch step would have
//! produced. Writers apply field changes back onto the underlying
//! document and save it atomically (write temp, then rename), mirroring
//! the pull, edit, push shape of the hub workflow with the transport
//! stripped out.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use hubsync_adapters::{
    BridgeFilter, ConfigDocument, ExposureSetting, HubArea, HubDevice, ListeningRecord, Location,
};
use hubsync_core::{FieldChange, RecordWriter, RemoteId, Source, WriteError};

use crate::error::Result;

/// Load a JSON list snapshot into typed records
pub fn load_json_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a JSON snapshot as a raw document
pub fn load_json_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Save a JSON document atomically
pub fn save_json(path: &Path, value: &Value) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    write_atomic(path, &content)?;
    Ok(())
}

/// Save a document list as YAML atomically
pub fn save_yaml(path: &Path, value: &Value) -> Result<()> {
    let content = serde_yaml::to_string(value)?;
    write_atomic(path, &content)?;
    Ok(())
}

fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}

/// Set each changed field on a JSON object
fn apply_field_changes(object: &mut Value, changes: &[FieldChange]) -> std::result::Result<(), WriteError> {
    let Some(map) = object.as_object_mut() else {
        return Err(WriteError::new("snapshot entry is not an object"));
    };
    for change in changes {
        map.insert(change.field.clone(), change.new.clone());
    }
    Ok(())
}

fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// In-memory snapshot pair handed to the reconciler
///
/// Snapshots are loaded (and validated) before the pass starts, so a
/// fetch problem aborts before any write.
pub struct SnapshotSource<D, R> {
    desired: Vec<D>,
    remote: Vec<R>,
}

impl<D, R> SnapshotSource<D, R> {
    /// Wrap already-loaded snapshots
    pub fn new(desired: Vec<D>, remote: Vec<R>) -> Self {
        Self { desired, remote }
    }
}

impl<D: Clone, R: Clone> Source<D, R> for SnapshotSource<D, R> {
    fn list_desired(&self) -> hubsync_core::Result<Vec<D>> {
        Ok(self.desired.clone())
    }

    fn list_remote(&self) -> hubsync_core::Result<Vec<R>> {
        Ok(self.remote.clone())
    }
}

/// Writer over a tracker locations snapshot
pub struct LocationStore {
    path: PathBuf,
    entries: Vec<Value>,
}

impl LocationStore {
    /// Load the locations snapshot
    pub fn load(path: &Path) -> Result<Self> {
        let entries = load_json_records(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// The locations currently in the snapshot
    pub fn locations(&self) -> Result<Vec<Location>> {
        Ok(serde_json::from_value(Value::Array(self.entries.clone()))?)
    }

    /// Write the snapshot back
    pub fn save(&self) -> Result<()> {
        save_json(&self.path, &Value::Array(self.entries.clone()))
    }
}

impl RecordWriter<HubArea> for LocationStore {
    fn create(&mut self, area: &HubArea) -> std::result::Result<(), WriteError> {
        self.entries.push(json!({
            "id": format!("loc-{}", slug(&area.name)),
            "name": area.name,
            "description": format!("Imported from hub area: {}", area.area_id),
        }));
        Ok(())
    }

    fn update(
        &mut self,
        _remote_id: &RemoteId,
        _changes: &[FieldChange],
    ) -> std::result::Result<(), WriteError> {
        Err(WriteError::new("locations do not support updates"))
    }
}

/// Writer over a tracker inventory snapshot
pub struct ItemStore {
    path: PathBuf,
    entries: Vec<Value>,
    area_locations: HashMap<String, String>,
}

impl ItemStore {
    /// Load the inventory snapshot
    pub fn load(path: &Path, area_locations: HashMap<String, String>) -> Result<Self> {
        let entries = load_json_records(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            area_locations,
        })
    }

    /// The inventory items as typed records
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        Ok(serde_json::from_value(Value::Array(self.entries.clone()))?)
    }

    /// Write the snapshot back
    pub fn save(&self) -> Result<()> {
        save_json(&self.path, &Value::Array(self.entries.clone()))
    }

    fn location_for(&self, device: &HubDevice) -> Option<&String> {
        device
            .area_id
            .as_deref()
            .and_then(|area| self.area_locations.get(area))
    }
}

impl RecordWriter<HubDevice> for ItemStore {
    fn create(&mut self, device: &HubDevice) -> std::result::Result<(), WriteError> {
        let name = device.display_name();
        if name.is_empty() {
            return Err(WriteError::new("device has no name"));
        }
        self.entries.push(json!({
            "id": format!("item-{}", slug(name)),
            "name": name,
            "quantity": 1,
            "location_id": self.location_for(device),
            "manufacturer": device.manufacturer.clone().unwrap_or_default(),
            "model": device.model.clone().unwrap_or_default(),
            "description": device.description(),
            "notes": device.notes(),
        }));
        Ok(())
    }

    fn update(
        &mut self,
        remote_id: &RemoteId,
        changes: &[FieldChange],
    ) -> std::result::Result<(), WriteError> {
        let entry = find_entry(&mut self.entries, "id", remote_id)
            .ok_or_else(|| WriteError::new(format!("no inventory item {remote_id}")))?;
        apply_field_changes(entry, changes)
    }
}

/// Writer over an audiobook shelf snapshot
pub struct ShelfStore {
    path: PathBuf,
    entries: Vec<Value>,
}

impl ShelfStore {
    /// Load the shelf snapshot
    pub fn load(path: &Path) -> Result<Self> {
        let entries = load_json_records(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// The shelf items as typed records
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        Ok(serde_json::from_value(Value::Array(self.entries.clone()))?)
    }

    /// Write the snapshot back
    pub fn save(&self) -> Result<()> {
        save_json(&self.path, &Value::Array(self.entries.clone()))
    }
}

impl RecordWriter<ListeningRecord> for ShelfStore {
    fn create(&mut self, _desired: &ListeningRecord) -> std::result::Result<(), WriteError> {
        Err(WriteError::new("shelf items cannot be created"))
    }

    fn update(
        &mut self,
        remote_id: &RemoteId,
        changes: &[FieldChange],
    ) -> std::result::Result<(), WriteError> {
        let entry = find_entry(&mut self.entries, "id", remote_id)
            .ok_or_else(|| WriteError::new(format!("no shelf item {remote_id}")))?;
        apply_field_changes(entry, changes)
    }
}

/// Writer over the entity registry document
///
/// The registry nests its entities under `data.entities`; the exposure
/// flag lives at `options.conversation.should_expose` of each entry.
pub struct RegistryStore {
    path: PathBuf,
    document: Value,
}

impl RegistryStore {
    /// Load the registry document
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            document: load_json_document(path)?,
        })
    }

    /// The registry entries as typed records
    pub fn entries<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let entities = self
            .document
            .pointer("/data/entities")
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(entities)?)
    }

    /// Write the document back
    pub fn save(&self) -> Result<()> {
        save_json(&self.path, &self.document)
    }
}

impl RecordWriter<ExposureSetting> for RegistryStore {
    fn create(&mut self, _desired: &ExposureSetting) -> std::result::Result<(), WriteError> {
        Err(WriteError::new("registry entries cannot be created"))
    }

    fn update(
        &mut self,
        remote_id: &RemoteId,
        changes: &[FieldChange],
    ) -> std::result::Result<(), WriteError> {
        let entities = self
            .document
            .pointer_mut("/data/entities")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| WriteError::new("registry document has no data.entities"))?;
        let entry = entities
            .iter_mut()
            .find(|e| e.get("entity_id").and_then(Value::as_str) == Some(remote_id.as_str()))
            .ok_or_else(|| WriteError::new(format!("no registry entry {remote_id}")))?;

        for change in changes {
            match change.field.as_str() {
                "should_expose" => set_nested(
                    entry,
                    &["options", "conversation", "should_expose"],
                    change.new.clone(),
                ),
                other => {
                    return Err(WriteError::new(format!("unknown registry field {other}")));
                }
            }
        }
        Ok(())
    }
}

/// Writer over the config entries document
///
/// Bridge entries live under `data.entries`; filter lists sit at
/// `options.filter.<list>` of the bridge entry.
pub struct EntriesStore {
    path: PathBuf,
    document: Value,
}

impl EntriesStore {
    /// Load the config entries document
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            document: load_json_document(path)?,
        })
    }

    /// The config entries as typed records
    pub fn entries<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let entries = self
            .document
            .pointer("/data/entries")
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(entries)?)
    }

    /// Write the document back
    pub fn save(&self) -> Result<()> {
        save_json(&self.path, &self.document)
    }
}

impl RecordWriter<BridgeFilter> for EntriesStore {
    fn create(&mut self, _desired: &BridgeFilter) -> std::result::Result<(), WriteError> {
        Err(WriteError::new("config entries cannot be created"))
    }

    fn update(
        &mut self,
        remote_id: &RemoteId,
        changes: &[FieldChange],
    ) -> std::result::Result<(), WriteError> {
        let entries = self
            .document
            .pointer_mut("/data/entries")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| WriteError::new("config document has no data.entries"))?;
        let entry = entries
            .iter_mut()
            .find(|e| e.get("entry_id").and_then(Value::as_str) == Some(remote_id.as_str()))
            .ok_or_else(|| WriteError::new(format!("no config entry {remote_id}")))?;

        for change in changes {
            let Some(list) = change.field.strip_prefix("filter.") else {
                return Err(WriteError::new(format!(
                    "unknown config entry field {}",
                    change.field
                )));
            };
            set_nested(entry, &["options", "filter", list], change.new.clone());
        }
        Ok(())
    }
}

/// Writer over a server-side scene or automation document list
pub struct DocumentStore {
    path: PathBuf,
    documents: Vec<Value>,
}

impl DocumentStore {
    /// Load the YAML document list
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&content)?;
        let Value::Array(documents) = serde_json::to_value(&value)? else {
            return Err(crate::error::CliError::user(format!(
                "{} is not a document list",
                path.display()
            )));
        };
        Ok(Self {
            path: path.to_path_buf(),
            documents,
        })
    }

    /// The raw YAML content reparsed as documents
    pub fn raw(&self) -> &[Value] {
        &self.documents
    }

    /// Write the document list back as YAML
    pub fn save(&self) -> Result<()> {
        save_yaml(&self.path, &Value::Array(self.documents.clone()))
    }
}

impl RecordWriter<ConfigDocument> for DocumentStore {
    fn create(&mut self, _desired: &ConfigDocument) -> std::result::Result<(), WriteError> {
        Err(WriteError::new("server documents cannot be created"))
    }

    fn update(
        &mut self,
        remote_id: &RemoteId,
        changes: &[FieldChange],
    ) -> std::result::Result<(), WriteError> {
        let entry = self
            .documents
            .iter_mut()
            .find(|doc| {
                doc.get("id")
                    .map(|id| match id {
                        Value::String(s) => s == remote_id,
                        Value::Number(n) => n.to_string() == *remote_id,
                        _ => false,
                    })
                    .unwrap_or(false)
            })
            .ok_or_else(|| WriteError::new(format!("no server document {remote_id}")))?;

        for change in changes {
            if change.field != "body" {
                return Err(WriteError::new(format!(
                    "unknown document field {}",
                    change.field
                )));
            }
            *entry = change.new.clone();
        }
        Ok(())
    }
}

fn find_entry<'a>(entries: &'a mut [Value], id_field: &str, id: &str) -> Option<&'a mut Value> {
    entries
        .iter_mut()
        .find(|e| e.get(id_field).and_then(Value::as_str) == Some(id))
}

fn set_nested(object: &mut Value, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = object;
    for key in parents {
        ensure_object_slot(current, key);
        current = match Value::get_mut(current, *key) {
            Some(next) => next,
            None => return,
        };
    }
    if let Some(map) = current.as_object_mut() {
        map.insert((*last).to_string(), value);
    }
}

fn ensure_object_slot(object: &mut Value, key: &str) {
    if let Some(map) = object.as_object_mut() {
        let slot = map.entry(key.to_string()).or_insert_with(|| json!({}));
        if !slot.is_object() {
            *slot = json!({});
        }
    }
}
