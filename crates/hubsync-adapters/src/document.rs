//! Scene and automation document synchronization
//!
//! Scenes and automations are the same shape: a YAML list on the server,
//! single-document files locally, paired by a stable `id` field. One
//! adapter serves both; [`DocumentKind`] picks the display-name field.
//! Documents must already exist on the server, and an update replaces
//! the whole body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hubsync_core::{Domain, FieldChange, MatchKey, RemoteId, ScopeFields, UnmatchedPolicy};

use crate::{Error, Result};

/// Which hub document list is being synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Scene,
    Automation,
}

impl DocumentKind {
    /// Domain name for logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Scene => "scenes",
            DocumentKind::Automation => "automations",
        }
    }

    /// The body field carrying the display name
    fn label_field(self) -> &'static str {
        match self {
            DocumentKind::Scene => "name",
            DocumentKind::Automation => "alias",
        }
    }
}

/// One scene or automation, id plus full body
///
/// The body is held in canonical JSON form so equality is independent
/// of YAML formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub id: String,
    pub body: Value,
}

impl ConfigDocument {
    /// Parse a single-document file
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] when the document is empty or
    /// missing its `id` field.
    pub fn from_yaml(kind: DocumentKind, content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let body = serde_json::to_value(&value)?;
        let id = document_id(&body)
            .ok_or_else(|| Error::invalid_document(kind.as_str(), "missing id"))?;
        Ok(Self { id, body })
    }

    /// Wrap a raw document body
    ///
    /// Lenient: an entry without an id is kept but never becomes
    /// matchable.
    pub fn from_value(body: Value) -> Self {
        Self {
            id: document_id(&body).unwrap_or_default(),
            body,
        }
    }

    /// Parse the server-side document list
    pub fn list_from_yaml(kind: DocumentKind, content: &str) -> Result<Vec<Self>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let body = serde_json::to_value(&value)?;
        let Value::Array(entries) = body else {
            return Err(Error::invalid_document(
                kind.as_str(),
                "server document is not a list",
            ));
        };

        Ok(entries.into_iter().map(Self::from_value).collect())
    }

    /// Display name from the body, or "Unknown"
    pub fn display_name(&self, kind: DocumentKind) -> String {
        self.body
            .get(kind.label_field())
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string()
    }
}

impl ScopeFields for ConfigDocument {
    fn name(&self) -> &str {
        &self.id
    }
}

fn document_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Scene/automation domain adapter
#[derive(Debug, Clone, Copy)]
pub struct DocumentSync {
    kind: DocumentKind,
}

impl DocumentSync {
    /// Create the adapter for one document kind
    pub fn new(kind: DocumentKind) -> Self {
        Self { kind }
    }

    /// The document kind this adapter serves
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

impl Domain for DocumentSync {
    type Desired = ConfigDocument;
    type Remote = ConfigDocument;

    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    fn desired_key(&self, desired: &ConfigDocument) -> Option<MatchKey> {
        (!desired.id.is_empty()).then(|| desired.id.clone())
    }

    fn remote_key(&self, remote: &ConfigDocument) -> Option<MatchKey> {
        (!remote.id.is_empty()).then(|| remote.id.clone())
    }

    fn remote_id(&self, remote: &ConfigDocument) -> RemoteId {
        remote.id.clone()
    }

    fn label(&self, desired: &ConfigDocument) -> String {
        desired.display_name(self.kind)
    }

    fn unmatched_policy(&self) -> UnmatchedPolicy {
        // The server list is authoritative for membership; a document
        // that is not there cannot be appended by this pass.
        UnmatchedPolicy::Report
    }

    fn changed_fields(&self, desired: &ConfigDocument, remote: &ConfigDocument) -> Vec<FieldChange> {
        if desired.body == remote.body {
            Vec::new()
        } else {
            vec![FieldChange {
                field: "body".to_string(),
                old: Some(remote.body.clone()),
                new: desired.body.clone(),
            }]
        }
    }
}
