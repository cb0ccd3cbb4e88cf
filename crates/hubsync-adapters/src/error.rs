//! Error types for hubsync-adapters

/// Result type for hubsync-adapters operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hubsync-adapters operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A desired-state document is malformed
    #[error("Invalid {kind} document: {message}")]
    InvalidDocument { kind: String, message: String },

    /// Error from the reconciliation core
    #[error(transparent)]
    Core(#[from] hubsync_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-document error
    pub fn invalid_document(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
