//! Error types for hubsync-core

/// Result type for hubsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hubsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record snapshot could not be obtained
    ///
    /// Fatal: a pass aborts before any write when either side fails to
    /// fetch.
    #[error("Failed to fetch {side} records: {message}")]
    Fetch { side: String, message: String },

    /// A deny-list name pattern is not a valid regex
    #[error("Invalid scope pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Create a fetch error for one side of a pass
    pub fn fetch(side: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            side: side.into(),
            message: message.into(),
        }
    }
}
