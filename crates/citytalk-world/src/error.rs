//! Error types for the `citytalk-world` crate.

/// Errors that can occur during world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The in-memory tile table rejected an operation.
    #[error("tile table error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A projection could not be serialized.
    #[error("projection serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}
