//! Error types for the command pipeline.
//!
//! Uses `thiserror` for typed errors that surface through the pipeline:
//! LLM calls, prompt templates, reply parsing, world snapshots, configuration.

use citytalk_world::WorldError;

/// Errors that can occur while converting a command into tasks.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// An LLM backend returned an error or was unreachable.
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// The LLM reply did not contain a usable task array.
    #[error("reply parse error: {0}")]
    Parse(String),

    /// A prompt template could not be loaded.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The world snapshot used for structured queries failed.
    #[error("world query error: {0}")]
    Query(#[from] WorldError),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
