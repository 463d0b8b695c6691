//! Error types
//!
//! Nothing here is fatal to the frame loop. Simulation errors reset the
//! offending entity, render errors become a diagnostic line, and storage or
//! leaderboard errors turn into a status message for the player.

use thiserror::Error;

/// Simulation invariant violations (detected before use, then repaired)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("non-finite {field} on {entity}")]
    NonFinite {
        entity: &'static str,
        field: &'static str,
    },
}

/// Faults raised by a renderer while painting a frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("no drawing context: {0}")]
    Context(String),
    #[error("paint failed: {0}")]
    Paint(String),
}

/// Key-value storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write rejected: {0}")]
    Write(String),
    #[error("stored data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Leaderboard submit/fetch failures
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("please enter a name")]
    EmptyName,
    #[error("name is longer than {max} characters")]
    NameTooLong { max: usize },
    #[error("leaderboard unavailable")]
    Unavailable,
    #[error("leaderboard backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
