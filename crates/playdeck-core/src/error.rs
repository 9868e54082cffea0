//! Error types for playdeck-core
//!
//! Lower layers only fail on contract violations or unreachable collaborators.
//! Missing or zero data is never an error; the cache degrades instead of failing.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for playdeck operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Store Errors
    // ===================
    #[error("Play log unavailable at {path}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Play log query failed: {operation}")]
    StoreQuery {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("No play log entry for {path}")]
    TitleNotFound { path: String },

    #[error("No play log entry with id {id}")]
    IdNotFound { id: i64 },

    // ===================
    // File Errors
    // ===================
    #[error("Failed to move {from} to {to}")]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ROM not found: {path}")]
    RomNotFound { path: PathBuf },

    #[error("Failed to read directory: {path}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid title name: {name:?}")]
    InvalidName { name: String },

    #[error("No archive directory configured")]
    ArchiveUnconfigured,

    /// The ROM was moved but the play log still points at the old path.
    #[error("Moved {path} but the play log update failed")]
    LogUpdateAfterMove {
        path: PathBuf,
        #[source]
        source: Box<CoreError>,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Failed to read config: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write config: {path}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Cheat Index
    // ===================
    #[error("Cheat index fetch failed for {url}")]
    CheatIndexFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid cheat index URL: {url}")]
    CheatIndexUrl { url: String },
}

impl CoreError {
    /// Short text suitable for a transient on-screen message.
    ///
    /// Never includes raw technical detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            CoreError::StoreUnavailable { .. } | CoreError::StoreQuery { .. } => {
                "Play history unavailable"
            }
            CoreError::TitleNotFound { .. } | CoreError::IdNotFound { .. } => {
                "No play history for this game"
            }
            CoreError::FileMove { .. } | CoreError::RomNotFound { .. } => "Unable to move ROM",
            CoreError::DirectoryRead { .. } => "Unable to read folder",
            CoreError::InvalidName { .. } => "Invalid name",
            CoreError::ArchiveUnconfigured => "No archive folder configured",
            CoreError::LogUpdateAfterMove { .. } => "ROM moved, play history not updated",
            CoreError::ConfigRead { .. }
            | CoreError::ConfigParse { .. }
            | CoreError::ConfigWrite { .. } => "Configuration error",
            CoreError::CheatIndexFetch { .. } | CoreError::CheatIndexUrl { .. } => {
                "Cheats unavailable"
            }
        }
    }
}

/// Degraded state indicator for the aggregation cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedState {
    /// Last refresh read the play log successfully
    Healthy,
    /// Play log unreachable; serving the previous snapshot
    Stale { reason: String },
    /// Play log unreachable and nothing cached; serving an empty snapshot
    Empty { reason: String },
}

impl DegradedState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, DegradedState::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        !self.is_healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_detail() {
        let err = CoreError::TitleNotFound {
            path: "Game Boy (GB)/Tetris.gb".to_string(),
        };
        assert_eq!(err.user_message(), "No play history for this game");
        assert!(err.to_string().contains("Tetris.gb"));
    }

    #[test]
    fn test_degraded_state() {
        assert!(DegradedState::Healthy.is_healthy());
        assert!(DegradedState::Empty {
            reason: "db missing".into()
        }
        .is_degraded());
    }
}
