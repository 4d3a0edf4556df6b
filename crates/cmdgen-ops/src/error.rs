//! Error types for the operations layer.

use std::path::PathBuf;

use cmdgen_core::{ArtifactKind, RunReport};
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur during operations.
///
/// A pending overwrite question is not an error; see
/// [`RunOutcome::AwaitingAnswer`](crate::RunOutcome::AwaitingAnswer).
#[derive(Debug, Error)]
pub enum OpsError {
    /// The model node cannot be turned into a connection.
    #[error("Cannot resolve node {node}: {message}")]
    Resolution { node: String, message: String },

    /// A generator failed to produce valid content.
    #[error("Failed to generate {artifact}: {message}")]
    Generation {
        artifact: ArtifactKind,
        message: String,
    },

    /// Writing a generated file failed. Files written earlier stay on disk.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        /// Report accumulated up to the failed write.
        report: RunReport,
    },

    /// The board file could not be read or parsed.
    #[error("Invalid board {path}: {message}")]
    Board { path: PathBuf, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error outside of artifact writes.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpsError {
    /// Create a resolution error.
    pub fn resolution(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create a generation error.
    pub fn generation(artifact: ArtifactKind, message: impl Into<String>) -> Self {
        Self::Generation {
            artifact,
            message: message.into(),
        }
    }

    /// Partial report for failures that happened after the run started writing.
    pub fn partial_report(&self) -> Option<&RunReport> {
        match self {
            OpsError::Write { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Whether the error stems from the model rather than the environment.
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            OpsError::Resolution { .. } | OpsError::Generation { .. } | OpsError::Board { .. }
        )
    }
}
