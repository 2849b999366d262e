//! Error types for the selection engine and workbench.

use std::path::PathBuf;

use dpv_model::PatientId;
use thiserror::Error;

/// Failures of engine mutations. A failed call leaves all state unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `add` with an identifier that is already loaded.
    #[error("patient {0} is already loaded")]
    DuplicateIdentifier(PatientId),

    /// Per-patient operation on an identifier that is not loaded.
    #[error("patient {0} is not loaded")]
    UnknownIdentifier(String),
}

/// Failures surfaced by the workbench to its view.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The loader could not produce a dataset; the engine was not touched.
    #[error("failed to load patient data from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl EngineError {
    /// Stable name of the failure, free of identifiers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateIdentifier(_) => "duplicate_identifier",
            Self::UnknownIdentifier(_) => "unknown_identifier",
        }
    }
}

impl WorkbenchError {
    /// Stable name of the failure, free of identifiers and paths.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Engine(err) => err.kind(),
            Self::Load { .. } => "load_failed",
        }
    }

    /// Returns the engine error, if this is one.
    pub fn as_engine(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(err) => Some(err),
            Self::Load { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
