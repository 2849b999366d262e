//! Error types for patient data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a patient folder.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Patient folder has no usable name.
    #[error("cannot derive a patient identifier from {path}")]
    InvalidPatientDirectory { path: PathBuf },

    /// Parameter table not found inside the patient folder.
    #[error("diffusion parameter table not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Table Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Table has no voxel rows.
    #[error("parameter table is empty: {path}")]
    EmptyTable { path: PathBuf },

    /// Region column not present in the table.
    #[error("region column '{column}' not found in {path}")]
    MissingRegionColumn { column: String, path: PathBuf },

    /// Region cell is not a non-negative integer in the configured numbering.
    #[error("invalid region value '{value}' in {path}")]
    InvalidRegion { value: String, path: PathBuf },

    /// No numeric parameter columns besides the region column.
    #[error("no numeric diffusion parameter columns in {path}")]
    NoParameterColumns { path: PathBuf },

    /// Columns of an in-memory dataset disagree on voxel count.
    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
