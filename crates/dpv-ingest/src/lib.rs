//! Patient data ingestion.
//!
//! This crate reads exported diffusion parameter tables into
//! [`DiffusionDataset`] values, the opaque per-patient handle kept by the
//! engine.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dpv_ingest::{PatientDataLoader, discover_patient_dirs, patient_id_from_dir};
//!
//! let loader = PatientDataLoader::default();
//! for dir in discover_patient_dirs(Path::new("scans"), loader.options())? {
//!     let id = patient_id_from_dir(&dir)?;
//!     let dataset = loader.load(&dir)?;
//! }
//! ```

mod dataset;
mod discovery;
mod error;
mod loader;

// === Error Types ===
pub use error::{IngestError, Result};

// === Dataset ===
pub use dataset::{DiffusionDataset, ParameterColumn};

// === Loading ===
pub use loader::{PatientDataLoader, patient_id_from_dir, read_parameter_table};

// === Discovery ===
pub use discovery::discover_patient_dirs;
