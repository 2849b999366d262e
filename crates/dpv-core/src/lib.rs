//! Selection and aggregation engine.
//!
//! [`CohortEngine`] owns a [`PatientStore`] and a [`SelectionTracker`] and
//! recomputes the combined summary through an [`AggregationEngine`].
//! [`Workbench`] drives it with the diffusion loader and summarizers.

pub mod aggregation;
pub mod collaborators;
pub mod engine;
pub mod error;
pub mod selection;
pub mod stats;
pub mod store;
pub mod summarizers;
pub mod workbench;

pub use aggregation::AggregationEngine;
pub use collaborators::{CombinedSummarizer, DatasetLoader, PatientSummarizer};
pub use engine::CohortEngine;
pub use error::{EngineError, Result, WorkbenchError};
pub use selection::SelectionTracker;
pub use stats::{describe, percentile};
pub use store::{PatientRecord, PatientStore};
pub use summarizers::{DiffusionSummarizer, PooledSummarizer};
pub use workbench::{LoadedPatient, Update, Workbench, WorkbenchOptions, WorkbenchResult};
