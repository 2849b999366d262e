//! Contracts for the loader and summarizers plugged into the engine.
//!
//! Implementations must be deterministic: summarizers are pure functions of
//! their inputs, and a loader reports failures as values without touching
//! engine state.

use std::path::Path;

use dpv_model::{CombinedSelection, PatientId, RegionSet};

/// Produces a dataset handle from a patient path.
pub trait DatasetLoader {
    /// Opaque per-patient dataset.
    type Handle;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Identifier the dataset at `path` will be stored under.
    fn identify(&self, path: &Path) -> Result<PatientId, Self::Error>;

    /// Reads the dataset at `path`.
    fn load(&self, path: &Path) -> Result<Self::Handle, Self::Error>;
}

/// Summarizes one patient's dataset restricted to a region selection.
pub trait PatientSummarizer<H> {
    type Summary;

    fn summarize_patient(&self, handle: &H, regions: &RegionSet) -> Self::Summary;
}

impl<H, F, T> PatientSummarizer<H> for F
where
    F: Fn(&H, &RegionSet) -> T,
{
    type Summary = T;

    fn summarize_patient(&self, handle: &H, regions: &RegionSet) -> T {
        self(handle, regions)
    }
}

/// Summarizes the selections of every combined patient into one value.
pub trait CombinedSummarizer {
    type Summary;

    fn summarize_combined(&self, selection: &CombinedSelection) -> Self::Summary;
}

impl<F, T> CombinedSummarizer for F
where
    F: Fn(&CombinedSelection) -> T,
{
    type Summary = T;

    fn summarize_combined(&self, selection: &CombinedSelection) -> T {
        self(selection)
    }
}
