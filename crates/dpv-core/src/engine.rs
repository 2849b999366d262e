//! Owned engine state: the patient store plus the selection tracker.
//!
//! # Design Notes
//!
//! - **Single owner** - one orchestrator owns the engine and issues one
//!   mutation at a time.
//! - **Cascading removal** - [`CohortEngine::remove`] purges selections and
//!   cohort membership before returning, so no recompute can observe a
//!   dangling identifier.
//! - **No caching** - the combined summary is rebuilt by every
//!   [`CohortEngine::recompute_combined`] call.

use dpv_model::{CombinedSelection, PatientId, RegionSet};

use crate::aggregation::AggregationEngine;
use crate::collaborators::CombinedSummarizer;
use crate::error::Result;
use crate::selection::SelectionTracker;
use crate::store::{PatientRecord, PatientStore};

#[derive(Debug, Clone)]
pub struct CohortEngine<H, S> {
    store: PatientStore<H, S>,
    selection: SelectionTracker,
}

impl<H, S> Default for CohortEngine<H, S> {
    fn default() -> Self {
        Self {
            store: PatientStore::new(),
            selection: SelectionTracker::new(),
        }
    }
}

impl<H, S> CohortEngine<H, S> {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Adds a loaded patient (∅ → Loaded).
    pub fn add(&mut self, id: PatientId, handle: H) -> Result<()> {
        self.store.add(id, handle)
    }

    /// Removes a patient and purges its selection and cohort membership.
    pub fn remove(&mut self, id: &str) -> Result<PatientRecord<H, S>> {
        let record = self.store.remove(id)?;
        self.selection.on_patient_removed(id);
        Ok(record)
    }

    /// Replaces the region selection of a loaded patient.
    pub fn set_regions(&mut self, id: &str, regions: RegionSet) -> Result<()> {
        self.selection.set_regions(&self.store, id, regions)
    }

    /// Moves a patient between Loaded and Combined.
    pub fn set_combined(&mut self, id: &str, is_member: bool) -> Result<()> {
        self.selection.set_combined(&self.store, id, is_member)
    }

    /// Stores the latest per-patient summary.
    pub fn set_summary(&mut self, id: &str, summary: S) -> Result<()> {
        self.store.set_summary(id, summary)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.store.contains(id)
    }

    pub fn combined_snapshot(&self) -> CombinedSelection {
        self.selection.combined_snapshot()
    }

    /// Rebuilds the combined summary from current state.
    pub fn recompute_combined<C>(&self, summarizer: &C) -> C::Summary
    where
        C: CombinedSummarizer + ?Sized,
    {
        AggregationEngine::new(&self.store, &self.selection).recompute_combined(summarizer)
    }

    pub fn store(&self) -> &PatientStore<H, S> {
        &self.store
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Checks that every tracked identifier is loaded.
    pub fn is_consistent(&self) -> bool {
        self.selection
            .combined()
            .chain(self.selection.selected_patients())
            .all(|id| self.store.contains(id.as_str()))
    }
}
