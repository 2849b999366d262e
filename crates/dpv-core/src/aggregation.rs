//! Aggregation engine - recomputes the combined summary.

use tracing::debug;

use crate::collaborators::CombinedSummarizer;
use crate::selection::SelectionTracker;
use crate::store::PatientStore;

/// Read-only view over engine state that produces the combined summary.
///
/// There is no caching: each call snapshots the cohort and runs the
/// summarizer over it, including when the cohort is empty.
pub struct AggregationEngine<'a, H, S> {
    store: &'a PatientStore<H, S>,
    selection: &'a SelectionTracker,
}

impl<'a, H, S> AggregationEngine<'a, H, S> {
    pub fn new(store: &'a PatientStore<H, S>, selection: &'a SelectionTracker) -> Self {
        Self { store, selection }
    }

    /// Passes the combined snapshot to `summarizer` and returns its result
    /// unmodified.
    pub fn recompute_combined<C>(&self, summarizer: &C) -> C::Summary
    where
        C: CombinedSummarizer + ?Sized,
    {
        let snapshot = self.selection.combined_snapshot();
        debug_assert!(
            snapshot.keys().all(|id| self.store.contains(id.as_str())),
            "combined cohort references a patient missing from the store"
        );
        debug!(
            patients = snapshot.len(),
            loaded = self.store.len(),
            "recomputing combined summary"
        );
        summarizer.summarize_combined(&snapshot)
    }
}
