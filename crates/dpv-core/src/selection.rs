//! Selection tracker - region selections and combined cohort membership.
//!
//! Every identifier held here is also present in the [`PatientStore`]; the
//! store is consulted on every mutation and [`SelectionTracker::on_patient_removed`]
//! purges entries when a patient goes away.

use std::collections::{BTreeMap, BTreeSet};

use dpv_model::{CombinedSelection, PatientId, RegionSet};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::store::PatientStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    regions: BTreeMap<PatientId, RegionSet>,
    combined: BTreeSet<PatientId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full region selection of a patient.
    ///
    /// Region values are not checked against the region domain.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownIdentifier`] when the patient is not in `store`;
    /// no entry is created in that case.
    pub fn set_regions<H, S>(
        &mut self,
        store: &PatientStore<H, S>,
        id: &str,
        regions: RegionSet,
    ) -> Result<()> {
        let key = resolve(store, id)?;
        debug!(patient = %key, regions = regions.len(), "set regions");
        self.regions.insert(key.clone(), regions);
        Ok(())
    }

    /// Adds or removes a patient from the combined cohort. Idempotent.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownIdentifier`] when the patient is not in `store`.
    pub fn set_combined<H, S>(
        &mut self,
        store: &PatientStore<H, S>,
        id: &str,
        is_member: bool,
    ) -> Result<()> {
        let key = resolve(store, id)?;
        let changed = if is_member {
            self.combined.insert(key.clone())
        } else {
            self.combined.remove(id)
        };
        debug!(patient = %key, is_member, changed, "set combined");
        Ok(())
    }

    /// Purges the selection and cohort membership of a removed patient.
    ///
    /// Must follow every successful [`PatientStore::remove`] before the next
    /// recompute.
    pub fn on_patient_removed(&mut self, id: &str) {
        let had_regions = self.regions.remove(id).is_some();
        let was_combined = self.combined.remove(id);
        debug!(patient = id, had_regions, was_combined, "purged removed patient");
    }

    /// Selection of every combined patient; empty set when the patient never
    /// selected a region.
    pub fn combined_snapshot(&self) -> CombinedSelection {
        self.combined
            .iter()
            .map(|id| {
                let regions = self.regions.get(id).cloned().unwrap_or_default();
                (id.clone(), regions)
            })
            .collect()
    }

    /// Current selection of a patient, if one was ever made.
    pub fn regions(&self, id: &str) -> Option<&RegionSet> {
        self.regions.get(id)
    }

    pub fn is_combined(&self, id: &str) -> bool {
        self.combined.contains(id)
    }

    /// Combined cohort members in ascending order.
    pub fn combined(&self) -> impl Iterator<Item = &PatientId> {
        self.combined.iter()
    }

    /// Identifiers that have a region selection entry.
    pub fn selected_patients(&self) -> impl Iterator<Item = &PatientId> {
        self.regions.keys()
    }
}

fn resolve<'a, H, S>(store: &'a PatientStore<H, S>, id: &str) -> Result<&'a PatientId> {
    store
        .resolve(id)
        .ok_or_else(|| EngineError::UnknownIdentifier(id.to_string()))
}
