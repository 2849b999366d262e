//! Patient store - one record per loaded patient.

use std::collections::BTreeMap;

use dpv_model::PatientId;

use crate::error::{EngineError, Result};

/// A loaded patient: its dataset handle and latest per-patient summary.
#[derive(Debug, Clone)]
pub struct PatientRecord<H, S> {
    handle: H,
    summary: Option<S>,
}

impl<H, S> PatientRecord<H, S> {
    fn new(handle: H) -> Self {
        Self {
            handle,
            summary: None,
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Summary of the current region selection; `None` until the first
    /// selection change.
    pub fn summary(&self) -> Option<&S> {
        self.summary.as_ref()
    }

    pub fn into_handle(self) -> H {
        self.handle
    }
}

/// Loaded patients keyed by identifier.
///
/// Handles and summaries are opaque to the store.
#[derive(Debug, Clone)]
pub struct PatientStore<H, S> {
    records: BTreeMap<PatientId, PatientRecord<H, S>>,
}

impl<H, S> Default for PatientStore<H, S> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<H, S> PatientStore<H, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new patient.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateIdentifier`] when the identifier is already
    /// present; the stored record is kept.
    pub fn add(&mut self, id: PatientId, handle: H) -> Result<()> {
        if self.records.contains_key(&id) {
            return Err(EngineError::DuplicateIdentifier(id));
        }
        self.records.insert(id, PatientRecord::new(handle));
        Ok(())
    }

    /// Removes a patient and returns its record.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownIdentifier`] when the identifier is absent.
    pub fn remove(&mut self, id: &str) -> Result<PatientRecord<H, S>> {
        self.records
            .remove(id)
            .ok_or_else(|| EngineError::UnknownIdentifier(id.to_string()))
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Returns the stored identifier matching `id`.
    pub fn resolve(&self, id: &str) -> Option<&PatientId> {
        self.records.get_key_value(id).map(|(key, _)| key)
    }

    pub fn get(&self, id: &str) -> Option<&PatientRecord<H, S>> {
        self.records.get(id)
    }

    pub fn handle(&self, id: &str) -> Option<&H> {
        self.records.get(id).map(PatientRecord::handle)
    }

    /// Replaces the per-patient summary.
    pub fn set_summary(&mut self, id: &str, summary: S) -> Result<()> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownIdentifier(id.to_string()))?;
        record.summary = Some(summary);
        Ok(())
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &PatientId> {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PatientId, &PatientRecord<H, S>)> {
        self.records.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
