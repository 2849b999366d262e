//! Summarizers over [`DiffusionDataset`] handles.
//!
//! Each summary pools the finite values of every parameter over the voxels
//! in scope and reports one row of statistics per parameter.

use dpv_ingest::DiffusionDataset;
use dpv_model::{
    CohortSummary, CombinedSelection, ParameterSummary, Region, RegionSet, SummaryTable,
};
use tracing::warn;

use crate::collaborators::{CombinedSummarizer, PatientSummarizer};
use crate::stats::describe;
use crate::store::PatientStore;

/// Per-patient summarizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffusionSummarizer;

impl DiffusionSummarizer {
    /// Statistics over every voxel of the dataset.
    pub fn overview(&self, dataset: &DiffusionDataset) -> SummaryTable {
        let mut pool = Pool::default();
        pool.add(dataset, |_| true);
        pool.finish()
    }

    /// Statistics over the voxels of the selected regions.
    pub fn selected(&self, dataset: &DiffusionDataset, regions: &RegionSet) -> SummaryTable {
        let mut pool = Pool::default();
        pool.add(dataset, |region| in_selection(region, regions));
        pool.finish()
    }
}

impl PatientSummarizer<DiffusionDataset> for DiffusionSummarizer {
    type Summary = SummaryTable;

    fn summarize_patient(&self, handle: &DiffusionDataset, regions: &RegionSet) -> SummaryTable {
        self.selected(handle, regions)
    }
}

/// Combined summarizer pooling the selected voxels of every combined patient.
///
/// Datasets are looked up in the store the cohort was taken from.
pub struct PooledSummarizer<'a, S> {
    store: &'a PatientStore<DiffusionDataset, S>,
}

impl<'a, S> PooledSummarizer<'a, S> {
    pub fn new(store: &'a PatientStore<DiffusionDataset, S>) -> Self {
        Self { store }
    }
}

impl<S> CombinedSummarizer for PooledSummarizer<'_, S> {
    type Summary = CohortSummary;

    fn summarize_combined(&self, selection: &CombinedSelection) -> CohortSummary {
        let mut pool = Pool::default();
        for (id, regions) in selection {
            match self.store.handle(id.as_str()) {
                Some(dataset) => pool.add(dataset, |region| in_selection(region, regions)),
                None => warn!(patient = %id, "combined patient has no dataset"),
            }
        }
        CohortSummary {
            selection: selection.clone(),
            table: pool.finish(),
        }
    }
}

fn in_selection(region: Option<Region>, regions: &RegionSet) -> bool {
    region.is_some_and(|r| regions.contains(&r))
}

/// Accumulates parameter values in first-seen column order.
#[derive(Default)]
struct Pool {
    voxel_count: usize,
    columns: Vec<(String, Vec<f64>)>,
}

impl Pool {
    fn add(&mut self, dataset: &DiffusionDataset, include: impl Fn(Option<Region>) -> bool) {
        let mask: Vec<bool> = dataset
            .voxel_regions()
            .iter()
            .map(|region| include(*region))
            .collect();
        self.voxel_count += mask.iter().filter(|keep| **keep).count();

        for column in dataset.parameters() {
            let index = match self.columns.iter().position(|(name, _)| *name == column.name) {
                Some(index) => index,
                None => {
                    self.columns.push((column.name.clone(), Vec::new()));
                    self.columns.len() - 1
                }
            };
            let values = &mut self.columns[index].1;
            values.extend(
                column
                    .values
                    .iter()
                    .zip(&mask)
                    .filter(|(_, keep)| **keep)
                    .filter_map(|(value, _)| *value)
                    .filter(|value| value.is_finite()),
            );
        }
    }

    fn finish(self) -> SummaryTable {
        SummaryTable {
            voxel_count: self.voxel_count,
            parameters: self
                .columns
                .into_iter()
                .map(|(parameter, values)| ParameterSummary {
                    parameter,
                    count: values.len(),
                    stats: describe(&values),
                })
                .collect(),
        }
    }
}
