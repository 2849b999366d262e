//! Workbench - the orchestrator driving the engine for a view.
//!
//! Every action is one engine mutation followed by a full recompute of the
//! combined summary. Loading is split into [`Workbench::prepare`] (I/O, no
//! mutation) and [`Workbench::commit`] (mutation), so loads can run on worker
//! threads while mutations stay sequential.

use std::path::{Path, PathBuf};
use std::thread;

use dpv_ingest::{DiffusionDataset, IngestError, PatientDataLoader, patient_id_from_dir};
use dpv_model::{
    CohortSummary, PatientId, PatientSummary, REGION_COUNT, Region, RegionSet, SummaryScope,
    SummaryTable,
};
use tracing::{debug, info, info_span};

use crate::collaborators::{DatasetLoader, PatientSummarizer};
use crate::engine::CohortEngine;
use crate::error::{EngineError, WorkbenchError};
use crate::summarizers::{DiffusionSummarizer, PooledSummarizer};

impl DatasetLoader for PatientDataLoader {
    type Handle = DiffusionDataset;
    type Error = IngestError;

    fn identify(&self, path: &Path) -> Result<PatientId, IngestError> {
        patient_id_from_dir(path)
    }

    fn load(&self, path: &Path) -> Result<DiffusionDataset, IngestError> {
        PatientDataLoader::load(self, path)
    }
}

/// Options controlling workbench behavior.
#[derive(Debug, Clone)]
pub struct WorkbenchOptions {
    /// Number of regions offered for selection.
    pub region_count: u32,
    /// Upper bound on concurrent loads in [`Workbench::load_all`].
    pub max_parallel_loads: usize,
}

impl Default for WorkbenchOptions {
    fn default() -> Self {
        Self {
            region_count: REGION_COUNT,
            max_parallel_loads: 4,
        }
    }
}

impl WorkbenchOptions {
    pub fn with_region_count(mut self, count: u32) -> Self {
        self.region_count = count;
        self
    }

    pub fn with_max_parallel_loads(mut self, count: usize) -> Self {
        self.max_parallel_loads = count.max(1);
        self
    }
}

/// A dataset that finished loading but is not yet in the engine.
#[derive(Debug, Clone)]
pub struct LoadedPatient {
    pub path: PathBuf,
    pub patient_id: PatientId,
    pub dataset: DiffusionDataset,
}

/// Result pushed to the view after every action.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Summary of the patient the action touched, when it still exists.
    pub patient: Option<PatientSummary>,
    /// Freshly recomputed combined summary.
    pub combined: CohortSummary,
}

pub type WorkbenchResult<T> = std::result::Result<T, WorkbenchError>;

/// Orchestrates loads, selections and cohort changes for one view.
pub struct Workbench<L = PatientDataLoader>
where
    L: DatasetLoader<Handle = DiffusionDataset>,
{
    engine: CohortEngine<DiffusionDataset, SummaryTable>,
    loader: L,
    summarizer: DiffusionSummarizer,
    options: WorkbenchOptions,
}

impl<L> Workbench<L>
where
    L: DatasetLoader<Handle = DiffusionDataset>,
{
    pub fn new(loader: L) -> Self {
        Self {
            engine: CohortEngine::new(),
            loader,
            summarizer: DiffusionSummarizer,
            options: WorkbenchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WorkbenchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &WorkbenchOptions {
        &self.options
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn engine(&self) -> &CohortEngine<DiffusionDataset, SummaryTable> {
        &self.engine
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// Identifies and loads a patient without touching engine state.
    ///
    /// The duplicate check happens before the loader runs.
    pub fn prepare(&self, path: &Path) -> WorkbenchResult<LoadedPatient> {
        let patient_id = self.loader.identify(path).map_err(|e| load_error(path, e))?;
        if self.engine.contains(patient_id.as_str()) {
            return Err(EngineError::DuplicateIdentifier(patient_id).into());
        }
        let dataset = self.loader.load(path).map_err(|e| load_error(path, e))?;
        Ok(LoadedPatient {
            path: path.to_path_buf(),
            patient_id,
            dataset,
        })
    }

    /// Inserts a prepared patient and recomputes.
    ///
    /// The returned update carries the patient's overview summary.
    pub fn commit(&mut self, loaded: LoadedPatient) -> WorkbenchResult<Update> {
        let LoadedPatient {
            path,
            patient_id,
            dataset,
        } = loaded;
        let overview = PatientSummary {
            patient_id: patient_id.clone(),
            scope: SummaryScope::AllRegions,
            table: self.summarizer.overview(&dataset),
        };
        self.engine.add(patient_id, dataset)?;
        debug!(path = %path.display(), "patient folder committed");
        info!(loaded = self.engine.store().len(), "patient added");
        Ok(self.update(Some(overview)))
    }

    /// Loads and adds one patient folder.
    pub fn add_patient(&mut self, path: &Path) -> WorkbenchResult<Update> {
        let loaded = self.prepare(path)?;
        self.commit(loaded)
    }

    /// Loads several patient folders on worker threads, then adds them in
    /// input order.
    pub fn load_all(&mut self, paths: &[PathBuf]) -> Vec<WorkbenchResult<Update>>
    where
        L: Sync,
    {
        let span = info_span!("load_all", count = paths.len());
        let _guard = span.enter();
        let chunk_size = paths
            .len()
            .div_ceil(self.options.max_parallel_loads.max(1))
            .max(1);

        let this = &*self;
        let prepared: Vec<WorkbenchResult<LoadedPatient>> = thread::scope(|scope| {
            let workers: Vec<_> = paths
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|path| this.prepare(path))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .zip(paths.chunks(chunk_size))
                .flat_map(|(worker, chunk)| match worker.join() {
                    Ok(results) => results,
                    Err(_) => chunk
                        .iter()
                        .map(|path| Err(load_error(path, WorkerPanicked)))
                        .collect(),
                })
                .collect()
        });

        prepared
            .into_iter()
            .map(|result| result.and_then(|loaded| self.commit(loaded)))
            .collect()
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Removes a patient; its selection and cohort membership go with it.
    pub fn remove_patient(&mut self, id: &str) -> WorkbenchResult<Update> {
        let was_combined = self.engine.selection().is_combined(id);
        self.engine.remove(id)?;
        info!(
            was_combined,
            loaded = self.engine.store().len(),
            "patient removed"
        );
        Ok(self.update(None))
    }

    /// Replaces a patient's region selection and refreshes its summary.
    pub fn set_regions(&mut self, id: &str, regions: RegionSet) -> WorkbenchResult<Update> {
        self.engine.set_regions(id, regions.clone())?;
        let table = match self.engine.store().handle(id) {
            Some(dataset) => self.summarizer.summarize_patient(dataset, &regions),
            None => return Err(EngineError::UnknownIdentifier(id.to_string()).into()),
        };
        self.engine.set_summary(id, table)?;
        debug!(regions = regions.len(), "regions updated");
        let patient = self.patient_summary(id);
        Ok(self.update(patient))
    }

    /// Flips one region in a patient's selection.
    pub fn toggle_region(&mut self, id: &str, region: Region) -> WorkbenchResult<Update> {
        if !self.engine.contains(id) {
            return Err(EngineError::UnknownIdentifier(id.to_string()).into());
        }
        let mut regions = self.regions(id);
        if !regions.remove(&region) {
            regions.insert(region);
        }
        self.set_regions(id, regions)
    }

    /// Adds a patient to, or drops it from, the combined cohort.
    pub fn set_combined(&mut self, id: &str, is_member: bool) -> WorkbenchResult<Update> {
        self.engine.set_combined(id, is_member)?;
        let patient = self.patient_summary(id);
        Ok(self.update(patient))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Recomputes the combined summary from current state.
    pub fn combined_summary(&self) -> CohortSummary {
        self.engine
            .recompute_combined(&PooledSummarizer::new(self.engine.store()))
    }

    /// Summary of a patient's current selection.
    ///
    /// Patients that never selected a region get an empty-selection summary.
    pub fn patient_summary(&self, id: &str) -> Option<PatientSummary> {
        let record = self.engine.store().get(id)?;
        let patient_id = self.engine.store().resolve(id)?.clone();
        let regions = self.regions(id);
        let table = match record.summary() {
            Some(table) => table.clone(),
            None => self.summarizer.summarize_patient(record.handle(), &regions),
        };
        Some(PatientSummary {
            patient_id,
            scope: SummaryScope::Selected(regions),
            table,
        })
    }

    /// Summary of every voxel of a patient.
    pub fn overview(&self, id: &str) -> Option<PatientSummary> {
        let dataset = self.engine.store().handle(id)?;
        Some(PatientSummary {
            patient_id: self.engine.store().resolve(id)?.clone(),
            scope: SummaryScope::AllRegions,
            table: self.summarizer.overview(dataset),
        })
    }

    pub fn patient_ids(&self) -> Vec<PatientId> {
        self.engine.store().ids().cloned().collect()
    }

    /// Current selection of a patient (empty when none was made).
    pub fn regions(&self, id: &str) -> RegionSet {
        self.engine
            .selection()
            .regions(id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_combined(&self, id: &str) -> bool {
        self.engine.selection().is_combined(id)
    }

    fn update(&self, patient: Option<PatientSummary>) -> Update {
        Update {
            patient,
            combined: self.combined_summary(),
        }
    }
}

impl Default for Workbench<PatientDataLoader> {
    fn default() -> Self {
        Self::new(PatientDataLoader::default())
    }
}

fn load_error<E>(path: &Path, source: E) -> WorkbenchError
where
    E: std::error::Error + Send + Sync + 'static,
{
    WorkbenchError::Load {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("load worker panicked")]
struct WorkerPanicked;
