//! Batch summaries of a list of patient folders.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use dpv_core::{DatasetLoader, Workbench};
use dpv_ingest::DiffusionDataset;
use dpv_model::{CohortSummary, PatientSummary, RegionSet};
use dpv_report::{render_cohort_summary, render_patient_summary, to_json, to_tsv};

use crate::logging::redact_value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct SummarizeRequest {
    pub patient_dirs: Vec<PathBuf>,
    /// Selection applied to every loaded patient. `None` prints overviews.
    pub regions: Option<RegionSet>,
    pub combine: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone)]
pub struct SummarizeOutcome {
    pub output: String,
    pub loaded: usize,
    /// One message per folder that could not be added.
    pub failures: Vec<String>,
}

impl SummarizeOutcome {
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Serialize)]
struct SummarizeReport<'a> {
    patients: &'a [PatientSummary],
    #[serde(skip_serializing_if = "Option::is_none")]
    combined: Option<&'a CohortSummary>,
}

/// Loads the requested folders, applies the selection and renders the result.
///
/// Folders that fail to load are reported in the outcome and skipped.
pub fn summarize<L>(workbench: &mut Workbench<L>, request: &SummarizeRequest) -> Result<SummarizeOutcome>
where
    L: DatasetLoader<Handle = DiffusionDataset> + Sync,
{
    let mut failures = Vec::new();
    for (path, result) in request
        .patient_dirs
        .iter()
        .zip(workbench.load_all(&request.patient_dirs))
    {
        if let Err(error) = result {
            let detail = error.to_string();
            warn!(
                kind = error.kind(),
                detail = redact_value(&detail),
                "skipping patient folder"
            );
            failures.push(format!("{}: {error}", path.display()));
        }
    }

    let ids = workbench.patient_ids();
    for id in &ids {
        if let Some(regions) = &request.regions {
            workbench.set_regions(id.as_str(), regions.clone())?;
        }
        if request.combine {
            workbench.set_combined(id.as_str(), true)?;
        }
        info!(patient = redact_value(id.as_str()), "patient summarized");
    }

    let patients: Vec<PatientSummary> = ids
        .iter()
        .filter_map(|id| match request.regions {
            Some(_) => workbench.patient_summary(id.as_str()),
            None => workbench.overview(id.as_str()),
        })
        .collect();
    let combined = request.combine.then(|| workbench.combined_summary());

    let output = render(&patients, combined.as_ref(), request.format)?;
    Ok(SummarizeOutcome {
        output,
        loaded: ids.len(),
        failures,
    })
}

fn render(
    patients: &[PatientSummary],
    combined: Option<&CohortSummary>,
    format: OutputFormat,
) -> Result<String> {
    let mut blocks = Vec::new();
    match format {
        OutputFormat::Table => {
            blocks.extend(patients.iter().map(render_patient_summary));
            blocks.extend(combined.map(render_cohort_summary));
        }
        OutputFormat::Tsv => {
            for patient in patients {
                let tsv = to_tsv(&patient.table)
                    .with_context(|| format!("export of patient {}", patient.patient_id))?;
                blocks.push(format!("# {}\n{tsv}", patient.patient_id));
            }
            if let Some(combined) = combined {
                let tsv = to_tsv(&combined.table).context("export of combined summary")?;
                blocks.push(format!("# combined\n{tsv}"));
            }
        }
        OutputFormat::Json => {
            let report = SummarizeReport { patients, combined };
            blocks.push(to_json(&report).context("serialize summary")?);
        }
    }
    Ok(blocks
        .iter()
        .map(|block| block.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n"))
}
