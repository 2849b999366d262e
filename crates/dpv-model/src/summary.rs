//! Summary values produced by the summarizers.
//!
//! The engine never inspects these; they are consumed by the report layer.

use serde::{Deserialize, Serialize};

use crate::{CombinedSelection, PatientId, RegionSet};

/// Descriptive statistics for one diffusion parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Descriptive {
    pub mean: f64,
    /// Sample standard deviation; `None` for a single value.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Statistics of one parameter column over the summarized voxels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub parameter: String,
    /// Number of finite values that contributed.
    pub count: usize,
    /// `None` when no value contributed.
    pub stats: Option<Descriptive>,
}

/// One table of per-parameter statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    /// Number of voxels that fell inside the summarized regions.
    pub voxel_count: usize,
    pub parameters: Vec<ParameterSummary>,
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.voxel_count == 0
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSummary> {
        self.parameters.iter().find(|p| p.parameter == name)
    }
}

/// Which voxels of a patient a summary covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "regions", rename_all = "snake_case")]
pub enum SummaryScope {
    /// Every voxel of the dataset.
    AllRegions,
    /// Voxels of the listed regions only.
    Selected(RegionSet),
}

/// Summary of a single patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: PatientId,
    pub scope: SummaryScope,
    pub table: SummaryTable,
}

/// Summary pooled over every combined patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    /// Selection each contributing patient was summarized with.
    pub selection: CombinedSelection,
    pub table: SummaryTable,
}

impl CohortSummary {
    pub fn patient_count(&self) -> usize {
        self.selection.len()
    }
}
