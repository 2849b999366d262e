//! Configuration options for loading patient data.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::REGION_COUNT;

/// Relative location of the exported parameter table inside a patient folder.
pub const DEFAULT_DATA_FILE: &str = "result_images/exported_data/diffusion_parameters.csv";

/// Default name of the column holding each voxel's region.
pub const DEFAULT_REGION_COLUMN: &str = "region";

/// How region values are numbered in the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionBase {
    /// Regions are stored as 0-based indices.
    #[default]
    Zero,
    /// Regions are stored as 1-based labels.
    One,
}

/// Options controlling how a patient folder is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderOptions {
    /// Path of the parameter table, relative to the patient folder.
    pub data_file: PathBuf,

    /// Column holding the region of each voxel.
    pub region_column: String,

    /// Numbering used by the region column.
    pub region_base: RegionBase,

    /// Number of regions known to the summarizers.
    ///
    /// Voxels outside `0..region_count` are kept but can never be selected
    /// through the CLI.
    pub region_count: u32,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            region_column: DEFAULT_REGION_COLUMN.to_string(),
            region_base: RegionBase::Zero,
            region_count: REGION_COUNT,
        }
    }
}

impl LoaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }

    pub fn with_region_column(mut self, column: impl Into<String>) -> Self {
        self.region_column = column.into();
        self
    }

    pub fn with_region_base(mut self, base: RegionBase) -> Self {
        self.region_base = base;
        self
    }

    pub fn with_region_count(mut self, count: u32) -> Self {
        self.region_count = count;
        self
    }
}
