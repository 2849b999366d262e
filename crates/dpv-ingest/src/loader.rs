//! Loading a patient folder into a [`DiffusionDataset`].
//!
//! A patient folder holds an exported per-voxel table (CSV) with one region
//! column and one column per diffusion parameter. The folder name is the
//! patient identifier.

use std::path::{Path, PathBuf};

use dpv_model::{LoaderOptions, PatientId, Region, RegionBase};
use polars::prelude::*;
use tracing::{debug, info};

use crate::dataset::{DiffusionDataset, ParameterColumn};
use crate::error::{IngestError, Result};

/// Number of rows Polars inspects when inferring column types.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Derives the patient identifier from the final component of a folder path.
pub fn patient_id_from_dir(dir: &Path) -> Result<PatientId> {
    dir.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| PatientId::new(name).ok())
        .ok_or_else(|| IngestError::InvalidPatientDirectory {
            path: dir.to_path_buf(),
        })
}

/// Reads patient folders according to [`LoaderOptions`].
#[derive(Debug, Clone, Default)]
pub struct PatientDataLoader {
    options: LoaderOptions,
}

impl PatientDataLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Location of the parameter table for a patient folder.
    pub fn data_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.options.data_file)
    }

    /// Loads the parameter table of one patient folder.
    ///
    /// # Errors
    ///
    /// Fails when the folder or table is missing, the table cannot be parsed,
    /// or its region/parameter columns are unusable. Nothing is cached on
    /// failure.
    pub fn load(&self, dir: &Path) -> Result<DiffusionDataset> {
        if !dir.is_dir() {
            return Err(IngestError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        read_parameter_table(&self.data_path(dir), &self.options)
    }
}

/// Reads an exported parameter table.
pub fn read_parameter_table(path: &Path, options: &LoaderOptions) -> Result<DiffusionDataset> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if df.height() == 0 {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    let wanted = options.region_column.trim();
    let region_name = df
        .get_column_names()
        .into_iter()
        .find(|name| name.as_str().trim().eq_ignore_ascii_case(wanted))
        .map(|name| name.to_string())
        .ok_or_else(|| IngestError::MissingRegionColumn {
            column: options.region_column.clone(),
            path: path.to_path_buf(),
        })?;

    let regions = decode_regions(df.column(&region_name)?, options.region_base, path)?;

    let mut parameters = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == region_name {
            continue;
        }
        if !is_numeric(column.dtype()) {
            debug!(
                path = %path.display(),
                column = name,
                dtype = %column.dtype(),
                "skipping non-numeric column"
            );
            continue;
        }
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = series.f64()?.into_iter().collect();
        parameters.push(ParameterColumn::new(name.trim(), values));
    }

    if parameters.is_empty() {
        return Err(IngestError::NoParameterColumns {
            path: path.to_path_buf(),
        });
    }

    let dataset = DiffusionDataset::from_columns(path, regions, parameters)?;
    info!(
        voxels = dataset.voxel_count(),
        parameters = dataset.parameters().len(),
        regions = dataset.present_regions().len(),
        "parameter table loaded"
    );
    Ok(dataset)
}

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

fn decode_regions(column: &Column, base: RegionBase, path: &Path) -> Result<Vec<Option<Region>>> {
    if !is_numeric(column.dtype()) {
        let value = column
            .get(0)
            .map(|value| value.to_string())
            .unwrap_or_default();
        return Err(IngestError::InvalidRegion {
            value,
            path: path.to_path_buf(),
        });
    }
    let offset = match base {
        RegionBase::Zero => 0.0,
        RegionBase::One => 1.0,
    };
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .map(|value| match value {
            None => Ok(None),
            Some(raw) => {
                let index = raw - offset;
                if raw.is_finite()
                    && raw.fract() == 0.0
                    && index >= 0.0
                    && index <= f64::from(Region::MAX)
                {
                    Ok(Some(index as Region))
                } else {
                    Err(IngestError::InvalidRegion {
                        value: raw.to_string(),
                        path: path.to_path_buf(),
                    })
                }
            }
        })
        .collect()
}
