//! In-memory diffusion parameter dataset.

use std::path::{Path, PathBuf};

use dpv_model::{Region, RegionSet};

use crate::error::{IngestError, Result};

/// Values of one diffusion parameter, one entry per voxel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterColumn {
    pub name: String,
    /// `None` for missing cells.
    pub values: Vec<Option<f64>>,
}

impl ParameterColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// One patient's per-voxel diffusion parameters.
///
/// This is the dataset handle stored for every loaded patient. Columns are
/// kept in source order and all have one entry per voxel.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionDataset {
    source: PathBuf,
    regions: Vec<Option<Region>>,
    parameters: Vec<ParameterColumn>,
}

impl DiffusionDataset {
    /// Builds a dataset from already-decoded columns.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::ColumnLength`] when a parameter column does not
    /// have one value per voxel.
    pub fn from_columns(
        source: impl Into<PathBuf>,
        regions: Vec<Option<Region>>,
        parameters: Vec<ParameterColumn>,
    ) -> Result<Self> {
        let expected = regions.len();
        for column in &parameters {
            if column.values.len() != expected {
                return Err(IngestError::ColumnLength {
                    column: column.name.clone(),
                    expected,
                    actual: column.values.len(),
                });
            }
        }
        Ok(Self {
            source: source.into(),
            regions,
            parameters,
        })
    }

    /// File the dataset was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.regions.len()
    }

    /// Region of each voxel (`None` when the source cell was empty).
    pub fn voxel_regions(&self) -> &[Option<Region>] {
        &self.regions
    }

    pub fn parameters(&self) -> &[ParameterColumn] {
        &self.parameters
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Regions that have at least one voxel.
    pub fn present_regions(&self) -> RegionSet {
        self.regions.iter().flatten().copied().collect()
    }

    /// Number of voxels whose region is in `regions`.
    pub fn voxels_in(&self, regions: &RegionSet) -> usize {
        self.regions
            .iter()
            .filter(|region| region.is_some_and(|r| regions.contains(&r)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> DiffusionDataset {
        DiffusionDataset::from_columns(
            "mem",
            vec![Some(0), Some(2), None, Some(2)],
            vec![ParameterColumn::new(
                "ADC",
                vec![Some(1.0), Some(2.0), Some(3.0), None],
            )],
        )
        .unwrap()
    }

    #[test]
    fn reports_present_regions() {
        let ds = dataset();
        assert_eq!(ds.voxel_count(), 4);
        assert_eq!(ds.present_regions(), RegionSet::from([0, 2]));
        assert_eq!(ds.voxels_in(&RegionSet::from([2])), 2);
        assert_eq!(ds.voxels_in(&RegionSet::new()), 0);
        assert_eq!(ds.parameter_names(), vec!["ADC"]);
    }

    #[test]
    fn rejects_ragged_columns() {
        let result = DiffusionDataset::from_columns(
            "mem",
            vec![Some(0)],
            vec![ParameterColumn::new("FA", vec![Some(0.1), Some(0.2)])],
        );
        assert!(matches!(
            result,
            Err(IngestError::ColumnLength {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }
}
