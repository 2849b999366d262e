//! Patient folder discovery.

use std::path::{Path, PathBuf};

use dpv_model::LoaderOptions;

use crate::error::{IngestError, Result};

/// Lists sub-folders of `root` that contain a parameter table.
///
/// Returns folders sorted by name.
pub fn discover_patient_dirs(root: &Path, options: &LoaderOptions) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(root).map_err(|e| IngestError::DirectoryRead {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut dirs = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: root.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if path.join(&options.data_file).is_file() {
            dirs.push(path);
        }
    }

    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(dirs)
}
