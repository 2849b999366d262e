//! Region domain and selection sets.
//!
//! Regions are stored as 0-based indices. User-facing surfaces show them as
//! 1-based labels, matching the numbering of the region checkboxes.

use std::collections::{BTreeMap, BTreeSet};

use crate::{ModelError, PatientId};

/// Number of anatomical regions known to the summarizers.
pub const REGION_COUNT: u32 = 12;

/// Largest region count accepted from configuration.
pub const MAX_REGION_COUNT: u32 = 256;

/// 0-based region index.
pub type Region = u32;

/// Set of selected regions for one patient.
pub type RegionSet = BTreeSet<Region>;

/// Selection of every combined patient, keyed by identifier.
pub type CombinedSelection = BTreeMap<PatientId, RegionSet>;

/// Returns the 1-based label shown for a region index.
pub fn region_label(region: Region) -> String {
    (u64::from(region) + 1).to_string()
}

/// Formats a region set as comma-separated 1-based labels ("-" when empty).
pub fn format_region_labels(regions: &RegionSet) -> String {
    if regions.is_empty() {
        return "-".to_string();
    }
    regions
        .iter()
        .map(|region| region_label(*region))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses 1-based region labels into 0-based indices.
///
/// Accepts comma separated labels and inclusive ranges (`1,3,5-7`), plus the
/// keywords `all` and `none`.
pub fn parse_region_labels(input: &str, region_count: u32) -> Result<RegionSet, ModelError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(RegionSet::new());
    }
    if trimmed.eq_ignore_ascii_case("all") {
        return Ok((0..region_count).collect());
    }
    let mut regions = RegionSet::new();
    for part in trimmed.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_label(start, region_count)?;
                let end = parse_label(end, region_count)?;
                if start > end {
                    return Err(ModelError::InvalidRegionLabel {
                        label: part.to_string(),
                        max: region_count,
                    });
                }
                regions.extend(start..=end);
            }
            None => {
                regions.insert(parse_label(part, region_count)?);
            }
        }
    }
    Ok(regions)
}

fn parse_label(raw: &str, region_count: u32) -> Result<Region, ModelError> {
    let invalid = || ModelError::InvalidRegionLabel {
        label: raw.trim().to_string(),
        max: region_count,
    };
    let label: u32 = raw.trim().parse().map_err(|_| invalid())?;
    if label == 0 || label > region_count {
        return Err(invalid());
    }
    Ok(label - 1)
}
