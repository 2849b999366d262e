//! Batch summaries over patient folders on disk.

use std::fs;
use std::path::{Path, PathBuf};

use dpv_cli::summarize::{OutputFormat, SummarizeRequest, summarize};
use dpv_core::Workbench;
use dpv_model::{LoaderOptions, RegionSet};

fn write_patient(root: &Path, name: &str, rows: &str) -> PathBuf {
    let dir = root.join(name);
    let table = dir.join(LoaderOptions::default().data_file);
    fs::create_dir_all(table.parent().unwrap()).unwrap();
    fs::write(table, format!("region,ADC\n{rows}")).unwrap();
    dir
}

fn request(root: &Path, format: OutputFormat) -> SummarizeRequest {
    SummarizeRequest {
        patient_dirs: vec![
            write_patient(root, "P1", "0,1.0\n1,2.0\n1,4.0\n"),
            write_patient(root, "P2", "0,10.0\n1,20.0\n"),
        ],
        regions: Some(RegionSet::from([1])),
        combine: true,
        format,
    }
}

#[test]
fn json_report_lists_patients_and_combined() {
    let root = tempfile::tempdir().unwrap();
    let outcome = summarize(
        &mut Workbench::default(),
        &request(root.path(), OutputFormat::Json),
    )
    .unwrap();
    assert!(!outcome.has_errors());
    assert_eq!(outcome.loaded, 2);

    let json: serde_json::Value = serde_json::from_str(&outcome.output).unwrap();
    assert_eq!(json["patients"].as_array().unwrap().len(), 2);
    assert_eq!(json["patients"][0]["scope"]["kind"], "selected");
    assert_eq!(json["combined"]["table"]["voxel_count"], 3);
    assert_eq!(json["combined"]["table"]["parameters"][0]["count"], 3);
}

#[test]
fn overviews_without_selection_or_combine() {
    let root = tempfile::tempdir().unwrap();
    let mut request = request(root.path(), OutputFormat::Table);
    request.regions = None;
    request.combine = false;
    let outcome = summarize(&mut Workbench::default(), &request).unwrap();
    assert!(outcome.output.contains("Patient: P1 (all regions, 3 voxels)"));
    assert!(outcome.output.contains("Patient: P2 (all regions, 2 voxels)"));
    assert!(!outcome.output.contains("Combined Patient Summary"));
}

#[test]
fn tsv_blocks_are_labelled() {
    let root = tempfile::tempdir().unwrap();
    let outcome = summarize(
        &mut Workbench::default(),
        &request(root.path(), OutputFormat::Tsv),
    )
    .unwrap();
    let headings: Vec<&str> = outcome
        .output
        .lines()
        .filter(|line| line.starts_with('#'))
        .collect();
    assert_eq!(headings, vec!["# P1", "# P2", "# combined"]);
}

#[test]
fn missing_folders_are_reported_and_skipped() {
    let root = tempfile::tempdir().unwrap();
    let mut request = request(root.path(), OutputFormat::Table);
    request.patient_dirs.push(root.path().join("P404"));
    let outcome = summarize(&mut Workbench::default(), &request).unwrap();
    assert!(outcome.has_errors());
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].contains("P404"));
    assert_eq!(outcome.loaded, 2);
}
