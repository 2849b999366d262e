//! Tests for dpv-model types.

use dpv_model::{
    CohortSummary, CombinedSelection, Descriptive, LoaderOptions, ModelError, ParameterSummary,
    PatientId, PatientSummary, RegionBase, RegionSet, SummaryScope, SummaryTable,
};

#[test]
fn patient_id_is_trimmed() {
    let id = PatientId::new("  P001 ").expect("valid id");
    assert_eq!(id.as_str(), "P001");
    assert_eq!(id.to_string(), "P001");
}

#[test]
fn patient_id_rejects_blank_values() {
    assert_eq!(
        PatientId::new("   "),
        Err(ModelError::InvalidPatientId("   ".to_string()))
    );
    assert!(PatientId::new("a\nb").is_err());
}

#[test]
fn selection_map_is_queryable_by_str() {
    let mut selection = CombinedSelection::new();
    selection.insert(PatientId::new("P1").unwrap(), RegionSet::from([1, 2]));
    assert_eq!(selection.get("P1"), Some(&RegionSet::from([1, 2])));
}

#[test]
fn loader_options_builder() {
    let options = LoaderOptions::new()
        .with_data_file("data.csv")
        .with_region_column("roi")
        .with_region_base(RegionBase::One)
        .with_region_count(4);
    assert_eq!(options.data_file.to_str(), Some("data.csv"));
    assert_eq!(options.region_column, "roi");
    assert_eq!(options.region_base, RegionBase::One);
    assert_eq!(options.region_count, 4);
}

#[test]
fn patient_summary_serializes() {
    let summary = PatientSummary {
        patient_id: PatientId::new("P1").unwrap(),
        scope: SummaryScope::Selected(RegionSet::from([0, 3])),
        table: SummaryTable {
            voxel_count: 2,
            parameters: vec![ParameterSummary {
                parameter: "ADC".to_string(),
                count: 2,
                stats: Some(Descriptive {
                    mean: 1.5,
                    std_dev: Some(0.7),
                    min: 1.0,
                    p25: 1.25,
                    median: 1.5,
                    p75: 1.75,
                    max: 2.0,
                }),
            }],
        },
    };
    let json = serde_json::to_value(&summary).expect("serialize summary");
    assert_eq!(json["patient_id"], "P1");
    assert_eq!(json["scope"]["kind"], "selected");
    assert_eq!(json["scope"]["regions"], serde_json::json!([0, 3]));
    let round: PatientSummary = serde_json::from_value(json).expect("deserialize summary");
    assert_eq!(round, summary);
}

#[test]
fn empty_cohort_summary() {
    let summary = CohortSummary::default();
    assert_eq!(summary.patient_count(), 0);
    assert!(summary.table.is_empty());
    assert!(summary.table.parameter("ADC").is_none());
}
