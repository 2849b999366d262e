use std::collections::BTreeMap;

use dpv_model::{
    CohortSummary, Descriptive, ParameterSummary, PatientId, PatientSummary, RegionSet,
    SummaryScope, SummaryTable,
};
use dpv_report::{
    EXPORT_HEADER, render_cohort_summary, render_patient_summary, to_delimited, to_json, to_tsv,
};

fn sample_table() -> SummaryTable {
    SummaryTable {
        voxel_count: 4,
        parameters: vec![
            ParameterSummary {
                parameter: "ADC".to_string(),
                count: 4,
                stats: Some(Descriptive {
                    mean: 2.5,
                    std_dev: Some(1.2909944487358056),
                    min: 1.0,
                    p25: 1.75,
                    median: 2.5,
                    p75: 3.25,
                    max: 4.0,
                }),
            },
            ParameterSummary {
                parameter: "FA".to_string(),
                count: 1,
                stats: Some(Descriptive {
                    mean: 0.3,
                    std_dev: None,
                    min: 0.3,
                    p25: 0.3,
                    median: 0.3,
                    p75: 0.3,
                    max: 0.3,
                }),
            },
            ParameterSummary {
                parameter: "MD".to_string(),
                count: 0,
                stats: None,
            },
        ],
    }
}

#[test]
fn comma_export_layout() {
    let text = to_delimited(&sample_table(), b',').expect("export");
    insta::assert_snapshot!(text, @r"
    parameter,n,mean,sd,min,p25,median,p75,max
    ADC,4,2.5,1.291,1,1.75,2.5,3.25,4
    FA,1,0.3,,0.3,0.3,0.3,0.3,0.3
    MD,0,,,,,,,
    ");
}

#[test]
fn tsv_export_uses_tabs() {
    let text = to_tsv(&sample_table()).expect("export");
    let header = text.lines().next().expect("header line");
    assert_eq!(header, EXPORT_HEADER.join("\t"));
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn patient_render_names_scope() {
    let summary = PatientSummary {
        patient_id: PatientId::new("P1").expect("id"),
        scope: SummaryScope::Selected(RegionSet::from([0, 11])),
        table: sample_table(),
    };
    let text = render_patient_summary(&summary);
    assert!(text.starts_with("Patient: P1 (regions 1,12, 4 voxels)"));
    assert!(text.contains("ADC"));
    assert!(text.contains("Median"));

    let overview = PatientSummary {
        scope: SummaryScope::AllRegions,
        ..summary
    };
    assert!(render_patient_summary(&overview).contains("all regions"));
}

#[test]
fn cohort_render_lists_members() {
    let mut selection = BTreeMap::new();
    selection.insert(PatientId::new("P1").expect("id"), RegionSet::from([0]));
    selection.insert(PatientId::new("P2").expect("id"), RegionSet::new());
    let summary = CohortSummary {
        selection,
        table: sample_table(),
    };
    let text = render_cohort_summary(&summary);
    assert!(text.starts_with("Combined Patient Summary"));
    assert!(text.contains("P1 [1], P2 [-]"));

    let empty = render_cohort_summary(&CohortSummary::default());
    assert!(empty.contains("No patients combined"));
}

#[test]
fn json_export_round_trips() {
    let summary = CohortSummary {
        selection: BTreeMap::from([(PatientId::new("P3").expect("id"), RegionSet::from([2]))]),
        table: sample_table(),
    };
    let json = to_json(&summary).expect("json");
    let back: CohortSummary = serde_json::from_str(&json).expect("parse");
    assert_eq!(back, summary);
}
