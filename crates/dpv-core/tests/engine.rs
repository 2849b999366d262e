//! Behavioral tests for the cohort engine.

use std::cell::RefCell;

use dpv_core::{CohortEngine, EngineError};
use dpv_model::{CombinedSelection, PatientId, RegionSet};
use proptest::prelude::*;

fn id(raw: &str) -> PatientId {
    PatientId::new(raw).expect("valid id")
}

fn regions(values: &[u32]) -> RegionSet {
    values.iter().copied().collect()
}

#[test]
fn removal_cascades_to_selection_and_cohort() {
    let mut engine: CohortEngine<&str, ()> = CohortEngine::new();
    engine.add(id("P1"), "h").unwrap();
    engine.set_regions("P1", regions(&[2, 5])).unwrap();
    engine.set_combined("P1", true).unwrap();

    engine.remove("P1").unwrap();

    assert!(!engine.combined_snapshot().contains_key("P1"));
    assert_eq!(
        engine.set_regions("P1", regions(&[1])),
        Err(EngineError::UnknownIdentifier("P1".to_string()))
    );
    assert!(engine.is_consistent());
}

#[test]
fn snapshot_follows_cohort_membership() {
    let mut engine: CohortEngine<&str, ()> = CohortEngine::new();
    engine.add(id("P1"), "h1").unwrap();
    engine.add(id("P2"), "h2").unwrap();
    engine.set_regions("P1", regions(&[1, 2])).unwrap();
    engine.set_combined("P1", true).unwrap();
    engine.set_regions("P2", regions(&[3])).unwrap();
    engine.set_combined("P2", false).unwrap();

    let mut expected = CombinedSelection::new();
    expected.insert(id("P1"), regions(&[1, 2]));
    assert_eq!(engine.combined_snapshot(), expected);

    engine.set_combined("P2", true).unwrap();
    expected.insert(id("P2"), regions(&[3]));
    assert_eq!(engine.combined_snapshot(), expected);
}

#[test]
fn duplicate_add_keeps_original_handle() {
    let mut engine: CohortEngine<&str, ()> = CohortEngine::new();
    engine.add(id("P1"), "h1").unwrap();
    assert_eq!(
        engine.add(id("P1"), "h2"),
        Err(EngineError::DuplicateIdentifier(id("P1")))
    );
    assert_eq!(engine.store().handle("P1"), Some(&"h1"));
}

#[test]
fn repeated_remove_leaves_state_unchanged() {
    let mut engine: CohortEngine<&str, ()> = CohortEngine::new();
    engine.add(id("P1"), "h1").unwrap();
    engine.add(id("P2"), "h2").unwrap();
    engine.set_combined("P2", true).unwrap();
    engine.remove("P1").unwrap();

    let before = (engine.combined_snapshot(), engine.selection().clone());
    assert!(matches!(
        engine.remove("P1"),
        Err(EngineError::UnknownIdentifier(_))
    ));
    assert_eq!((engine.combined_snapshot(), engine.selection().clone()), before);
    assert_eq!(engine.store().len(), 1);
}

#[test]
fn set_combined_twice_equals_once() {
    let mut engine: CohortEngine<&str, ()> = CohortEngine::new();
    engine.add(id("P1"), "h1").unwrap();
    engine.set_combined("P1", true).unwrap();
    let once = engine.combined_snapshot();
    engine.set_combined("P1", true).unwrap();
    assert_eq!(engine.combined_snapshot(), once);
}

#[test]
fn empty_cohort_is_passed_to_summarizer() {
    let mut engine: CohortEngine<&str, ()> = CohortEngine::new();
    engine.add(id("P1"), "h1").unwrap();

    let calls = RefCell::new(Vec::new());
    let summarizer = |selection: &CombinedSelection| {
        calls.borrow_mut().push(selection.clone());
        "nothing combined"
    };
    let summary = engine.recompute_combined(&summarizer);

    assert_eq!(summary, "nothing combined");
    assert_eq!(calls.into_inner(), vec![CombinedSelection::new()]);
}

#[test]
fn recompute_returns_summarizer_output_unmodified() {
    let mut engine: CohortEngine<&str, ()> = CohortEngine::new();
    engine.add(id("P1"), "h1").unwrap();
    engine.set_regions("P1", regions(&[4])).unwrap();
    engine.set_combined("P1", true).unwrap();

    let summary = engine.recompute_combined(&|selection: &CombinedSelection| {
        selection
            .iter()
            .map(|(id, regions)| format!("{id}:{}", regions.len()))
            .collect::<Vec<_>>()
    });
    assert_eq!(summary, vec!["P1:1".to_string()]);
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
    SetRegions(u8, Vec<u32>),
    SetCombined(u8, bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..5).prop_map(Op::Add),
        (0u8..5).prop_map(Op::Remove),
        (0u8..5, proptest::collection::vec(0u32..14, 0..4))
            .prop_map(|(p, r)| Op::SetRegions(p, r)),
        (0u8..5, any::<bool>()).prop_map(|(p, m)| Op::SetCombined(p, m)),
    ]
}

proptest! {
    #[test]
    fn tracked_identifiers_are_always_loaded(ops in proptest::collection::vec(op_strategy(), 0..40)) {
        let mut engine: CohortEngine<u8, ()> = CohortEngine::new();
        for op in ops {
            let before = engine.clone();
            let result = match &op {
                Op::Add(p) => engine.add(id(&format!("P{p}")), *p),
                Op::Remove(p) => engine.remove(&format!("P{p}")).map(|_| ()),
                Op::SetRegions(p, r) => engine.set_regions(&format!("P{p}"), regions(r)),
                Op::SetCombined(p, m) => engine.set_combined(&format!("P{p}"), *m),
            };
            if result.is_err() {
                prop_assert_eq!(engine.selection(), before.selection());
                prop_assert_eq!(engine.store().len(), before.store().len());
            }
            prop_assert!(engine.is_consistent());
            for key in engine.combined_snapshot().keys() {
                prop_assert!(engine.contains(key.as_str()));
            }
        }
    }
}
