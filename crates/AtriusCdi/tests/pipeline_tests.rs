mod common;

use atrius_cdi_lib::{process_note, CdiError, PipelineOptions};
use common::{DIABETES_NOTE, HOSPICE_NOTE};

#[test]
fn test_empty_note_fails_fast() {
    let err = process_note("", &PipelineOptions::default()).unwrap_err();
    assert_eq!(err, CdiError::EmptyNote);
    let err = process_note(" \n\t ", &PipelineOptions::default()).unwrap_err();
    assert_eq!(err, CdiError::EmptyNote);
}

#[test]
fn test_full_pipeline_determinism() {
    for note in [DIABETES_NOTE, HOSPICE_NOTE] {
        let first = process_note(note, &PipelineOptions::default()).unwrap();
        let second = process_note(note, &PipelineOptions::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap(),
            "pipeline output must serialize byte-identically"
        );
    }
}

#[test]
fn test_reference_scenario_gap_carries_hedis_impact() {
    let report = process_note(DIABETES_NOTE, &PipelineOptions::default()).unwrap();
    assert!(
        report
            .gaps
            .gaps
            .iter()
            .any(|g| g.hedis_impact.as_deref() == Some("CBP")),
        "expected a gap tagged with the CBP measure, got {:?}",
        report
            .gaps
            .gaps
            .iter()
            .map(|g| g.hedis_impact.clone())
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_confidence_bounds_across_all_stages() {
    for note in [DIABETES_NOTE, HOSPICE_NOTE] {
        let report = process_note(note, &PipelineOptions::default()).unwrap();
        assert!((0.0..=1.0).contains(&report.entities.extraction_confidence));
        for measure in &report.measures.measures {
            assert!((0.0..=1.0).contains(&measure.confidence), "{:?}", measure);
        }
        assert!((0.0..=1.0).contains(&report.measures.overall_compliance_rate));
        for gap in &report.gaps.gaps {
            assert!((0.0..=1.0).contains(&gap.confidence), "{:?}", gap);
        }
        for query in &report.queries.queries {
            assert!((0.0..=1.0).contains(&query.confidence), "{:?}", query);
        }
    }
}

#[test]
fn test_boundary_json_shape() {
    let report = process_note(DIABETES_NOTE, &PipelineOptions::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    // entity bundle mirrors the documented tree
    assert!(json["entities"]["diagnoses"].is_array());
    assert_eq!(json["entities"]["labs"]["hba1c"], 8.5);
    assert_eq!(json["entities"]["vitals"]["systolic"], 148.0);

    // measure statuses use snake_case wire names
    let statuses: Vec<&str> = json["measures"]["measures"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["status"].as_str().unwrap())
        .collect();
    assert!(statuses
        .iter()
        .all(|s| ["met", "not_met", "excluded", "not_applicable"].contains(s)));

    // summaries expose the documented counters
    assert!(json["gaps"]["summary"]["by_priority"].is_object());
    assert!(json["queries"]["summary"]["total_queries"].is_number());
}

#[test]
fn test_partial_note_degrades_gracefully() {
    // nothing clinical at all: empty bundles, no errors
    let report = process_note("Patient seen for paperwork.", &PipelineOptions::default()).unwrap();
    assert!(report.entities.diagnoses.is_empty());
    assert_eq!(report.measures.overall_compliance_rate, 0.0);
    assert!(report
        .measures
        .measures
        .iter()
        .all(|m| m.status == atrius_cdi_lib::MeasureStatus::NotApplicable));
    assert!(report.gaps.gaps.is_empty());
    assert!(report.queries.queries.is_empty());
}
