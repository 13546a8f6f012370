mod common;

use atrius_cdi_lib::entities::Gender;
use atrius_cdi_lib::evaluator::MeasureStatus;
use atrius_cdi_lib::measures::{
    classify, classify_blood_pressure, classify_egfr, evaluate_ldl_target, BpCategory,
    BMI_BANDS, GLUCOSE_BANDS, HBA1C_BANDS,
};
use atrius_cdi_lib::{evaluate_measures, extract_entities, EvaluationOptions};
use common::options_with;

/// HbA1c boundary exactness through the full evaluation path, not just
/// the band table.
#[test]
fn test_hba1c_699_met_700_not_met() {
    let note_met = "52-year-old male with type 2 diabetes. A1C 6.99%.";
    let entities = extract_entities(note_met, &options_with(52, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, note_met, &EvaluationOptions::default());
    let cdc = report
        .measures
        .iter()
        .find(|m| m.measure_id == "CDC")
        .unwrap();
    assert_eq!(cdc.status, MeasureStatus::Met);
    assert_eq!(cdc.meets_target, Some(true));

    let note_not_met = "52-year-old male with type 2 diabetes. A1C 7.00%.";
    let entities = extract_entities(note_not_met, &options_with(52, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, note_not_met, &EvaluationOptions::default());
    let cdc = report
        .measures
        .iter()
        .find(|m| m.measure_id == "CDC")
        .unwrap();
    assert_eq!(cdc.status, MeasureStatus::NotMet);
    assert!(cdc
        .gap_description
        .as_ref()
        .unwrap()
        .contains("moderate control"));
}

#[test]
fn test_hba1c_band_labels() {
    assert_eq!(classify(HBA1C_BANDS, 5.69).label, "normal");
    assert_eq!(classify(HBA1C_BANDS, 5.7).label, "prediabetes range");
    assert_eq!(classify(HBA1C_BANDS, 6.5).label, "well controlled");
    assert_eq!(classify(HBA1C_BANDS, 8.0).label, "poor control");
    assert_eq!(classify(HBA1C_BANDS, 9.0).label, "very poor control");
}

#[test]
fn test_glucose_boundary_at_126() {
    assert_eq!(classify(GLUCOSE_BANDS, 125.99).label, "prediabetes range");
    assert_eq!(classify(GLUCOSE_BANDS, 126.0).label, "diabetes range");
    assert_eq!(classify(GLUCOSE_BANDS, 100.0).label, "prediabetes range");
    assert_eq!(classify(GLUCOSE_BANDS, 99.99).label, "normal");
}

#[test]
fn test_bp_boundaries() {
    assert_eq!(classify_blood_pressure(119.9, 79.9), BpCategory::Normal);
    assert_eq!(classify_blood_pressure(120.0, 79.9), BpCategory::Elevated);
    assert_eq!(classify_blood_pressure(130.0, 79.9), BpCategory::Stage1);
    assert_eq!(classify_blood_pressure(129.9, 80.0), BpCategory::Stage1);
    assert_eq!(classify_blood_pressure(140.0, 80.0), BpCategory::Stage2);
    assert_eq!(classify_blood_pressure(130.0, 90.0), BpCategory::Stage2);
}

#[test]
fn test_bmi_boundaries() {
    let labels: Vec<&str> = [18.49, 18.5, 24.99, 25.0, 29.99, 30.0, 34.99, 35.0, 39.99, 40.0]
        .iter()
        .map(|v| classify(BMI_BANDS, *v).label)
        .collect();
    assert_eq!(
        labels,
        vec![
            "underweight",
            "normal",
            "normal",
            "overweight",
            "overweight",
            "obesity class I",
            "obesity class I",
            "obesity class II",
            "obesity class II",
            "obesity class III",
        ]
    );
}

#[test]
fn test_egfr_stages() {
    assert_eq!(classify_egfr(120.0), "G1");
    assert_eq!(classify_egfr(60.0), "G2");
    assert_eq!(classify_egfr(59.9), "G3a");
    assert_eq!(classify_egfr(30.0), "G3b");
    assert_eq!(classify_egfr(15.0), "G4");
    assert_eq!(classify_egfr(5.0), "G5");
}

#[test]
fn test_ldl_target_boundary() {
    assert!(evaluate_ldl_target(99.99));
    assert!(!evaluate_ldl_target(100.0));
}
