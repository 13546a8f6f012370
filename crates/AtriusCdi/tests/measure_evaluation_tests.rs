mod common;

use atrius_cdi_lib::entities::Gender;
use atrius_cdi_lib::evaluator::MeasureStatus;
use atrius_cdi_lib::exclusions::ExclusionCategory;
use atrius_cdi_lib::{evaluate_measures, extract_entities, EvaluationOptions};
use common::{options_with, DIABETES_NOTE, HOSPICE_NOTE};

fn status(report: &atrius_cdi_lib::MeasureReport, id: &str) -> MeasureStatus {
    report
        .measures
        .iter()
        .find(|m| m.measure_id == id)
        .unwrap_or_else(|| panic!("measure {} missing from report", id))
        .status
}

#[test]
fn test_reference_scenario_measures() {
    let entities = extract_entities(DIABETES_NOTE, &options_with(65, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, DIABETES_NOTE, &EvaluationOptions::default());

    // 148/92 is stage 2; blood pressure control is not met
    let cbp = report
        .measures
        .iter()
        .find(|m| m.measure_id == "CBP")
        .unwrap();
    assert_eq!(cbp.status, MeasureStatus::NotMet);
    assert!(
        cbp.gap_description.as_ref().unwrap().contains("stage 2"),
        "expected a stage 2 gap description, got {:?}",
        cbp.gap_description
    );

    // 8.5 is moderate control; above the 7.0 target
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
    assert_eq!(cdc.raw_value, Some(8.5));
}

#[test]
fn test_hospice_scenario_exclusions() {
    let entities = extract_entities(HOSPICE_NOTE, &options_with(60, Gender::Female)).unwrap();
    let report = evaluate_measures(&entities, HOSPICE_NOTE, &EvaluationOptions::default());

    let present: Vec<ExclusionCategory> = report
        .exclusions
        .iter()
        .filter(|r| r.present)
        .map(|r| r.exclusion_type)
        .collect();
    assert!(present.contains(&ExclusionCategory::Hospice));
    assert!(present.contains(&ExclusionCategory::AdvancedIllness));

    assert_eq!(status(&report, "BCS"), MeasureStatus::Excluded);
}

#[test]
fn test_exclusion_precedence_over_numerator() {
    // mammogram documented AND hospice: exclusion must win
    let note = "60-year-old female. Screening mammogram 3/2/2023, normal. Enrolled in hospice.";
    let entities = extract_entities(note, &options_with(60, Gender::Female)).unwrap();
    assert!(entities.screenings.mammogram.documented);
    let report = evaluate_measures(&entities, note, &EvaluationOptions::default());
    assert_eq!(status(&report, "BCS"), MeasureStatus::Excluded);
}

#[test]
fn test_compliance_rate_excludes_non_denominator_statuses() {
    let entities = extract_entities(HOSPICE_NOTE, &options_with(60, Gender::Female)).unwrap();
    let report = evaluate_measures(&entities, HOSPICE_NOTE, &EvaluationOptions::default());
    let met = report
        .measures
        .iter()
        .filter(|m| m.status == MeasureStatus::Met)
        .count();
    let not_met = report
        .measures
        .iter()
        .filter(|m| m.status == MeasureStatus::NotMet)
        .count();
    if met + not_met == 0 {
        assert_eq!(report.overall_compliance_rate, 0.0);
    } else {
        let expected = met as f64 / (met + not_met) as f64;
        assert!((report.overall_compliance_rate - expected).abs() < 1e-12);
    }
    assert!((0.0..=1.0).contains(&report.overall_compliance_rate));
}

#[test]
fn test_age_gates_applicability() {
    let note = "Type 2 diabetes. A1C 8.1%.";
    let entities = extract_entities(note, &options_with(80, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, note, &EvaluationOptions::default());
    // CDC population is 18-75
    assert_eq!(status(&report, "CDC"), MeasureStatus::NotApplicable);
    // KED population extends to 85
    assert_eq!(status(&report, "KED"), MeasureStatus::NotMet);
}

#[test]
fn test_gender_gates_applicability() {
    let note = "55-year-old male, routine visit.";
    let entities = extract_entities(note, &options_with(55, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, note, &EvaluationOptions::default());
    assert_eq!(status(&report, "BCS"), MeasureStatus::NotApplicable);
    assert_eq!(status(&report, "CCS"), MeasureStatus::NotApplicable);
    // colorectal screening applies regardless of gender at 55
    assert_eq!(status(&report, "COL"), MeasureStatus::NotMet);
}

#[test]
fn test_statin_measures_met_by_medication_class() {
    let note = "67-year-old male with coronary artery disease and type 2 diabetes, \
        on atorvastatin 40 mg nightly.";
    let entities = extract_entities(note, &options_with(67, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, note, &EvaluationOptions::default());
    assert_eq!(status(&report, "SPC"), MeasureStatus::Met);
    assert_eq!(status(&report, "SPD"), MeasureStatus::Met);
}

#[test]
fn test_followup_measures_for_mental_illness() {
    let note = "14-year-old male with major depressive disorder, discharged last week. \
        Psychotherapy session completed today. PHQ-9 score 14 documented.";
    let entities = extract_entities(note, &options_with(14, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, note, &EvaluationOptions::default());
    assert_eq!(status(&report, "FUH"), MeasureStatus::Met);
    assert_eq!(status(&report, "FUM"), MeasureStatus::Met);
    assert_eq!(status(&report, "DSF"), MeasureStatus::Met);
    // substance-use follow-up needs a substance-use diagnosis
    assert_eq!(status(&report, "FUA"), MeasureStatus::NotApplicable);
}

#[test]
fn test_well_child_and_immunization_measures() {
    let note = "4-year-old female here for well-child visit. Immunizations administered.";
    let entities = extract_entities(note, &options_with(4, Gender::Female)).unwrap();
    let report = evaluate_measures(&entities, note, &EvaluationOptions::default());
    assert_eq!(status(&report, "W34"), MeasureStatus::Met);
    // outside the first-15-months population
    assert_eq!(status(&report, "W15"), MeasureStatus::NotApplicable);
    assert_eq!(status(&report, "CIS"), MeasureStatus::NotApplicable);
}

#[test]
fn test_esrd_excludes_kidney_and_bp_measures_only() {
    let note = "68-year-old male with type 2 diabetes and hypertension, on dialysis. \
        A1C 8.2%. BP 150/94. Colonoscopy 2021.";
    let entities = extract_entities(note, &options_with(68, Gender::Male)).unwrap();
    let report = evaluate_measures(&entities, note, &EvaluationOptions::default());
    assert_eq!(status(&report, "CBP"), MeasureStatus::Excluded);
    assert_eq!(status(&report, "CDC"), MeasureStatus::Excluded);
    assert_eq!(status(&report, "KED"), MeasureStatus::Excluded);
    // colorectal screening is untouched by the ESRD exclusion
    assert_eq!(status(&report, "COL"), MeasureStatus::Met);
}
