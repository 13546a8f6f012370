//! Quality measure evaluator
//!
//! Evaluates one entity bundle against the measure catalogue. Every
//! measure passes through `evaluate_measure`, the single dispatcher
//! that enforces the evaluation order:
//!
//! 1. applicability (eligible population) - a patient outside the
//!    population is `NotApplicable` and no exclusion or value check runs
//! 2. exclusion application - a present exclusion category that affects
//!    the measure forces `Excluded`, overriding any value-based result
//! 3. value evaluation - threshold measures classify the parsed value
//!    against their clinical bands; event measures check documentation
//!    evidence
//! 4. gap synthesis - every `NotMet` measure carries a short
//!    `gap_description` consumed by the gap analyzer
//!
//! The exclusion table itself is scanned once per evaluation call,
//! before any measure is considered.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::ClinicalEntities;
use crate::exclusions::{self, ExclusionRecord};
use crate::measures::{
    classify, classify_blood_pressure, Applicability, ConditionContext, EventSource,
    MeasureDefinition, MeasureKind, ThresholdKind, BMI_BANDS, HBA1C_BANDS, LDL_BANDS,
    MEASURE_TABLE,
};
use crate::terminology::{MedicationClass, MEDICATION_VOCABULARY};

/// Final status of one measure for one patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStatus {
    Met,
    NotMet,
    Excluded,
    NotApplicable,
}

/// Result of evaluating one measure. Created fresh per evaluation call
/// and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureEvaluation {
    pub measure_id: String,
    pub measure_name: String,
    pub status: MeasureStatus,
    pub applicable: bool,
    /// Whether the numeric target was met; `None` when no value applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_target: Option<bool>,
    /// Display form of the evaluated value (e.g. "148/92")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Display form of the measure target
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<f64>,
    /// Whether the data needed to evaluate the measure was documented
    pub documented: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_description: Option<String>,
    pub is_compliant: bool,
    pub confidence: f64,
}

/// Caller options for one evaluation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationOptions {
    /// Restrict evaluation to these measure codes (case-insensitive);
    /// unknown codes are ignored
    pub measure_filter: Option<Vec<String>>,
    /// Encounter type supplied by the adapter layer; carried for report
    /// context only
    pub encounter_type: Option<String>,
}

/// The measure evaluation bundle for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureReport {
    pub measures: Vec<MeasureEvaluation>,
    pub exclusions: Vec<ExclusionRecord>,
    /// met / (met + not_met) over applicable, non-excluded measures;
    /// 0.0 when no measure lands in the denominator
    pub overall_compliance_rate: f64,
}

impl MeasureReport {
    /// Measures that ended `NotMet`, in catalogue order.
    pub fn open_gaps(&self) -> impl Iterator<Item = &MeasureEvaluation> {
        self.measures
            .iter()
            .filter(|m| m.status == MeasureStatus::NotMet)
    }
}

fn medication_class(name: &str) -> Option<MedicationClass> {
    MEDICATION_VOCABULARY
        .iter()
        .find(|entry| entry.canonical == name)
        .map(|entry| entry.class)
}

fn has_medication_class(entities: &ClinicalEntities, classes: &[MedicationClass]) -> bool {
    entities
        .medications
        .iter()
        .filter_map(|m| medication_class(&m.name))
        .any(|class| classes.contains(&class))
}

/// Diagnosis-name needles that evidence each condition context.
fn context_needles(context: ConditionContext) -> &'static [&'static str] {
    match context {
        ConditionContext::Diabetes => &["diabet"],
        ConditionContext::Hypertension => &["hypertension"],
        ConditionContext::CardiovascularDisease => &["coronary", "cerebrovascular"],
        ConditionContext::MentalIllness => &["depressive", "bipolar", "schizophrenia"],
        ConditionContext::SubstanceUse => &["substance use"],
        ConditionContext::Copd => &["obstructive pulmonary"],
        ConditionContext::Pregnancy => &["pregnancy"],
        ConditionContext::Depression => &["depressive"],
        ConditionContext::LipidRisk => &["hyperlipidemia", "coronary", "cerebrovascular"],
        ConditionContext::AdhdMedication => &[],
    }
}

/// A documented reading at or above the stage-1 threshold places the
/// patient in the blood-pressure-control population even when no
/// hypertension diagnosis was written down.
fn elevated_bp_documented(entities: &ClinicalEntities) -> bool {
    match (entities.vitals.systolic, entities.vitals.diastolic) {
        (Some(systolic), Some(diastolic)) => {
            !classify_blood_pressure(systolic, diastolic).meets_target()
        }
        _ => false,
    }
}

fn context_present(context: ConditionContext, entities: &ClinicalEntities) -> bool {
    if context == ConditionContext::AdhdMedication {
        return has_medication_class(entities, &[MedicationClass::AdhdStimulant]);
    }
    if context == ConditionContext::Hypertension && elevated_bp_documented(entities) {
        return true;
    }
    context_needles(context)
        .iter()
        .any(|needle| entities.has_current_diagnosis(needle))
}

/// Confidence carried onto the measure result: the best extraction
/// confidence among the diagnoses that established the context, or 1.0
/// for purely demographic populations.
fn context_confidence(context: Option<ConditionContext>, entities: &ClinicalEntities) -> f64 {
    let Some(context) = context else {
        return 1.0;
    };
    if context == ConditionContext::AdhdMedication {
        return crate::terminology::EXACT_MATCH_CONFIDENCE;
    }
    let from_diagnoses = context_needles(context)
        .iter()
        .filter_map(|needle| entities.current_diagnosis(needle))
        .map(|d| d.confidence)
        .fold(0.0_f64, f64::max);
    if context == ConditionContext::Hypertension && elevated_bp_documented(entities) {
        return from_diagnoses.max(crate::terminology::EXACT_MATCH_CONFIDENCE);
    }
    from_diagnoses
}

fn is_applicable(applicability: &Applicability, entities: &ClinicalEntities) -> bool {
    if let Some(min_age) = applicability.min_age {
        match entities.demographics.age {
            Some(age) if age >= min_age => {}
            _ => return false,
        }
    }
    if let Some(max_age) = applicability.max_age {
        match entities.demographics.age {
            Some(age) if age <= max_age => {}
            _ => return false,
        }
    }
    if let Some(gender) = applicability.gender {
        if entities.demographics.gender != Some(gender) {
            return false;
        }
    }
    if let Some(context) = applicability.context {
        if !context_present(context, entities) {
            return false;
        }
    }
    true
}

struct ThresholdOutcome {
    value: String,
    raw_value: f64,
    band_label: &'static str,
    meets_target: bool,
}

fn evaluate_threshold(kind: ThresholdKind, entities: &ClinicalEntities) -> Option<ThresholdOutcome> {
    match kind {
        ThresholdKind::BloodPressure => {
            let systolic = entities.vitals.systolic?;
            let diastolic = entities.vitals.diastolic?;
            let category = classify_blood_pressure(systolic, diastolic);
            Some(ThresholdOutcome {
                value: format!("{}/{}", systolic, diastolic),
                raw_value: systolic,
                band_label: category.label(),
                meets_target: category.meets_target(),
            })
        }
        ThresholdKind::Hba1c => {
            let hba1c = entities.labs.hba1c?;
            let band = classify(HBA1C_BANDS, hba1c);
            Some(ThresholdOutcome {
                value: format!("{}%", hba1c),
                raw_value: hba1c,
                band_label: band.label,
                meets_target: band.meets_target,
            })
        }
        ThresholdKind::Bmi => {
            let bmi = entities.vitals.bmi?;
            let band = classify(BMI_BANDS, bmi);
            Some(ThresholdOutcome {
                value: format!("{}", bmi),
                raw_value: bmi,
                band_label: band.label,
                meets_target: band.meets_target,
            })
        }
        ThresholdKind::Ldl => {
            let ldl = entities.labs.ldl?;
            let band = classify(LDL_BANDS, ldl);
            Some(ThresholdOutcome {
                value: format!("{} mg/dL", ldl),
                raw_value: ldl,
                band_label: band.label,
                meets_target: band.meets_target,
            })
        }
    }
}

fn threshold_subject(kind: ThresholdKind) -> &'static str {
    match kind {
        ThresholdKind::BloodPressure => "blood pressure",
        ThresholdKind::Hba1c => "HbA1c",
        ThresholdKind::Bmi => "BMI",
        ThresholdKind::Ldl => "LDL-C",
    }
}

fn evaluate_event(source: &EventSource, entities: &ClinicalEntities) -> bool {
    match source {
        EventSource::AnyScreening(screenings) => screenings
            .iter()
            .any(|s| entities.screenings.get(*s).documented),
        EventSource::AnyMedicationClass(classes) => has_medication_class(entities, classes),
        EventSource::AnyProcedure(needles) => {
            needles.iter().any(|needle| entities.has_procedure(needle))
        }
        EventSource::AllLabs(fields) => fields.iter().all(|f| entities.labs.get(*f).is_some()),
    }
}

/// Evaluates one measure. This is the only place the ordering invariant
/// (applicability, then exclusion, then value) lives.
fn evaluate_measure(
    definition: &MeasureDefinition,
    entities: &ClinicalEntities,
    exclusion_records: &[ExclusionRecord],
) -> MeasureEvaluation {
    let confidence = context_confidence(definition.applicability.context, entities);
    let base = MeasureEvaluation {
        measure_id: definition.id.to_string(),
        measure_name: definition.name.to_string(),
        status: MeasureStatus::NotApplicable,
        applicable: false,
        meets_target: None,
        value: None,
        target: definition.target.to_string(),
        raw_value: None,
        documented: false,
        gap_description: None,
        is_compliant: false,
        confidence,
    };

    if !is_applicable(&definition.applicability, entities) {
        return base;
    }
    if exclusions::is_excluded(exclusion_records, definition.id) {
        return MeasureEvaluation {
            status: MeasureStatus::Excluded,
            applicable: true,
            ..base
        };
    }

    match &definition.kind {
        MeasureKind::Threshold(kind) => match evaluate_threshold(*kind, entities) {
            Some(outcome) => {
                let status = if outcome.meets_target {
                    MeasureStatus::Met
                } else {
                    MeasureStatus::NotMet
                };
                let gap_description = (!outcome.meets_target).then(|| {
                    format!(
                        "{} {} is {}; target {}",
                        threshold_subject(*kind),
                        outcome.value,
                        outcome.band_label,
                        definition.target
                    )
                });
                MeasureEvaluation {
                    status,
                    applicable: true,
                    meets_target: Some(outcome.meets_target),
                    value: Some(outcome.value),
                    raw_value: Some(outcome.raw_value),
                    documented: true,
                    gap_description,
                    is_compliant: outcome.meets_target,
                    ..base
                }
            }
            None => MeasureEvaluation {
                status: MeasureStatus::NotMet,
                applicable: true,
                documented: false,
                gap_description: Some(format!(
                    "no documented {} to evaluate against target {}",
                    threshold_subject(*kind),
                    definition.target
                )),
                ..base
            },
        },
        MeasureKind::Event(source) => {
            if evaluate_event(source, entities) {
                MeasureEvaluation {
                    status: MeasureStatus::Met,
                    applicable: true,
                    value: Some("documented".to_string()),
                    documented: true,
                    is_compliant: true,
                    ..base
                }
            } else {
                MeasureEvaluation {
                    status: MeasureStatus::NotMet,
                    applicable: true,
                    value: Some("not documented".to_string()),
                    documented: false,
                    gap_description: Some(format!("{} not documented", definition.target)),
                    ..base
                }
            }
        }
    }
}

/// Evaluates the entity bundle against the measure catalogue.
///
/// `note_text` is scanned (together with diagnosis names) for exclusion
/// keywords; entities are otherwise the only evidence source. The result
/// is deterministic for identical inputs.
pub fn evaluate_measures(
    entities: &ClinicalEntities,
    note_text: &str,
    options: &EvaluationOptions,
) -> MeasureReport {
    let exclusion_records = exclusions::scan_exclusions(entities, note_text);

    let selected: Vec<&MeasureDefinition> = match &options.measure_filter {
        Some(filter) => MEASURE_TABLE
            .iter()
            .filter(|m| filter.iter().any(|id| id.eq_ignore_ascii_case(m.id)))
            .collect(),
        None => MEASURE_TABLE.iter().collect(),
    };

    let measures: Vec<MeasureEvaluation> = selected
        .iter()
        .map(|definition| evaluate_measure(definition, entities, &exclusion_records))
        .collect();

    let met = measures
        .iter()
        .filter(|m| m.status == MeasureStatus::Met)
        .count();
    let not_met = measures
        .iter()
        .filter(|m| m.status == MeasureStatus::NotMet)
        .count();
    let overall_compliance_rate = if met + not_met == 0 {
        0.0
    } else {
        met as f64 / (met + not_met) as f64
    };

    debug!(
        evaluated = measures.len(),
        met, not_met, overall_compliance_rate, "evaluated quality measures"
    );

    MeasureReport {
        measures,
        exclusions: exclusion_records,
        overall_compliance_rate,
    }
}
