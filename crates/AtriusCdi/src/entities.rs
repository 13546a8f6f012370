//! Clinical entity data model
//!
//! [`ClinicalEntities`] is the central value object of the pipeline: one
//! bundle per note, assembled by the extractor and consumed read-only by
//! the measure evaluator and the gap analyzer. Every optional field is
//! either absent or holds a value that has already passed unit and bound
//! validation; partially-parsed or implausible values are never stored.
//!
//! All types serialize to the JSON tree consumed by the adapter layer
//! (HTTP API, chat bots, agent tools), which is why everything here
//! derives `Serialize`/`Deserialize`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Patient gender as documented in the note or supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Documentation status of a diagnosis mention.
///
/// Only `Active` and `ChronicStable` diagnoses establish measure
/// applicability; "history of" and "rule out" phrasing is preserved in the
/// bundle but does not count as an active condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStatus {
    Active,
    ChronicStable,
    HistoryOf,
    RuleOut,
    Resolved,
}

impl DiagnosisStatus {
    /// Whether this status represents a currently-present condition.
    pub fn is_current(&self) -> bool {
        matches!(self, DiagnosisStatus::Active | DiagnosisStatus::ChronicStable)
    }
}

/// A diagnosis extracted from note text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Canonical condition name from the terminology table
    pub name: String,
    /// ICD-10 code inferred from the terminology table, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred_code: Option<String>,
    pub status: DiagnosisStatus,
    /// Severity or stage qualifier found near the mention (e.g. "severe",
    /// "stage 3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Match-specificity confidence in [0, 1]
    pub confidence: f64,
}

/// A medication mention with whatever sig details were documented nearby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

/// Unit tag for a documented body weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lb,
}

/// Unit tag for a documented body temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

/// Vital signs parsed from the note. All fields optional; absent means
/// not documented (or documented implausibly).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Unit the temperature was recorded in; present iff `temperature` is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<TemperatureUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Unit the weight was recorded in; present iff `weight` is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<WeightUnit>,
    /// Height in centimeters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
}

/// Laboratory results parsed from the note, unit-normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabResults {
    /// Percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hba1c: Option<f64>,
    /// mg/dL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldl: Option<f64>,
    /// mg/dL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
    /// mg/dL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creatinine: Option<f64>,
    /// mL/min/1.73m2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egfr: Option<f64>,
    /// mEq/L
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    /// mEq/L
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    /// g/dL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hemoglobin: Option<f64>,
    /// 10^3/uL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wbc: Option<f64>,
    /// 10^3/uL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platelets: Option<f64>,
}

/// Typed handle for one lab slot, used by the static rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabField {
    Hba1c,
    Ldl,
    Glucose,
    Creatinine,
    Egfr,
    Potassium,
    Sodium,
    Hemoglobin,
    Wbc,
    Platelets,
}

impl LabResults {
    /// Field access by handle, so rule tables stay data instead of code.
    pub fn get(&self, field: LabField) -> Option<f64> {
        match field {
            LabField::Hba1c => self.hba1c,
            LabField::Ldl => self.ldl,
            LabField::Glucose => self.glucose,
            LabField::Creatinine => self.creatinine,
            LabField::Egfr => self.egfr,
            LabField::Potassium => self.potassium,
            LabField::Sodium => self.sodium,
            LabField::Hemoglobin => self.hemoglobin,
            LabField::Wbc => self.wbc,
            LabField::Platelets => self.platelets,
        }
    }
}

/// Typed handle for one vital-sign slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalField {
    Systolic,
    Diastolic,
    HeartRate,
    Temperature,
    RespiratoryRate,
    Spo2,
    Weight,
    Height,
    Bmi,
}

impl VitalSigns {
    pub fn get(&self, field: VitalField) -> Option<f64> {
        match field {
            VitalField::Systolic => self.systolic,
            VitalField::Diastolic => self.diastolic,
            VitalField::HeartRate => self.heart_rate,
            VitalField::Temperature => self.temperature,
            VitalField::RespiratoryRate => self.respiratory_rate,
            VitalField::Spo2 => self.spo2,
            VitalField::Weight => self.weight,
            VitalField::Height => self.height,
            VitalField::Bmi => self.bmi,
        }
    }
}

/// One documented screening event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningEvent {
    pub documented: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ScreeningEvent {
    pub fn documented_on(date: Option<NaiveDate>) -> Self {
        ScreeningEvent {
            documented: true,
            date,
        }
    }
}

/// Screening documentation found in the note, one slot per screening type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screenings {
    pub mammogram: ScreeningEvent,
    pub colonoscopy: ScreeningEvent,
    pub cervical_cancer: ScreeningEvent,
    pub diabetic_eye: ScreeningEvent,
    pub diabetic_foot: ScreeningEvent,
    pub depression_screening: ScreeningEvent,
    pub fit_test: ScreeningEvent,
    pub lung_cancer: ScreeningEvent,
}

impl Screenings {
    /// Slot access by handle, so rule tables stay data instead of code.
    pub fn get(&self, screening: crate::terminology::ScreeningType) -> &ScreeningEvent {
        use crate::terminology::ScreeningType;
        match screening {
            ScreeningType::Mammogram => &self.mammogram,
            ScreeningType::Colonoscopy => &self.colonoscopy,
            ScreeningType::CervicalCancer => &self.cervical_cancer,
            ScreeningType::DiabeticEye => &self.diabetic_eye,
            ScreeningType::DiabeticFoot => &self.diabetic_foot,
            ScreeningType::DepressionScreening => &self.depression_screening,
            ScreeningType::FitTest => &self.fit_test,
            ScreeningType::LungCancer => &self.lung_cancer,
        }
    }
}

/// A documented procedure with its CPT code when the terminology table
/// knows one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Patient demographics, from the caller or parsed out of the note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// The entity bundle for one note: the pipeline's central value object.
///
/// Created by [`crate::extractor::extract_entities`] and handed by value
/// to the measure evaluator and gap analyzer, which read it without
/// mutation. No field refers back to another stage, so the bundle is a
/// plain tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalEntities {
    pub diagnoses: Vec<Diagnosis>,
    pub medications: Vec<Medication>,
    pub vitals: VitalSigns,
    pub labs: LabResults,
    pub screenings: Screenings,
    pub procedures: Vec<Procedure>,
    pub demographics: Demographics,
    pub symptoms: Vec<String>,
    pub social_history: Vec<String>,
    /// Overall extraction confidence in [0, 1]
    pub extraction_confidence: f64,
}

impl ClinicalEntities {
    /// Returns the highest-confidence currently-present diagnosis whose
    /// canonical name contains `needle` (case-insensitive).
    pub fn current_diagnosis(&self, needle: &str) -> Option<&Diagnosis> {
        let needle = needle.to_lowercase();
        self.diagnoses
            .iter()
            .filter(|d| d.status.is_current() && d.name.to_lowercase().contains(&needle))
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Whether any currently-present diagnosis matches `needle`
    /// (case-insensitive substring on the canonical name).
    pub fn has_current_diagnosis(&self, needle: &str) -> bool {
        self.current_diagnosis(needle).is_some()
    }

    /// Whether any documented social history item contains `needle`.
    pub fn has_social_history(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.social_history
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
    }

    /// Whether any documented procedure name contains `needle`.
    pub fn has_procedure(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.procedures
            .iter()
            .any(|p| p.name.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_diagnosis_ignores_history_of() {
        let entities = ClinicalEntities {
            diagnoses: vec![
                Diagnosis {
                    name: "Type 2 diabetes mellitus".to_string(),
                    inferred_code: Some("E11.9".to_string()),
                    status: DiagnosisStatus::HistoryOf,
                    severity: None,
                    confidence: 0.9,
                },
                Diagnosis {
                    name: "Essential hypertension".to_string(),
                    inferred_code: Some("I10".to_string()),
                    status: DiagnosisStatus::Active,
                    severity: None,
                    confidence: 0.9,
                },
            ],
            ..Default::default()
        };
        assert!(!entities.has_current_diagnosis("diabetes"));
        assert!(entities.has_current_diagnosis("hypertension"));
    }

    #[test]
    fn test_bundle_serializes_without_absent_fields() {
        let entities = ClinicalEntities::default();
        let json = serde_json::to_string(&entities).unwrap();
        assert!(!json.contains("systolic"));
        assert!(!json.contains("hba1c"));
    }
}
