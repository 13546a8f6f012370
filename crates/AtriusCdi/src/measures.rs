//! Quality measure definitions and clinical band tables
//!
//! Measures come in two behaviorally distinct kinds, modeled as a tagged
//! variant evaluated through one shared dispatcher in
//! [`crate::evaluator`]:
//!
//! - [`MeasureKind::Threshold`] - a numeric value compared against fixed
//!   clinical bands (blood pressure, HbA1c, BMI, LDL)
//! - [`MeasureKind::Event`] - a binary documentation event (a screening,
//!   a medication class, a visit)
//!
//! Both the band tables and the measure catalogue are declarative data:
//! adding a measure or moving a cutoff is a change here, never a new
//! branch in the evaluator. All bands are half-open at their documented
//! cutoffs (a value equal to a cutoff falls in the band above it).

use crate::entities::{Gender, LabField};
use crate::terminology::{MedicationClass, ScreeningType};

/// One half-open classification band: a value belongs to the first band
/// whose `upper` it is strictly below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub label: &'static str,
    pub meets_target: bool,
}

/// HbA1c bands. The control target is met strictly below 7.0.
pub static HBA1C_BANDS: &[Band] = &[
    Band { upper: 5.7, label: "normal", meets_target: true },
    Band { upper: 6.5, label: "prediabetes range", meets_target: true },
    Band { upper: 7.0, label: "well controlled", meets_target: true },
    Band { upper: 8.0, label: "moderate control", meets_target: false },
    Band { upper: 9.0, label: "poor control", meets_target: false },
    Band { upper: f64::INFINITY, label: "very poor control", meets_target: false },
];

/// Fasting glucose bands in mg/dL.
pub static GLUCOSE_BANDS: &[Band] = &[
    Band { upper: 100.0, label: "normal", meets_target: true },
    Band { upper: 126.0, label: "prediabetes range", meets_target: false },
    Band { upper: f64::INFINITY, label: "diabetes range", meets_target: false },
];

/// BMI bands in kg/m2.
pub static BMI_BANDS: &[Band] = &[
    Band { upper: 18.5, label: "underweight", meets_target: false },
    Band { upper: 25.0, label: "normal", meets_target: true },
    Band { upper: 30.0, label: "overweight", meets_target: false },
    Band { upper: 35.0, label: "obesity class I", meets_target: false },
    Band { upper: 40.0, label: "obesity class II", meets_target: false },
    Band { upper: f64::INFINITY, label: "obesity class III", meets_target: false },
];

/// LDL cholesterol bands in mg/dL; the control target is < 100.
pub static LDL_BANDS: &[Band] = &[
    Band { upper: 70.0, label: "optimal (high-risk target)", meets_target: true },
    Band { upper: 100.0, label: "optimal", meets_target: true },
    Band { upper: 130.0, label: "near optimal", meets_target: false },
    Band { upper: 160.0, label: "borderline high", meets_target: false },
    Band { upper: 190.0, label: "high", meets_target: false },
    Band { upper: f64::INFINITY, label: "very high", meets_target: false },
];

/// Classifies a value into the first band it is strictly below.
pub fn classify(bands: &'static [Band], value: f64) -> &'static Band {
    bands
        .iter()
        .find(|band| value < band.upper)
        .unwrap_or(&bands[bands.len() - 1])
}

/// Whether an LDL value meets the numeric control target.
pub fn evaluate_ldl_target(ldl: f64) -> bool {
    classify(LDL_BANDS, ldl).meets_target
}

/// Blood pressure category per the staged classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpCategory {
    Normal,
    Elevated,
    Stage1,
    Stage2,
}

impl BpCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BpCategory::Normal => "normal",
            BpCategory::Elevated => "elevated",
            BpCategory::Stage1 => "stage 1 hypertension",
            BpCategory::Stage2 => "stage 2 hypertension",
        }
    }

    /// Control is met only below the stage-1 threshold (130/80).
    pub fn meets_target(&self) -> bool {
        matches!(self, BpCategory::Normal | BpCategory::Elevated)
    }
}

/// Classifies a blood pressure reading.
pub fn classify_blood_pressure(systolic: f64, diastolic: f64) -> BpCategory {
    if systolic >= 140.0 || diastolic >= 90.0 {
        BpCategory::Stage2
    } else if systolic >= 130.0 || diastolic >= 80.0 {
        BpCategory::Stage1
    } else if systolic >= 120.0 {
        BpCategory::Elevated
    } else {
        BpCategory::Normal
    }
}

/// eGFR staging threshold: the first stage whose `min` the value reaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgfrStage {
    pub min: f64,
    pub label: &'static str,
}

/// CKD staging by eGFR; used by gap and revenue logic, not a numerator.
pub static EGFR_STAGES: &[EgfrStage] = &[
    EgfrStage { min: 90.0, label: "G1" },
    EgfrStage { min: 60.0, label: "G2" },
    EgfrStage { min: 45.0, label: "G3a" },
    EgfrStage { min: 30.0, label: "G3b" },
    EgfrStage { min: 15.0, label: "G4" },
    EgfrStage { min: 0.0, label: "G5" },
];

pub fn classify_egfr(egfr: f64) -> &'static str {
    EGFR_STAGES
        .iter()
        .find(|stage| egfr >= stage.min)
        .map(|stage| stage.label)
        .unwrap_or("G5")
}

/// The numeric source a threshold measure reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    BloodPressure,
    Hba1c,
    Bmi,
    Ldl,
}

/// The documentation evidence a binary event measure accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventSource {
    /// Any of the listed screenings is documented
    AnyScreening(&'static [ScreeningType]),
    /// Any medication of the listed classes is on the list
    AnyMedicationClass(&'static [MedicationClass]),
    /// Any documented procedure whose name contains one of these
    AnyProcedure(&'static [&'static str]),
    /// All of the listed labs are documented
    AllLabs(&'static [LabField]),
}

/// Tagged measure kind; the dispatcher in `evaluator` is the only place
/// that branches on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasureKind {
    Threshold(ThresholdKind),
    Event(EventSource),
}

/// Diagnosis/medication context that places a patient in a measure's
/// eligible population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionContext {
    Diabetes,
    Hypertension,
    CardiovascularDisease,
    MentalIllness,
    SubstanceUse,
    AdhdMedication,
    Copd,
    Pregnancy,
    Depression,
    LipidRisk,
}

/// Declarative eligible-population predicate. Ages are inclusive; a
/// missing demographic fails the predicate rather than guessing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Applicability {
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub gender: Option<Gender>,
    pub context: Option<ConditionContext>,
}

const ANY: Applicability = Applicability {
    min_age: None,
    max_age: None,
    gender: None,
    context: None,
};

/// One quality measure definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: MeasureKind,
    pub applicability: Applicability,
    /// Display form of the measure target for reporting
    pub target: &'static str,
}

pub static MEASURE_TABLE: &[MeasureDefinition] = &[
    MeasureDefinition {
        id: "CBP",
        name: "Controlling High Blood Pressure",
        kind: MeasureKind::Threshold(ThresholdKind::BloodPressure),
        applicability: Applicability {
            min_age: Some(18),
            max_age: Some(85),
            context: Some(ConditionContext::Hypertension),
            ..ANY
        },
        target: "< 130/80 mmHg",
    },
    MeasureDefinition {
        id: "CDC",
        name: "Comprehensive Diabetes Care: HbA1c Control",
        kind: MeasureKind::Threshold(ThresholdKind::Hba1c),
        applicability: Applicability {
            min_age: Some(18),
            max_age: Some(75),
            context: Some(ConditionContext::Diabetes),
            ..ANY
        },
        target: "< 7.0%",
    },
    MeasureDefinition {
        id: "EED",
        name: "Eye Exam for Patients with Diabetes",
        kind: MeasureKind::Event(EventSource::AnyScreening(&[ScreeningType::DiabeticEye])),
        applicability: Applicability {
            min_age: Some(18),
            max_age: Some(75),
            context: Some(ConditionContext::Diabetes),
            ..ANY
        },
        target: "retinal exam documented",
    },
    MeasureDefinition {
        id: "KED",
        name: "Kidney Health Evaluation for Patients with Diabetes",
        kind: MeasureKind::Event(EventSource::AllLabs(&[LabField::Egfr, LabField::Creatinine])),
        applicability: Applicability {
            min_age: Some(18),
            max_age: Some(85),
            context: Some(ConditionContext::Diabetes),
            ..ANY
        },
        target: "eGFR and creatinine documented",
    },
    MeasureDefinition {
        id: "BCS",
        name: "Breast Cancer Screening",
        kind: MeasureKind::Event(EventSource::AnyScreening(&[ScreeningType::Mammogram])),
        applicability: Applicability {
            min_age: Some(50),
            max_age: Some(74),
            gender: Some(Gender::Female),
            ..ANY
        },
        target: "mammogram documented",
    },
    MeasureDefinition {
        id: "COL",
        name: "Colorectal Cancer Screening",
        kind: MeasureKind::Event(EventSource::AnyScreening(&[
            ScreeningType::Colonoscopy,
            ScreeningType::FitTest,
        ])),
        applicability: Applicability {
            min_age: Some(45),
            max_age: Some(75),
            ..ANY
        },
        target: "colonoscopy or FIT documented",
    },
    MeasureDefinition {
        id: "CCS",
        name: "Cervical Cancer Screening",
        kind: MeasureKind::Event(EventSource::AnyScreening(&[ScreeningType::CervicalCancer])),
        applicability: Applicability {
            min_age: Some(21),
            max_age: Some(64),
            gender: Some(Gender::Female),
            ..ANY
        },
        target: "cervical cytology documented",
    },
    MeasureDefinition {
        id: "DSF",
        name: "Depression Screening and Follow-Up",
        kind: MeasureKind::Event(EventSource::AnyScreening(&[
            ScreeningType::DepressionScreening,
        ])),
        applicability: Applicability {
            min_age: Some(12),
            ..ANY
        },
        target: "depression screening documented",
    },
    MeasureDefinition {
        id: "SPC",
        name: "Statin Therapy for Patients with Cardiovascular Disease",
        kind: MeasureKind::Event(EventSource::AnyMedicationClass(&[MedicationClass::Statin])),
        applicability: Applicability {
            min_age: Some(21),
            max_age: Some(75),
            context: Some(ConditionContext::CardiovascularDisease),
            ..ANY
        },
        target: "statin on medication list",
    },
    MeasureDefinition {
        id: "SPD",
        name: "Statin Therapy for Patients with Diabetes",
        kind: MeasureKind::Event(EventSource::AnyMedicationClass(&[MedicationClass::Statin])),
        applicability: Applicability {
            min_age: Some(40),
            max_age: Some(75),
            context: Some(ConditionContext::Diabetes),
            ..ANY
        },
        target: "statin on medication list",
    },
    MeasureDefinition {
        id: "AMM",
        name: "Antidepressant Medication Management",
        kind: MeasureKind::Event(EventSource::AnyMedicationClass(&[
            MedicationClass::Antidepressant,
        ])),
        applicability: Applicability {
            min_age: Some(18),
            context: Some(ConditionContext::Depression),
            ..ANY
        },
        target: "antidepressant on medication list",
    },
    MeasureDefinition {
        id: "FUH",
        name: "Follow-Up After Hospitalization for Mental Illness",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["follow-up visit", "psychotherapy"])),
        applicability: Applicability {
            min_age: Some(6),
            context: Some(ConditionContext::MentalIllness),
            ..ANY
        },
        target: "follow-up visit documented",
    },
    MeasureDefinition {
        id: "FUM",
        name: "Follow-Up After Emergency Department Visit for Mental Illness",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["follow-up visit", "psychotherapy"])),
        applicability: Applicability {
            min_age: Some(6),
            context: Some(ConditionContext::MentalIllness),
            ..ANY
        },
        target: "follow-up visit documented",
    },
    MeasureDefinition {
        id: "FUA",
        name: "Follow-Up After Emergency Department Visit for Substance Use",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["follow-up visit", "psychotherapy"])),
        applicability: Applicability {
            min_age: Some(13),
            context: Some(ConditionContext::SubstanceUse),
            ..ANY
        },
        target: "follow-up visit documented",
    },
    MeasureDefinition {
        id: "ADD",
        name: "Follow-Up Care for Children Prescribed ADHD Medication",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["follow-up visit"])),
        applicability: Applicability {
            min_age: Some(6),
            max_age: Some(12),
            context: Some(ConditionContext::AdhdMedication),
            ..ANY
        },
        target: "follow-up visit documented",
    },
    MeasureDefinition {
        id: "CIS",
        name: "Childhood Immunization Status",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["immunization"])),
        applicability: Applicability {
            max_age: Some(2),
            ..ANY
        },
        target: "immunizations documented",
    },
    MeasureDefinition {
        id: "W15",
        name: "Well-Child Visits in the First 15 Months",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["well-child visit"])),
        applicability: Applicability {
            max_age: Some(1),
            ..ANY
        },
        target: "well-child visit documented",
    },
    MeasureDefinition {
        id: "W34",
        name: "Well-Child Visits Ages 3-6",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["well-child visit"])),
        applicability: Applicability {
            min_age: Some(3),
            max_age: Some(6),
            ..ANY
        },
        target: "well-child visit documented",
    },
    MeasureDefinition {
        id: "PPC",
        name: "Prenatal and Postpartum Care",
        kind: MeasureKind::Event(EventSource::AnyProcedure(&["prenatal visit", "postpartum visit"])),
        applicability: Applicability {
            min_age: Some(12),
            max_age: Some(55),
            gender: Some(Gender::Female),
            context: Some(ConditionContext::Pregnancy),
        },
        target: "prenatal or postpartum visit documented",
    },
    MeasureDefinition {
        id: "PCE",
        name: "Pharmacotherapy Management of COPD Exacerbation",
        kind: MeasureKind::Event(EventSource::AnyMedicationClass(&[
            MedicationClass::SystemicCorticosteroid,
            MedicationClass::Bronchodilator,
        ])),
        applicability: Applicability {
            min_age: Some(40),
            context: Some(ConditionContext::Copd),
            ..ANY
        },
        target: "corticosteroid or bronchodilator on medication list",
    },
    MeasureDefinition {
        id: "ABA",
        name: "Adult BMI Assessment",
        kind: MeasureKind::Threshold(ThresholdKind::Bmi),
        applicability: Applicability {
            min_age: Some(18),
            max_age: Some(74),
            ..ANY
        },
        target: "18.5 - 24.9 kg/m2",
    },
    MeasureDefinition {
        id: "LDL",
        name: "LDL-C Control for Patients with Cardiovascular Risk",
        kind: MeasureKind::Threshold(ThresholdKind::Ldl),
        applicability: Applicability {
            min_age: Some(21),
            max_age: Some(75),
            context: Some(ConditionContext::LipidRisk),
            ..ANY
        },
        target: "< 100 mg/dL",
    },
];

/// Looks up a measure definition by its code.
pub fn measure_by_id(id: &str) -> Option<&'static MeasureDefinition> {
    MEASURE_TABLE.iter().find(|m| m.id.eq_ignore_ascii_case(id))
}
