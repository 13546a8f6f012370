//! Documentation gap analyzer
//!
//! Compares an entity bundle against per-condition completeness
//! expectations (specificity, acuity, linkage, expected vitals/labs and
//! screenings) and against the open quality-measure results, producing
//! prioritized [`DocumentationGap`]s. Gap priority comes from a fixed
//! severity table, capped by the diagnosis confidence that produced it:
//! a low-confidence diagnosis never yields a critical gap.
//!
//! No two gaps share a `(category, clinical_indicator)` pair; the first
//! one produced wins.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{ClinicalEntities, Diagnosis, LabField, VitalField};
use crate::evaluator::MeasureReport;
use crate::measures::{classify_egfr, MeasureKind};
use crate::terminology::ScreeningType;

/// What kind of documentation is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapCategory {
    Specificity,
    Acuity,
    Linkage,
    MissingVitals,
    MissingLabs,
    MissingScreening,
    ClinicalValidation,
    HedisQuality,
}

impl GapCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapCategory::Specificity => "specificity",
            GapCategory::Acuity => "acuity",
            GapCategory::Linkage => "linkage",
            GapCategory::MissingVitals => "missing_vitals",
            GapCategory::MissingLabs => "missing_labs",
            GapCategory::MissingScreening => "missing_screening",
            GapCategory::ClinicalValidation => "clinical_validation",
            GapCategory::HedisQuality => "hedis_quality",
        }
    }
}

/// Gap priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl GapPriority {
    /// Sort rank; lower sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            GapPriority::Critical => 0,
            GapPriority::High => 1,
            GapPriority::Medium => 2,
            GapPriority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GapPriority::Critical => "critical",
            GapPriority::High => "high",
            GapPriority::Medium => "medium",
            GapPriority::Low => "low",
        }
    }
}

/// One prioritized documentation gap; consumed by the query generator
/// and never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationGap {
    pub category: GapCategory,
    pub priority: GapPriority,
    pub title: String,
    pub description: String,
    /// The note evidence this gap hangs on (a diagnosis or finding
    /// already documented)
    pub clinical_indicator: String,
    pub suggested_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_impact: Option<String>,
    /// Affected measure code, for gaps synthesized from quality results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedis_impact: Option<String>,
    pub confidence: f64,
}

/// Aggregate counters for the gap bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapSummary {
    pub by_priority: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub critical_count: usize,
    pub high_count: usize,
}

/// The gap bundle for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub gaps: Vec<DocumentationGap>,
    pub summary: GapSummary,
}

/// What a condition expects to see documented.
#[derive(Debug, Clone, Copy)]
enum Requirement {
    /// Diagnosis name carries one of these specificity markers
    NameContains(&'static [&'static str]),
    /// A severity/stage/acuity qualifier was documented
    SeverityQualifier,
    Lab(LabField),
    Vital(VitalField),
    Screening(ScreeningType),
    Procedure(&'static str),
    /// When the lab evidence is present and below `max`, the linked
    /// complication diagnosis is expected by name
    LinkedDiagnosis {
        needle: &'static str,
        lab: LabField,
        max: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct Expectation {
    category: GapCategory,
    priority: GapPriority,
    requirement: Requirement,
    title: &'static str,
    description: &'static str,
    suggested_query: &'static str,
    revenue_impact: Option<&'static str>,
}

struct ConditionExpectations {
    /// Case-insensitive needle matched against diagnosis names
    needle: &'static str,
    expectations: &'static [Expectation],
}

static CONDITION_EXPECTATIONS: &[ConditionExpectations] = &[
    ConditionExpectations {
        needle: "diabetes",
        expectations: &[
            Expectation {
                category: GapCategory::Specificity,
                priority: GapPriority::High,
                requirement: Requirement::NameContains(&["type 1", "type 2"]),
                title: "Diabetes type not documented",
                description: "Diabetes is documented without type specificity",
                suggested_query: "Please specify the diabetes type (type 1 or type 2) and any manifestations",
                revenue_impact: Some("Unspecified diabetes defaults to E11.9; type and complication specificity supports accurate risk adjustment"),
            },
            Expectation {
                category: GapCategory::MissingLabs,
                priority: GapPriority::High,
                requirement: Requirement::Lab(LabField::Hba1c),
                title: "No HbA1c on file",
                description: "Diabetes is documented without a recent HbA1c result",
                suggested_query: "Please document the most recent HbA1c result or order one",
                revenue_impact: None,
            },
            Expectation {
                category: GapCategory::MissingScreening,
                priority: GapPriority::Medium,
                requirement: Requirement::Screening(ScreeningType::DiabeticEye),
                title: "Diabetic eye exam not documented",
                description: "No retinal exam is documented for this diabetic patient",
                suggested_query: "Please document the date and result of the most recent diabetic eye exam",
                revenue_impact: None,
            },
            Expectation {
                category: GapCategory::MissingScreening,
                priority: GapPriority::Medium,
                requirement: Requirement::Screening(ScreeningType::DiabeticFoot),
                title: "Diabetic foot exam not documented",
                description: "No foot exam is documented for this diabetic patient",
                suggested_query: "Please document the most recent diabetic foot exam",
                revenue_impact: None,
            },
            Expectation {
                category: GapCategory::Linkage,
                priority: GapPriority::High,
                requirement: Requirement::LinkedDiagnosis {
                    needle: "nephropathy",
                    lab: LabField::Egfr,
                    max: 60.0,
                },
                title: "Renal impairment not linked to diabetes",
                description: "Reduced eGFR is documented without a diabetic nephropathy diagnosis linking it to diabetes",
                suggested_query: "Based on the documented eGFR, please clarify whether the renal findings are related to diabetes",
                revenue_impact: Some("Linked diabetic nephropathy (E11.21) carries different risk weight than unlinked findings"),
            },
        ],
    },
    ConditionExpectations {
        needle: "hypertension",
        expectations: &[Expectation {
            category: GapCategory::MissingVitals,
            priority: GapPriority::High,
            requirement: Requirement::Vital(VitalField::Systolic),
            title: "No blood pressure reading",
            description: "Hypertension is documented without a blood pressure reading in the note",
            suggested_query: "Please document today's blood pressure reading",
            revenue_impact: None,
        }],
    },
    ConditionExpectations {
        needle: "kidney disease",
        expectations: &[
            Expectation {
                category: GapCategory::Specificity,
                priority: GapPriority::High,
                requirement: Requirement::SeverityQualifier,
                title: "CKD stage not documented",
                description: "Chronic kidney disease is documented without a stage",
                suggested_query: "Please document the CKD stage supported by the most recent eGFR",
                revenue_impact: Some("Staged CKD (N18.1-N18.5) is risk-adjusted; unspecified N18.9 is not"),
            },
            Expectation {
                category: GapCategory::MissingLabs,
                priority: GapPriority::High,
                requirement: Requirement::Lab(LabField::Egfr),
                title: "No eGFR on file",
                description: "Chronic kidney disease is documented without an eGFR result",
                suggested_query: "Please document the most recent eGFR result",
                revenue_impact: None,
            },
            Expectation {
                category: GapCategory::MissingLabs,
                priority: GapPriority::Medium,
                requirement: Requirement::Lab(LabField::Creatinine),
                title: "No creatinine on file",
                description: "Chronic kidney disease is documented without a creatinine result",
                suggested_query: "Please document the most recent serum creatinine",
                revenue_impact: None,
            },
        ],
    },
    ConditionExpectations {
        needle: "heart failure",
        expectations: &[
            Expectation {
                category: GapCategory::Acuity,
                priority: GapPriority::Critical,
                requirement: Requirement::SeverityQualifier,
                title: "Heart failure acuity not documented",
                description: "Heart failure is documented without acuity (acute, chronic, acute on chronic)",
                suggested_query: "Please clarify the acuity of the heart failure (acute, chronic, or acute on chronic) and the type (systolic or diastolic)",
                revenue_impact: Some("Acuity and type determine the specific I50 code and materially affect severity classification"),
            },
            Expectation {
                category: GapCategory::MissingLabs,
                priority: GapPriority::Medium,
                requirement: Requirement::Procedure("echocardiogram"),
                title: "No echocardiogram documented",
                description: "Heart failure is documented without ejection fraction assessment",
                suggested_query: "Please document the most recent echocardiogram and ejection fraction",
                revenue_impact: None,
            },
        ],
    },
    ConditionExpectations {
        needle: "obstructive pulmonary",
        expectations: &[
            Expectation {
                category: GapCategory::Acuity,
                priority: GapPriority::Medium,
                requirement: Requirement::SeverityQualifier,
                title: "COPD severity not documented",
                description: "COPD is documented without severity or exacerbation status",
                suggested_query: "Please document COPD severity and whether this represents an exacerbation",
                revenue_impact: None,
            },
            Expectation {
                category: GapCategory::MissingLabs,
                priority: GapPriority::Medium,
                requirement: Requirement::Procedure("spirometry"),
                title: "No spirometry documented",
                description: "COPD is documented without spirometry confirmation",
                suggested_query: "Please document spirometry results confirming the COPD diagnosis",
                revenue_impact: None,
            },
        ],
    },
    ConditionExpectations {
        needle: "depressive",
        expectations: &[
            Expectation {
                category: GapCategory::Specificity,
                priority: GapPriority::Medium,
                requirement: Requirement::SeverityQualifier,
                title: "Depression severity not documented",
                description: "Depression is documented without severity",
                suggested_query: "Please document the severity of the depressive episode (mild, moderate, severe)",
                revenue_impact: None,
            },
            Expectation {
                category: GapCategory::MissingScreening,
                priority: GapPriority::Medium,
                requirement: Requirement::Screening(ScreeningType::DepressionScreening),
                title: "No standardized depression score",
                description: "Depression is documented without a standardized screening score",
                suggested_query: "Please document a PHQ-9 or equivalent standardized score",
                revenue_impact: None,
            },
        ],
    },
    ConditionExpectations {
        needle: "hyperlipidemia",
        expectations: &[Expectation {
            category: GapCategory::MissingLabs,
            priority: GapPriority::Medium,
            requirement: Requirement::Lab(LabField::Ldl),
            title: "No LDL-C on file",
            description: "Hyperlipidemia is documented without a recent lipid panel",
            suggested_query: "Please document the most recent LDL-C result",
            revenue_impact: None,
        }],
    },
    ConditionExpectations {
        needle: "anemia",
        expectations: &[Expectation {
            category: GapCategory::MissingLabs,
            priority: GapPriority::High,
            requirement: Requirement::Lab(LabField::Hemoglobin),
            title: "No hemoglobin on file",
            description: "Anemia is documented without a hemoglobin result",
            suggested_query: "Please document the hemoglobin value supporting the anemia diagnosis",
            revenue_impact: None,
        }],
    },
    ConditionExpectations {
        needle: "obesity",
        expectations: &[Expectation {
            category: GapCategory::MissingVitals,
            priority: GapPriority::High,
            requirement: Requirement::Vital(VitalField::Bmi),
            title: "No BMI documented",
            description: "Obesity is documented without a BMI",
            suggested_query: "Please document the calculated BMI",
            revenue_impact: Some("Obesity class coding (E66) requires a documented BMI (Z68)"),
        }],
    },
];

/// A clinical finding that should carry an associated diagnosis.
#[derive(Debug, Clone, Copy)]
enum ValueCheck {
    LabAtLeast(LabField, f64),
    LabBelow(LabField, f64),
    VitalAtLeast(VitalField, f64),
}

#[derive(Debug, Clone, Copy)]
struct ValidationRule {
    check: ValueCheck,
    /// No current diagnosis matching this needle means the finding is
    /// unexplained
    absent_needle: &'static str,
    indicator: &'static str,
    title: &'static str,
    priority: GapPriority,
}

static VALIDATION_RULES: &[ValidationRule] = &[
    ValidationRule {
        check: ValueCheck::LabAtLeast(LabField::Glucose, 126.0),
        absent_needle: "diabet",
        indicator: "elevated fasting glucose",
        title: "Elevated glucose without associated diagnosis",
        priority: GapPriority::High,
    },
    ValidationRule {
        check: ValueCheck::LabAtLeast(LabField::Hba1c, 6.5),
        absent_needle: "diabet",
        indicator: "elevated HbA1c",
        title: "Elevated HbA1c without associated diagnosis",
        priority: GapPriority::High,
    },
    ValidationRule {
        check: ValueCheck::VitalAtLeast(VitalField::Systolic, 140.0),
        absent_needle: "hypertension",
        indicator: "elevated blood pressure reading",
        title: "Elevated blood pressure without associated diagnosis",
        priority: GapPriority::High,
    },
    ValidationRule {
        check: ValueCheck::LabBelow(LabField::Egfr, 60.0),
        absent_needle: "kidney",
        indicator: "reduced eGFR",
        title: "Reduced eGFR without associated diagnosis",
        priority: GapPriority::High,
    },
    ValidationRule {
        check: ValueCheck::LabBelow(LabField::Hemoglobin, 10.0),
        absent_needle: "anemia",
        indicator: "low hemoglobin",
        title: "Low hemoglobin without associated diagnosis",
        priority: GapPriority::Medium,
    },
    ValidationRule {
        check: ValueCheck::VitalAtLeast(VitalField::Bmi, 30.0),
        absent_needle: "obesity",
        indicator: "BMI in the obese range",
        title: "Obese-range BMI without associated diagnosis",
        priority: GapPriority::Medium,
    },
];

/// A low-confidence diagnosis cannot generate a critical gap.
fn capped_priority(priority: GapPriority, confidence: f64) -> GapPriority {
    if priority == GapPriority::Critical && confidence < 0.8 {
        GapPriority::High
    } else {
        priority
    }
}

fn requirement_satisfied(
    requirement: &Requirement,
    diagnosis: &Diagnosis,
    entities: &ClinicalEntities,
) -> bool {
    match requirement {
        Requirement::NameContains(markers) => {
            let name = diagnosis.name.to_lowercase();
            markers.iter().any(|m| name.contains(m))
        }
        Requirement::SeverityQualifier => diagnosis.severity.is_some(),
        Requirement::Lab(field) => entities.labs.get(*field).is_some(),
        Requirement::Vital(field) => entities.vitals.get(*field).is_some(),
        Requirement::Screening(screening) => entities.screenings.get(*screening).documented,
        Requirement::Procedure(needle) => entities.has_procedure(needle),
        Requirement::LinkedDiagnosis { needle, lab, max } => {
            match entities.labs.get(*lab) {
                // evidence below the cutoff demands the linked diagnosis
                Some(value) if value < *max => entities.has_current_diagnosis(needle),
                _ => true,
            }
        }
    }
}

fn check_holds(check: &ValueCheck, entities: &ClinicalEntities) -> bool {
    match check {
        ValueCheck::LabAtLeast(field, cutoff) => {
            entities.labs.get(*field).is_some_and(|v| v >= *cutoff)
        }
        ValueCheck::LabBelow(field, cutoff) => {
            entities.labs.get(*field).is_some_and(|v| v < *cutoff)
        }
        ValueCheck::VitalAtLeast(field, cutoff) => {
            entities.vitals.get(*field).is_some_and(|v| v >= *cutoff)
        }
    }
}

/// Analyzes an entity bundle (and optionally the measure report built
/// from it) into a deduplicated, priority-ordered gap bundle.
pub fn analyze_gaps(entities: &ClinicalEntities, report: Option<&MeasureReport>) -> GapAnalysis {
    let mut gaps: Vec<DocumentationGap> = Vec::new();
    let mut seen: HashSet<(GapCategory, String)> = HashSet::new();

    let mut push = |gaps: &mut Vec<DocumentationGap>, gap: DocumentationGap| {
        let key = (gap.category, gap.clinical_indicator.to_lowercase());
        if seen.insert(key) {
            gaps.push(gap);
        }
    };

    // condition-driven expectations
    for diagnosis in entities.diagnoses.iter().filter(|d| d.status.is_current()) {
        let name = diagnosis.name.to_lowercase();
        for table in CONDITION_EXPECTATIONS {
            if !name.contains(table.needle) {
                continue;
            }
            for expectation in table.expectations {
                if requirement_satisfied(&expectation.requirement, diagnosis, entities) {
                    continue;
                }
                let mut description = expectation.description.to_string();
                // stage hint when the data to derive it is already there
                if let Requirement::SeverityQualifier = expectation.requirement {
                    if table.needle == "kidney disease" {
                        if let Some(egfr) = entities.labs.egfr {
                            description = format!(
                                "{} (documented eGFR {} is consistent with stage {})",
                                description,
                                egfr,
                                classify_egfr(egfr)
                            );
                        }
                    }
                }
                push(
                    &mut gaps,
                    DocumentationGap {
                        category: expectation.category,
                        priority: capped_priority(expectation.priority, diagnosis.confidence),
                        title: expectation.title.to_string(),
                        description,
                        clinical_indicator: diagnosis.name.clone(),
                        suggested_query: expectation.suggested_query.to_string(),
                        revenue_impact: expectation.revenue_impact.map(|r| r.to_string()),
                        hedis_impact: None,
                        confidence: diagnosis.confidence,
                    },
                );
            }
        }
    }

    // findings without an associated diagnosis
    for rule in VALIDATION_RULES {
        if !check_holds(&rule.check, entities) {
            continue;
        }
        if entities.has_current_diagnosis(rule.absent_needle) {
            continue;
        }
        push(
            &mut gaps,
            DocumentationGap {
                category: GapCategory::ClinicalValidation,
                priority: rule.priority,
                title: rule.title.to_string(),
                description: format!(
                    "The note documents {} without an associated diagnosis",
                    rule.indicator
                ),
                clinical_indicator: rule.indicator.to_string(),
                suggested_query: format!(
                    "Based on the documented {}, please clarify the associated clinical significance",
                    rule.indicator
                ),
                revenue_impact: None,
                hedis_impact: None,
                confidence: entities.extraction_confidence.max(0.5),
            },
        );
    }

    // open quality measures
    if let Some(report) = report {
        for measure in report.open_gaps() {
            let priority = match crate::measures::measure_by_id(&measure.measure_id).map(|m| m.kind)
            {
                Some(MeasureKind::Threshold(_)) => GapPriority::High,
                _ => GapPriority::Medium,
            };
            push(
                &mut gaps,
                DocumentationGap {
                    category: GapCategory::HedisQuality,
                    priority,
                    title: format!("Open quality measure: {}", measure.measure_name),
                    description: measure
                        .gap_description
                        .clone()
                        .unwrap_or_else(|| format!("{} not met", measure.measure_id)),
                    clinical_indicator: measure.measure_name.clone(),
                    suggested_query: format!(
                        "Please address or document: {}",
                        measure.target
                    ),
                    revenue_impact: None,
                    hedis_impact: Some(measure.measure_id.clone()),
                    confidence: measure.confidence,
                },
            );
        }
    }

    // stable: insertion order breaks priority ties
    gaps.sort_by_key(|g| g.priority.rank());

    let mut summary = GapSummary::default();
    for gap in &gaps {
        *summary
            .by_priority
            .entry(gap.priority.as_str().to_string())
            .or_insert(0) += 1;
        *summary
            .by_category
            .entry(gap.category.as_str().to_string())
            .or_insert(0) += 1;
    }
    summary.critical_count = summary.by_priority.get("critical").copied().unwrap_or(0);
    summary.high_count = summary.by_priority.get("high").copied().unwrap_or(0);

    debug!(gaps = gaps.len(), "analyzed documentation gaps");

    GapAnalysis { gaps, summary }
}
