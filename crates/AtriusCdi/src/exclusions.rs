//! Measure exclusion engine
//!
//! Exclusion categories remove a patient from a measure entirely,
//! overriding any value-based result. The table below is scanned once
//! per evaluation against the concatenation of diagnosis names and raw
//! note text (case-insensitive); the first keyword hit marks a category
//! present, regardless of how many keywords match.

use serde::{Deserialize, Serialize};

use crate::entities::ClinicalEntities;
use crate::measures::MEASURE_TABLE;

/// Exclusion category identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionCategory {
    Hospice,
    Esrd,
    AdvancedIllness,
    Frailty,
    Pregnancy,
    Dementia,
    BilateralMastectomy,
    ColorectalCancerHistory,
    InstitutionalCare,
    Blindness,
}

/// One exclusion rule: keywords that evidence the category and the
/// measure codes it removes the patient from. An empty `affects` list
/// means the category excludes every measure (hospice).
#[derive(Debug, Clone, Copy)]
pub struct ExclusionRule {
    pub category: ExclusionCategory,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    pub affects: &'static [&'static str],
}

pub static EXCLUSION_TABLE: &[ExclusionRule] = &[
    ExclusionRule {
        category: ExclusionCategory::Hospice,
        description: "Hospice enrollment or comfort-care-only status",
        keywords: &["hospice", "comfort care", "comfort measures only"],
        affects: &[],
    },
    ExclusionRule {
        category: ExclusionCategory::Esrd,
        description: "End-stage renal disease, dialysis, or renal transplant",
        keywords: &[
            "esrd",
            "end-stage renal",
            "end stage renal",
            "dialysis",
            "renal transplant",
            "kidney transplant",
        ],
        affects: &["CBP", "CDC", "KED"],
    },
    ExclusionRule {
        category: ExclusionCategory::AdvancedIllness,
        description: "Advanced or terminal illness",
        keywords: &["metastatic", "advanced cancer", "advanced illness", "terminal illness", "terminally ill"],
        affects: &["BCS", "COL", "CCS", "CBP", "CDC", "EED", "KED", "SPC", "SPD", "ABA", "LDL"],
    },
    ExclusionRule {
        category: ExclusionCategory::Frailty,
        description: "Frailty limiting benefit from routine screening",
        keywords: &["frailty", "frail", "bed-bound", "bedbound", "wheelchair-bound"],
        affects: &["BCS", "COL", "CCS", "CBP", "CDC", "EED", "KED", "SPC", "SPD", "ABA", "LDL"],
    },
    ExclusionRule {
        category: ExclusionCategory::Pregnancy,
        description: "Current pregnancy",
        keywords: &["pregnant", "pregnancy", "gravid"],
        affects: &["CBP", "CDC", "ABA", "LDL"],
    },
    ExclusionRule {
        category: ExclusionCategory::Dementia,
        description: "Dementia",
        keywords: &["dementia", "alzheimer"],
        affects: &["BCS", "COL", "CCS", "DSF", "AMM"],
    },
    ExclusionRule {
        category: ExclusionCategory::BilateralMastectomy,
        description: "History of bilateral mastectomy",
        keywords: &["bilateral mastectomy", "double mastectomy"],
        affects: &["BCS"],
    },
    ExclusionRule {
        category: ExclusionCategory::ColorectalCancerHistory,
        description: "History of colorectal cancer or total colectomy",
        keywords: &["colorectal cancer", "colon cancer", "rectal cancer", "total colectomy"],
        affects: &["COL"],
    },
    ExclusionRule {
        category: ExclusionCategory::InstitutionalCare,
        description: "Long-term institutional care",
        keywords: &[
            "nursing home",
            "skilled nursing facility",
            "long-term care",
            "institutionalized",
        ],
        affects: &["BCS", "COL", "CCS", "CBP", "CDC", "EED", "KED"],
    },
    ExclusionRule {
        category: ExclusionCategory::Blindness,
        description: "Bilateral blindness",
        keywords: &["blindness", "blind", "bilateral enucleation"],
        affects: &["EED"],
    },
];

/// One scanned exclusion category: built once per evaluation call from
/// the static table and read-only afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub exclusion_type: ExclusionCategory,
    pub present: bool,
    /// Which keyword evidenced the category, when present
    pub reason: String,
    pub description: String,
    pub affects: Vec<String>,
}

fn affected_measures(rule: &ExclusionRule) -> Vec<String> {
    if rule.affects.is_empty() {
        MEASURE_TABLE.iter().map(|m| m.id.to_string()).collect()
    } else {
        rule.affects.iter().map(|id| id.to_string()).collect()
    }
}

/// Scans diagnosis names plus raw note text for every exclusion
/// category. One record per category, in table order; first keyword hit
/// wins per category.
pub fn scan_exclusions(entities: &ClinicalEntities, note_text: &str) -> Vec<ExclusionRecord> {
    let mut haystack = entities
        .diagnoses
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    haystack.push(' ');
    haystack.push_str(note_text);
    let haystack = haystack.to_lowercase();

    EXCLUSION_TABLE
        .iter()
        .map(|rule| {
            let hit = rule.keywords.iter().find(|kw| haystack.contains(*kw));
            ExclusionRecord {
                exclusion_type: rule.category,
                present: hit.is_some(),
                reason: hit
                    .map(|kw| format!("documented mention of \"{}\"", kw))
                    .unwrap_or_default(),
                description: rule.description.to_string(),
                affects: affected_measures(rule),
            }
        })
        .collect()
}

/// Whether a measure is excluded by any present record.
pub fn is_excluded(records: &[ExclusionRecord], measure_id: &str) -> bool {
    records
        .iter()
        .any(|r| r.present && r.affects.iter().any(|m| m == measure_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ClinicalEntities;

    #[test]
    fn test_hospice_affects_every_measure() {
        let entities = ClinicalEntities::default();
        let records = scan_exclusions(&entities, "Patient enrolled in hospice care.");
        let hospice = records
            .iter()
            .find(|r| r.exclusion_type == ExclusionCategory::Hospice)
            .unwrap();
        assert!(hospice.present);
        assert_eq!(hospice.affects.len(), MEASURE_TABLE.len());
        assert!(is_excluded(&records, "BCS"));
        assert!(is_excluded(&records, "CBP"));
    }

    #[test]
    fn test_first_keyword_wins_per_category() {
        let entities = ClinicalEntities::default();
        let records = scan_exclusions(&entities, "on dialysis for esrd");
        let esrd = records
            .iter()
            .find(|r| r.exclusion_type == ExclusionCategory::Esrd)
            .unwrap();
        assert!(esrd.present);
        // "esrd" is listed before "dialysis" in the keyword table
        assert!(esrd.reason.contains("esrd"));
    }

    #[test]
    fn test_absent_categories_do_not_exclude() {
        let entities = ClinicalEntities::default();
        let records = scan_exclusions(&entities, "Routine follow-up, doing well.");
        assert!(records.iter().all(|r| !r.present));
        assert!(!is_excluded(&records, "CBP"));
        assert_eq!(records.len(), EXCLUSION_TABLE.len());
    }

    #[test]
    fn test_scan_includes_diagnosis_names() {
        use crate::entities::{Diagnosis, DiagnosisStatus};
        let entities = ClinicalEntities {
            diagnoses: vec![Diagnosis {
                name: "Pregnancy".to_string(),
                inferred_code: Some("Z33.1".to_string()),
                status: DiagnosisStatus::Active,
                severity: None,
                confidence: 0.9,
            }],
            ..Default::default()
        };
        let records = scan_exclusions(&entities, "routine visit");
        let pregnancy = records
            .iter()
            .find(|r| r.exclusion_type == ExclusionCategory::Pregnancy)
            .unwrap();
        assert!(pregnancy.present);
        assert!(is_excluded(&records, "CDC"));
        assert!(!is_excluded(&records, "BCS"));
    }
}
