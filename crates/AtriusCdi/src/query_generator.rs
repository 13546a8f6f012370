//! CDI query generator
//!
//! Converts documentation gaps (or an explicit condition plus its
//! indicators) into non-leading physician queries. Templates reference
//! only clinical indicator text already present in the note; candidate
//! diagnoses appear exclusively inside a qualified options clause
//! ("options to consider include: ...") and are never asserted as fact.
//!
//! Ordering: queries are sorted urgent > high > routine, ties broken by
//! the gap analyzer's original ordering (stable sort), then truncated to
//! `max_queries`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gap_analysis::{DocumentationGap, GapAnalysis, GapCategory, GapPriority};

/// The clarification a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Specificity,
    ClinicalValidation,
    CauseAndEffect,
    MissingDocumentation,
    Acuity,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Specificity => "specificity",
            QueryType::ClinicalValidation => "clinical_validation",
            QueryType::CauseAndEffect => "cause_and_effect",
            QueryType::MissingDocumentation => "missing_documentation",
            QueryType::Acuity => "acuity",
        }
    }
}

/// Query priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPriority {
    Urgent,
    High,
    Routine,
}

impl QueryPriority {
    pub fn rank(&self) -> u8 {
        match self {
            QueryPriority::Urgent => 0,
            QueryPriority::High => 1,
            QueryPriority::Routine => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryPriority::Urgent => "urgent",
            QueryPriority::High => "high",
            QueryPriority::Routine => "routine",
        }
    }
}

/// One physician-facing clarification query: the terminal artifact of
/// the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdiQuery {
    pub query_id: String,
    pub query_type: QueryType,
    pub priority: QueryPriority,
    pub query_text: String,
    pub clinical_indicator: String,
    pub supporting_evidence: Vec<String>,
    /// Candidate diagnoses offered only as options, never asserted
    pub potential_diagnoses: Vec<String>,
    pub documentation_needed: String,
    pub confidence: f64,
}

/// Aggregate counters for the query bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub total_queries: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub urgent_count: usize,
}

/// The query bundle for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryBundle {
    pub queries: Vec<CdiQuery>,
    pub summary: QuerySummary,
}

/// Caller options for query generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    /// Upper bound on emitted queries; 0 yields an empty bundle
    pub max_queries: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions { max_queries: 10 }
    }
}

/// Candidate diagnoses per clinical-validation indicator. Listed here,
/// not in gap descriptions, so candidates only ever surface inside the
/// qualified options clause.
static INDICATOR_CANDIDATES: &[(&str, &[&str])] = &[
    ("elevated fasting glucose", &["type 2 diabetes mellitus", "impaired fasting glucose"]),
    ("elevated HbA1c", &["type 2 diabetes mellitus", "prediabetes"]),
    ("elevated blood pressure reading", &["essential hypertension"]),
    ("reduced eGFR", &["chronic kidney disease"]),
    ("low hemoglobin", &["anemia"]),
    ("BMI in the obese range", &["obesity"]),
];

fn candidates_for(indicator: &str) -> Vec<String> {
    INDICATOR_CANDIDATES
        .iter()
        .find(|(key, _)| *key == indicator)
        .map(|(_, list)| list.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default()
}

fn query_type_for(category: GapCategory) -> QueryType {
    match category {
        GapCategory::Specificity => QueryType::Specificity,
        GapCategory::Acuity => QueryType::Acuity,
        GapCategory::Linkage => QueryType::CauseAndEffect,
        GapCategory::ClinicalValidation => QueryType::ClinicalValidation,
        GapCategory::MissingVitals
        | GapCategory::MissingLabs
        | GapCategory::MissingScreening
        | GapCategory::HedisQuality => QueryType::MissingDocumentation,
    }
}

fn priority_for(priority: GapPriority) -> QueryPriority {
    match priority {
        GapPriority::Critical => QueryPriority::Urgent,
        GapPriority::High => QueryPriority::High,
        GapPriority::Medium | GapPriority::Low => QueryPriority::Routine,
    }
}

/// Qualified options clause; the only place candidate diagnoses may
/// appear in query text.
fn options_clause(candidates: &[String]) -> String {
    if candidates.is_empty() {
        return String::new();
    }
    format!(
        " Options to consider include: {}, another condition, or clinically undetermined.",
        candidates.join(", ")
    )
}

fn query_text(query_type: QueryType, indicator: &str, candidates: &[String]) -> String {
    let body = match query_type {
        QueryType::Specificity => format!(
            "The documentation references {}. In your clinical judgment, can this be further \
             specified? Please document the most specific supportable form, or indicate that no \
             further specificity is possible.",
            indicator
        ),
        QueryType::Acuity => format!(
            "The documentation references {} without acuity. Please clarify whether this is \
             acute, chronic, or acute on chronic, based on your clinical judgment.",
            indicator
        ),
        QueryType::CauseAndEffect => format!(
            "The documentation references {} together with related clinical findings. Please \
             clarify whether a causal relationship exists, or indicate that none can be \
             determined.",
            indicator
        ),
        QueryType::MissingDocumentation => format!(
            "The record associated with {} appears to be missing expected supporting \
             documentation. Please document the relevant findings, or indicate why they are not \
             applicable.",
            indicator
        ),
        QueryType::ClinicalValidation => format!(
            "The note documents {} without an associated diagnosis. In your clinical judgment, \
             is there an associated condition?",
            indicator
        ),
    };
    format!("{}{}", body, options_clause(candidates))
}

fn query_from_gap(gap: &DocumentationGap) -> CdiQuery {
    let query_type = query_type_for(gap.category);
    let candidates = candidates_for(&gap.clinical_indicator);
    CdiQuery {
        query_id: String::new(), // assigned after ordering
        query_type,
        priority: priority_for(gap.priority),
        query_text: query_text(query_type, &gap.clinical_indicator, &candidates),
        clinical_indicator: gap.clinical_indicator.clone(),
        supporting_evidence: vec![gap.description.clone()],
        potential_diagnoses: candidates,
        documentation_needed: gap.suggested_query.clone(),
        confidence: gap.confidence,
    }
}

fn summarize(queries: &[CdiQuery]) -> QuerySummary {
    let mut summary = QuerySummary {
        total_queries: queries.len(),
        ..Default::default()
    };
    for query in queries {
        *summary
            .by_type
            .entry(query.query_type.as_str().to_string())
            .or_insert(0) += 1;
        *summary
            .by_priority
            .entry(query.priority.as_str().to_string())
            .or_insert(0) += 1;
    }
    summary.urgent_count = summary.by_priority.get("urgent").copied().unwrap_or(0);
    summary
}

/// Generates the query bundle from a gap analysis.
pub fn generate_from_gaps(analysis: &GapAnalysis, options: &QueryOptions) -> QueryBundle {
    let mut queries: Vec<CdiQuery> = analysis.gaps.iter().map(query_from_gap).collect();

    // stable: the analyzer's gap ordering breaks priority ties
    queries.sort_by_key(|q| q.priority.rank());
    queries.truncate(options.max_queries);
    for (index, query) in queries.iter_mut().enumerate() {
        query.query_id = format!("CDI-{:03}", index + 1);
    }

    debug!(queries = queries.len(), "generated physician queries");

    let summary = summarize(&queries);
    QueryBundle { queries, summary }
}

/// Generates a single ad-hoc query for an explicit condition and its
/// documented indicators.
pub fn generate_condition_query(
    condition: &str,
    clinical_indicators: &[String],
    query_type: QueryType,
) -> CdiQuery {
    let indicator = if clinical_indicators.is_empty() {
        "the documented clinical findings".to_string()
    } else {
        clinical_indicators.join(", ")
    };
    let candidates = vec![condition.to_string()];
    let id_stub: String = condition
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(12)
        .collect::<String>()
        .to_uppercase();
    CdiQuery {
        query_id: format!("CDI-{}", id_stub),
        query_type,
        priority: if query_type == QueryType::ClinicalValidation {
            QueryPriority::High
        } else {
            QueryPriority::Routine
        },
        query_text: query_text(query_type, &indicator, &candidates),
        clinical_indicator: indicator,
        supporting_evidence: clinical_indicators.to_vec(),
        potential_diagnoses: candidates,
        documentation_needed: "Physician clarification".to_string(),
        confidence: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap_analysis::{GapCategory, GapPriority};

    fn gap(
        category: GapCategory,
        priority: GapPriority,
        indicator: &str,
    ) -> DocumentationGap {
        DocumentationGap {
            category,
            priority,
            title: format!("{} gap", indicator),
            description: format!("description for {}", indicator),
            clinical_indicator: indicator.to_string(),
            suggested_query: "please clarify".to_string(),
            revenue_impact: None,
            hedis_impact: None,
            confidence: 0.9,
        }
    }

    fn analysis(gaps: Vec<DocumentationGap>) -> GapAnalysis {
        GapAnalysis {
            gaps,
            summary: Default::default(),
        }
    }

    #[test]
    fn test_priority_mapping_and_truncation() {
        let analysis = analysis(vec![
            gap(GapCategory::Acuity, GapPriority::Critical, "heart failure"),
            gap(GapCategory::MissingLabs, GapPriority::High, "diabetes"),
            gap(GapCategory::MissingScreening, GapPriority::Medium, "eye exam"),
        ]);
        let bundle = generate_from_gaps(&analysis, &QueryOptions { max_queries: 2 });
        assert_eq!(bundle.queries.len(), 2);
        assert_eq!(bundle.queries[0].priority, QueryPriority::Urgent);
        assert_eq!(bundle.queries[1].priority, QueryPriority::High);
        // the routine item was the one truncated
        assert!(bundle
            .queries
            .iter()
            .all(|q| q.priority != QueryPriority::Routine));
        assert_eq!(bundle.queries[0].query_id, "CDI-001");
    }

    #[test]
    fn test_zero_max_queries_yields_empty_bundle() {
        let analysis = analysis(vec![gap(
            GapCategory::Specificity,
            GapPriority::High,
            "diabetes",
        )]);
        let bundle = generate_from_gaps(&analysis, &QueryOptions { max_queries: 0 });
        assert!(bundle.queries.is_empty());
        assert_eq!(bundle.summary.total_queries, 0);
    }

    #[test]
    fn test_candidates_only_inside_options_clause() {
        let analysis = analysis(vec![gap(
            GapCategory::ClinicalValidation,
            GapPriority::High,
            "elevated fasting glucose",
        )]);
        let bundle = generate_from_gaps(&analysis, &QueryOptions::default());
        let query = &bundle.queries[0];
        assert!(!query.potential_diagnoses.is_empty());
        let clause_start = query.query_text.find("include:").unwrap();
        for dx in &query.potential_diagnoses {
            let position = query.query_text.find(dx.as_str()).unwrap();
            assert!(
                position > clause_start,
                "diagnosis \"{}\" appears outside the options clause",
                dx
            );
        }
    }

    #[test]
    fn test_condition_query_is_non_leading() {
        let query = generate_condition_query(
            "type 2 diabetes mellitus",
            &["elevated fasting glucose".to_string(), "polyuria".to_string()],
            QueryType::ClinicalValidation,
        );
        assert_eq!(query.potential_diagnoses, vec!["type 2 diabetes mellitus"]);
        let clause_start = query.query_text.find("include:").unwrap();
        let position = query.query_text.find("type 2 diabetes mellitus").unwrap();
        assert!(position > clause_start);
        assert!(query.query_text.contains("elevated fasting glucose"));
    }

    #[test]
    fn test_summary_counters() {
        let analysis = analysis(vec![
            gap(GapCategory::Acuity, GapPriority::Critical, "heart failure"),
            gap(GapCategory::MissingLabs, GapPriority::High, "diabetes"),
        ]);
        let bundle = generate_from_gaps(&analysis, &QueryOptions::default());
        assert_eq!(bundle.summary.total_queries, 2);
        assert_eq!(bundle.summary.urgent_count, 1);
        assert_eq!(bundle.summary.by_type.get("acuity"), Some(&1));
        assert_eq!(
            bundle.summary.by_priority.get("high").copied().unwrap_or(0),
            1
        );
    }
}
