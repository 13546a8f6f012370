//! # Clinical Documentation Integrity (CDI) Engine
//!
//! This crate extracts structured clinical facts from free-text
//! physician notes and evaluates them against a fixed catalogue of
//! quality and documentation rules, producing:
//!
//! - **Structured entities** - diagnoses, medications, vitals, labs,
//!   screenings, procedures, demographics ([`ClinicalEntities`])
//! - **Measure verdicts** - per-measure compliance status with exclusion
//!   handling and an overall compliance rate ([`MeasureReport`])
//! - **Documentation gaps** - prioritized completeness findings, some
//!   carrying quality or revenue impact ([`GapAnalysis`])
//! - **Physician queries** - non-leading clarification requests
//!   ([`QueryBundle`])
//!
//! ## Pipeline
//!
//! ```text
//! note text -> extractor -> ClinicalEntities -> { evaluator, gap analyzer }
//!                                                       |
//!                                          gap analysis -> query generator
//! ```
//!
//! Every stage is a pure, synchronous transformation over immutable
//! inputs: no I/O, no shared mutable state, no cross-request state. The
//! rule tables (terminology, measure catalogue, exclusion table,
//! clinical bands) are read-only statics initialized once per process.
//! Identical inputs produce byte-identical output, so callers are free
//! to cache results and to run one invocation per worker without
//! coordination.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atrius_cdi_lib::{process_note, PipelineOptions};
//!
//! # fn main() -> Result<(), atrius_cdi_lib::CdiError> {
//! let note = "65-year-old male with Type 2 diabetes. A1C 8.5%. BP 148/92.";
//! let report = process_note(note, &PipelineOptions::default())?;
//!
//! assert!(report.entities.labs.hba1c.is_some());
//! for measure in &report.measures.measures {
//!     println!("{}: {:?}", measure.measure_id, measure.status);
//! }
//! for query in &report.queries.queries {
//!     println!("[{}] {}", query.query_id, query.query_text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The stages can equally be called individually
//! ([`extract_entities`], [`evaluate_measures`], [`analyze_gaps`],
//! [`generate_from_gaps`]) when an adapter only needs part of the
//! pipeline.
//!
//! ## Error handling
//!
//! Only a note with no text fails ([`CdiError::EmptyNote`]). Everything
//! else degrades: a value that does not parse (or parses implausibly) is
//! simply absent, a measure without data resolves to `not_met` with
//! `documented = false`, and an empty gap list yields an empty query
//! bundle.

pub mod entities;
pub mod evaluator;
pub mod exclusions;
pub mod extractor;
pub mod gap_analysis;
pub mod measures;
pub mod query_generator;
pub mod terminology;
pub mod value_parser;

pub use atrius_cdi_support::{CdiError, CdiResult};
pub use entities::ClinicalEntities;
pub use evaluator::{evaluate_measures, EvaluationOptions, MeasureReport, MeasureStatus};
pub use extractor::{extract_entities, ExtractionOptions};
pub use gap_analysis::{analyze_gaps, DocumentationGap, GapAnalysis};
pub use query_generator::{
    generate_condition_query, generate_from_gaps, CdiQuery, QueryBundle, QueryOptions, QueryType,
};

use serde::{Deserialize, Serialize};

/// Options for one full pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    pub extraction: ExtractionOptions,
    pub evaluation: EvaluationOptions,
    pub query: QueryOptions,
}

/// All four pipeline artifacts for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub entities: ClinicalEntities,
    pub measures: MeasureReport,
    pub gaps: GapAnalysis,
    pub queries: QueryBundle,
}

/// Runs the full pipeline: extract, evaluate, analyze, generate.
///
/// Fails only when `note_text` is empty; every other anomaly degrades
/// to a partial result inside the corresponding bundle.
pub fn process_note(note_text: &str, options: &PipelineOptions) -> CdiResult<PipelineReport> {
    let entities = extract_entities(note_text, &options.extraction)?;
    let measures = evaluate_measures(&entities, note_text, &options.evaluation);
    let gaps = analyze_gaps(&entities, Some(&measures));
    let queries = generate_from_gaps(&gaps, &options.query);
    Ok(PipelineReport {
        entities,
        measures,
        gaps,
        queries,
    })
}
