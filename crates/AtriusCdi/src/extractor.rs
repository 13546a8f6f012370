//! Clinical entity extractor
//!
//! Orchestrates the value parsers and the terminology matchers into one
//! [`ClinicalEntities`] bundle per note. Every parser and matcher runs
//! independently over the full note; a miss leaves its field unset and
//! never aborts the remaining categories. The only hard failure is a
//! note with no text at all.
//!
//! Extraction is a pure function of its inputs: identical text and
//! patient attributes always produce a bit-identical bundle.

use atrius_cdi_support::confidence;
use atrius_cdi_support::{CdiError, CdiResult};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::entities::{
    ClinicalEntities, Demographics, Diagnosis, DiagnosisStatus, Gender, LabResults, Medication,
    Procedure, ScreeningEvent, Screenings, VitalSigns,
};
use crate::terminology::{
    self, ScreeningType, CONDITION_VOCABULARY, EXACT_MATCH_CONFIDENCE, MEDICATION_VOCABULARY,
    PARTIAL_MATCH_CONFIDENCE, PROCEDURE_VOCABULARY, SCREENING_VOCABULARY, SOCIAL_HISTORY_TERMS,
    SYMPTOM_TERMS,
};
use crate::value_parser;

/// Caller-supplied extraction options: demographic overrides plus flags
/// selecting which entity categories to extract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionOptions {
    /// Known patient age; takes precedence over age parsed from the note
    pub patient_age: Option<u32>,
    /// Known patient gender; takes precedence over the note
    pub patient_gender: Option<Gender>,
    pub include_diagnoses: bool,
    pub include_medications: bool,
    pub include_vitals: bool,
    pub include_labs: bool,
    pub include_procedures: bool,
    pub include_screenings: bool,
    pub include_symptoms: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        ExtractionOptions {
            patient_age: None,
            patient_gender: None,
            include_diagnoses: true,
            include_medications: true,
            include_vitals: true,
            include_labs: true,
            include_procedures: true,
            include_screenings: true,
            include_symptoms: true,
        }
    }
}

/// Finds `term` in `haystack` at word boundaries, returning the byte
/// offset of the first bounded occurrence.
///
/// A plain substring search would fire inside longer words ("gad" in
/// "gadolinium"), so both neighbors must be non-alphanumeric.
fn find_term(haystack: &str, term: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(term) {
        let start = from + rel;
        let end = start + term.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == haystack.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(start);
        }
        // terms are ASCII, so start + 1 stays on a char boundary
        from = start + 1;
        if from >= haystack.len() {
            break;
        }
    }
    None
}

/// Char-boundary-safe window of up to `len` bytes ending at `end`.
fn window_before(text: &str, end: usize, len: usize) -> &str {
    let mut start = end.saturating_sub(len);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    &text[start..end]
}

/// Char-boundary-safe window of up to `len` bytes starting at `start`.
fn window_after(text: &str, start: usize, len: usize) -> &str {
    let mut end = (start + len).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

fn any_cue(window: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| window.contains(cue))
}

/// Resolves the documentation status of a diagnosis mention from the
/// text immediately before it. Returns `None` for negated mentions,
/// which are dropped entirely.
fn diagnosis_status(before: &str) -> Option<DiagnosisStatus> {
    if any_cue(before, terminology::NEGATION_CUES) {
        return None;
    }
    if any_cue(before, terminology::RULE_OUT_CUES) {
        return Some(DiagnosisStatus::RuleOut);
    }
    if any_cue(before, terminology::HISTORY_CUES) {
        return Some(DiagnosisStatus::HistoryOf);
    }
    if any_cue(before, terminology::RESOLVED_CUES) {
        return Some(DiagnosisStatus::Resolved);
    }
    if any_cue(before, terminology::CHRONIC_CUES) {
        return Some(DiagnosisStatus::ChronicStable);
    }
    Some(DiagnosisStatus::Active)
}

fn severity_qualifier(around: &str) -> Option<String> {
    terminology::SEVERITY_QUALIFIERS
        .iter()
        .find(|q| around.contains(*q))
        .map(|q| q.to_string())
}

fn match_diagnoses(lower: &str) -> Vec<Diagnosis> {
    let mut found: Vec<(usize, Diagnosis)> = Vec::new();
    for entry in CONDITION_VOCABULARY {
        let exact_hit = entry.exact.iter().find_map(|t| find_term(lower, t).map(|p| (p, *t)));
        let (position, term, match_confidence) = match exact_hit {
            Some((p, t)) => (p, t, EXACT_MATCH_CONFIDENCE),
            None => {
                match entry
                    .partial
                    .iter()
                    .find_map(|t| find_term(lower, t).map(|p| (p, *t)))
                {
                    Some((p, t)) => (p, t, PARTIAL_MATCH_CONFIDENCE),
                    None => continue,
                }
            }
        };
        let before = window_before(lower, position, 30);
        let Some(status) = diagnosis_status(before) else {
            continue;
        };
        let around = format!("{}{}", before, window_after(lower, position, 40 + term.len()));
        found.push((
            position,
            Diagnosis {
                name: entry.canonical.to_string(),
                inferred_code: Some(entry.icd10.to_string()),
                status,
                severity: severity_qualifier(&around),
                confidence: match_confidence,
            },
        ));
    }
    // a generic mention adds nothing next to its specific form
    let names: Vec<String> = found.iter().map(|(_, d)| d.name.clone()).collect();
    found.retain(|(_, d)| {
        CONDITION_VOCABULARY
            .iter()
            .find(|e| e.canonical == d.name)
            .map(|e| !e.subsumed_by.iter().any(|s| names.iter().any(|n| n == s)))
            .unwrap_or(true)
    });
    // note order, so output is deterministic and reads like the note
    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, d)| d).collect()
}

static DOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?\s*(?:mg|mcg|g|units?))\b").expect("static clinical pattern compiles"));
static FREQUENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(once daily|twice daily|three times daily|every morning|at bedtime|daily|nightly|weekly|bid|tid|qid|qd|qhs|prn)\b")
        .expect("static clinical pattern compiles")
});
static ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(by mouth|po|oral(?:ly)?|subcutaneous(?:ly)?|subq|intravenous|iv|im|topical|inhaled)\b")
        .expect("static clinical pattern compiles")
});

fn match_medications(lower: &str) -> Vec<Medication> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut found: Vec<(usize, Medication)> = Vec::new();
    for entry in MEDICATION_VOCABULARY {
        let Some((position, term)) = entry
            .terms
            .iter()
            .find_map(|t| find_term(lower, t).map(|p| (p, *t)))
        else {
            continue;
        };
        // "insulin" inside an already-matched "insulin glargine" adds nothing
        let end = position + term.len();
        if spans.iter().any(|&(s, e)| position >= s && end <= e) {
            continue;
        }
        spans.push((position, end));
        // sig details are documented right after the drug name when at all
        let sig = window_after(lower, position, 80);
        found.push((
            position,
            Medication {
                name: entry.canonical.to_string(),
                dose: DOSE.captures(sig).map(|c| c[1].to_string()),
                frequency: FREQUENCY.captures(sig).map(|c| c[1].to_string()),
                route: ROUTE.captures(sig).map(|c| c[1].to_string()),
            },
        ));
    }
    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, m)| m).collect()
}

fn match_procedures(lower: &str) -> Vec<Procedure> {
    let mut found: Vec<(usize, Procedure)> = Vec::new();
    for entry in PROCEDURE_VOCABULARY {
        let Some(position) = entry.terms.iter().find_map(|t| find_term(lower, t)) else {
            continue;
        };
        // an ordered or recommended procedure has not happened yet
        let before = window_before(lower, position, 30);
        if any_cue(before, terminology::SCREENING_PENDING_CUES)
            || any_cue(before, terminology::NEGATION_CUES)
        {
            continue;
        }
        found.push((
            position,
            Procedure {
                name: entry.canonical.to_string(),
                code: entry.cpt.map(|c| c.to_string()),
            },
        ));
    }
    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, p)| p).collect()
}

static DATE_MDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\b").expect("static clinical pattern compiles"));
static DATE_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b")
        .expect("static clinical pattern compiles")
});
static DATE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:in|from)\s+(\d{4})\b").expect("static clinical pattern compiles"));

fn month_number(name: &str) -> u32 {
    match name {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        _ => 12,
    }
}

fn plausible_year(year: i32) -> bool {
    (1950..=2035).contains(&year)
}

/// Parses a screening date from the text following its mention.
///
/// Handles "3/14/2023", "March 2023" (first of month) and "in 2023"
/// (first of year). Anything else leaves the event undated.
fn parse_screening_date(window: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_MDY.captures(window) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if year < 100 {
            year += 2000;
        }
        if plausible_year(year) {
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        return None;
    }
    if let Some(caps) = DATE_MONTH_YEAR.captures(window) {
        let month = month_number(&caps[1].to_lowercase());
        let year: i32 = caps[2].parse().ok()?;
        if plausible_year(year) {
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
        return None;
    }
    if let Some(caps) = DATE_YEAR.captures(window) {
        let year: i32 = caps[1].parse().ok()?;
        if plausible_year(year) {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    None
}

fn match_screenings(lower: &str) -> Screenings {
    let mut screenings = Screenings::default();
    for entry in SCREENING_VOCABULARY {
        let Some((position, term)) = entry
            .terms
            .iter()
            .find_map(|t| find_term(lower, t).map(|p| (p, *t)))
        else {
            continue;
        };
        let before = window_before(lower, position, 30);
        if any_cue(before, terminology::SCREENING_PENDING_CUES)
            || any_cue(before, terminology::NEGATION_CUES)
        {
            continue;
        }
        let after = window_after(lower, position + term.len(), 50);
        let event = ScreeningEvent::documented_on(parse_screening_date(after));
        let slot = match entry.screening {
            ScreeningType::Mammogram => &mut screenings.mammogram,
            ScreeningType::Colonoscopy => &mut screenings.colonoscopy,
            ScreeningType::CervicalCancer => &mut screenings.cervical_cancer,
            ScreeningType::DiabeticEye => &mut screenings.diabetic_eye,
            ScreeningType::DiabeticFoot => &mut screenings.diabetic_foot,
            ScreeningType::DepressionScreening => &mut screenings.depression_screening,
            ScreeningType::FitTest => &mut screenings.fit_test,
            ScreeningType::LungCancer => &mut screenings.lung_cancer,
        };
        if !slot.documented {
            *slot = event;
        }
    }
    screenings
}

/// Matches free-form terms, skipping any whose span sits inside an
/// already-matched longer term ("edema" inside "lower extremity edema")
/// and any mention the note explicitly denies.
fn match_phrases(lower: &str, terms: &[&str]) -> Vec<String> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut found: Vec<(usize, String)> = Vec::new();
    for term in terms {
        let Some(position) = find_term(lower, term) else {
            continue;
        };
        if any_cue(window_before(lower, position, 30), terminology::NEGATION_CUES) {
            continue;
        }
        let end = position + term.len();
        if spans.iter().any(|&(s, e)| position >= s && end <= e) {
            continue;
        }
        spans.push((position, end));
        found.push((position, term.to_string()));
    }
    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, t)| t).collect()
}

fn extract_vitals(text: &str) -> (VitalSigns, Vec<f64>) {
    let mut vitals = VitalSigns::default();
    let mut confidences = Vec::new();
    if let Some(bp) = value_parser::parse_blood_pressure(text) {
        vitals.systolic = Some(bp.systolic);
        vitals.diastolic = Some(bp.diastolic);
        confidences.push(bp.confidence);
    }
    if let Some(v) = value_parser::parse_heart_rate(text) {
        vitals.heart_rate = Some(v.value);
        confidences.push(v.confidence);
    }
    if let Some(t) = value_parser::parse_temperature(text) {
        vitals.temperature = Some(t.value);
        vitals.temperature_unit = Some(t.unit);
        confidences.push(t.confidence);
    }
    if let Some(v) = value_parser::parse_respiratory_rate(text) {
        vitals.respiratory_rate = Some(v.value);
        confidences.push(v.confidence);
    }
    if let Some(v) = value_parser::parse_spo2(text) {
        vitals.spo2 = Some(v.value);
        confidences.push(v.confidence);
    }
    if let Some(w) = value_parser::parse_weight(text) {
        vitals.weight = Some(w.value);
        vitals.weight_unit = Some(w.unit);
        confidences.push(w.confidence);
    }
    if let Some(v) = value_parser::parse_height(text) {
        vitals.height = Some(v.value);
        confidences.push(v.confidence);
    }
    if let Some(v) = value_parser::parse_bmi(text) {
        vitals.bmi = Some(v.value);
        confidences.push(v.confidence);
    }
    (vitals, confidences)
}

fn extract_labs(text: &str) -> (LabResults, Vec<f64>) {
    let mut labs = LabResults::default();
    let mut confidences = Vec::new();
    let mut take = |parsed: Option<value_parser::ParsedValue>, slot: &mut Option<f64>| {
        if let Some(v) = parsed {
            *slot = Some(v.value);
            confidences.push(v.confidence);
        }
    };
    take(value_parser::parse_hba1c(text), &mut labs.hba1c);
    take(value_parser::parse_ldl(text), &mut labs.ldl);
    take(value_parser::parse_glucose(text), &mut labs.glucose);
    take(value_parser::parse_creatinine(text), &mut labs.creatinine);
    take(value_parser::parse_egfr(text), &mut labs.egfr);
    take(value_parser::parse_potassium(text), &mut labs.potassium);
    take(value_parser::parse_sodium(text), &mut labs.sodium);
    take(value_parser::parse_hemoglobin(text), &mut labs.hemoglobin);
    take(value_parser::parse_wbc(text), &mut labs.wbc);
    take(value_parser::parse_platelets(text), &mut labs.platelets);
    (labs, confidences)
}

fn extract_demographics(text: &str, options: &ExtractionOptions) -> Demographics {
    let age = options
        .patient_age
        .or_else(|| value_parser::parse_age(text).map(|(age, _)| age));
    let gender = options
        .patient_gender
        .or_else(|| value_parser::parse_gender(text).map(|(gender, _)| gender));
    Demographics { age, gender }
}

/// Extracts one [`ClinicalEntities`] bundle from note text.
///
/// Every requested category is attempted independently; anomalies
/// degrade to partial results. The only error is empty note text.
pub fn extract_entities(
    note_text: &str,
    options: &ExtractionOptions,
) -> CdiResult<ClinicalEntities> {
    if note_text.trim().is_empty() {
        return Err(CdiError::EmptyNote);
    }
    let lower = note_text.to_lowercase();

    let mut entities = ClinicalEntities {
        demographics: extract_demographics(note_text, options),
        ..Default::default()
    };

    // per-category confidences for the overall score; empty categories
    // count against completeness rather than being skipped
    let mut requested = 0usize;
    let mut category_scores: Vec<f64> = Vec::new();
    let record = |scores: &mut Vec<f64>, requested: &mut usize, score: Option<f64>| {
        *requested += 1;
        if let Some(s) = score {
            scores.push(s);
        }
    };

    if options.include_vitals {
        let (vitals, confidences) = extract_vitals(note_text);
        entities.vitals = vitals;
        let score = (!confidences.is_empty()).then(|| confidence::mean(&confidences));
        record(&mut category_scores, &mut requested, score);
    }
    if options.include_labs {
        let (labs, confidences) = extract_labs(note_text);
        entities.labs = labs;
        let score = (!confidences.is_empty()).then(|| confidence::mean(&confidences));
        record(&mut category_scores, &mut requested, score);
    }
    if options.include_diagnoses {
        entities.diagnoses = match_diagnoses(&lower);
        let confidences: Vec<f64> = entities.diagnoses.iter().map(|d| d.confidence).collect();
        let score = (!confidences.is_empty()).then(|| confidence::mean(&confidences));
        record(&mut category_scores, &mut requested, score);
    }
    if options.include_medications {
        entities.medications = match_medications(&lower);
        let score = (!entities.medications.is_empty()).then_some(EXACT_MATCH_CONFIDENCE);
        record(&mut category_scores, &mut requested, score);
    }
    if options.include_procedures {
        entities.procedures = match_procedures(&lower);
        let score = (!entities.procedures.is_empty()).then_some(EXACT_MATCH_CONFIDENCE);
        record(&mut category_scores, &mut requested, score);
    }
    if options.include_screenings {
        entities.screenings = match_screenings(&lower);
        let any = entities.screenings != Screenings::default();
        let score = any.then_some(EXACT_MATCH_CONFIDENCE);
        record(&mut category_scores, &mut requested, score);
    }
    if options.include_symptoms {
        entities.symptoms = match_phrases(&lower, SYMPTOM_TERMS);
        entities.social_history = match_phrases(&lower, SOCIAL_HISTORY_TERMS);
        let any = !entities.symptoms.is_empty() || !entities.social_history.is_empty();
        let score = any.then_some(PARTIAL_MATCH_CONFIDENCE);
        record(&mut category_scores, &mut requested, score);
    }

    entities.extraction_confidence = confidence::completeness_mean(&category_scores, requested);

    debug!(
        diagnoses = entities.diagnoses.len(),
        medications = entities.medications.len(),
        confidence = entities.extraction_confidence,
        "extracted clinical entities"
    );
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_note_is_the_only_hard_error() {
        let options = ExtractionOptions::default();
        assert_eq!(
            extract_entities("   ", &options).unwrap_err(),
            CdiError::EmptyNote
        );
        // arbitrary text with nothing clinical still yields a bundle
        let bundle = extract_entities("Patient seen today.", &options).unwrap();
        assert!(bundle.diagnoses.is_empty());
    }

    #[test]
    fn test_reference_note_extraction() {
        let note = "65-year-old male with Type 2 diabetes. A1C 8.5%. BP 148/92.";
        let options = ExtractionOptions {
            patient_age: Some(65),
            patient_gender: Some(Gender::Male),
            ..Default::default()
        };
        let bundle = extract_entities(note, &options).unwrap();
        let diabetes: Vec<_> = bundle
            .diagnoses
            .iter()
            .filter(|d| d.name.to_lowercase().contains("diabetes"))
            .collect();
        assert_eq!(diabetes.len(), 1, "generic mention must be subsumed");
        assert_eq!(diabetes[0].name, "Type 2 diabetes mellitus");
        assert_eq!(bundle.labs.hba1c, Some(8.5));
        assert_eq!(bundle.vitals.systolic, Some(148.0));
        assert_eq!(bundle.vitals.diastolic, Some(92.0));
        assert_eq!(bundle.demographics.age, Some(65));
        assert_eq!(bundle.demographics.gender, Some(Gender::Male));
    }

    #[test]
    fn test_negated_diagnosis_is_dropped() {
        let options = ExtractionOptions::default();
        let bundle = extract_entities("Denies chest pain. No evidence of heart failure.", &options)
            .unwrap();
        assert!(!bundle.has_current_diagnosis("heart failure"));
        assert!(bundle.diagnoses.iter().all(|d| d.name != "Heart failure"));
    }

    #[test]
    fn test_history_of_is_not_current() {
        let options = ExtractionOptions::default();
        let bundle =
            extract_entities("History of stroke in 2019. Currently on aspirin.", &options).unwrap();
        let stroke = bundle
            .diagnoses
            .iter()
            .find(|d| d.name == "Cerebrovascular accident")
            .unwrap();
        assert_eq!(stroke.status, DiagnosisStatus::HistoryOf);
        assert!(!bundle.has_current_diagnosis("cerebrovascular"));
    }

    #[test]
    fn test_medication_sig_details() {
        let options = ExtractionOptions::default();
        let bundle = extract_entities(
            "Continue metformin 1000 mg twice daily po and lisinopril 20 mg daily.",
            &options,
        )
        .unwrap();
        let metformin = bundle
            .medications
            .iter()
            .find(|m| m.name == "metformin")
            .unwrap();
        assert_eq!(metformin.dose.as_deref(), Some("1000 mg"));
        assert_eq!(metformin.frequency.as_deref(), Some("twice daily"));
        assert_eq!(metformin.route.as_deref(), Some("po"));
    }

    #[test]
    fn test_screening_pending_is_not_documented() {
        let options = ExtractionOptions::default();
        let bundle = extract_entities("Patient is due for mammogram.", &options).unwrap();
        assert!(!bundle.screenings.mammogram.documented);
        let bundle =
            extract_entities("Screening mammogram 4/12/2023 was normal.", &options).unwrap();
        assert!(bundle.screenings.mammogram.documented);
        assert_eq!(
            bundle.screenings.mammogram.date,
            NaiveDate::from_ymd_opt(2023, 4, 12)
        );
    }

    #[test]
    fn test_category_flags_limit_extraction() {
        let note = "Type 2 diabetes on metformin. A1C 8.5%.";
        let options = ExtractionOptions {
            include_medications: false,
            ..Default::default()
        };
        let bundle = extract_entities(note, &options).unwrap();
        assert!(bundle.medications.is_empty());
        assert!(bundle.labs.hba1c.is_some());
    }

    #[test]
    fn test_determinism() {
        let note = "72 yo woman with CKD stage 3, eGFR 48, Cr 1.6. BP 136/82. On lisinopril.";
        let options = ExtractionOptions::default();
        let a = extract_entities(note, &options).unwrap();
        let b = extract_entities(note, &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
