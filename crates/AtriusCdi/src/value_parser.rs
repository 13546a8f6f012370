//! Clinical measurement value parsers
//!
//! Each parser takes raw note text and returns the first plausible match
//! for its measurement, or `None`. A non-match or an implausible match is
//! never an error; absence of a value is a valid, common outcome that
//! must not abort extraction of the remaining fields.
//!
//! Parsers recognize common clinical shorthand ("BP 148/92", "A1C 8.5%",
//! "Cr 1.4") via compiled patterns, bound-check every candidate against
//! the plausibility table in `atrius-cdi-support`, and tag values whose
//! unit is ambiguous in the wild (weight kg/lb, temperature C/F).

use atrius_cdi_support::bounds::{self, MeasurementField};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::entities::{Gender, TemperatureUnit, WeightUnit};

/// A parsed, bound-checked measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedValue {
    pub value: f64,
    pub unit: Option<&'static str>,
    /// Pattern-tier confidence in [0, 1]; labeled shorthand scores higher
    /// than contextual matches
    pub confidence: f64,
}

/// A parsed blood pressure reading. Both components have passed bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodPressureReading {
    pub systolic: f64,
    pub diastolic: f64,
    pub confidence: f64,
}

/// A parsed body weight with its documented unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedWeight {
    pub value: f64,
    pub unit: WeightUnit,
    pub confidence: f64,
}

/// A parsed body temperature with its documented or inferred unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedTemperature {
    pub value: f64,
    pub unit: TemperatureUnit,
    pub confidence: f64,
}

// Optional connector between a label and its value ("A1C of 8.5",
// "BP: 148/92", "glucose was 132").
const SEP: &str = r"\s*(?:of|is|was|:|=)?\s*";

fn pattern(body: &str) -> Regex {
    Regex::new(&format!("(?i){}", body)).expect("static clinical pattern compiles")
}

/// Scans `text` with `re`, returning the first capture-1 value that
/// passes the bounds for `field`.
fn first_plausible(
    re: &Regex,
    text: &str,
    field: MeasurementField,
    confidence: f64,
    unit: Option<&'static str>,
) -> Option<ParsedValue> {
    for caps in re.captures_iter(text) {
        if let Ok(candidate) = caps[1].parse::<f64>() {
            if let Some(value) = bounds::validate(field, candidate) {
                return Some(ParsedValue {
                    value,
                    unit,
                    confidence,
                });
            }
        }
    }
    None
}

static BP_LABELED: Lazy<Regex> =
    Lazy::new(|| pattern(&format!(r"\b(?:bp|b/p|blood\s+pressure){SEP}(\d{{2,3}})\s*/\s*(\d{{2,3}})\b")));
static BP_WITH_UNIT: Lazy<Regex> =
    Lazy::new(|| pattern(r"\b(\d{2,3})\s*/\s*(\d{2,3})\s*mm\s*hg\b"));

/// Parses a blood pressure reading ("BP 148/92", "148/92 mmHg").
///
/// Both components must be plausible; a reading with either component out
/// of range is skipped and scanning continues.
pub fn parse_blood_pressure(text: &str) -> Option<BloodPressureReading> {
    for (re, confidence) in [(&*BP_LABELED, 0.95), (&*BP_WITH_UNIT, 0.9)] {
        for caps in re.captures_iter(text) {
            let systolic = caps[1].parse::<f64>().ok();
            let diastolic = caps[2].parse::<f64>().ok();
            if let (Some(s), Some(d)) = (systolic, diastolic) {
                let s = bounds::validate(MeasurementField::Systolic, s);
                let d = bounds::validate(MeasurementField::Diastolic, d);
                if let (Some(systolic), Some(diastolic)) = (s, d) {
                    return Some(BloodPressureReading {
                        systolic,
                        diastolic,
                        confidence,
                    });
                }
            }
        }
    }
    None
}

static HBA1C: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:hb\s*a1c|hba1c|a1c|hemoglobin\s+a1c|glycated\s+hemoglobin){SEP}(\d{{1,2}}(?:\.\d+)?)\s*%?"
    ))
});

/// Parses an HbA1c percentage ("A1C 8.5%", "HbA1c of 7.2").
pub fn parse_hba1c(text: &str) -> Option<ParsedValue> {
    first_plausible(&HBA1C, text, MeasurementField::Hba1c, 0.95, Some("%"))
}

static LDL: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\bldl(?:-c|\s+cholesterol)?{SEP}(\d{{1,3}}(?:\.\d+)?)"
    ))
});

/// Parses an LDL cholesterol value in mg/dL.
pub fn parse_ldl(text: &str) -> Option<ParsedValue> {
    first_plausible(&LDL, text, MeasurementField::Ldl, 0.9, Some("mg/dL"))
}

static GLUCOSE_FASTING: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:fasting\s+(?:blood\s+)?glucose|fbg|fbs|fpg){SEP}(\d{{2,4}}(?:\.\d+)?)"
    ))
});
static GLUCOSE_GENERAL: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:glucose|blood\s+sugar){SEP}(\d{{2,4}}(?:\.\d+)?)"
    ))
});

/// Parses a glucose value in mg/dL; explicit fasting labels score higher.
pub fn parse_glucose(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &GLUCOSE_FASTING,
        text,
        MeasurementField::Glucose,
        0.95,
        Some("mg/dL"),
    )
    .or_else(|| {
        first_plausible(
            &GLUCOSE_GENERAL,
            text,
            MeasurementField::Glucose,
            0.85,
            Some("mg/dL"),
        )
    })
}

static CREATININE: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:serum\s+creatinine|creatinine|cr){SEP}(\d{{1,2}}(?:\.\d+)?)"
    ))
});

/// Parses a serum creatinine in mg/dL ("Cr 1.4").
pub fn parse_creatinine(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &CREATININE,
        text,
        MeasurementField::Creatinine,
        0.9,
        Some("mg/dL"),
    )
}

static EGFR: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(r"\be?gfr{SEP}[<>]?\s*(\d{{1,3}}(?:\.\d+)?)"))
});

/// Parses an eGFR in mL/min/1.73m2 ("eGFR 52", "GFR > 60").
pub fn parse_egfr(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &EGFR,
        text,
        MeasurementField::Egfr,
        0.9,
        Some("mL/min/1.73m2"),
    )
}

static BMI: Lazy<Regex> =
    Lazy::new(|| pattern(&format!(r"\bbmi{SEP}(\d{{1,2}}(?:\.\d+)?)")));

/// Parses a body mass index ("BMI 31.4").
pub fn parse_bmi(text: &str) -> Option<ParsedValue> {
    first_plausible(&BMI, text, MeasurementField::Bmi, 0.95, Some("kg/m2"))
}

static HEART_RATE: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(r"\b(?:heart\s+rate|hr|pulse){SEP}(\d{{2,3}})\b"))
});

/// Parses a heart rate in beats per minute.
pub fn parse_heart_rate(text: &str) -> Option<ParsedValue> {
    first_plausible(&HEART_RATE, text, MeasurementField::HeartRate, 0.9, Some("bpm"))
}

static TEMPERATURE: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:temperature|temp){SEP}(\d{{2,3}}(?:\.\d+)?)(?:\s*(?:°|deg(?:rees)?)?\s*([cf])\b)?"
    ))
});

/// Parses a body temperature, tagging Celsius vs Fahrenheit.
///
/// When the unit is not written out it is inferred from magnitude: a
/// plausible Celsius reading never reaches 80.
pub fn parse_temperature(text: &str) -> Option<ParsedTemperature> {
    for caps in TEMPERATURE.captures_iter(text) {
        let Ok(candidate) = caps[1].parse::<f64>() else {
            continue;
        };
        let (unit, field, confidence) = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
            Some(u) if u == "c" => (TemperatureUnit::Celsius, MeasurementField::TemperatureCelsius, 0.95),
            Some(_) => (
                TemperatureUnit::Fahrenheit,
                MeasurementField::TemperatureFahrenheit,
                0.95,
            ),
            None if candidate >= 80.0 => (
                TemperatureUnit::Fahrenheit,
                MeasurementField::TemperatureFahrenheit,
                0.85,
            ),
            None => (TemperatureUnit::Celsius, MeasurementField::TemperatureCelsius, 0.85),
        };
        if let Some(value) = bounds::validate(field, candidate) {
            return Some(ParsedTemperature {
                value,
                unit,
                confidence,
            });
        }
    }
    None
}

static RESPIRATORY_RATE: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:respiratory\s+rate|resp\s+rate|rr){SEP}(\d{{1,2}})\b"
    ))
});

/// Parses a respiratory rate in breaths per minute.
pub fn parse_respiratory_rate(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &RESPIRATORY_RATE,
        text,
        MeasurementField::RespiratoryRate,
        0.9,
        Some("breaths/min"),
    )
}

static SPO2: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:spo2|sp\s*o2|o2\s+sat(?:uration)?|oxygen\s+saturation|sao2){SEP}(\d{{2,3}})\s*%?"
    ))
});

/// Parses an oxygen saturation percentage.
pub fn parse_spo2(text: &str) -> Option<ParsedValue> {
    first_plausible(&SPO2, text, MeasurementField::Spo2, 0.9, Some("%"))
}

static WEIGHT: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:weight|wt){SEP}(\d{{1,4}}(?:\.\d+)?)\s*(kg|kilograms?|lbs?|pounds?)\b"
    ))
});

/// Parses a body weight; the unit must be documented so kg and lb stay
/// distinguishable in the bundle.
pub fn parse_weight(text: &str) -> Option<ParsedWeight> {
    for caps in WEIGHT.captures_iter(text) {
        let Ok(candidate) = caps[1].parse::<f64>() else {
            continue;
        };
        let unit_text = caps[2].to_lowercase();
        let (unit, field) = if unit_text.starts_with("k") {
            (WeightUnit::Kg, MeasurementField::WeightKg)
        } else {
            (WeightUnit::Lb, MeasurementField::WeightLb)
        };
        if let Some(value) = bounds::validate(field, candidate) {
            return Some(ParsedWeight {
                value,
                unit,
                confidence: 0.95,
            });
        }
    }
    None
}

static HEIGHT_CM: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:height|ht){SEP}(\d{{2,3}}(?:\.\d+)?)\s*(?:cm|centimeters?)\b"
    ))
});
static HEIGHT_FT_IN: Lazy<Regex> =
    Lazy::new(|| pattern(r#"\b(\d)\s*(?:'|ft)\s*(\d{1,2})\s*(?:"|in\b)?"#));

/// Parses a height, normalized to centimeters.
pub fn parse_height(text: &str) -> Option<ParsedValue> {
    if let Some(v) = first_plausible(&HEIGHT_CM, text, MeasurementField::HeightCm, 0.95, Some("cm"))
    {
        return Some(v);
    }
    for caps in HEIGHT_FT_IN.captures_iter(text) {
        let feet = caps[1].parse::<f64>().ok();
        let inches = caps[2].parse::<f64>().ok();
        if let (Some(feet), Some(inches)) = (feet, inches) {
            let cm = (feet * 12.0 + inches) * 2.54;
            if let Some(value) = bounds::validate(MeasurementField::HeightCm, cm) {
                return Some(ParsedValue {
                    value,
                    unit: Some("cm"),
                    confidence: 0.85,
                });
            }
        }
    }
    None
}

static POTASSIUM_LABELED: Lazy<Regex> =
    Lazy::new(|| pattern(&format!(r"\bpotassium{SEP}(\d(?:\.\d+)?)\b")));
static POTASSIUM_SHORT: Lazy<Regex> =
    Lazy::new(|| pattern(r"\bk\s*[:=+]\s*(\d(?:\.\d+)?)\b"));

/// Parses a serum potassium in mEq/L.
pub fn parse_potassium(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &POTASSIUM_LABELED,
        text,
        MeasurementField::Potassium,
        0.95,
        Some("mEq/L"),
    )
    .or_else(|| {
        first_plausible(
            &POTASSIUM_SHORT,
            text,
            MeasurementField::Potassium,
            0.85,
            Some("mEq/L"),
        )
    })
}

static SODIUM_LABELED: Lazy<Regex> =
    Lazy::new(|| pattern(&format!(r"\bsodium{SEP}(\d{{3}})\b")));
static SODIUM_SHORT: Lazy<Regex> = Lazy::new(|| pattern(r"\bna\s*[:=]\s*(\d{3})\b"));

/// Parses a serum sodium in mEq/L.
pub fn parse_sodium(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &SODIUM_LABELED,
        text,
        MeasurementField::Sodium,
        0.95,
        Some("mEq/L"),
    )
    .or_else(|| {
        first_plausible(
            &SODIUM_SHORT,
            text,
            MeasurementField::Sodium,
            0.85,
            Some("mEq/L"),
        )
    })
}

static HEMOGLOBIN: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:hemoglobin|haemoglobin|hgb|hb){SEP}(\d{{1,2}}(?:\.\d+)?)\b"
    ))
});

/// Parses a hemoglobin in g/dL. Does not fire on "HbA1c"; the glycated
/// label is consumed by [`parse_hba1c`] and never followed directly by a
/// bare number here.
pub fn parse_hemoglobin(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &HEMOGLOBIN,
        text,
        MeasurementField::Hemoglobin,
        0.9,
        Some("g/dL"),
    )
}

static WBC: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(
        r"\b(?:wbc|white\s+(?:blood\s+)?cell\s+count|leukocytes){SEP}(\d{{1,3}}(?:\.\d+)?)"
    ))
});

/// Parses a white blood cell count in 10^3/uL.
pub fn parse_wbc(text: &str) -> Option<ParsedValue> {
    first_plausible(&WBC, text, MeasurementField::Wbc, 0.9, Some("10^3/uL"))
}

static PLATELETS: Lazy<Regex> = Lazy::new(|| {
    pattern(&format!(r"\b(?:platelets?|plt){SEP}(\d{{1,4}}(?:\.\d+)?)"))
});

/// Parses a platelet count in 10^3/uL.
pub fn parse_platelets(text: &str) -> Option<ParsedValue> {
    first_plausible(
        &PLATELETS,
        text,
        MeasurementField::Platelets,
        0.9,
        Some("10^3/uL"),
    )
}

static AGE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(\d{1,3})\s*(?:-\s*)?(?:year[-\s]?old|y\.?o\.?\b|yr\s+old)")
});
static AGE_LABELED: Lazy<Regex> = Lazy::new(|| pattern(r"\bage\s*[:=]?\s*(\d{1,3})\b"));

/// Parses patient age from phrasing like "65-year-old" or "Age: 65".
pub fn parse_age(text: &str) -> Option<(u32, f64)> {
    for (re, confidence) in [(&*AGE_PHRASE, 0.95), (&*AGE_LABELED, 0.9)] {
        for caps in re.captures_iter(text) {
            if let Ok(candidate) = caps[1].parse::<f64>() {
                if let Some(age) = bounds::validate(MeasurementField::Age, candidate) {
                    return Some((age as u32, confidence));
                }
            }
        }
    }
    None
}

static GENDER_LABELED: Lazy<Regex> =
    Lazy::new(|| pattern(r"\b(?:gender|sex)\s*[:=]?\s*(male|female|m|f)\b"));
static GENDER_PHRASE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(?:year[-\s]?old|y\.?o\.?)\s+(male|female|man|woman|gentleman|lady)\b")
});
static GENDER_PATIENT: Lazy<Regex> =
    Lazy::new(|| pattern(r"\b(male|female)\s+patient\b"));

fn gender_from_word(word: &str) -> Gender {
    match word.to_lowercase().as_str() {
        "male" | "m" | "man" | "gentleman" => Gender::Male,
        _ => Gender::Female,
    }
}

/// Parses patient gender from demographic phrasing.
pub fn parse_gender(text: &str) -> Option<(Gender, f64)> {
    for (re, confidence) in [
        (&*GENDER_LABELED, 0.95),
        (&*GENDER_PHRASE, 0.9),
        (&*GENDER_PATIENT, 0.85),
    ] {
        if let Some(caps) = re.captures(text) {
            return Some((gender_from_word(&caps[1]), confidence));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blood_pressure_shorthand() {
        let reading = parse_blood_pressure("BP 148/92, HR 78").unwrap();
        assert_eq!(reading.systolic, 148.0);
        assert_eq!(reading.diastolic, 92.0);
        assert!(reading.confidence > 0.9);
    }

    #[test]
    fn test_parse_blood_pressure_with_unit_only() {
        let reading = parse_blood_pressure("Readings today were 132/84 mmHg.").unwrap();
        assert_eq!(reading.systolic, 132.0);
        assert_eq!(reading.diastolic, 84.0);
    }

    #[test]
    fn test_parse_blood_pressure_rejects_implausible() {
        // systolic of 20 fails bounds; the date fragment must not match
        assert_eq!(parse_blood_pressure("BP 20/900 today"), None);
        assert_eq!(parse_blood_pressure("no pressure documented"), None);
    }

    #[test]
    fn test_parse_hba1c_variants() {
        assert_eq!(parse_hba1c("A1C 8.5%").unwrap().value, 8.5);
        assert_eq!(parse_hba1c("HbA1c of 7.2").unwrap().value, 7.2);
        assert_eq!(parse_hba1c("hemoglobin A1c: 6.9%").unwrap().value, 6.9);
        assert_eq!(parse_hba1c("A1C 45%"), None);
    }

    #[test]
    fn test_parse_creatinine_shorthand() {
        assert_eq!(parse_creatinine("Cr 1.4").unwrap().value, 1.4);
        assert_eq!(parse_creatinine("serum creatinine was 2.1").unwrap().value, 2.1);
    }

    #[test]
    fn test_parse_weight_requires_and_tags_unit() {
        let w = parse_weight("Weight: 210 lbs").unwrap();
        assert_eq!(w.unit, WeightUnit::Lb);
        assert_eq!(w.value, 210.0);
        let w = parse_weight("wt 95.5 kg").unwrap();
        assert_eq!(w.unit, WeightUnit::Kg);
        // no unit documented: ambiguous, so no value is stored
        assert_eq!(parse_weight("Weight 210"), None);
    }

    #[test]
    fn test_parse_temperature_infers_unit_from_magnitude() {
        let t = parse_temperature("Temp 98.6").unwrap();
        assert_eq!(t.unit, TemperatureUnit::Fahrenheit);
        let t = parse_temperature("temperature 37.2").unwrap();
        assert_eq!(t.unit, TemperatureUnit::Celsius);
        let t = parse_temperature("Temp 101.2 F").unwrap();
        assert_eq!(t.unit, TemperatureUnit::Fahrenheit);
        assert!(t.confidence > 0.9);
    }

    #[test]
    fn test_parse_hemoglobin_does_not_fire_on_a1c() {
        assert_eq!(parse_hemoglobin("HbA1c 8.5%"), None);
        assert_eq!(parse_hemoglobin("Hgb 10.2 g/dL").unwrap().value, 10.2);
    }

    #[test]
    fn test_parse_age_and_gender_phrase() {
        let (age, _) = parse_age("65-year-old male with diabetes").unwrap();
        assert_eq!(age, 65);
        let (gender, _) = parse_gender("65-year-old male with diabetes").unwrap();
        assert_eq!(gender, Gender::Male);
        let (gender, _) = parse_gender("72 yo woman, here for follow-up").unwrap();
        assert_eq!(gender, Gender::Female);
    }

    #[test]
    fn test_parse_height_feet_inches() {
        let h = parse_height(r#"Height 5'10""#).unwrap();
        assert!((h.value - 177.8).abs() < 0.1);
        assert_eq!(parse_height("height 172 cm").unwrap().value, 172.0);
    }

    #[test]
    fn test_parse_egfr_with_comparator() {
        assert_eq!(parse_egfr("eGFR > 60").unwrap().value, 60.0);
        assert_eq!(parse_egfr("egfr 52").unwrap().value, 52.0);
    }
}
