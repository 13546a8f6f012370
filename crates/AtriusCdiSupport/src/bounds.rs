//! Physiological plausibility bounds for parsed clinical values
//!
//! Every numeric value extracted from note text is checked against the
//! range for its field before it is stored in an entity bundle. A value
//! outside its range is treated as a parse miss, never as an error.

/// Identifies a clinical measurement field for bound checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementField {
    Systolic,
    Diastolic,
    HeartRate,
    /// Body temperature in degrees Celsius
    TemperatureCelsius,
    /// Body temperature in degrees Fahrenheit
    TemperatureFahrenheit,
    RespiratoryRate,
    Spo2,
    WeightKg,
    WeightLb,
    HeightCm,
    Bmi,
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
    Age,
}

/// Inclusive plausibility range for one measurement field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysiologicalRange {
    pub min: f64,
    pub max: f64,
}

impl PhysiologicalRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Returns the plausibility range for a measurement field.
pub fn range_for(field: MeasurementField) -> PhysiologicalRange {
    use MeasurementField::*;
    let (min, max) = match field {
        Systolic => (40.0, 300.0),
        Diastolic => (20.0, 200.0),
        HeartRate => (20.0, 300.0),
        TemperatureCelsius => (30.0, 45.0),
        TemperatureFahrenheit => (86.0, 113.0),
        RespiratoryRate => (4.0, 80.0),
        Spo2 => (50.0, 100.0),
        WeightKg => (1.0, 500.0),
        WeightLb => (2.0, 1100.0),
        HeightCm => (30.0, 260.0),
        Bmi => (8.0, 100.0),
        Hba1c => (3.0, 20.0),
        Ldl => (10.0, 500.0),
        Glucose => (20.0, 1000.0),
        Creatinine => (0.1, 25.0),
        Egfr => (1.0, 200.0),
        Potassium => (1.0, 10.0),
        Sodium => (100.0, 180.0),
        Hemoglobin => (3.0, 25.0),
        Wbc => (0.1, 200.0),
        Platelets => (1.0, 2000.0),
        Age => (0.0, 130.0),
    };
    PhysiologicalRange { min, max }
}

/// Bound-checks a candidate value, returning it unchanged when plausible.
///
/// Returns `None` for implausible values so the caller can treat the match
/// as absent rather than storing a partially-parsed result.
pub fn validate(field: MeasurementField, value: f64) -> Option<f64> {
    if range_for(field).contains(value) {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_systolic_bounds() {
        assert_eq!(validate(MeasurementField::Systolic, 148.0), Some(148.0));
        assert_eq!(validate(MeasurementField::Systolic, 39.0), None);
        assert_eq!(validate(MeasurementField::Systolic, 301.0), None);
        // boundary values are accepted
        assert_eq!(validate(MeasurementField::Systolic, 40.0), Some(40.0));
        assert_eq!(validate(MeasurementField::Systolic, 300.0), Some(300.0));
    }

    #[test]
    fn test_lab_bounds() {
        assert_eq!(validate(MeasurementField::Hba1c, 8.5), Some(8.5));
        assert_eq!(validate(MeasurementField::Hba1c, 45.0), None);
        assert_eq!(validate(MeasurementField::Creatinine, 1.4), Some(1.4));
        assert_eq!(validate(MeasurementField::Creatinine, 0.0), None);
    }

    #[test]
    fn test_weight_units_have_distinct_ranges() {
        assert_eq!(validate(MeasurementField::WeightKg, 620.0), None);
        assert_eq!(validate(MeasurementField::WeightLb, 620.0), Some(620.0));
    }
}
