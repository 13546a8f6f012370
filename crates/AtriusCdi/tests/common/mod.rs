use atrius_cdi_lib::entities::Gender;
use atrius_cdi_lib::ExtractionOptions;

/// Reference note used across the integration suites.
pub const DIABETES_NOTE: &str = "65-year-old male with Type 2 diabetes. A1C 8.5%. BP 148/92.";

/// Hospice patient with advanced illness, due (but not screened) for
/// breast cancer screening.
pub const HOSPICE_NOTE: &str = "60-year-old female enrolled in hospice care. \
     Metastatic cancer. Patient is due for mammogram.";

pub fn options_with(age: u32, gender: Gender) -> ExtractionOptions {
    ExtractionOptions {
        patient_age: Some(age),
        patient_gender: Some(gender),
        ..Default::default()
    }
}
