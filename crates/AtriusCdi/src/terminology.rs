//! Static clinical vocabularies
//!
//! The terminology tables drive every non-numeric matcher in the
//! extractor: diagnoses (with ICD-10 hints), medications (with drug
//! class), procedures (with CPT hints), screening events, symptoms and
//! social history. Adding a term is a data change here, never a new
//! branch in the extractor.

/// Confidence assigned to an exact terminology match.
pub const EXACT_MATCH_CONFIDENCE: f64 = 0.9;
/// Confidence assigned to a partial / colloquial match.
pub const PARTIAL_MATCH_CONFIDENCE: f64 = 0.7;

/// One condition entry: canonical name, ICD-10 hint, and its match terms.
///
/// `exact` terms are specific phrasings; `partial` terms are looser
/// mentions that still evidence the condition at lower confidence.
/// `subsumed_by` lists canonical names that, when also matched, replace
/// this entry (a generic "diabetes" mention adds nothing next to a
/// documented type).
#[derive(Debug, Clone, Copy)]
pub struct ConditionTerm {
    pub canonical: &'static str,
    pub icd10: &'static str,
    pub exact: &'static [&'static str],
    pub partial: &'static [&'static str],
    pub subsumed_by: &'static [&'static str],
}

pub static CONDITION_VOCABULARY: &[ConditionTerm] = &[
    ConditionTerm {
        canonical: "Type 2 diabetes mellitus",
        icd10: "E11.9",
        exact: &[
            "type 2 diabetes mellitus",
            "diabetes mellitus type 2",
            "type 2 diabetes",
            "type ii diabetes",
            "t2dm",
            "dm2",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Type 1 diabetes mellitus",
        icd10: "E10.9",
        exact: &[
            "type 1 diabetes mellitus",
            "diabetes mellitus type 1",
            "type 1 diabetes",
            "type i diabetes",
            "t1dm",
            "dm1",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Diabetes mellitus",
        icd10: "E11.9",
        exact: &["diabetes mellitus"],
        partial: &["diabetes", "diabetic"],
        subsumed_by: &["Type 2 diabetes mellitus", "Type 1 diabetes mellitus"],
    },
    ConditionTerm {
        canonical: "Essential hypertension",
        icd10: "I10",
        exact: &["essential hypertension", "hypertension", "htn"],
        partial: &["high blood pressure"],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Hyperlipidemia",
        icd10: "E78.5",
        exact: &["hyperlipidemia", "dyslipidemia", "hypercholesterolemia", "hld"],
        partial: &["high cholesterol"],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Chronic kidney disease",
        icd10: "N18.9",
        exact: &[
            "chronic kidney disease",
            "chronic renal insufficiency",
            "chronic renal disease",
            "ckd",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Chronic obstructive pulmonary disease",
        icd10: "J44.9",
        exact: &[
            "chronic obstructive pulmonary disease",
            "copd",
            "emphysema",
            "chronic bronchitis",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Asthma",
        icd10: "J45.909",
        exact: &["asthma"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Heart failure",
        icd10: "I50.9",
        exact: &[
            "congestive heart failure",
            "heart failure",
            "chf",
            "hfref",
            "hfpef",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Coronary artery disease",
        icd10: "I25.10",
        exact: &[
            "coronary artery disease",
            "coronary heart disease",
            "ischemic heart disease",
            "cad",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Atrial fibrillation",
        icd10: "I48.91",
        exact: &["atrial fibrillation", "afib", "a-fib", "a fib"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Major depressive disorder",
        icd10: "F32.9",
        exact: &["major depressive disorder", "major depression", "mdd"],
        partial: &["depression"],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Generalized anxiety disorder",
        icd10: "F41.1",
        exact: &["generalized anxiety disorder", "gad"],
        partial: &["anxiety"],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Obesity",
        icd10: "E66.9",
        exact: &["morbid obesity", "obesity", "obese"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Hypothyroidism",
        icd10: "E03.9",
        exact: &["hypothyroidism"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Osteoarthritis",
        icd10: "M19.90",
        exact: &["osteoarthritis", "degenerative joint disease"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Cerebrovascular accident",
        icd10: "I63.9",
        exact: &[
            "cerebrovascular accident",
            "transient ischemic attack",
            "stroke",
            "cva",
            "tia",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Pregnancy",
        icd10: "Z33.1",
        exact: &["pregnancy", "pregnant", "gravid"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Attention-deficit hyperactivity disorder",
        icd10: "F90.9",
        exact: &[
            "attention-deficit hyperactivity disorder",
            "attention deficit hyperactivity disorder",
            "adhd",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Substance use disorder",
        icd10: "F19.20",
        exact: &[
            "substance use disorder",
            "substance abuse",
            "opioid use disorder",
            "alcohol use disorder",
            "alcoholism",
        ],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Bipolar disorder",
        icd10: "F31.9",
        exact: &["bipolar disorder", "bipolar"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Schizophrenia",
        icd10: "F20.9",
        exact: &["schizophrenia"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Anemia",
        icd10: "D64.9",
        exact: &["anemia", "anaemia"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Gastroesophageal reflux disease",
        icd10: "K21.9",
        exact: &["gastroesophageal reflux disease", "gastroesophageal reflux", "gerd", "acid reflux"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Diabetic neuropathy",
        icd10: "E11.40",
        exact: &["diabetic neuropathy", "diabetic peripheral neuropathy"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Diabetic nephropathy",
        icd10: "E11.21",
        exact: &["diabetic nephropathy"],
        partial: &[],
        subsumed_by: &[],
    },
    ConditionTerm {
        canonical: "Diabetic retinopathy",
        icd10: "E11.319",
        exact: &["diabetic retinopathy"],
        partial: &[],
        subsumed_by: &[],
    },
];

/// Pharmacological class used by measure evidence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MedicationClass {
    Statin,
    AceInhibitor,
    Arb,
    BetaBlocker,
    CalciumChannelBlocker,
    Diuretic,
    Metformin,
    Insulin,
    Sulfonylurea,
    Glp1Agonist,
    Sglt2Inhibitor,
    Antidepressant,
    AdhdStimulant,
    Anticoagulant,
    Antiplatelet,
    Bronchodilator,
    SystemicCorticosteroid,
    ThyroidReplacement,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct MedicationTerm {
    pub canonical: &'static str,
    pub class: MedicationClass,
    pub terms: &'static [&'static str],
}

pub static MEDICATION_VOCABULARY: &[MedicationTerm] = &[
    MedicationTerm { canonical: "atorvastatin", class: MedicationClass::Statin, terms: &["atorvastatin", "lipitor"] },
    MedicationTerm { canonical: "simvastatin", class: MedicationClass::Statin, terms: &["simvastatin", "zocor"] },
    MedicationTerm { canonical: "rosuvastatin", class: MedicationClass::Statin, terms: &["rosuvastatin", "crestor"] },
    MedicationTerm { canonical: "pravastatin", class: MedicationClass::Statin, terms: &["pravastatin"] },
    MedicationTerm { canonical: "lisinopril", class: MedicationClass::AceInhibitor, terms: &["lisinopril", "zestril"] },
    MedicationTerm { canonical: "enalapril", class: MedicationClass::AceInhibitor, terms: &["enalapril"] },
    MedicationTerm { canonical: "losartan", class: MedicationClass::Arb, terms: &["losartan", "cozaar"] },
    MedicationTerm { canonical: "valsartan", class: MedicationClass::Arb, terms: &["valsartan", "diovan"] },
    MedicationTerm { canonical: "metoprolol", class: MedicationClass::BetaBlocker, terms: &["metoprolol", "lopressor", "toprol"] },
    MedicationTerm { canonical: "carvedilol", class: MedicationClass::BetaBlocker, terms: &["carvedilol", "coreg"] },
    MedicationTerm { canonical: "atenolol", class: MedicationClass::BetaBlocker, terms: &["atenolol"] },
    MedicationTerm { canonical: "amlodipine", class: MedicationClass::CalciumChannelBlocker, terms: &["amlodipine", "norvasc"] },
    MedicationTerm { canonical: "hydrochlorothiazide", class: MedicationClass::Diuretic, terms: &["hydrochlorothiazide", "hctz"] },
    MedicationTerm { canonical: "furosemide", class: MedicationClass::Diuretic, terms: &["furosemide", "lasix"] },
    MedicationTerm { canonical: "metformin", class: MedicationClass::Metformin, terms: &["metformin", "glucophage"] },
    MedicationTerm { canonical: "insulin glargine", class: MedicationClass::Insulin, terms: &["insulin glargine", "lantus", "basaglar"] },
    MedicationTerm { canonical: "insulin", class: MedicationClass::Insulin, terms: &["insulin"] },
    MedicationTerm { canonical: "glipizide", class: MedicationClass::Sulfonylurea, terms: &["glipizide", "glucotrol"] },
    MedicationTerm { canonical: "semaglutide", class: MedicationClass::Glp1Agonist, terms: &["semaglutide", "ozempic", "wegovy"] },
    MedicationTerm { canonical: "empagliflozin", class: MedicationClass::Sglt2Inhibitor, terms: &["empagliflozin", "jardiance"] },
    MedicationTerm { canonical: "sertraline", class: MedicationClass::Antidepressant, terms: &["sertraline", "zoloft"] },
    MedicationTerm { canonical: "fluoxetine", class: MedicationClass::Antidepressant, terms: &["fluoxetine", "prozac"] },
    MedicationTerm { canonical: "escitalopram", class: MedicationClass::Antidepressant, terms: &["escitalopram", "lexapro"] },
    MedicationTerm { canonical: "citalopram", class: MedicationClass::Antidepressant, terms: &["citalopram", "celexa"] },
    MedicationTerm { canonical: "bupropion", class: MedicationClass::Antidepressant, terms: &["bupropion", "wellbutrin"] },
    MedicationTerm { canonical: "methylphenidate", class: MedicationClass::AdhdStimulant, terms: &["methylphenidate", "ritalin", "concerta"] },
    MedicationTerm { canonical: "amphetamine-dextroamphetamine", class: MedicationClass::AdhdStimulant, terms: &["adderall", "dextroamphetamine", "amphetamine salts"] },
    MedicationTerm { canonical: "warfarin", class: MedicationClass::Anticoagulant, terms: &["warfarin", "coumadin"] },
    MedicationTerm { canonical: "apixaban", class: MedicationClass::Anticoagulant, terms: &["apixaban", "eliquis"] },
    MedicationTerm { canonical: "aspirin", class: MedicationClass::Antiplatelet, terms: &["aspirin", "asa 81"] },
    MedicationTerm { canonical: "clopidogrel", class: MedicationClass::Antiplatelet, terms: &["clopidogrel", "plavix"] },
    MedicationTerm { canonical: "albuterol", class: MedicationClass::Bronchodilator, terms: &["albuterol", "proair", "ventolin"] },
    MedicationTerm { canonical: "tiotropium", class: MedicationClass::Bronchodilator, terms: &["tiotropium", "spiriva"] },
    MedicationTerm { canonical: "prednisone", class: MedicationClass::SystemicCorticosteroid, terms: &["prednisone"] },
    MedicationTerm { canonical: "levothyroxine", class: MedicationClass::ThyroidReplacement, terms: &["levothyroxine", "synthroid"] },
    MedicationTerm { canonical: "omeprazole", class: MedicationClass::Other, terms: &["omeprazole", "prilosec"] },
    MedicationTerm { canonical: "gabapentin", class: MedicationClass::Other, terms: &["gabapentin", "neurontin"] },
];

#[derive(Debug, Clone, Copy)]
pub struct ProcedureTerm {
    pub canonical: &'static str,
    pub cpt: Option<&'static str>,
    pub terms: &'static [&'static str],
}

pub static PROCEDURE_VOCABULARY: &[ProcedureTerm] = &[
    ProcedureTerm { canonical: "Colonoscopy", cpt: Some("45378"), terms: &["colonoscopy"] },
    ProcedureTerm { canonical: "Screening mammogram", cpt: Some("77067"), terms: &["mammogram", "mammography"] },
    ProcedureTerm { canonical: "Echocardiogram", cpt: Some("93306"), terms: &["echocardiogram", "transthoracic echo", "tte"] },
    ProcedureTerm { canonical: "Electrocardiogram", cpt: Some("93000"), terms: &["electrocardiogram", "ekg", "ecg"] },
    ProcedureTerm { canonical: "Spirometry", cpt: Some("94010"), terms: &["spirometry", "pulmonary function test", "pft"] },
    ProcedureTerm { canonical: "Chest x-ray", cpt: Some("71046"), terms: &["chest x-ray", "chest xray", "cxr"] },
    ProcedureTerm { canonical: "Follow-up visit", cpt: Some("99213"), terms: &["follow-up visit", "follow up visit", "outpatient follow-up", "follow-up appointment"] },
    ProcedureTerm { canonical: "Psychotherapy", cpt: Some("90834"), terms: &["psychotherapy", "therapy session", "counseling"] },
    ProcedureTerm { canonical: "Well-child visit", cpt: Some("99392"), terms: &["well-child visit", "well child visit", "well-child check", "well child check"] },
    ProcedureTerm { canonical: "Prenatal visit", cpt: Some("59425"), terms: &["prenatal visit", "prenatal care visit"] },
    ProcedureTerm { canonical: "Postpartum visit", cpt: Some("59430"), terms: &["postpartum visit", "postpartum check"] },
    ProcedureTerm { canonical: "Immunization administration", cpt: Some("90471"), terms: &["immunizations", "immunization", "vaccinations", "vaccination", "vaccines", "vaccine"] },
];

/// Screening slot a matched term documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreeningType {
    Mammogram,
    Colonoscopy,
    CervicalCancer,
    DiabeticEye,
    DiabeticFoot,
    DepressionScreening,
    FitTest,
    LungCancer,
}

#[derive(Debug, Clone, Copy)]
pub struct ScreeningTerm {
    pub screening: ScreeningType,
    pub terms: &'static [&'static str],
}

pub static SCREENING_VOCABULARY: &[ScreeningTerm] = &[
    ScreeningTerm { screening: ScreeningType::Mammogram, terms: &["mammogram", "mammography"] },
    ScreeningTerm { screening: ScreeningType::Colonoscopy, terms: &["colonoscopy"] },
    ScreeningTerm { screening: ScreeningType::CervicalCancer, terms: &["pap smear", "pap test", "cervical cytology", "cervical cancer screening"] },
    ScreeningTerm { screening: ScreeningType::DiabeticEye, terms: &["diabetic eye exam", "dilated eye exam", "dilated retinal exam", "retinal exam", "eye exam"] },
    ScreeningTerm { screening: ScreeningType::DiabeticFoot, terms: &["diabetic foot exam", "monofilament", "foot exam"] },
    ScreeningTerm { screening: ScreeningType::DepressionScreening, terms: &["phq-9", "phq9", "depression screening", "depression screen"] },
    ScreeningTerm { screening: ScreeningType::FitTest, terms: &["fit test", "fecal immunochemical", "cologuard", "fecal occult blood", "fobt"] },
    ScreeningTerm { screening: ScreeningType::LungCancer, terms: &["low-dose ct", "low dose ct", "ldct", "lung cancer screening"] },
];

pub static SYMPTOM_TERMS: &[&str] = &[
    "chest pain",
    "shortness of breath",
    "dyspnea",
    "fatigue",
    "dizziness",
    "headache",
    "nausea",
    "palpitations",
    "cough",
    "fever",
    "lower extremity edema",
    "edema",
    "weight loss",
    "weight gain",
];

pub static SOCIAL_HISTORY_TERMS: &[&str] = &[
    "former smoker",
    "current smoker",
    "smoker",
    "tobacco use",
    "alcohol use",
    "drinks alcohol",
    "etoh use",
    "illicit drug use",
    "iv drug use",
];

// Cue windows are scanned immediately before a diagnosis mention to set
// its documentation status. Negated mentions are dropped entirely.
pub static NEGATION_CUES: &[&str] = &["no evidence of", "denies", "negative for", "ruled out", "without"];
pub static HISTORY_CUES: &[&str] = &["history of", "h/o", "hx of", "prior"];
pub static RULE_OUT_CUES: &[&str] = &["rule out", "r/o", "suspected", "possible", "probable"];
pub static RESOLVED_CUES: &[&str] = &["resolved"];
pub static CHRONIC_CUES: &[&str] = &["well-controlled", "well controlled", "controlled", "chronic", "stable"];

// A screening mention preceded by one of these is an order or a gap, not
// a completed event, and must not mark the screening documented.
pub static SCREENING_PENDING_CUES: &[&str] = &[
    "due for",
    "overdue for",
    "needs",
    "needs a",
    "declined",
    "refused",
    "recommend",
    "recommended",
    "schedule",
    "scheduled for",
    "will order",
    "ordered",
];

/// Severity and stage qualifiers, longest first so "stage 3b" wins over
/// "stage 3".
pub static SEVERITY_QUALIFIERS: &[&str] = &[
    "acute on chronic",
    "end-stage",
    "end stage",
    "stage 3a",
    "stage 3b",
    "stage 1",
    "stage 2",
    "stage 3",
    "stage 4",
    "stage 5",
    "severe",
    "moderate",
    "mild",
    "acute",
];
