use atrius_cdi_lib::{
    analyze_gaps, evaluate_measures, extract_entities, process_note, EvaluationOptions,
    ExtractionOptions, PipelineOptions,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SHORT_NOTE: &str = "65-year-old male with Type 2 diabetes. A1C 8.5%. BP 148/92.";

const LONG_NOTE: &str = "Assessment and Plan: 68-year-old female with essential hypertension, \
    type 2 diabetes mellitus, chronic kidney disease stage 3, hyperlipidemia, and COPD. \
    Vitals today: BP 152/88, HR 78, Temp 98.6 F, RR 18, SpO2 94%, Weight 182 lbs, BMI 31.4. \
    Labs: A1C 8.2%, LDL 138, fasting glucose 144, creatinine 1.6, eGFR 46, potassium 4.4, \
    sodium 139, hemoglobin 11.2. \
    Medications: lisinopril 20 mg daily, metformin 1000 mg twice daily, atorvastatin 40 mg \
    nightly, albuterol inhaled prn. \
    Colonoscopy March 2021, negative. Diabetic eye exam 5/14/2023. Current smoker, \
    counseled on cessation. Denies chest pain. Reports fatigue and occasional dizziness.";

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extractor");
    let options = ExtractionOptions::default();

    group.bench_function("short_note", |b| {
        b.iter(|| extract_entities(black_box(SHORT_NOTE), &options))
    });

    group.bench_function("long_note", |b| {
        b.iter(|| extract_entities(black_box(LONG_NOTE), &options))
    });

    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");
    let entities = extract_entities(LONG_NOTE, &ExtractionOptions::default()).unwrap();

    group.bench_function("measures", |b| {
        b.iter(|| {
            evaluate_measures(
                black_box(&entities),
                black_box(LONG_NOTE),
                &EvaluationOptions::default(),
            )
        })
    });

    group.bench_function("gaps", |b| {
        b.iter(|| analyze_gaps(black_box(&entities), None))
    });

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let options = PipelineOptions::default();

    group.bench_function("end_to_end", |b| {
        b.iter(|| process_note(black_box(LONG_NOTE), &options))
    });

    group.finish();
}

criterion_group!(benches, bench_extraction, bench_evaluation, bench_full_pipeline);
criterion_main!(benches);
