use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fatigue::{FatigueClassifier, FatigueConfig};

/// One minute of 30fps input with periodic blinks and a yawn every 20s
fn synthetic_stream() -> Vec<(f64, f64, f64)> {
    (0..1800)
        .map(|i| {
            let t = i as f64 / 30.0;
            let ear = if i % 90 < 4 { 0.21 } else { 0.31 };
            let mar = if i % 600 < 40 { 0.75 } else { 0.2 };
            (ear, mar, t)
        })
        .collect()
}

fn bench_update(c: &mut Criterion) {
    let stream = synthetic_stream();

    c.bench_function("classifier_update_1800_frames", |b| {
        b.iter(|| {
            let mut classifier = FatigueClassifier::new(FatigueConfig::default()).unwrap();
            for &(ear, mar, t) in &stream {
                black_box(classifier.update(ear, mar, t).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
