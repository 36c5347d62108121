//! Benchmarks for corner detection and Lucas-Kanade tracking.
//!
//! Run with: cargo bench -p flowcam-vision

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowcam_core::GrayFrame;
use flowcam_vision::{DetectParams, FeatureDetector, FlowEstimator, GoodFeatures, PyramidalLk};

fn scene(offset: u32) -> GrayFrame {
    GrayFrame::from_fn(640, 480, |x, y| {
        let x = x + offset;
        if ((x / 24) + (y / 24)) % 2 == 0 {
            200
        } else {
            40
        }
    })
}

fn bench_detection(c: &mut Criterion) {
    let frame = scene(0);
    let detector = GoodFeatures::default();
    let params = DetectParams::default();

    c.bench_function("good_features_640x480", |bencher| {
        bencher.iter(|| detector.detect(black_box(&frame), black_box(&params)));
    });
}

fn bench_tracking(c: &mut Criterion) {
    let prev = scene(0);
    let next = scene(1);
    let points = GoodFeatures::default().detect(&prev, &DetectParams::default());
    let lk = PyramidalLk::default();

    c.bench_function("pyramidal_lk_300_points", |bencher| {
        bencher.iter(|| lk.estimate(black_box(&prev), black_box(&next), black_box(&points)));
    });
}

criterion_group!(benches, bench_detection, bench_tracking);
criterion_main!(benches);
