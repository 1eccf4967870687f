//! Performance benchmarks for CrabBlur operators
//!
//! Run with: cargo bench
//! Compare with the sequential path: cargo bench --no-default-features

use crabblur::ops::{flip, gaussian_blur, stitch_images, FlipAxis, StitchLayout, StitchOptions};
use crabblur::quality::laplacian_variance;
use crabblur::testing::pseudo_noise;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

const RESOLUTIONS: [(u32, u32); 3] = [(320, 240), (640, 480), (1280, 720)];

fn bench_gaussian_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gaussian Blur");
    group.measurement_time(Duration::from_secs(10));

    for (width, height) in RESOLUTIONS {
        let src = pseudo_noise(width, height, 7);
        let mut dst = src.clone();
        group.throughput(Throughput::Elements((width * height) as u64));

        for sigma in [1.0f32, 5.0] {
            group.bench_with_input(
                BenchmarkId::new(format!("sigma_{}", sigma), format!("{}x{}", width, height)),
                &sigma,
                |b, &sigma| b.iter(|| gaussian_blur(black_box(&src), &mut dst, sigma).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_blur_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Blur Detection");

    for (width, height) in RESOLUTIONS {
        let img = pseudo_noise(width, height, 11);
        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_function(format!("{}x{}", width, height), |b| {
            b.iter(|| laplacian_variance(black_box(&img)).unwrap())
        });
    }

    group.finish();
}

fn bench_flip(c: &mut Criterion) {
    let src = pseudo_noise(1280, 720, 3);
    let mut dst = src.clone();
    c.bench_function("Flip 1280x720 vertical", |b| {
        b.iter(|| flip(black_box(&src), &mut dst, FlipAxis::Vertical).unwrap())
    });
    c.bench_function("Flip 1280x720 both", |b| {
        b.iter(|| flip(black_box(&src), &mut dst, FlipAxis::Both).unwrap())
    });
}

fn bench_stitch(c: &mut Criterion) {
    let tiles: Vec<_> = (0..4).map(|seed| pseudo_noise(320, 240, seed + 1)).collect();
    let options = StitchOptions {
        layout: StitchLayout::Grid { columns: 2 },
        overlap: 16,
    };
    c.bench_function("Stitch 2x2 grid overlap 16", |b| {
        b.iter(|| stitch_images(black_box(&tiles), &options).unwrap())
    });
}

criterion_group!(
    benches,
    bench_gaussian_blur,
    bench_blur_detection,
    bench_flip,
    bench_stitch
);
criterion_main!(benches);
