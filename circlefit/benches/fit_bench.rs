//! Benchmarks for the circle fitter.
use std::hint::black_box;

use circlefit::{Circle, Config, Point, fit, fit_with_analysis};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// `n` points spread over `degrees` of arc, wobbling slightly off the circle.
fn noisy_arc(n: usize, degrees: f64) -> Vec<Point> {
    let circle = Circle::new(Point::new(12.0, -4.0), 30.0);
    (0..n)
        .map(|i| {
            let theta = (degrees * i as f64 / n as f64).to_radians();
            let wobble = if i % 2 == 0 { 0.05 } else { -0.05 };
            let r = circle.radius + wobble;
            Point::new(
                circle.center.x + r * libm::cos(theta),
                circle.center.y + r * libm::sin(theta),
            )
        })
        .collect()
}

fn fit_three_points(c: &mut Criterion) {
    let points = [
        Point::new(0.0, 1.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, -1.0),
    ];
    c.bench_function("fit_three_points", |b| {
        b.iter(|| {
            let _actual = black_box(fit(black_box(&points), Config::default()).unwrap());
        });
    });
}

/// Narrow arcs take the solver many more iterations than full circles.
fn fit_narrow_arc(c: &mut Criterion) {
    let points = noisy_arc(32, 60.0);
    c.bench_function("fit_narrow_arc", |b| {
        b.iter(|| {
            let _actual = black_box(fit(black_box(&points), Config::default()).unwrap());
        });
    });
}

fn fit_many_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_many_points");
    for size in [8u64, 64, 512, 4096] {
        let points = noisy_arc(size as usize, 360.0);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| {
                let _actual = black_box(fit(points, Config::default()).unwrap());
            });
        });
    }
    group.finish();
}

/// Like [`fit_many_points`] but with the conditioning analysis.
fn fit_many_points_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_many_points_analysis");
    for size in [8u64, 512] {
        let points = noisy_arc(size as usize, 360.0);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| {
                let _actual = black_box(fit_with_analysis(points, Config::default()).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    fit_three_points,
    fit_narrow_arc,
    fit_many_points,
    fit_many_points_analysis,
);
criterion_main!(benches);
