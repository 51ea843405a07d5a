#![allow(non_snake_case)]
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use kfun::{G, Point, Scalar, op};

fn scalar_mul_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecmult");

    group.bench_function("mul_base", |b| {
        b.iter_batched(
            || Scalar::random(&mut rand::thread_rng()),
            |scalar| op::mul_base(&scalar),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("scalar_mul_point", |b| {
        b.iter_batched(
            || {
                (
                    Scalar::random(&mut rand::thread_rng()),
                    Point::random(&mut rand::thread_rng()),
                )
            },
            |(scalar, point)| op::scalar_mul_point(&scalar, &point),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("g_double_mul", |b| {
        b.iter_batched(
            || {
                (
                    Scalar::random(&mut rand::thread_rng()),
                    Scalar::random(&mut rand::thread_rng()),
                    Point::random(&mut rand::thread_rng()),
                )
            },
            |(x, y, P)| op::g_double_mul(&x, &y, &P),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("double_mul", |b| {
        b.iter_batched(
            || {
                (
                    Scalar::random(&mut rand::thread_rng()),
                    Point::random(&mut rand::thread_rng()),
                    Scalar::random(&mut rand::thread_rng()),
                    Point::random(&mut rand::thread_rng()),
                )
            },
            |(x, A, y, B)| op::double_mul(&x, &A, &y, &B),
            BatchSize::SmallInput,
        )
    });

    for n in [2usize, 8, 32] {
        group.bench_function(format!("lincomb:{}", n), |b| {
            b.iter_batched(
                || {
                    let scalars: Vec<Scalar> = (0..n)
                        .map(|_| Scalar::random(&mut rand::thread_rng()))
                        .collect();
                    let mut points: Vec<Point> = (0..n)
                        .map(|_| Point::random(&mut rand::thread_rng()))
                        .collect();
                    points[0] = *G;
                    (scalars, points)
                },
                |(scalars, points)| op::lincomb(scalars.iter(), points.iter()),
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, scalar_mul_point);
criterion_main!(benches);
