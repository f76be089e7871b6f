// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::ops::ControlFlow;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Vec2};
use understory_dynamic_tree::{BroadPhase, DynamicTree, ProxyId, RayCastInput};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Rect::new(x0, y0, x0 + cell * 0.8, y0 + cell * 0.8));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, extent: f64, size: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * extent;
        let y0 = rng.next_f64() * extent;
        out.push(Rect::new(x0, y0, x0 + size, y0 + size));
    }
    out
}

fn build(rects: &[Rect]) -> (DynamicTree<u32>, Vec<ProxyId>) {
    let mut tree = DynamicTree::new();
    let ids = rects
        .iter()
        .enumerate()
        .map(|(i, r)| tree.create_proxy(*r, i as u32))
        .collect();
    (tree, ids)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter(|| {
                let (tree, _) = build(&rects);
                black_box(tree.height())
            });
        });
    }
    let rects = gen_random_rects(10_000, 2000.0, 8.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("random_10k", |b| {
        b.iter(|| {
            let (tree, _) = build(&rects);
            black_box(tree.height())
        });
    });
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("move");
    let rects = gen_random_rects(4096, 2000.0, 8.0);
    group.throughput(Throughput::Elements(rects.len() as u64));

    // Jitter stays inside the fat boxes, so these moves should not touch the tree.
    group.bench_function("jitter_4k", |b| {
        b.iter_batched(
            || build(&rects),
            |(mut tree, ids)| {
                for (id, r) in ids.iter().zip(&rects) {
                    let d = Vec2::new(0.05, -0.05);
                    let _ = tree.move_proxy(*id, *r + d, d);
                }
                black_box(tree.insertion_count())
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("drift_4k", |b| {
        b.iter_batched(
            || build(&rects),
            |(mut tree, ids)| {
                let d = Vec2::new(3.0, 1.5);
                for (id, r) in ids.iter().zip(&rects) {
                    let _ = tree.move_proxy(*id, *r + d, d);
                }
                black_box(tree.insertion_count())
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let rects = gen_random_rects(10_000, 2000.0, 8.0);
    let (tree, _) = build(&rects);
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let regions: Vec<Rect> = (0..256)
        .map(|_| {
            let (x, y) = (rng.next_f64() * 1900.0, rng.next_f64() * 1900.0);
            Rect::new(x, y, x + 100.0, y + 100.0)
        })
        .collect();

    group.throughput(Throughput::Elements(regions.len() as u64));
    group.bench_function("rect_100x100", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            for r in &regions {
                tree.query(*r, |_| {
                    hits += 1;
                    ControlFlow::Continue(())
                });
            }
            black_box(hits)
        });
    });

    group.bench_function("ray_diagonal", |b| {
        let input = RayCastInput::new(Point::new(0.0, 0.0), Point::new(2000.0, 2000.0));
        b.iter(|| {
            let mut hits = 0_usize;
            tree.ray_cast(&input, |sub, _| {
                hits += 1;
                sub.max_fraction
            });
            black_box(hits)
        });
    });
    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    group.sample_size(10);
    let rects = gen_random_rects(256, 500.0, 8.0);
    group.bench_function("bottom_up_256", |b| {
        b.iter_batched(
            || build(&rects).0,
            |mut tree| {
                tree.rebuild_bottom_up();
                black_box(tree.area_ratio())
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_broad_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_phase");
    let rects = gen_random_rects(2048, 800.0, 8.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("create_update_pairs_2k", |b| {
        b.iter(|| {
            let mut bp = BroadPhase::new();
            for (i, r) in rects.iter().enumerate() {
                let _ = bp.create_proxy(*r, i as u32);
            }
            let mut pairs = 0_usize;
            bp.update_pairs(|_, _| pairs += 1);
            black_box(pairs)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_move,
    bench_query,
    bench_rebuild,
    bench_broad_phase
);
criterion_main!(benches);
