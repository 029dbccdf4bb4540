// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use loopguard_select::{Candidate, select};
use loopguard_session::{Config, Machine, Playback, StopRule};

const ITEM_HEIGHT: f64 = 640.0;

fn gen_feed(n: usize) -> Vec<Candidate<u32>> {
    (0..n)
        .map(|i| {
            let y0 = i as f64 * ITEM_HEIGHT;
            Candidate {
                item: i as u32,
                bounds: Rect::new(0.0, y0, 360.0, y0 + ITEM_HEIGHT),
            }
        })
        .collect()
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    for &n in &[8usize, 64, 512] {
        let feed = gen_feed(n);
        let mid = (n / 2) as f64 * ITEM_HEIGHT;
        let viewport = Rect::new(0.0, mid - 120.0, 360.0, mid - 120.0 + ITEM_HEIGHT);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("geometry_n{}", n), |b| {
            b.iter(|| black_box(select(None, black_box(&feed), viewport)));
        });
        group.bench_function(format!("marker_n{}", n), |b| {
            b.iter(|| black_box(select(Some(3), black_box(&feed), viewport)));
        });
    }
    group.finish();
}

/// Positions of a 6 s clip sampled every 250 ms over `loops` cycles.
fn gen_loop_samples(loops: usize) -> Vec<(Duration, f64)> {
    let mut out = Vec::with_capacity(loops * 25);
    let mut now = Duration::from_secs(2);
    for _ in 0..loops {
        for tick in 0..25 {
            now += Duration::from_millis(250);
            out.push((now, f64::from(tick) * 0.25));
        }
    }
    out
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    let samples = gen_loop_samples(40);
    group.throughput(Throughput::Elements(samples.len() as u64));
    for (name, stop) in [
        ("cycles", StopRule::Cycles { count: u32::MAX }),
        ("elapsed", StopRule::Elapsed { seconds: f64::MAX }),
    ] {
        let config = Config {
            stop,
            logging: false,
        };
        group.bench_function(format!("looping_{}", name), |b| {
            b.iter_batched(
                || {
                    let mut m = Machine::<u32>::new(config);
                    let _ = m.observe(Some(1), "/clips/1", Playback::new(0.0, 6.0), Duration::ZERO);
                    m
                },
                |mut m| {
                    for &(now, position) in &samples {
                        let step = m.sample(Playback::new(position, 6.0), Some("/clips/1"), now);
                        let _ = black_box(step);
                    }
                    black_box(m.session().map(|s| s.cycles()));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_select, bench_sample);
criterion_main!(benches);
