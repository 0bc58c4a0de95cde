//! Power index benchmarks on weighted majority games.
//!
//! Run with:
//! ```bash
//! cargo bench --bench power_indices
//! ```

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use simple_games::game::SimpleGame;
use simple_games::manager::Manager;
use simple_games::power;
use simple_games::wvg::Wvg;

/// `[total / 2 + 1; 1, 2, 3, 4, 5, 1, 2, ...]` with `n` players.
fn majority(n: usize) -> Wvg {
    let weights: Vec<i64> = (0..n).map(|i| (i % 5) as i64 + 1).collect();
    let total: i64 = weights.iter().sum();
    Wvg::new(total / 2 + 1, weights)
}

// ============================================================================
// Benchmark: building the diagram
// ============================================================================

fn bench_to_qobdd(c: &mut Criterion) {
    let mut group = c.benchmark_group("wvg/to_qobdd");

    for n in [10, 20, 40] {
        let wvg = majority(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &wvg, |b, wvg| {
            b.iter(|| {
                let mgr = Manager::new(wvg.num_players());
                black_box(wvg.to_qobdd(&mgr))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: indices on a fixed diagram
// ============================================================================

fn bench_indices(c: &mut Criterion) {
    let mut group = c.benchmark_group("power");

    for n in [10, 20, 40] {
        let mgr = Manager::new(n);
        let win = majority(n).to_qobdd(&mgr);
        let min_win = mgr.min_win(win);

        group.bench_with_input(BenchmarkId::new("shapley_shubik", n), &win, |b, &win| {
            b.iter(|| black_box(power::shapley_shubik(&mgr, win)))
        });
        group.bench_with_input(BenchmarkId::new("banzhaf", n), &win, |b, &win| {
            b.iter(|| black_box(power::banzhaf_normalized(&mgr, win)))
        });
        group.bench_with_input(BenchmarkId::new("deegan_packel", n), &min_win, |b, &min_win| {
            b.iter(|| black_box(power::deegan_packel(&mgr, min_win)))
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: full analysis
// ============================================================================

fn bench_weightedness(c: &mut Criterion) {
    let mut group = c.benchmark_group("game/weighted");
    group.sample_size(10);

    for n in [10, 20] {
        let wvg = majority(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &wvg, |b, wvg| {
            b.iter(|| {
                let game = SimpleGame::weighted(wvg.quota, &wvg.weights).ok()?;
                let _ = game.is_directed();
                black_box(game.is_homogeneous().ok())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_to_qobdd, bench_indices, bench_weightedness);
criterion_main!(benches);
