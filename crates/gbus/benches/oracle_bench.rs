//! Criterion benchmarks for oracle scoring.
//! Sizes: open square mazes with side in {16, 32, 64}, 10 pairs each.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use gbus::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn oracle_for(side: usize, rotate: bool) -> Oracle<StdRng> {
    let mut rng = StdRng::seed_from_u64(17);
    let maze = Maze::generate(side, side, 0.85, &mut rng).unwrap();
    let pairs = maze.sample_pairs(10, &mut rng).unwrap();
    let cfg = OracleCfg {
        rotate_maze: rotate,
        early_termination: false,
    };
    Oracle::new(maze, pairs, cfg, rng).unwrap()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("oracle");
    for &side in &[16usize, 32, 64] {
        group.bench_with_input(BenchmarkId::new("manhattan", side), &side, |b, &side| {
            let heuristic = manhattan();
            b.iter_batched(
                || oracle_for(side, false),
                |mut oracle| {
                    let _s = oracle.score(
                        &heuristic,
                        ScoreFlags::validation(),
                        &mut BestRecord::default(),
                    );
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("diagonal_rotated", side), &side, |b, &side| {
            let heuristic = manhattan_diagonal();
            b.iter_batched(
                || oracle_for(side, true),
                |mut oracle| {
                    let _s = oracle.score(
                        &heuristic,
                        ScoreFlags::validation(),
                        &mut BestRecord::default(),
                    );
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
