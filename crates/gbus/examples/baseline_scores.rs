//! Baseline timing probe: Manhattan and diagonal Manhattan on a random maze.
//!
//! Purpose
//! - Give a quick, reproducible data point for how long one oracle call takes
//!   and what step counts the reference heuristics reach, before launching a
//!   full synthesis run.

use std::time::Instant;

use gbus::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn main() {
    let mut rng = StdRng::seed_from_u64(2024);
    let maze = Maze::generate(48, 48, 0.8, &mut rng).expect("maze dimensions are non-zero");
    let pairs = maze.sample_pairs(10, &mut rng).expect("maze has free cells");
    let mut oracle = Oracle::new(maze, pairs, OracleCfg::default(), rng)
        .expect("sampled pairs lie inside the maze");

    for (name, heuristic) in [
        ("manhattan", manhattan()),
        ("manhattan_diagonal", manhattan_diagonal()),
    ] {
        let t0 = Instant::now();
        let score = oracle.score(&heuristic, ScoreFlags::validation(), &mut BestRecord::default());
        let ms = t0.elapsed().as_secs_f64() * 1e3;
        println!(
            "{name:>20}: avg_steps={:.2} accepted={:?} ({ms:.2} ms)",
            score.avg_steps, score.accepted
        );
    }
}
