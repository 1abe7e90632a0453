//! Evaluation oracle: scores a heuristic by greedy best-first walks.
//!
//! Purpose
//! - Turn a candidate `Program` into one cost field per (start, goal) pair,
//!   reject ill-shaped or numerically unstable fields, skip fields whose local
//!   windows were already seen, and walk every pair on the field.
//! - Report the average step count; this ranks candidates, it is not a
//!   shortest-path computation.
//!
//! Determinism
//! - Tie-breaks draw from the injected `Rng`; with a seeded source, scoring
//!   the same program on the same maze and pairs is reproducible.
//!
//! Layout
//! - `types.rs`: `OracleCfg`, `ScoreFlags`, `Score`, `BestRecord`.
//! - `field.rs`: normalization, fingerprint windows, padding, rotation.
//! - `walk.rs`: the walk itself and its sentinels.

mod field;
mod types;
mod walk;

pub use types::{BestRecord, OracleCfg, Score, ScoreFlags};

use nalgebra::DMatrix;
use rand::Rng;
use std::collections::HashSet;

use crate::dsl::{coordinate_grids, Env, Program};
use crate::maze::{Cell, Maze, MazeError, Pair};
use field::{is_stable, normalize, pad, rotate_ccw, rotate_cell, Window};
use walk::{greedy_walk, Budget, WalkOutcome};

/// Scores candidate heuristics against a fixed maze and pair list.
pub struct Oracle<R> {
    maze: Maze,
    pairs: Vec<Pair>,
    cfg: OracleCfg,
    state_x: DMatrix<f64>,
    state_y: DMatrix<f64>,
    windows: Vec<Window>,
    fingerprints: HashSet<Vec<u64>>,
    rng: R,
}

impl<R: Rng> Oracle<R> {
    /// Bind the oracle to `maze` and `pairs`; every endpoint must lie inside the maze.
    pub fn new(maze: Maze, pairs: Vec<Pair>, cfg: OracleCfg, rng: R) -> Result<Self, MazeError> {
        let (rows, cols) = (maze.rows(), maze.cols());
        if let Some(&pair) = pairs
            .iter()
            .find(|p| !maze.contains(p.start) || !maze.contains(p.goal))
        {
            return Err(MazeError::PairOutOfBounds { pair, rows, cols });
        }
        let (state_x, state_y) = coordinate_grids(rows, cols);
        let windows = pairs
            .iter()
            .map(|p| Window::around(p.start, rows, cols))
            .collect();
        Ok(Self {
            maze,
            pairs,
            cfg,
            state_x,
            state_y,
            windows,
            fingerprints: HashSet::new(),
            rng,
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn cfg(&self) -> OracleCfg {
        self.cfg
    }

    /// Walks per candidate: one per pair, two in rotated mode.
    pub fn walks_per_candidate(&self) -> usize {
        if self.cfg.rotate_maze {
            2 * self.pairs.len()
        } else {
            self.pairs.len()
        }
    }

    /// Distinct fingerprints recorded so far.
    pub fn fingerprints_seen(&self) -> usize {
        self.fingerprints.len()
    }

    /// Score `program`. All failures are soft and come back as a `Score`.
    pub fn score(&mut self, program: &Program, flags: ScoreFlags, best: &mut BestRecord) -> Score {
        if self.pairs.is_empty() {
            return Score::invalid();
        }
        let shape = (self.maze.rows(), self.maze.cols());
        let mut fields = Vec::with_capacity(self.pairs.len());
        let mut fingerprint = Vec::new();
        for (pair, window) in self.pairs.iter().zip(&self.windows) {
            let env = Env {
                state_x: &self.state_x,
                state_y: &self.state_y,
                goal_x: pair.goal.col as f64,
                goal_y: pair.goal.row as f64,
            };
            let mut field = match program.evaluate(&env).into_grid() {
                Some(g) if g.shape() == shape => g,
                _ => {
                    tracing::trace!(program = %program, "not a full grid");
                    return Score::invalid();
                }
            };
            if flags.update_best && !flags.compare_normalized_costs {
                window.extend_fingerprint(&field, &mut fingerprint);
            }
            normalize(&mut field);
            if flags.update_best && flags.compare_normalized_costs {
                window.extend_fingerprint(&field, &mut fingerprint);
            }
            fields.push(field);
        }

        if !fields.iter().all(is_stable) {
            tracing::trace!(program = %program, "unstable field");
            return Score::rejected();
        }

        if flags.update_best && !self.fingerprints.insert(fingerprint) {
            return Score::rejected();
        }

        let walks = self.walks_per_candidate();
        let limit = (self.cfg.early_termination && best.prune_avg.is_finite())
            .then(|| best.prune_avg * walks as f64);
        let orientations = if self.cfg.rotate_maze { 2 } else { 1 };
        let mut total = 0usize;
        let mut completed = 0usize;
        for (pair, field) in self.pairs.iter().zip(&fields) {
            let padded = pad(field, &self.maze);
            let start = Cell::new(pair.start.row + 1, pair.start.col + 1);
            let goal = Cell::new(pair.goal.row + 1, pair.goal.col + 1);
            for rotated in [false, true].into_iter().take(orientations) {
                let budget = limit.map(|limit| Budget {
                    spent: total,
                    limit,
                });
                let outcome = if rotated {
                    let cols = padded.ncols();
                    greedy_walk(
                        &rotate_ccw(&padded),
                        rotate_cell(start, cols),
                        rotate_cell(goal, cols),
                        &mut self.rng,
                        budget,
                    )
                } else {
                    greedy_walk(&padded, start, goal, &mut self.rng, budget)
                };
                match outcome {
                    WalkOutcome::Reached(steps) => {
                        total += steps;
                        completed += 1;
                    }
                    WalkOutcome::Runaway => {
                        tracing::trace!(program = %program, ?pair, "walk ran away");
                        return Score::invalid();
                    }
                    WalkOutcome::Pruned => return Score::pruned(completed),
                }
            }
        }

        let avg = total as f64 / walks as f64;
        if flags.update_best && avg < best.prune_avg {
            best.prune_avg = avg;
        }
        Score::finished(avg, completed)
    }
}

#[cfg(test)]
mod tests;
