//! Greedy best-first walk over a padded cost field.
//!
//! The frontier holds the best revealed cost of every cell. Each step takes a
//! uniformly random cell among those at the frontier minimum, stops at the
//! goal, and otherwise marks the cell visited and reveals its 3×3 neighborhood.

use nalgebra::DMatrix;
use rand::Rng;

use crate::maze::Cell;

/// Working-field value of visited cells.
pub(crate) const VISITED: f64 = 7.0;
/// Frontier seed at the start cell.
pub(crate) const FRONTIER_ACTIVE: f64 = 7.0;
/// Frontier value of cells not yet revealed.
pub(crate) const UNREVEALED: f64 = 9.0;
/// Cost of blocked cells.
pub(crate) const BLOCKED: f64 = 9.0;
/// Cost of the padding ring.
pub(crate) const BORDER: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WalkOutcome {
    Reached(usize),
    /// Step count exceeded the padded cell count.
    Runaway,
    /// The candidate's running total exceeded the pruning budget.
    Pruned,
}

/// Abort once `spent + steps > limit`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Budget {
    pub spent: usize,
    pub limit: f64,
}

/// Walk from `start` to `goal` (padded coordinates) on `costs`.
pub(crate) fn greedy_walk<R: Rng>(
    costs: &DMatrix<f64>,
    start: Cell,
    goal: Cell,
    rng: &mut R,
    budget: Option<Budget>,
) -> WalkOutcome {
    let (rows, cols) = costs.shape();
    let step_limit = rows * cols;
    let mut working = costs.clone();
    let mut frontier = DMatrix::from_element(rows, cols, UNREVEALED);
    frontier[(start.row, start.col)] = FRONTIER_ACTIVE;
    let mut ties = Vec::new();
    let mut steps = 0usize;
    loop {
        steps += 1;
        let cur = pick_min(&frontier, &mut ties, rng);
        if cur == goal {
            return WalkOutcome::Reached(steps);
        }
        working[(cur.row, cur.col)] = VISITED;
        for r in cur.row.saturating_sub(1)..=(cur.row + 1).min(rows - 1) {
            for c in cur.col.saturating_sub(1)..=(cur.col + 1).min(cols - 1) {
                frontier[(r, c)] = working[(r, c)];
            }
        }
        if steps > step_limit {
            return WalkOutcome::Runaway;
        }
        if let Some(b) = budget {
            if (b.spent + steps) as f64 > b.limit {
                return WalkOutcome::Pruned;
            }
        }
    }
}

/// Uniform choice among the row-major list of cells at the frontier minimum.
fn pick_min<R: Rng>(frontier: &DMatrix<f64>, ties: &mut Vec<Cell>, rng: &mut R) -> Cell {
    ties.clear();
    let mut best = f64::INFINITY;
    for r in 0..frontier.nrows() {
        for c in 0..frontier.ncols() {
            let v = frontier[(r, c)];
            if v < best {
                best = v;
                ties.clear();
                ties.push(Cell::new(r, c));
            } else if v == best {
                ties.push(Cell::new(r, c));
            }
        }
    }
    if ties.len() == 1 {
        ties[0]
    } else {
        ties[rng.gen_range(0..ties.len())]
    }
}
