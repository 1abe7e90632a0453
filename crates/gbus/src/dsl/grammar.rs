//! Leaves, the production catalog, and reference heuristics.

use super::types::{Program, Var};

/// Number of candidates produced per ordered `(p1, p2)` pair.
pub const PRODUCTIONS_PER_PAIR: usize = 11;

/// Default leaf set: the four coordinate variables and the constants 0.5 and 2.
pub fn default_leaves() -> Vec<Program> {
    let mut leaves: Vec<Program> = Var::ALL.into_iter().map(Program::var).collect();
    leaves.push(Program::num(0.5));
    leaves.push(Program::num(2.0));
    leaves
}

/// Production `index` (0..11) of the catalog applied to `(p1, p2)`.
///
/// Order: plus, abs(plus), minus, reversed minus, abs(minus), times,
/// abs(times), max, abs(max), min, abs(min).
pub fn production(index: usize, p1: &Program, p2: &Program) -> Option<Program> {
    let p = match index {
        0 => Program::plus(p1, p2),
        1 => Program::abs(&Program::plus(p1, p2)),
        2 => Program::minus(p1, p2),
        3 => Program::minus(p2, p1),
        4 => Program::abs(&Program::minus(p1, p2)),
        5 => Program::times(p1, p2),
        6 => Program::abs(&Program::times(p1, p2)),
        7 => Program::max(p1, p2),
        8 => Program::abs(&Program::max(p1, p2)),
        9 => Program::min(p1, p2),
        10 => Program::abs(&Program::min(p1, p2)),
        _ => return None,
    };
    Some(p)
}

/// All productions combining `p1` and `p2`, in catalog order.
pub fn productions(p1: &Program, p2: &Program) -> Vec<Program> {
    (0..PRODUCTIONS_PER_PAIR)
        .filter_map(|i| production(i, p1, p2))
        .collect()
}

/// `|state_x - goal_x| + |state_y - goal_y|`.
pub fn manhattan() -> Program {
    let (dx, dy) = axis_distances();
    Program::plus(&dx, &dy)
}

/// `max(dx, dy) + 0.5 * min(dx, dy)`.
pub fn manhattan_diagonal() -> Program {
    let (dx, dy) = axis_distances();
    Program::plus(
        &Program::max(&dx, &dy),
        &Program::times(&Program::num(0.5), &Program::min(&dx, &dy)),
    )
}

fn axis_distances() -> (Program, Program) {
    let dx = Program::abs(&Program::minus(
        &Program::var(Var::StateX),
        &Program::var(Var::GoalX),
    ));
    let dy = Program::abs(&Program::minus(
        &Program::var(Var::StateY),
        &Program::var(Var::GoalY),
    ));
    (dx, dy)
}
