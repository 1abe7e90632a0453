use super::field::{normalize, pad, quantize, rotate_ccw, rotate_cell, Window};
use super::walk::{greedy_walk, WalkOutcome, BLOCKED, BORDER};
use super::*;
use crate::dsl::{manhattan, Program, Var};
use crate::maze::{Cell, Maze, MazeError, Pair};
use nalgebra::DMatrix;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn corner_pair() -> Pair {
    Pair::new(Cell::new(0, 0), Cell::new(4, 4))
}

fn open_oracle(cfg: OracleCfg, seed: u64) -> Oracle<StdRng> {
    Oracle::new(
        Maze::open(5, 5).unwrap(),
        vec![corner_pair()],
        cfg,
        StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

fn chebyshev() -> Program {
    let dx = Program::abs(&Program::minus(
        &Program::var(Var::StateX),
        &Program::var(Var::GoalX),
    ));
    let dy = Program::abs(&Program::minus(
        &Program::var(Var::StateY),
        &Program::var(Var::GoalY),
    ));
    Program::max(&dx, &dy)
}

#[test]
fn manhattan_on_open_grid_walks_the_diagonal() {
    let mut oracle = open_oracle(OracleCfg::default(), 0);
    let mut best = BestRecord::default();
    let s = oracle.score(&manhattan(), ScoreFlags::validation(), &mut best);
    assert_eq!(s.accepted, Some(true));
    assert_eq!(s.completed, Some(1));
    assert_eq!(s.avg_steps, 5.0);
    assert!(s.avg_steps <= 81.0);
    // validation mode leaves the shared state alone
    assert!(best.prune_avg.is_infinite());
    assert_eq!(oracle.fingerprints_seen(), 0);
}

#[test]
fn scalar_programs_are_invalid() {
    let mut oracle = open_oracle(OracleCfg::default(), 0);
    let mut best = BestRecord::default();
    let constant = Program::plus(&Program::num(2.0), &Program::num(0.5));
    for p in [constant, Program::var(Var::GoalX)] {
        let s = oracle.score(&p, ScoreFlags::canonical(true), &mut best);
        assert_eq!(s, Score::invalid());
    }
}

#[test]
fn canonical_mode_dedups_but_validation_does_not() {
    let mut oracle = open_oracle(OracleCfg::default(), 1);
    let mut best = BestRecord::default();
    let first = oracle.score(&manhattan(), ScoreFlags::canonical(true), &mut best);
    assert!(first.is_accepted());
    assert_eq!(best.prune_avg, 5.0);

    let second = oracle.score(&manhattan(), ScoreFlags::canonical(true), &mut best);
    assert_eq!(second, Score::rejected());

    let validated = oracle.score(&manhattan(), ScoreFlags::validation(), &mut best);
    assert_eq!(validated.accepted, Some(true));
    assert_eq!(validated.avg_steps, 5.0);
    assert_eq!(oracle.fingerprints_seen(), 1);
}

#[test]
fn algebraically_distinct_but_equal_fields_collide() {
    let mut oracle = open_oracle(OracleCfg::default(), 2);
    let mut best = BestRecord::default();
    let dx = Program::abs(&Program::minus(
        &Program::var(Var::StateX),
        &Program::var(Var::GoalX),
    ));
    let dy = Program::abs(&Program::minus(
        &Program::var(Var::StateY),
        &Program::var(Var::GoalY),
    ));
    let swapped = Program::plus(&dy, &dx);
    assert!(oracle
        .score(&manhattan(), ScoreFlags::canonical(true), &mut best)
        .is_accepted());
    assert_eq!(
        oracle.score(&swapped, ScoreFlags::canonical(true), &mut best),
        Score::rejected()
    );
}

#[test]
fn raw_fingerprints_separate_scaled_fields() {
    let doubled = Program::times(&manhattan(), &Program::num(2.0));

    let mut normalized = open_oracle(OracleCfg::default(), 3);
    let mut best = BestRecord::default();
    assert!(normalized
        .score(&manhattan(), ScoreFlags::canonical(true), &mut best)
        .is_accepted());
    assert_eq!(
        normalized.score(&doubled, ScoreFlags::canonical(true), &mut best),
        Score::rejected()
    );

    let mut raw = open_oracle(OracleCfg::default(), 3);
    let mut best = BestRecord::default();
    assert!(raw
        .score(&manhattan(), ScoreFlags::canonical(false), &mut best)
        .is_accepted());
    assert!(raw
        .score(&doubled, ScoreFlags::canonical(false), &mut best)
        .is_accepted());
}

#[test]
fn seeded_tie_breaks_are_reproducible() {
    let maze = Maze::open(7, 7).unwrap();
    let pairs = vec![
        Pair::new(Cell::new(0, 0), Cell::new(6, 3)),
        Pair::new(Cell::new(3, 6), Cell::new(0, 1)),
        Pair::new(Cell::new(5, 5), Cell::new(1, 0)),
    ];
    let run = || {
        let mut oracle = Oracle::new(
            maze.clone(),
            pairs.clone(),
            OracleCfg::default(),
            StdRng::seed_from_u64(99),
        )
        .unwrap();
        oracle.score(&chebyshev(), ScoreFlags::validation(), &mut BestRecord::default())
    };
    let a = run();
    let b = run();
    assert_eq!(a.avg_steps, b.avg_steps);
    assert_eq!(a.accepted, b.accepted);
}

#[test]
fn unreachable_goal_runs_away() {
    let maze = Maze::from_rows(&["..@..", "..@..", "..@..", "..@..", "..@.."]).unwrap();
    let pair = Pair::new(Cell::new(0, 0), Cell::new(0, 4));
    let mut oracle =
        Oracle::new(maze, vec![pair], OracleCfg::default(), StdRng::seed_from_u64(4)).unwrap();
    let s = oracle.score(&manhattan(), ScoreFlags::validation(), &mut BestRecord::default());
    assert_eq!(s, Score::invalid());
}

#[test]
fn overflowing_fields_are_rejected() {
    let huge = Program::times(
        &Program::num(f64::MAX),
        &Program::plus(&Program::var(Var::StateX), &Program::num(2.0)),
    );
    let mut oracle = open_oracle(OracleCfg::default(), 5);
    let s = oracle.score(&huge, ScoreFlags::canonical(true), &mut BestRecord::default());
    assert_eq!(s, Score::rejected());
}

#[test]
fn pruning_aborts_against_a_better_incumbent() {
    let mut best = BestRecord {
        prune_avg: 1.0,
        ..BestRecord::default()
    };
    let mut oracle = open_oracle(OracleCfg::default(), 6);
    let s = oracle.score(&manhattan(), ScoreFlags::canonical(true), &mut best);
    assert_eq!(s, Score::pruned(0));
    assert_eq!(best.prune_avg, 1.0);

    let cfg = OracleCfg {
        early_termination: false,
        ..OracleCfg::default()
    };
    let mut oracle = open_oracle(cfg, 6);
    let s = oracle.score(&manhattan(), ScoreFlags::validation(), &mut best);
    assert_eq!(s.avg_steps, 5.0);
}

#[test]
fn rotated_mode_doubles_the_walks() {
    let cfg = OracleCfg {
        rotate_maze: true,
        ..OracleCfg::default()
    };
    let mut oracle = open_oracle(cfg, 7);
    assert_eq!(oracle.walks_per_candidate(), 2);
    let s = oracle.score(&manhattan(), ScoreFlags::validation(), &mut BestRecord::default());
    assert_eq!(s.completed, Some(2));
    assert_eq!(s.avg_steps, 5.0);
}

#[test]
fn empty_pair_list_scores_invalid() {
    let mut oracle = Oracle::new(
        Maze::open(3, 3).unwrap(),
        Vec::new(),
        OracleCfg::default(),
        StdRng::seed_from_u64(0),
    )
    .unwrap();
    let s = oracle.score(&manhattan(), ScoreFlags::validation(), &mut BestRecord::default());
    assert_eq!(s, Score::invalid());
}

#[test]
fn pairs_outside_the_maze_are_refused() {
    let pairs = vec![
        Pair::new(Cell::new(0, 0), Cell::new(2, 3)),
        Pair::new(Cell::new(1, 1), Cell::new(3, 0)),
    ];
    let err = Oracle::new(
        Maze::open(3, 4).unwrap(),
        pairs,
        OracleCfg::default(),
        StdRng::seed_from_u64(0),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        MazeError::PairOutOfBounds {
            rows: 3,
            cols: 4,
            ..
        }
    ));
    assert!(err.to_string().contains("(1, 1) -> (3, 0)"));
}

#[test]
fn rotated_mode_on_a_walled_strip() {
    let maze = Maze::from_rows(&["......", ".@@@..", "......"]).unwrap();
    let pairs = vec![
        Pair::new(Cell::new(0, 0), Cell::new(2, 5)),
        Pair::new(Cell::new(2, 1), Cell::new(0, 4)),
    ];
    let cfg = OracleCfg {
        rotate_maze: true,
        ..OracleCfg::default()
    };
    let mut oracle = Oracle::new(maze.clone(), pairs, cfg, StdRng::seed_from_u64(11)).unwrap();
    assert_eq!(oracle.walks_per_candidate(), 4);
    let s = oracle.score(&manhattan(), ScoreFlags::validation(), &mut BestRecord::default());
    assert_eq!(s.accepted, Some(true));
    assert_eq!(s.completed, Some(4));
    assert!(s.avg_steps.is_finite());
    assert!(s.avg_steps >= 1.0);

    // every padded cell keeps its value under the rotation of its coordinates
    let field = DMatrix::from_fn(3, 6, |r, c| (r * 6 + c) as f64 / 17.0);
    let padded = pad(&field, &maze);
    let rotated = rotate_ccw(&padded);
    assert_eq!(rotated.shape(), (8, 5));
    for r in 0..padded.nrows() {
        for c in 0..padded.ncols() {
            let moved = rotate_cell(Cell::new(r, c), padded.ncols());
            assert_eq!(rotated[(moved.row, moved.col)], padded[(r, c)]);
        }
    }
}

#[test]
fn large_raw_values_keep_distinct_fingerprints() {
    assert_ne!(quantize(1e10), quantize(2e10));
    assert_ne!(quantize(9.3e18), quantize(9.4e18));
    assert_eq!(quantize(0.25), quantize(0.25 + 1e-12));
    assert_eq!(quantize(-0.0), quantize(0.0));

    // raw windows of x·1e10 and x·2e10 differ, so neither collides
    let scaled = |k: f64| {
        Program::times(
            &Program::num(k),
            &Program::plus(&Program::var(Var::StateX), &Program::num(2.0)),
        )
    };
    let mut oracle = open_oracle(OracleCfg::default(), 12);
    let mut best = BestRecord::default();
    let a = oracle.score(&scaled(1e10), ScoreFlags::canonical(false), &mut best);
    let b = oracle.score(&scaled(2e10), ScoreFlags::canonical(false), &mut best);
    assert_eq!(a.accepted, Some(true));
    assert_eq!(b.accepted, Some(true));
    assert_eq!(oracle.fingerprints_seen(), 2);
}

#[test]
fn constant_field_normalizes_to_zero() {
    let mut f = DMatrix::from_element(3, 4, 2.5);
    normalize(&mut f);
    assert!(f.iter().all(|v| *v == 0.0));
}

#[test]
fn rotation_matches_quarter_turn() {
    let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let r = rotate_ccw(&m);
    assert_eq!(r, DMatrix::from_row_slice(3, 2, &[3.0, 6.0, 2.0, 5.0, 1.0, 4.0]));
    let moved = rotate_cell(Cell::new(0, 0), 3);
    assert_eq!(r[(moved.row, moved.col)], 1.0);
    let moved = rotate_cell(Cell::new(1, 1), 3);
    assert_eq!(r[(moved.row, moved.col)], 5.0);
}

#[test]
fn windows_stay_inside_the_grid() {
    assert_eq!(
        Window::around(Cell::new(0, 9), 10, 10),
        Window {
            rows: 0..5,
            cols: 5..10
        }
    );
    assert_eq!(
        Window::around(Cell::new(4, 1), 10, 3),
        Window {
            rows: 2..7,
            cols: 0..3
        }
    );
}

#[test]
fn padding_marks_border_and_walls() {
    let maze = Maze::from_rows(&[".@", ".."]).unwrap();
    let field = DMatrix::from_element(2, 2, 0.25);
    let p = pad(&field, &maze);
    assert_eq!(p.shape(), (4, 4));
    assert_eq!(p[(0, 0)], BORDER);
    assert_eq!(p[(1, 2)], BLOCKED);
    assert_eq!(p[(2, 2)], 0.25);
}

#[test]
fn walk_starting_on_goal_takes_one_step() {
    let costs = DMatrix::from_element(3, 3, 0.0);
    let c = Cell::new(1, 1);
    let out = greedy_walk(&costs, c, c, &mut StdRng::seed_from_u64(0), None);
    assert_eq!(out, WalkOutcome::Reached(1));
}

proptest! {
    #[test]
    fn normalized_fields_lie_in_unit_interval(
        values in prop::collection::vec(-1e3f64..1e3, 12)
    ) {
        let mut f = DMatrix::from_vec(3, 4, values);
        normalize(&mut f);
        prop_assert!(f.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
