//! Mazes and (start, goal) pair sampling.
//!
//! Purpose
//! - Hold the fixed free/blocked grid the oracle walks on.
//! - Provide the two ways of obtaining one: parsing a MovingAI `.map` file and
//!   generating a random maze (thresholded noise + 3×3 morphological closing).
//! - Sample start/goal pairs uniformly from free cells with an injected RNG.

use nalgebra::DMatrix;
use rand::Rng;
use std::fmt;

/// Grid coordinate `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One search query on the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pair {
    pub start: Cell,
    pub goal: Cell,
}

impl Pair {
    pub fn new(start: Cell, goal: Cell) -> Self {
        Self { start, goal }
    }
}

/// Errors raised while building a maze or sampling pairs.
#[derive(Debug)]
pub enum MazeError {
    Parse { reason: String },
    Empty,
    NoFreeCells,
    /// A pair endpoint lies outside the grid.
    PairOutOfBounds { pair: Pair, rows: usize, cols: usize },
}

impl MazeError {
    fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { reason } => write!(f, "invalid map: {reason}"),
            Self::Empty => write!(f, "maze has zero rows or columns"),
            Self::NoFreeCells => write!(f, "maze has no free cells to sample from"),
            Self::PairOutOfBounds { pair, rows, cols } => write!(
                f,
                "pair ({}, {}) -> ({}, {}) lies outside the {rows}x{cols} maze",
                pair.start.row, pair.start.col, pair.goal.row, pair.goal.col
            ),
        }
    }
}

impl std::error::Error for MazeError {}

/// Immutable free/blocked grid (`true` = blocked).
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    blocked: DMatrix<bool>,
}

impl Maze {
    pub fn from_blocked(blocked: DMatrix<bool>) -> Result<Self, MazeError> {
        if blocked.nrows() == 0 || blocked.ncols() == 0 {
            return Err(MazeError::Empty);
        }
        Ok(Self { blocked })
    }

    /// All cells free.
    pub fn open(rows: usize, cols: usize) -> Result<Self, MazeError> {
        Self::from_blocked(DMatrix::from_element(rows, cols, false))
    }

    /// Build from text rows: `.` is free, `T` and `@` are blocked.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MazeError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        let mut blocked = DMatrix::from_element(height, width, false);
        for (r, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != width {
                return Err(MazeError::parse(format!(
                    "row {r} has {} cells, expected {width}",
                    line.chars().count()
                )));
            }
            for (c, ch) in line.chars().enumerate() {
                blocked[(r, c)] = match ch {
                    '.' => false,
                    'T' | '@' => true,
                    other => {
                        return Err(MazeError::parse(format!(
                            "unexpected cell '{other}' at ({r}, {c})"
                        )))
                    }
                };
            }
        }
        Self::from_blocked(blocked)
    }

    /// Parse a MovingAI map (`type`, `height N`, `width M`, `map`, then rows).
    pub fn parse_map(text: &str) -> Result<Self, MazeError> {
        let mut height = None;
        let mut width = None;
        let mut lines = text.lines();
        for line in lines.by_ref() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("height") => height = parts.next().and_then(|v| v.parse::<usize>().ok()),
                Some("width") => width = parts.next().and_then(|v| v.parse::<usize>().ok()),
                Some("map") => break,
                _ => {}
            }
        }
        let height = height.ok_or_else(|| MazeError::parse("missing height"))?;
        let width = width.ok_or_else(|| MazeError::parse("missing width"))?;
        let rows: Vec<&str> = lines
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        if rows.len() != height {
            return Err(MazeError::parse(format!(
                "header says {height} rows, found {}",
                rows.len()
            )));
        }
        let maze = Self::from_rows(&rows)?;
        if maze.cols() != width {
            return Err(MazeError::parse(format!(
                "header says {width} columns, found {}",
                maze.cols()
            )));
        }
        Ok(maze)
    }

    /// Random maze: a cell is blocked when its uniform draw exceeds `cutoff`,
    /// then a 3×3 closing (dilate, erode) joins nearby obstacles.
    pub fn generate<R: Rng>(
        rows: usize,
        cols: usize,
        cutoff: f64,
        rng: &mut R,
    ) -> Result<Self, MazeError> {
        let noise = DMatrix::from_fn(rows, cols, |_, _| rng.gen::<f64>() > cutoff);
        let closed = erode(&dilate(&noise));
        Self::from_blocked(closed)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.blocked.nrows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.blocked.ncols()
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows() && cell.col < self.cols()
    }

    #[inline]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.blocked[(cell.row, cell.col)]
    }

    pub fn free_cells(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        for r in 0..self.rows() {
            for c in 0..self.cols() {
                if !self.blocked[(r, c)] {
                    out.push(Cell::new(r, c));
                }
            }
        }
        out
    }

    /// Draw `n` starts, then `n` goals, each uniformly (with replacement) from
    /// the free cells in row-major order.
    pub fn sample_pairs<R: Rng>(&self, n: usize, rng: &mut R) -> Result<Vec<Pair>, MazeError> {
        let free = self.free_cells();
        if free.is_empty() {
            return Err(MazeError::NoFreeCells);
        }
        let starts: Vec<Cell> = (0..n).map(|_| free[rng.gen_range(0..free.len())]).collect();
        let goals: Vec<Cell> = (0..n).map(|_| free[rng.gen_range(0..free.len())]).collect();
        Ok(starts
            .into_iter()
            .zip(goals)
            .map(|(s, g)| Pair::new(s, g))
            .collect())
    }
}

// Out-of-bounds neighbors are ignored, so borders neither grow nor shrink obstacles.
fn morph(src: &DMatrix<bool>, blocked_if_any: bool) -> DMatrix<bool> {
    let (rows, cols) = src.shape();
    DMatrix::from_fn(rows, cols, |r, c| {
        let mut any = false;
        let mut all = true;
        for rr in r.saturating_sub(1)..=(r + 1).min(rows - 1) {
            for cc in c.saturating_sub(1)..=(c + 1).min(cols - 1) {
                any |= src[(rr, cc)];
                all &= src[(rr, cc)];
            }
        }
        if blocked_if_any {
            any
        } else {
            all
        }
    })
}

fn dilate(src: &DMatrix<bool>) -> DMatrix<bool> {
    morph(src, true)
}

fn erode(src: &DMatrix<bool>) -> DMatrix<bool> {
    morph(src, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const SMALL_MAP: &str = "type octile\nheight 3\nwidth 4\nmap\n....\n.@T.\n....\n";

    #[test]
    fn parses_movingai_map() {
        let maze = Maze::parse_map(SMALL_MAP).unwrap();
        assert_eq!((maze.rows(), maze.cols()), (3, 4));
        assert!(maze.is_blocked(Cell::new(1, 1)));
        assert!(maze.is_blocked(Cell::new(1, 2)));
        assert!(!maze.is_blocked(Cell::new(0, 0)));
        assert_eq!(maze.free_cells().len(), 10);
    }

    #[test]
    fn rejects_inconsistent_header() {
        let bad = "type octile\nheight 2\nwidth 4\nmap\n....\n";
        assert!(matches!(Maze::parse_map(bad), Err(MazeError::Parse { .. })));
        let ragged = Maze::from_rows(&["...", ".."]);
        assert!(ragged.is_err());
        assert!(matches!(Maze::open(0, 3), Err(MazeError::Empty)));
    }

    #[test]
    fn closing_fills_single_gaps() {
        // A free cell enclosed by obstacles is filled; open space stays free.
        let src = DMatrix::from_row_slice(
            3,
            5,
            &[
                true, true, true, false, false, //
                true, false, true, false, false, //
                true, true, true, false, false,
            ],
        );
        let closed = erode(&dilate(&src));
        assert!(closed[(1, 1)]);
        assert!(!closed[(1, 4)]);
    }

    #[test]
    fn generated_maze_is_reproducible() {
        let a = Maze::generate(12, 9, 0.8, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = Maze::generate(12, 9, 0.8, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.rows(), a.cols()), (12, 9));
    }

    #[test]
    fn sampled_pairs_land_on_free_cells() {
        let maze = Maze::parse_map(SMALL_MAP).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let pairs = maze.sample_pairs(25, &mut rng).unwrap();
        assert_eq!(pairs.len(), 25);
        for p in pairs {
            assert!(!maze.is_blocked(p.start));
            assert!(!maze.is_blocked(p.goal));
        }
        let walls = Maze::from_rows(&["@@", "@@"]).unwrap();
        assert!(matches!(
            walls.sample_pairs(1, &mut rng),
            Err(MazeError::NoFreeCells)
        ));
    }
}
