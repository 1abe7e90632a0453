//! Cost-field helpers: normalization, fingerprint windows, padding, rotation.

use nalgebra::DMatrix;
use std::ops::Range;

use super::walk::{BLOCKED, BORDER};
use crate::maze::{Cell, Maze};

/// Side length of the fingerprint window.
pub(crate) const WINDOW: usize = 5;
/// Fingerprint values are rounded to this many steps per unit.
const FINGERPRINT_SCALE: f64 = 1e9;

/// Shift to `[0, max-min]`, then scale to `[0, 1]` unless the field is constant.
pub(crate) fn normalize(field: &mut DMatrix<f64>) {
    let lo = field.min();
    field.add_scalar_mut(-lo);
    let hi = field.max();
    if hi != 0.0 {
        *field /= hi;
    }
}

/// Finite and within `[0, 1]`.
pub(crate) fn is_stable(field: &DMatrix<f64>) -> bool {
    field.iter().all(|v| v.is_finite() && *v <= 1.0)
}

/// Local rectangle used to fingerprint a field near one start cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Window {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Window {
    pub fn around(cell: Cell, rows: usize, cols: usize) -> Self {
        Self {
            rows: span(cell.row, rows),
            cols: span(cell.col, cols),
        }
    }

    pub fn extend_fingerprint(&self, field: &DMatrix<f64>, out: &mut Vec<u64>) {
        for r in self.rows.clone() {
            for c in self.cols.clone() {
                out.push(quantize(field[(r, c)]));
            }
        }
    }
}

// Centered on `center` where possible, shifted inward at the edges, clipped to `dim`.
fn span(center: usize, dim: usize) -> Range<usize> {
    let lo = center
        .saturating_sub(WINDOW / 2)
        .min(dim.saturating_sub(WINDOW));
    lo..(lo + WINDOW).min(dim)
}

/// Round to `1 / FINGERPRINT_SCALE` and key by bit pattern, so large raw
/// values stay distinct instead of saturating an integer.
#[inline]
pub(crate) fn quantize(v: f64) -> u64 {
    let scaled = v * FINGERPRINT_SCALE;
    let rounded = if scaled.is_finite() {
        scaled.round() / FINGERPRINT_SCALE
    } else {
        v
    };
    // -0.0 and 0.0 share a key
    (rounded + 0.0).to_bits()
}

/// Copy `field` into a one-cell border of `BORDER`, with blocked cells set to `BLOCKED`.
pub(crate) fn pad(field: &DMatrix<f64>, maze: &Maze) -> DMatrix<f64> {
    let (rows, cols) = field.shape();
    DMatrix::from_fn(rows + 2, cols + 2, |r, c| {
        if r == 0 || c == 0 || r == rows + 1 || c == cols + 1 {
            BORDER
        } else if maze.is_blocked(Cell::new(r - 1, c - 1)) {
            BLOCKED
        } else {
            field[(r - 1, c - 1)]
        }
    })
}

/// Rotate 90° counter-clockwise: entry `(r, c)` moves to `(cols-1-c, r)`.
pub(crate) fn rotate_ccw(m: &DMatrix<f64>) -> DMatrix<f64> {
    let (rows, cols) = m.shape();
    DMatrix::from_fn(cols, rows, |i, j| m[(j, cols - 1 - i)])
}

/// Where `cell` of a matrix with `cols` columns lands after `rotate_ccw`.
#[inline]
pub(crate) fn rotate_cell(cell: Cell, cols: usize) -> Cell {
    Cell::new(cols - 1 - cell.col, cell.row)
}
