//! Bucket assignment: performance + regularization, floored.
//!
//! `bucket = floor(perf + reg + 1)`, clamped to the structural size, where
//! - `perf = log_base(solved fraction)` with one of two smoothing variants,
//! - `reg = (size / divisor)^power`.
//!
//! With `log_base < 1` a poor solve rate pushes a program into a high bucket,
//! and large programs drift upward through `reg`.

/// Added to the solved fraction by `PerformanceTransform::Epsilon`.
pub const PERFORMANCE_EPSILON: f64 = 1e-4;

/// Smoothing applied before taking the logarithm of the solved fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerformanceTransform {
    /// `log(completed / walks + ε)`.
    Epsilon,
    /// `log((completed + 1) / (walks + 1))`.
    Laplace,
}

/// Where flooring happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Floor performance and regularization separately, then the sum.
    Individually,
    /// Floor only the sum.
    Sum,
}

/// Cost model hyperparameters.
#[derive(Clone, Copy, Debug)]
pub struct CostModel {
    pub transform: PerformanceTransform,
    pub log_base: f64,
    pub reg_divisor: f64,
    pub reg_power: f64,
    pub rounding: Rounding,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            transform: PerformanceTransform::Epsilon,
            log_base: 0.25,
            reg_divisor: 10.0,
            reg_power: 1.5,
            rounding: Rounding::Individually,
        }
    }
}

impl CostModel {
    pub fn performance(&self, completed: usize, walks: usize) -> f64 {
        let fraction = match self.transform {
            PerformanceTransform::Epsilon => {
                completed as f64 / walks as f64 + PERFORMANCE_EPSILON
            }
            PerformanceTransform::Laplace => (completed as f64 + 1.0) / (walks as f64 + 1.0),
        };
        fraction.ln() / self.log_base.ln()
    }

    pub fn regularization(&self, size: usize) -> f64 {
        (size as f64 / self.reg_divisor).powf(self.reg_power)
    }

    /// Bucket for a program of structural `size` that finished `completed` of `walks`.
    ///
    /// `Err` carries the floored index when it is negative, which means the
    /// model itself is misconfigured (e.g. `log_base > 1`).
    pub fn bucket(&self, completed: usize, walks: usize, size: usize) -> Result<usize, f64> {
        let mut perf = self.performance(completed, walks);
        let mut reg = self.regularization(size);
        if self.rounding == Rounding::Individually {
            perf = perf.floor();
            reg = reg.floor();
        }
        let index = (perf + reg + 1.0).floor();
        if index < 0.0 || index.is_nan() {
            return Err(index);
        }
        Ok((index.min(size as f64)) as usize)
    }
}
