//! Configuration, flags, results, and the shared best record.

use crate::dsl::Program;

/// Oracle configuration.
#[derive(Clone, Copy, Debug)]
pub struct OracleCfg {
    /// Walk every pair a second time on the 90°-rotated field.
    pub rotate_maze: bool,
    /// Abort a candidate once its running step total cannot beat the pruning bound.
    pub early_termination: bool,
}

impl Default for OracleCfg {
    fn default() -> Self {
        Self {
            rotate_maze: false,
            early_termination: true,
        }
    }
}

/// Per-call scoring flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreFlags {
    /// Fingerprint normalized (true) or raw (false) window values.
    pub compare_normalized_costs: bool,
    /// Canonical mode: dedup by fingerprint and lower the pruning bound.
    /// Off means validation-only scoring with no side effects on the oracle state.
    pub update_best: bool,
}

impl ScoreFlags {
    pub fn canonical(compare_normalized_costs: bool) -> Self {
        Self {
            compare_normalized_costs,
            update_best: true,
        }
    }

    pub fn validation() -> Self {
        Self {
            compare_normalized_costs: true,
            update_best: false,
        }
    }
}

/// Oracle verdict for one candidate.
///
/// - `accepted == None`: no verdict (scalar output or a runaway walk).
/// - `accepted == Some(false)`: numerically unstable field or fingerprint collision.
/// - `accepted == Some(true)`: the field passed all checks; `avg_steps` is
///   finite unless the candidate was pruned, in which case `completed` counts
///   the walks finished before the abort.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
    pub avg_steps: f64,
    pub accepted: Option<bool>,
    pub completed: Option<usize>,
}

impl Score {
    pub fn invalid() -> Self {
        Self {
            avg_steps: f64::INFINITY,
            accepted: None,
            completed: None,
        }
    }

    pub fn rejected() -> Self {
        Self {
            avg_steps: f64::INFINITY,
            accepted: Some(false),
            completed: None,
        }
    }

    pub fn pruned(completed: usize) -> Self {
        Self {
            avg_steps: f64::INFINITY,
            accepted: Some(true),
            completed: Some(completed),
        }
    }

    pub fn finished(avg_steps: f64, walks: usize) -> Self {
        Self {
            avg_steps,
            accepted: Some(true),
            completed: Some(walks),
        }
    }

    #[inline]
    pub fn is_accepted(&self) -> bool {
        self.accepted == Some(true)
    }
}

/// Incumbent state shared between the engine (writer) and the oracle (reader).
///
/// The oracle only ever lowers `prune_avg`; every other field is owned by the engine.
#[derive(Clone, Debug)]
pub struct BestRecord {
    pub avg_steps: f64,
    pub program: Option<Program>,
    pub avg_at_last_restart: f64,
    /// Lowest average the oracle has completed in canonical mode.
    pub prune_avg: f64,
}

impl Default for BestRecord {
    fn default() -> Self {
        Self {
            avg_steps: f64::INFINITY,
            program: None,
            avg_at_last_restart: f64::INFINITY,
            prune_avg: f64::INFINITY,
        }
    }
}
