//! Bottom-up enumeration driven by a size counter with adaptive restarts.

use rand::Rng;
use std::collections::HashSet;
use std::fmt;

use super::cost::CostModel;
use super::table::BucketTable;
use crate::dsl::Program;
use crate::oracle::{BestRecord, Oracle, ScoreFlags};

/// Synthesis configuration.
#[derive(Clone, Copy, Debug)]
pub struct SynthCfg {
    /// Stop once the size counter reaches this value; 0 disables search.
    pub bound: usize,
    /// Restart when a new best is at least this fraction below the
    /// best recorded at the last restart.
    pub restart_margin: f64,
    pub compare_normalized_costs: bool,
    pub cost: CostModel,
}

impl Default for SynthCfg {
    fn default() -> Self {
        Self {
            bound: 10,
            restart_margin: 0.05,
            compare_normalized_costs: true,
            cost: CostModel::default(),
        }
    }
}

/// Fatal synthesis errors. Per-candidate failures never surface here.
#[derive(Debug)]
pub enum SynthesisError {
    /// The cost model produced a negative bucket index.
    NegativeBucket { program: String, index: f64 },
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeBucket { program, index } => write!(
                f,
                "cost model assigned negative bucket {index} to {program}; check log base and regularization"
            ),
        }
    }
}

impl std::error::Error for SynthesisError {}

/// Where the state machine stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Next step enumerates size `n + 1`.
    Growing(usize),
    Done,
}

/// Counters for one enumerated size level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelReport {
    pub size: usize,
    pub planned: usize,
    pub evaluated: usize,
    pub duplicates: usize,
    pub accepted: usize,
    pub improvements: usize,
    pub restarted: bool,
}

/// Final state of a search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub best_avg_steps: f64,
    pub best_program: Option<Program>,
    pub levels: usize,
    pub restarts: usize,
    pub evaluated: usize,
}

/// Guided bottom-up search over the heuristic grammar.
pub struct Synthesizer<R> {
    oracle: Oracle<R>,
    cfg: SynthCfg,
    table: BucketTable,
    registry: HashSet<String>,
    best: BestRecord,
    size: usize,
    restart_pending: bool,
    levels: usize,
    restarts: usize,
    evaluated: usize,
}

impl<R: Rng> Synthesizer<R> {
    pub fn new(oracle: Oracle<R>, leaves: Vec<Program>, cfg: SynthCfg) -> Self {
        Self {
            oracle,
            cfg,
            table: BucketTable::with_leaves(leaves),
            registry: HashSet::new(),
            best: BestRecord::default(),
            size: 0,
            restart_pending: false,
            levels: 0,
            restarts: 0,
            evaluated: 0,
        }
    }

    pub fn cfg(&self) -> &SynthCfg {
        &self.cfg
    }

    pub fn oracle(&self) -> &Oracle<R> {
        &self.oracle
    }

    pub fn table(&self) -> &BucketTable {
        &self.table
    }

    pub fn best(&self) -> &BestRecord {
        &self.best
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Canonical strings scored so far.
    pub fn registry_len(&self) -> usize {
        self.registry.len()
    }

    /// True once an improvement cleared the restart margin in the current level.
    pub fn restart_pending(&self) -> bool {
        self.restart_pending
    }

    pub fn phase(&self) -> Phase {
        if self.size < self.cfg.bound {
            Phase::Growing(self.size)
        } else {
            Phase::Done
        }
    }

    /// Run to completion.
    pub fn search(&mut self) -> Result<SearchOutcome, SynthesisError> {
        while self.step()?.is_some() {}
        Ok(self.outcome())
    }

    /// Advance one size level; `None` once the bound is reached.
    pub fn step(&mut self) -> Result<Option<LevelReport>, SynthesisError> {
        if self.phase() == Phase::Done {
            return Ok(None);
        }
        self.size += 1;
        let mut report = self.run_level()?;
        self.levels += 1;
        if self.restart_pending {
            self.restart();
            report.restarted = true;
        }
        Ok(Some(report))
    }

    pub fn outcome(&self) -> SearchOutcome {
        SearchOutcome {
            best_avg_steps: self.best.avg_steps,
            best_program: self.best.program.clone(),
            levels: self.levels,
            restarts: self.restarts,
            evaluated: self.evaluated,
        }
    }

    fn run_level(&mut self) -> Result<LevelReport, SynthesisError> {
        let plan = self.table.level_plan(self.size);
        let mut report = LevelReport {
            size: self.size,
            planned: plan.total_candidates(),
            ..LevelReport::default()
        };
        tracing::info!(
            size = self.size,
            candidates = report.planned,
            "enumerating level"
        );
        let flags = ScoreFlags::canonical(self.cfg.compare_normalized_costs);
        let walks = self.oracle.walks_per_candidate();
        let mut cursor = plan.candidates();
        while let Some(candidate) = cursor.next_candidate(&self.table) {
            let key = candidate.render();
            if self.registry.contains(&key) {
                report.duplicates += 1;
                continue;
            }
            report.evaluated += 1;
            self.evaluated += 1;
            let score = self.oracle.score(&candidate, flags, &mut self.best);
            if score.is_accepted() {
                let completed = score.completed.unwrap_or(0);
                let bucket = self
                    .cfg
                    .cost
                    .bucket(completed, walks, candidate.structural_size())
                    .map_err(|index| SynthesisError::NegativeBucket {
                        program: key.clone(),
                        index,
                    })?;
                tracing::debug!(program = %key, bucket, avg_steps = score.avg_steps, "accepted");
                self.table.push(bucket, candidate.clone());
                report.accepted += 1;
            }
            self.registry.insert(key);
            if score.avg_steps < self.best.avg_steps {
                self.record_improvement(candidate, score.avg_steps);
                report.improvements += 1;
            }
        }
        Ok(report)
    }

    pub(super) fn record_improvement(&mut self, program: Program, avg_steps: f64) {
        if avg_steps <= (1.0 - self.cfg.restart_margin) * self.best.avg_at_last_restart {
            self.restart_pending = true;
        }
        tracing::info!(program = %program, avg_steps, "new best");
        self.best.avg_steps = avg_steps;
        self.best.program = Some(program);
    }

    pub(super) fn restart(&mut self) {
        tracing::info!(
            best = self.best.avg_steps,
            programs = self.table.len(),
            "restarting size counter"
        );
        self.size = 0;
        self.restart_pending = false;
        self.best.avg_at_last_restart = self.best.avg_steps;
        self.restarts += 1;
    }
}
