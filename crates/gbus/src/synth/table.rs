//! Append-only bucket table and per-level candidate enumeration.

use std::collections::BTreeMap;

use crate::dsl::{production, Program, PRODUCTIONS_PER_PAIR};

/// Bucket index → programs, in insertion order. Entries are never removed.
#[derive(Clone, Debug, Default)]
pub struct BucketTable {
    buckets: BTreeMap<usize, Vec<Program>>,
}

impl BucketTable {
    /// Table with `leaves` in bucket 1.
    pub fn with_leaves(leaves: Vec<Program>) -> Self {
        let mut buckets = BTreeMap::new();
        buckets.insert(1, leaves);
        Self { buckets }
    }

    pub fn push(&mut self, bucket: usize, program: Program) {
        self.buckets.entry(bucket).or_default().push(program);
    }

    pub fn get(&self, bucket: usize) -> &[Program] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty buckets in increasing index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Program])> + '_ {
        self.buckets
            .iter()
            .filter(|(_, progs)| !progs.is_empty())
            .map(|(b, progs)| (*b, progs.as_slice()))
    }

    /// Total number of programs across buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unordered bucket pairs `(lo, hi)` with `lo + hi + 1 == size`, sized as of now.
    pub fn level_plan(&self, size: usize) -> LevelPlan {
        let mut pairs = Vec::new();
        for (lo, lo_progs) in self.iter() {
            let Some(hi) = size.checked_sub(lo + 1) else {
                break;
            };
            if hi < lo {
                break;
            }
            let hi_len = self.get(hi).len();
            if hi_len > 0 {
                pairs.push(BucketPair {
                    lo,
                    hi,
                    lo_len: lo_progs.len(),
                    hi_len,
                });
            }
        }
        LevelPlan { size, pairs }
    }
}

/// One unordered bucket pair with the bucket lengths frozen at plan time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketPair {
    pub lo: usize,
    pub hi: usize,
    pub lo_len: usize,
    pub hi_len: usize,
}

/// Everything one size level will enumerate.
#[derive(Clone, Debug)]
pub struct LevelPlan {
    pub size: usize,
    pub pairs: Vec<BucketPair>,
}

impl LevelPlan {
    /// Candidate count before registry dedup (progress reporting only).
    pub fn total_candidates(&self) -> usize {
        self.pairs
            .iter()
            .map(|p| p.lo_len * p.hi_len * PRODUCTIONS_PER_PAIR)
            .sum()
    }

    pub fn candidates(self) -> Candidates {
        Candidates {
            pairs: self.pairs,
            pair: 0,
            i: 0,
            j: 0,
            k: 0,
        }
    }
}

/// Lazy cursor over a level's candidates.
///
/// Borrows the table only per call, so the caller may append to it between
/// pulls; programs added after planning are not enumerated.
#[derive(Clone, Debug)]
pub struct Candidates {
    pairs: Vec<BucketPair>,
    pair: usize,
    i: usize,
    j: usize,
    k: usize,
}

impl Candidates {
    pub fn next_candidate(&mut self, table: &BucketTable) -> Option<Program> {
        while let Some(bp) = self.pairs.get(self.pair) {
            if self.i >= bp.lo_len {
                self.pair += 1;
                self.i = 0;
                self.j = 0;
                self.k = 0;
            } else if self.j >= bp.hi_len {
                self.i += 1;
                self.j = 0;
                self.k = 0;
            } else if self.k >= PRODUCTIONS_PER_PAIR {
                self.j += 1;
                self.k = 0;
            } else {
                let p1 = &table.get(bp.lo)[self.i];
                let p2 = &table.get(bp.hi)[self.j];
                let k = self.k;
                self.k += 1;
                return production(k, p1, p2);
            }
        }
        None
    }
}
