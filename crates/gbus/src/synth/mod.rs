//! Synthesis engine: guided bottom-up enumeration of heuristics.
//!
//! Purpose
//! - Grow candidates from a leaf set by combining programs of buckets `b1`,
//!   `b2` with `b1 + b2 + 1` equal to the current size level.
//! - Price each accepted candidate into a bucket from how many walks it
//!   finished and how large it is, so good small programs get recombined early.
//! - Reset the size counter on large improvements; the bucket table persists.
//!
//! Layout
//! - `cost.rs`: `CostModel` and its two open choices (smoothing, rounding).
//! - `table.rs`: `BucketTable`, `LevelPlan`, the lazy `Candidates` cursor.
//! - `engine.rs`: `Synthesizer` state machine, `SynthCfg`, `SynthesisError`.

mod cost;
mod engine;
mod table;

pub use cost::{CostModel, PerformanceTransform, Rounding, PERFORMANCE_EPSILON};
pub use engine::{LevelReport, Phase, SearchOutcome, SynthCfg, SynthesisError, Synthesizer};
pub use table::{BucketPair, BucketTable, Candidates, LevelPlan};
