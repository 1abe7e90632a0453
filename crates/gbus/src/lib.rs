//! Guided bottom-up synthesis of grid heuristics.
//!
//! A candidate heuristic is an expression over cell and goal coordinates. The
//! oracle scores it by greedy best-first walks across a fixed maze; the
//! synthesizer enumerates candidates bottom-up, pricing each into a cost
//! bucket from its walk performance and size.
//!
//! Modules
//! - `dsl`: expression trees, grid evaluation, production catalog.
//! - `maze`: maze parsing/generation and pair sampling.
//! - `oracle`: field checks, fingerprint dedup, the greedy walk.
//! - `synth`: cost model, bucket table, the search state machine.

pub mod dsl;
pub mod maze;
pub mod oracle;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for callers.
pub mod prelude {
    pub use crate::dsl::{default_leaves, manhattan, manhattan_diagonal, Env, Program, Value, Var};
    pub use crate::maze::{Cell, Maze, MazeError, Pair};
    pub use crate::oracle::{BestRecord, Oracle, OracleCfg, Score, ScoreFlags};
    pub use crate::synth::{
        CostModel, PerformanceTransform, Rounding, SearchOutcome, SynthCfg, SynthesisError,
        Synthesizer,
    };
}
