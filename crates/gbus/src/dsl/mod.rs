//! Heuristic grammar: expression trees, evaluation, and the production catalog.
//!
//! Purpose
//! - Represent candidate heuristics as immutable trees whose subtrees are
//!   shared (`Rc`) between every program built on top of them.
//! - Evaluate a tree over whole coordinate grids at once; scalars broadcast.
//!
//! Layout
//! - `types.rs`: `Var`, `BinOp`, `Node`, `Program` (size, canonical rendering).
//! - `value.rs`: `Value`, `Env`, grid evaluation.
//! - `grammar.rs`: default leaves, the 11 productions, reference heuristics.

mod grammar;
mod types;
mod value;

pub use grammar::{
    default_leaves, manhattan, manhattan_diagonal, production, productions,
    PRODUCTIONS_PER_PAIR,
};
pub use types::{BinOp, Node, Program, Var};
pub use value::{coordinate_grids, Env, Value};
