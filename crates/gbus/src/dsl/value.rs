//! Evaluation of programs over coordinate grids with scalar broadcasting.

use nalgebra::DMatrix;

use super::types::{BinOp, Node, Program, Var};

/// Result of evaluating a program: a scalar or a full grid.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(f64),
    Grid(DMatrix<f64>),
}

impl Value {
    pub fn as_grid(&self) -> Option<&DMatrix<f64>> {
        match self {
            Value::Grid(g) => Some(g),
            Value::Scalar(_) => None,
        }
    }

    pub fn into_grid(self) -> Option<DMatrix<f64>> {
        match self {
            Value::Grid(g) => Some(g),
            Value::Scalar(_) => None,
        }
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(s) => Value::Scalar(f(s)),
            Value::Grid(mut g) => {
                g.apply(|v| *v = f(*v));
                Value::Grid(g)
            }
        }
    }

    /// Elementwise `op`; scalars broadcast against grids.
    fn combine(op: BinOp, lhs: Value, rhs: Value) -> Value {
        match (lhs, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(op.apply(a, b)),
            (Value::Grid(mut a), Value::Scalar(b)) => {
                a.apply(|v| *v = op.apply(*v, b));
                Value::Grid(a)
            }
            (Value::Scalar(a), Value::Grid(mut b)) => {
                b.apply(|v| *v = op.apply(a, *v));
                Value::Grid(b)
            }
            (Value::Grid(a), Value::Grid(b)) => Value::Grid(a.zip_map(&b, |x, y| op.apply(x, y))),
        }
    }
}

/// Variable bindings for one evaluation: coordinate grids plus goal scalars.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a> {
    pub state_x: &'a DMatrix<f64>,
    pub state_y: &'a DMatrix<f64>,
    pub goal_x: f64,
    pub goal_y: f64,
}

impl Env<'_> {
    pub fn get(&self, var: Var) -> Value {
        match var {
            Var::StateX => Value::Grid(self.state_x.clone()),
            Var::StateY => Value::Grid(self.state_y.clone()),
            Var::GoalX => Value::Scalar(self.goal_x),
            Var::GoalY => Value::Scalar(self.goal_y),
        }
    }

    /// Lookup by variable name (`state_x`, `state_y`, `goal_x`, `goal_y`).
    pub fn lookup(&self, name: &str) -> Option<Value> {
        Var::from_name(name).map(|v| self.get(v))
    }
}

/// Row/column index grids for a `rows × cols` maze: `(state_x, state_y)`.
pub fn coordinate_grids(rows: usize, cols: usize) -> (DMatrix<f64>, DMatrix<f64>) {
    let xs = DMatrix::from_fn(rows, cols, |_, c| c as f64);
    let ys = DMatrix::from_fn(rows, cols, |r, _| r as f64);
    (xs, ys)
}

impl Program {
    pub fn evaluate(&self, env: &Env<'_>) -> Value {
        match self.node() {
            Node::Num(v) => Value::Scalar(*v),
            Node::Var(v) => env.get(*v),
            Node::Bin(op, a, b) => Value::combine(*op, a.evaluate(env), b.evaluate(env)),
            Node::Abs(a) => a.evaluate(env).map(f64::abs),
        }
    }
}
