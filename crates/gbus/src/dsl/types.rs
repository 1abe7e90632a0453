//! Expression nodes of the heuristic grammar.
//!
//! `Program` is a cheap handle: cloning bumps a reference count, and combining
//! two programs stores the handles, never copies of the subtrees.

use std::fmt;
use std::rc::Rc;

/// Coordinate variables exposed to heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Var {
    /// Column index of each cell (grid).
    StateX,
    /// Row index of each cell (grid).
    StateY,
    /// Goal column (scalar per pair).
    GoalX,
    /// Goal row (scalar per pair).
    GoalY,
}

impl Var {
    pub const ALL: [Var; 4] = [Var::StateX, Var::StateY, Var::GoalX, Var::GoalY];

    pub fn name(self) -> &'static str {
        match self {
            Var::StateX => "state_x",
            Var::StateY => "state_y",
            Var::GoalX => "goal_x",
            Var::GoalY => "goal_y",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Var::ALL.into_iter().find(|v| v.name() == name)
    }
}

/// Binary operators of the grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Plus,
    Minus,
    Times,
    Max,
    Min,
}

impl BinOp {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinOp::Plus => a + b,
            BinOp::Minus => a - b,
            BinOp::Times => a * b,
            BinOp::Max => a.max(b),
            BinOp::Min => a.min(b),
        }
    }
}

/// One node of an expression tree.
#[derive(Debug)]
pub enum Node {
    Num(f64),
    Var(Var),
    Bin(BinOp, Program, Program),
    Abs(Program),
}

/// Immutable, shareable expression tree with its structural size cached.
#[derive(Clone, Debug)]
pub struct Program {
    node: Rc<Node>,
    size: usize,
}

impl Program {
    pub fn num(value: f64) -> Self {
        Self::leaf(Node::Num(value))
    }

    pub fn var(var: Var) -> Self {
        Self::leaf(Node::Var(var))
    }

    pub fn bin(op: BinOp, lhs: &Program, rhs: &Program) -> Self {
        let size = 1 + lhs.size + rhs.size;
        Self {
            node: Rc::new(Node::Bin(op, lhs.clone(), rhs.clone())),
            size,
        }
    }

    pub fn abs(inner: &Program) -> Self {
        Self {
            node: Rc::new(Node::Abs(inner.clone())),
            size: 1 + inner.size,
        }
    }

    pub fn plus(lhs: &Program, rhs: &Program) -> Self {
        Self::bin(BinOp::Plus, lhs, rhs)
    }
    pub fn minus(lhs: &Program, rhs: &Program) -> Self {
        Self::bin(BinOp::Minus, lhs, rhs)
    }
    pub fn times(lhs: &Program, rhs: &Program) -> Self {
        Self::bin(BinOp::Times, lhs, rhs)
    }
    pub fn max(lhs: &Program, rhs: &Program) -> Self {
        Self::bin(BinOp::Max, lhs, rhs)
    }
    pub fn min(lhs: &Program, rhs: &Program) -> Self {
        Self::bin(BinOp::Min, lhs, rhs)
    }

    fn leaf(node: Node) -> Self {
        Self {
            node: Rc::new(node),
            size: 1,
        }
    }

    #[inline]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Number of nodes in the tree (leaves count 1).
    #[inline]
    pub fn structural_size(&self) -> usize {
        self.size
    }

    /// Canonical string form; equal structures render equal strings.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// True when both handles point at the same allocation.
    pub fn shares_root(&self, other: &Program) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Num(v) => write!(f, "{v}"),
            Node::Var(v) => f.write_str(v.name()),
            Node::Bin(op, a, b) => match op {
                BinOp::Plus => write!(f, "({a} + {b})"),
                BinOp::Minus => write!(f, "({a} - {b})"),
                BinOp::Times => write!(f, "({a} * {b})"),
                BinOp::Max => write!(f, "max({a}, {b})"),
                BinOp::Min => write!(f, "min({a}, {b})"),
            },
            Node::Abs(a) => write!(f, "abs({a})"),
        }
    }
}
