//! Filter expressions
//!
//! Predicate trees attached to policies and evaluated by the store against
//! the existing record before an operation is applied.

mod compiler;
mod eval;

pub use compiler::compile;

use crate::core::types::Value;
use thiserror::Error;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// Compiled predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Const(bool),
    Compare {
        op: CmpOp,
        bin: String,
        value: Value,
    },
    BinExists(String),
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            FilterExpression::And(children) | FilterExpression::Or(children) => {
                1 + children.iter().map(FilterExpression::size).sum::<usize>()
            }
            FilterExpression::Not(inner) => 1 + inner.size(),
            _ => 1,
        }
    }
}

/// Expression compilation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("expression must be an object with exactly one operator")]
    Malformed,

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("operand of '{op}' is invalid: {reason}")]
    InvalidOperand { op: String, reason: String },

    #[error("expression exceeds {0} nodes")]
    TooLarge(usize),
}
