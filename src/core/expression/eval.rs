//! Evaluate predicate trees against record bins

use super::{CmpOp, FilterExpression};
use crate::core::types::Bins;
use std::cmp::Ordering;

impl FilterExpression {
    /// Evaluate against a record's bins; comparisons on missing or
    /// incomparable bins are false
    pub fn evaluate(&self, bins: &Bins) -> bool {
        match self {
            FilterExpression::Const(b) => *b,
            FilterExpression::BinExists(bin) => bins.contains_key(bin),
            FilterExpression::And(children) => children.iter().all(|c| c.evaluate(bins)),
            FilterExpression::Or(children) => children.iter().any(|c| c.evaluate(bins)),
            FilterExpression::Not(inner) => !inner.evaluate(bins),
            FilterExpression::Compare { op, bin, value } => {
                let Some(ordering) = bins.get(bin).and_then(|v| v.partial_compare(value)) else {
                    return false;
                };
                match op {
                    CmpOp::Eq => ordering == Ordering::Equal,
                    CmpOp::Ne => ordering != Ordering::Equal,
                    CmpOp::Gt => ordering == Ordering::Greater,
                    CmpOp::Ge => ordering != Ordering::Less,
                    CmpOp::Lt => ordering == Ordering::Less,
                    CmpOp::Le => ordering != Ordering::Greater,
                }
            }
        }
    }
}
