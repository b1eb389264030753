//! Compile JSON predicate trees

use super::{CmpOp, ExpressionError, FilterExpression};
use crate::core::codec::decode_value;
use serde_json::Value as Json;

/// Largest tree accepted
pub const MAX_NODES: usize = 256;

/// Compile a caller expression into a predicate tree
pub fn compile(repr: &Json) -> Result<FilterExpression, ExpressionError> {
    let expr = compile_node(repr)?;
    if expr.size() > MAX_NODES {
        return Err(ExpressionError::TooLarge(MAX_NODES));
    }
    Ok(expr)
}

fn compile_node(repr: &Json) -> Result<FilterExpression, ExpressionError> {
    let fields = repr.as_object().ok_or(ExpressionError::Malformed)?;

    // Comparisons carry three fields, every other node exactly one.
    if let Some(cmp) = fields.get("cmp") {
        return compile_compare(cmp, fields);
    }
    if fields.len() != 1 {
        return Err(ExpressionError::Malformed);
    }
    let (op, operand) = fields.iter().next().ok_or(ExpressionError::Malformed)?;

    match op.as_str() {
        "const" => operand
            .as_bool()
            .map(FilterExpression::Const)
            .ok_or_else(|| invalid(op, "expected a boolean")),
        "bin_exists" => operand
            .as_str()
            .map(|bin| FilterExpression::BinExists(bin.to_string()))
            .ok_or_else(|| invalid(op, "expected a bin name")),
        "and" | "or" => {
            let children = operand
                .as_array()
                .filter(|items| !items.is_empty())
                .ok_or_else(|| invalid(op, "expected a non-empty list"))?
                .iter()
                .map(compile_node)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if op == "and" {
                FilterExpression::And(children)
            } else {
                FilterExpression::Or(children)
            })
        }
        "not" => Ok(FilterExpression::Not(Box::new(compile_node(operand)?))),
        other => Err(ExpressionError::UnknownOperator(other.to_string())),
    }
}

fn compile_compare(
    cmp: &Json,
    fields: &serde_json::Map<String, Json>,
) -> Result<FilterExpression, ExpressionError> {
    let op = match cmp.as_str() {
        Some("eq") => CmpOp::Eq,
        Some("ne") => CmpOp::Ne,
        Some("gt") => CmpOp::Gt,
        Some("ge") => CmpOp::Ge,
        Some("lt") => CmpOp::Lt,
        Some("le") => CmpOp::Le,
        Some(other) => return Err(ExpressionError::UnknownOperator(other.to_string())),
        None => return Err(invalid("cmp", "expected an operator name")),
    };

    if fields.len() != 3 {
        return Err(ExpressionError::Malformed);
    }

    let bin = fields
        .get("bin")
        .and_then(Json::as_str)
        .ok_or_else(|| invalid("cmp", "missing bin name"))?;
    let value = fields
        .get("value")
        .ok_or_else(|| invalid("cmp", "missing value"))
        .and_then(|raw| decode_value(raw).map_err(|e| invalid("cmp", &e.to_string())))?;

    Ok(FilterExpression::Compare {
        op,
        bin: bin.to_string(),
        value,
    })
}

fn invalid(op: &str, reason: &str) -> ExpressionError {
    ExpressionError::InvalidOperand {
        op: op.to_string(),
        reason: reason.to_string(),
    }
}
