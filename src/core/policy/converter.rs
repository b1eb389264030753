//! Policy converter
//!
//! Overlays the fields present in a caller's policy object onto the client
//! default for the same policy type. The filter expression is compiled
//! separately so the caller can take ownership of the policy first.

use crate::config::Validate;
use crate::core::expression::{FilterExpression, compile};
use crate::utils::error::{ClientError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

/// Policy field holding the filter expression
pub const EXPRESSION_FIELD: &str = "expression";

/// Convert a caller policy object, starting from `defaults`
///
/// Unknown fields are ignored; a known field with a value of the wrong type
/// or out of range is reported by name.
pub fn convert_policy<P>(repr: &Json, defaults: &P) -> Result<P>
where
    P: Serialize + DeserializeOwned + Validate,
{
    let overrides = repr
        .as_object()
        .ok_or_else(|| ClientError::invalid_parameter("policy must be a dict"))?;

    let mut merged = match serde_json::to_value(defaults)? {
        Json::Object(fields) => fields,
        _ => return Err(ClientError::internal("policy defaults are not a struct")),
    };

    for (field, value) in overrides {
        if !merged.contains_key(field) {
            continue;
        }
        merged.insert(field.clone(), value.clone());
        if serde_json::from_value::<P>(Json::Object(merged.clone())).is_err() {
            return Err(ClientError::invalid_parameter(format!(
                "policy.{} has an invalid value: {}",
                field, value
            )));
        }
    }

    let policy: P = serde_json::from_value(Json::Object(merged))?;
    policy
        .validate()
        .map_err(|e| ClientError::invalid_parameter(format!("policy.{}", e)))?;
    Ok(policy)
}

/// Compile the policy's filter expression, if it carries one
pub fn policy_expression(repr: &Json) -> Result<Option<FilterExpression>> {
    match repr.get(EXPRESSION_FIELD) {
        None | Some(Json::Null) => Ok(None),
        Some(expr) => Ok(Some(compile(expr)?)),
    }
}
