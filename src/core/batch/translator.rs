//! Request translator
//!
//! Turns each caller [`BatchRecord`] into an internal [`BatchRecordRequest`],
//! registering every resource it creates with the record's arena slot as
//! soon as it exists. A failure on any record aborts the whole batch; what
//! was registered so far is left for the arena to release.

use super::arena::{Resource, ResourceArena};
use super::types::{BatchRecord, BatchType};
use crate::core::codec::{decode_key, decode_operation, decode_value};
use crate::core::policy::{ClientPolicies, RecordPolicy, convert_policy, policy_expression};
use crate::core::types::{Key, OperationKind};
use crate::utils::error::{ClientError, Result};
use serde_json::Value as Json;
use tracing::debug;

/// Translated form of one batch record
///
/// Transient resources (policy, expression, operations, arguments) are not
/// held here; they live in the arena slot at `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecordRequest {
    pub index: usize,
    pub key: Key,
    pub variant: RequestVariant,
}

/// Variant-specific fields that are not arena resources
#[derive(Debug, Clone, PartialEq)]
pub enum RequestVariant {
    Read,
    Write,
    Apply { module: String, function: String },
    Remove,
}

impl BatchRecordRequest {
    pub fn batch_type(&self) -> BatchType {
        match self.variant {
            RequestVariant::Read => BatchType::Read,
            RequestVariant::Write => BatchType::Write,
            RequestVariant::Apply { .. } => BatchType::Apply,
            RequestVariant::Remove => BatchType::Remove,
        }
    }
}

/// Translates caller records against the client's policy defaults
pub struct RequestTranslator<'p> {
    defaults: &'p ClientPolicies,
}

impl<'p> RequestTranslator<'p> {
    pub fn new(defaults: &'p ClientPolicies) -> Self {
        Self { defaults }
    }

    /// Translate every record in input order, stopping at the first failure
    pub fn translate_all(
        &self,
        records: &[BatchRecord],
        arena: &mut ResourceArena,
    ) -> Result<Vec<BatchRecordRequest>> {
        let mut requests = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let request = self.translate(index, record, arena).map_err(|e| {
                debug!(index, error = %e, "record translation failed");
                e
            })?;
            requests.push(request);
        }
        Ok(requests)
    }

    /// Translate the record at `index`
    pub fn translate(
        &self,
        index: usize,
        record: &BatchRecord,
        arena: &mut ResourceArena,
    ) -> Result<BatchRecordRequest> {
        let key = translate_key(index, &record.key)?;

        let batch_type = BatchType::from_tag(record.batch_type).ok_or_else(|| {
            ClientError::invalid_parameter(format!(
                "batch_records[{}]: batch_type unknown: {}",
                index, record.batch_type
            ))
        })?;

        if let Some(repr) = record.policy.as_ref().filter(|p| !p.is_null()) {
            self.translate_policy(index, batch_type, repr, arena)?;
        }

        let variant = match batch_type {
            BatchType::Read => {
                translate_operations(index, record.ops.as_ref(), batch_type, arena)?;
                RequestVariant::Read
            }
            BatchType::Write => {
                translate_operations(index, record.ops.as_ref(), batch_type, arena)?;
                RequestVariant::Write
            }
            BatchType::Apply => {
                let module = required_string(index, "module", record.module.as_ref())?;
                let function = required_string(index, "function", record.function.as_ref())?;
                translate_arguments(index, record.args.as_ref(), arena)?;
                RequestVariant::Apply { module, function }
            }
            BatchType::Remove => RequestVariant::Remove,
        };

        debug!(index, key = %key, ?batch_type, "translated batch record");
        Ok(BatchRecordRequest {
            index,
            key,
            variant,
        })
    }

    /// Clone the override into a typed policy, registering it before its
    /// expression is compiled
    fn translate_policy(
        &self,
        index: usize,
        batch_type: BatchType,
        repr: &Json,
        arena: &mut ResourceArena,
    ) -> Result<()> {
        let named = |e: ClientError| match e {
            ClientError::InvalidParameter(msg) => {
                ClientError::invalid_parameter(format!("batch_records[{}]: {}", index, msg))
            }
            other => other,
        };

        let policy = match batch_type {
            BatchType::Read => {
                RecordPolicy::Read(convert_policy(repr, &self.defaults.batch_read).map_err(named)?)
            }
            BatchType::Write => RecordPolicy::Write(
                convert_policy(repr, &self.defaults.batch_write).map_err(named)?,
            ),
            BatchType::Apply => RecordPolicy::Apply(
                convert_policy(repr, &self.defaults.batch_apply).map_err(named)?,
            ),
            BatchType::Remove => RecordPolicy::Remove(
                convert_policy(repr, &self.defaults.batch_remove).map_err(named)?,
            ),
        };
        arena.acquire(index, Resource::Policy(policy))?;

        if let Some(expr) = policy_expression(repr)? {
            arena.acquire(index, Resource::Expression(expr))?;
        }
        Ok(())
    }
}

fn translate_key(index: usize, repr: &Json) -> Result<Key> {
    if repr.is_null() {
        return Err(ClientError::invalid_parameter(format!(
            "batch_records[{}]: key is missing, key must be a key tuple",
            index
        )));
    }
    decode_key(repr).map_err(|e| {
        ClientError::invalid_parameter(format!("batch_records[{}]: key: {}", index, e))
    })
}

fn translate_operations(
    index: usize,
    ops: Option<&Json>,
    batch_type: BatchType,
    arena: &mut ResourceArena,
) -> Result<()> {
    let ops = match ops {
        Some(Json::Array(ops)) => ops,
        _ => {
            return Err(ClientError::invalid_parameter(format!(
                "batch_records[{}]: ops must be a list of operation dicts",
                index
            )));
        }
    };

    if batch_type == BatchType::Write && ops.is_empty() {
        return Err(ClientError::invalid_parameter(format!(
            "batch_records[{}]: ops must contain at least one operation for a write",
            index
        )));
    }

    arena.acquire(index, Resource::Operations(Vec::with_capacity(ops.len())))?;

    for (position, repr) in ops.iter().enumerate() {
        let operation = decode_operation(repr).map_err(|e| {
            ClientError::translation(format!("batch_records[{}].ops[{}]: {}", index, position, e))
        })?;

        if batch_type == BatchType::Read && operation.kind() != OperationKind::Read {
            return Err(ClientError::invalid_parameter(format!(
                "batch_records[{}].ops[{}]: {:?} operations are not allowed in a read",
                index,
                position,
                operation.kind()
            )));
        }

        arena
            .operations_mut(index)
            .ok_or_else(|| ClientError::internal("operation list vanished from arena slot"))?
            .push(operation);
    }
    Ok(())
}

fn translate_arguments(index: usize, args: Option<&Json>, arena: &mut ResourceArena) -> Result<()> {
    let args = match args {
        Some(Json::Array(args)) => args,
        _ => {
            return Err(ClientError::invalid_parameter(format!(
                "batch_records[{}]: args must be a list of arguments for the function",
                index
            )));
        }
    };

    arena.acquire(index, Resource::Arguments(Vec::with_capacity(args.len())))?;

    for (position, repr) in args.iter().enumerate() {
        let value = decode_value(repr).map_err(|e| {
            ClientError::translation(format!(
                "batch_records[{}].args[{}]: {}",
                index, position, e
            ))
        })?;
        arena
            .arguments_mut(index)
            .ok_or_else(|| ClientError::internal("argument list vanished from arena slot"))?
            .push(value);
    }
    Ok(())
}

/// A field that must be present and a non-empty string
fn required_string(index: usize, field: &str, repr: Option<&Json>) -> Result<String> {
    match repr {
        Some(Json::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Json::String(_)) => Err(ClientError::invalid_parameter(format!(
            "batch_records[{}]: {} must not be empty",
            index, field
        ))),
        None | Some(Json::Null) => Err(ClientError::invalid_parameter(format!(
            "batch_records[{}]: {} is missing, {} must be a string",
            index, field, field
        ))),
        Some(_) => Err(ClientError::invalid_parameter(format!(
            "batch_records[{}]: {} must be a string",
            index, field
        ))),
    }
}
