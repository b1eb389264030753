//! Per-entry execution against the memory store

use super::store::MemoryStore;
use crate::core::batch::{BatchEntry, EntryAction};
use crate::core::policy::{GenerationPolicy, RecordExistsAction};
use crate::core::types::{Bins, Operation, Record, ResultCode, Value};
use crate::storage::transport::BatchResponse;

/// Bin holding a record function's return value
pub const UDF_RESULT_BIN: &str = "SUCCESS";

/// What to do with the stored record after an entry ran
pub(crate) enum Change {
    Keep,
    Put(Record),
    Remove,
}

type Outcome = (BatchResponse, Change);

fn fail(code: ResultCode) -> Outcome {
    (BatchResponse::failed(code), Change::Keep)
}

impl MemoryStore {
    pub(super) fn apply_entry(&self, entry: &BatchEntry<'_>) -> BatchResponse {
        // Resolve the function before the record is locked
        let udf = match entry.action {
            EntryAction::Apply {
                module, function, ..
            } => match self.udf(module, function) {
                Some(udf) => Some(udf),
                None => return BatchResponse::failed(ResultCode::UdfError),
            },
            _ => None,
        };

        self.commit(entry.key, |existing| {
            if let (Some(filter), Some(record)) = (entry.filter, existing) {
                if !filter.evaluate(&record.bins) {
                    return fail(ResultCode::FilteredOut);
                }
            }

            match &entry.action {
                EntryAction::Read { ops, .. } => read(existing, ops),
                EntryAction::Write { policy, ops } => {
                    if let Err(code) =
                        check_generation(policy.generation_policy, policy.generation, existing)
                    {
                        return fail(code);
                    }
                    write(existing, policy.exists, policy.ttl, ops)
                }
                EntryAction::Apply { policy, args, .. } => {
                    let Some(udf) = udf.as_ref() else {
                        return fail(ResultCode::UdfError);
                    };
                    let mut bins = existing.map(|r| r.bins.clone()).unwrap_or_default();
                    match udf(&mut bins, args) {
                        Ok(value) => {
                            let change = settle(
                                existing,
                                bins,
                                next_generation(existing),
                                expiration(policy.ttl, existing),
                            );
                            let (generation, expiration) = stored_meta(&change, existing);
                            let mut returned = Bins::new();
                            returned.insert(UDF_RESULT_BIN.to_string(), value);
                            (
                                BatchResponse::ok(Some(Record::new(returned, generation, expiration))),
                                change,
                            )
                        }
                        Err(_) => fail(ResultCode::UdfError),
                    }
                }
                EntryAction::Remove { policy } => {
                    if existing.is_none() {
                        return fail(ResultCode::KeyNotFound);
                    }
                    if let Err(code) =
                        check_generation(policy.generation_policy, policy.generation, existing)
                    {
                        return fail(code);
                    }
                    (BatchResponse::ok(None), Change::Remove)
                }
            }
        })
    }
}

fn read(existing: Option<&Record>, ops: &[Operation]) -> Outcome {
    let Some(record) = existing else {
        return fail(ResultCode::KeyNotFound);
    };
    if ops.is_empty() {
        return (BatchResponse::ok(Some(record.clone())), Change::Keep);
    }

    let mut bins = record.bins.clone();
    let mut returned = Bins::new();
    for op in ops {
        match apply_operation(op, &mut bins) {
            Ok(Some(value)) => {
                if let Some(bin) = op.bin() {
                    returned.insert(bin.to_string(), value);
                }
            }
            Ok(None) => {}
            Err(code) => return fail(code),
        }
    }
    (
        BatchResponse::ok(Some(Record::new(
            returned,
            record.generation,
            record.expiration,
        ))),
        Change::Keep,
    )
}

fn write(
    existing: Option<&Record>,
    exists: RecordExistsAction,
    ttl: i64,
    ops: &[Operation],
) -> Outcome {
    let mut bins = match (exists, existing) {
        (RecordExistsAction::CreateOnly, Some(_)) => return fail(ResultCode::KeyExists),
        (RecordExistsAction::UpdateOnly | RecordExistsAction::ReplaceOnly, None) => {
            return fail(ResultCode::KeyNotFound);
        }
        (RecordExistsAction::Replace | RecordExistsAction::ReplaceOnly, _) => Bins::new(),
        (_, Some(record)) => record.bins.clone(),
        (_, None) => Bins::new(),
    };

    let mut returned = Bins::new();
    for op in ops {
        match op {
            Operation::Delete => bins.clear(),
            Operation::Touch => {}
            _ => match apply_operation(op, &mut bins) {
                Ok(Some(value)) if op.returns_value() => {
                    if let Some(bin) = op.bin() {
                        returned.insert(bin.to_string(), value);
                    }
                }
                Ok(_) => {}
                Err(code) => return fail(code),
            },
        }
    }

    let generation = next_generation(existing);
    let expiration = expiration(ttl, existing);
    if bins.is_empty() {
        let change = if existing.is_some() {
            Change::Remove
        } else {
            Change::Keep
        };
        return (BatchResponse::ok(None), change);
    }
    (
        BatchResponse::ok(Some(Record::new(returned, generation, expiration))),
        Change::Put(Record::new(bins, generation, expiration)),
    )
}

/// Store `bins` as the new record state, dropping the record once empty
fn settle(existing: Option<&Record>, bins: Bins, generation: u32, expiration: u32) -> Change {
    match existing {
        Some(record) if record.bins == bins => Change::Keep,
        Some(_) if bins.is_empty() => Change::Remove,
        None if bins.is_empty() => Change::Keep,
        _ => Change::Put(Record::new(bins, generation, expiration)),
    }
}

/// Generation and expiration of the record as stored once `change` is
/// applied; zero when no record remains
fn stored_meta(change: &Change, existing: Option<&Record>) -> (u32, u32) {
    match (change, existing) {
        (Change::Put(record), _) | (Change::Keep, Some(record)) => {
            (record.generation, record.expiration)
        }
        (Change::Keep, None) | (Change::Remove, _) => (0, 0),
    }
}

fn check_generation(
    policy: GenerationPolicy,
    expected: u32,
    existing: Option<&Record>,
) -> Result<(), ResultCode> {
    match (policy, existing) {
        (GenerationPolicy::Ignore, _) | (_, None) => Ok(()),
        (GenerationPolicy::Eq, Some(record)) if record.generation == expected => Ok(()),
        (GenerationPolicy::Gt, Some(record)) if expected > record.generation => Ok(()),
        _ => Err(ResultCode::GenerationError),
    }
}

fn next_generation(existing: Option<&Record>) -> u32 {
    existing.map_or(0, |r| r.generation).wrapping_add(1)
}

/// Expiration for a write with `ttl`: -1 never expires, -2 keeps the
/// current expiration, 0 uses the namespace default (never)
fn expiration(ttl: i64, existing: Option<&Record>) -> u32 {
    match ttl {
        -2 => existing.map_or(0, |r| r.expiration),
        t if t <= 0 => 0,
        t => u32::try_from(t).unwrap_or(u32::MAX),
    }
}

/// Apply one bin operation, returning the value it produces
fn apply_operation(op: &Operation, bins: &mut Bins) -> Result<Option<Value>, ResultCode> {
    match op {
        Operation::Read { bin } => Ok(bins.get(bin).cloned()),
        Operation::Write { bin, value } => {
            if value.is_nil() {
                bins.remove(bin);
            } else {
                bins.insert(bin.clone(), value.clone());
            }
            Ok(None)
        }
        Operation::Increment { bin, value } => {
            let sum = match (bins.get(bin), value) {
                (None, Value::Int(_) | Value::Float(_)) => value.clone(),
                (Some(Value::Int(a)), Value::Int(b)) => Value::Int(a.wrapping_add(*b)),
                (Some(Value::Float(a)), Value::Float(b)) => Value::Float(a + b),
                (_, Value::Int(_) | Value::Float(_)) => return Err(ResultCode::BinIncompatibleType),
                _ => return Err(ResultCode::ParameterError),
            };
            bins.insert(bin.clone(), sum);
            Ok(None)
        }
        Operation::Prepend { bin, value } | Operation::Append { bin, value } => {
            let Value::String(text) = value else {
                return Err(ResultCode::ParameterError);
            };
            let joined = match bins.get(bin) {
                None => text.clone(),
                Some(Value::String(current)) if matches!(op, Operation::Prepend { .. }) => {
                    format!("{}{}", text, current)
                }
                Some(Value::String(current)) => format!("{}{}", current, text),
                Some(_) => return Err(ResultCode::BinIncompatibleType),
            };
            bins.insert(bin.clone(), Value::String(joined));
            Ok(None)
        }
        Operation::ListAppend { bin, value } => {
            let list = list_mut(bins, bin)?;
            list.push(value.clone());
            Ok(Some(Value::Int(list.len() as i64)))
        }
        Operation::ListAppendItems { bin, values } => {
            let list = list_mut(bins, bin)?;
            list.extend(values.iter().cloned());
            Ok(Some(Value::Int(list.len() as i64)))
        }
        Operation::ListClear { bin } => match bins.get_mut(bin) {
            None => Ok(None),
            Some(Value::List(items)) => {
                items.clear();
                Ok(None)
            }
            Some(_) => Err(ResultCode::BinIncompatibleType),
        },
        Operation::ListGet { bin, index } => match bins.get(bin) {
            None => Ok(None),
            Some(Value::List(items)) => {
                let position = resolve_index(*index, items.len()).ok_or(ResultCode::ParameterError)?;
                Ok(Some(items[position].clone()))
            }
            Some(_) => Err(ResultCode::BinIncompatibleType),
        },
        Operation::ListSize { bin } => match bins.get(bin) {
            None => Ok(None),
            Some(Value::List(items)) => Ok(Some(Value::Int(items.len() as i64))),
            Some(_) => Err(ResultCode::BinIncompatibleType),
        },
        Operation::Touch | Operation::Delete => Ok(None),
    }
}

fn list_mut<'b>(bins: &'b mut Bins, bin: &str) -> Result<&'b mut Vec<Value>, ResultCode> {
    match bins
        .entry(bin.to_string())
        .or_insert_with(|| Value::List(Vec::new()))
    {
        Value::List(items) => Ok(items),
        _ => Err(ResultCode::BinIncompatibleType),
    }
}

/// Position of `index` in a list of `len` items; negative counts from the end
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let position = if index < 0 { len + index } else { index };
    if (0..len).contains(&position) {
        usize::try_from(position).ok()
    } else {
        None
    }
}
