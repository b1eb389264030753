//! Batch assembler
//!
//! Builds the ordered batch handed to the transport. Entries borrow the
//! translated requests and the arena, so the batch cannot outlive either.

use super::arena::ResourceArena;
use super::translator::{BatchRecordRequest, RequestVariant};
use crate::core::expression::FilterExpression;
use crate::core::policy::{
    BatchApplyPolicy, BatchReadPolicy, BatchRemovePolicy, BatchWritePolicy, ClientPolicies,
    RecordPolicy,
};
use crate::core::types::{Key, Operation, Value};
use crate::utils::error::{ClientError, Result};

/// One entry of an assembled batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry<'a> {
    /// Position of the originating record in the caller's list
    pub index: usize,
    pub key: &'a Key,
    /// Record filter, falling back to the batch-level filter
    pub filter: Option<&'a FilterExpression>,
    pub action: EntryAction<'a>,
}

/// Variant payload of an entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryAction<'a> {
    Read {
        policy: &'a BatchReadPolicy,
        ops: &'a [Operation],
    },
    Write {
        policy: &'a BatchWritePolicy,
        ops: &'a [Operation],
    },
    Apply {
        policy: &'a BatchApplyPolicy,
        module: &'a str,
        function: &'a str,
        args: &'a [Value],
    },
    Remove {
        policy: &'a BatchRemovePolicy,
    },
}

impl BatchEntry<'_> {
    /// Whether the entry may change the stored record
    pub fn has_write(&self) -> bool {
        !matches!(self.action, EntryAction::Read { .. })
    }
}

/// Ordered batch, one entry per translated request
#[derive(Debug, Default)]
pub struct AssembledBatch<'a> {
    entries: Vec<BatchEntry<'a>>,
}

impl<'a> AssembledBatch<'a> {
    pub fn with_capacity(records: usize) -> Self {
        Self {
            entries: Vec::with_capacity(records),
        }
    }

    /// Assemble `requests` in order, attaching the resources held by `arena`
    pub fn assemble(
        requests: &'a [BatchRecordRequest],
        arena: &'a ResourceArena,
        defaults: &'a ClientPolicies,
    ) -> Result<Self> {
        let mut batch = Self::with_capacity(requests.len());
        let batch_filter = arena.batch_slot().expression();

        for request in requests {
            let slot = arena.slot(request.index).ok_or_else(|| {
                ClientError::internal(format!("no arena slot for record {}", request.index))
            })?;
            let filter = slot.expression().or(batch_filter);
            let ops = slot.operations().unwrap_or(&[]);

            match &request.variant {
                RequestVariant::Read => {
                    let entry = batch.reserve_read(request.index, &request.key, &defaults.batch_read);
                    if let Some(RecordPolicy::Read(policy)) = slot.policy() {
                        policy.attach(&mut entry.action);
                    }
                    set_ops(&mut entry.action, ops);
                    entry.filter = filter;
                }
                RequestVariant::Write => {
                    let entry =
                        batch.reserve_write(request.index, &request.key, &defaults.batch_write);
                    if let Some(RecordPolicy::Write(policy)) = slot.policy() {
                        policy.attach(&mut entry.action);
                    }
                    set_ops(&mut entry.action, ops);
                    entry.filter = filter;
                }
                RequestVariant::Apply { module, function } => {
                    let args = slot.arguments().unwrap_or(&[]);
                    let entry = batch.reserve_apply(
                        request.index,
                        &request.key,
                        &defaults.batch_apply,
                        module,
                        function,
                    );
                    if let Some(RecordPolicy::Apply(policy)) = slot.policy() {
                        policy.attach(&mut entry.action);
                    }
                    if let EntryAction::Apply { args: slot_args, .. } = &mut entry.action {
                        *slot_args = args;
                    }
                    entry.filter = filter;
                }
                RequestVariant::Remove => {
                    let entry =
                        batch.reserve_remove(request.index, &request.key, &defaults.batch_remove);
                    if let Some(RecordPolicy::Remove(policy)) = slot.policy() {
                        policy.attach(&mut entry.action);
                    }
                    entry.filter = filter;
                }
            }
        }
        Ok(batch)
    }

    /// Append a read entry with default policy and no operations
    pub fn reserve_read(
        &mut self,
        index: usize,
        key: &'a Key,
        policy: &'a BatchReadPolicy,
    ) -> &mut BatchEntry<'a> {
        self.reserve(index, key, EntryAction::Read { policy, ops: &[] })
    }

    pub fn reserve_write(
        &mut self,
        index: usize,
        key: &'a Key,
        policy: &'a BatchWritePolicy,
    ) -> &mut BatchEntry<'a> {
        self.reserve(index, key, EntryAction::Write { policy, ops: &[] })
    }

    pub fn reserve_apply(
        &mut self,
        index: usize,
        key: &'a Key,
        policy: &'a BatchApplyPolicy,
        module: &'a str,
        function: &'a str,
    ) -> &mut BatchEntry<'a> {
        self.reserve(
            index,
            key,
            EntryAction::Apply {
                policy,
                module,
                function,
                args: &[],
            },
        )
    }

    pub fn reserve_remove(
        &mut self,
        index: usize,
        key: &'a Key,
        policy: &'a BatchRemovePolicy,
    ) -> &mut BatchEntry<'a> {
        self.reserve(index, key, EntryAction::Remove { policy })
    }

    fn reserve(&mut self, index: usize, key: &'a Key, action: EntryAction<'a>) -> &mut BatchEntry<'a> {
        self.entries.push(BatchEntry {
            index,
            key,
            filter: None,
            action,
        });
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    pub fn entries(&self) -> &[BatchEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchEntry<'a>> {
        self.entries.iter()
    }
}

/// Policy override for an action of the matching variant
trait EntryPolicy<'a> {
    fn attach(self, action: &mut EntryAction<'a>);
}

impl<'a> EntryPolicy<'a> for &'a BatchReadPolicy {
    fn attach(self, action: &mut EntryAction<'a>) {
        if let EntryAction::Read { policy, .. } = action {
            *policy = self;
        }
    }
}

impl<'a> EntryPolicy<'a> for &'a BatchWritePolicy {
    fn attach(self, action: &mut EntryAction<'a>) {
        if let EntryAction::Write { policy, .. } = action {
            *policy = self;
        }
    }
}

impl<'a> EntryPolicy<'a> for &'a BatchApplyPolicy {
    fn attach(self, action: &mut EntryAction<'a>) {
        if let EntryAction::Apply { policy, .. } = action {
            *policy = self;
        }
    }
}

impl<'a> EntryPolicy<'a> for &'a BatchRemovePolicy {
    fn attach(self, action: &mut EntryAction<'a>) {
        if let EntryAction::Remove { policy } = action {
            *policy = self;
        }
    }
}

fn set_ops<'a>(action: &mut EntryAction<'a>, slot_ops: &'a [Operation]) {
    match action {
        EntryAction::Read { ops, .. } | EntryAction::Write { ops, .. } => *ops = slot_ops,
        _ => {}
    }
}

impl<'a, 'b> IntoIterator for &'b AssembledBatch<'a> {
    type Item = &'b BatchEntry<'a>;
    type IntoIter = std::slice::Iter<'b, BatchEntry<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
