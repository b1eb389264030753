//! Per-record operations

use super::value::Value;

/// Broad category of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Reads without changing the record
    Read,
    /// Replaces or removes record state
    Write,
    /// Changes bin state in place
    Modify,
}

/// A single bin operation carried by a Read or Write batch record
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Read one bin
    Read { bin: String },
    /// Set a bin; a nil value deletes the bin
    Write { bin: String, value: Value },
    /// Add to an integer or float bin
    Increment { bin: String, value: Value },
    /// Prepend to a string bin
    Prepend { bin: String, value: Value },
    /// Append to a string bin
    Append { bin: String, value: Value },
    /// Reset the record's ttl
    Touch,
    /// Delete the whole record
    Delete,
    /// Append one item to a list bin
    ListAppend { bin: String, value: Value },
    /// Append several items to a list bin
    ListAppendItems { bin: String, values: Vec<Value> },
    /// Remove every item of a list bin
    ListClear { bin: String },
    /// Read one list item; negative indexes count from the end
    ListGet { bin: String, index: i64 },
    /// Read the length of a list bin
    ListSize { bin: String },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Read { .. } | Operation::ListGet { .. } | Operation::ListSize { .. } => {
                OperationKind::Read
            }
            Operation::Write { .. } | Operation::Touch | Operation::Delete => OperationKind::Write,
            Operation::Increment { .. }
            | Operation::Prepend { .. }
            | Operation::Append { .. }
            | Operation::ListAppend { .. }
            | Operation::ListAppendItems { .. }
            | Operation::ListClear { .. } => OperationKind::Modify,
        }
    }

    /// Bin the operation targets, if any
    pub fn bin(&self) -> Option<&str> {
        match self {
            Operation::Read { bin }
            | Operation::Write { bin, .. }
            | Operation::Increment { bin, .. }
            | Operation::Prepend { bin, .. }
            | Operation::Append { bin, .. }
            | Operation::ListAppend { bin, .. }
            | Operation::ListAppendItems { bin, .. }
            | Operation::ListClear { bin }
            | Operation::ListGet { bin, .. }
            | Operation::ListSize { bin } => Some(bin),
            Operation::Touch | Operation::Delete => None,
        }
    }

    /// Whether the operation contributes a value to the returned record
    pub fn returns_value(&self) -> bool {
        matches!(
            self,
            Operation::Read { .. }
                | Operation::ListGet { .. }
                | Operation::ListSize { .. }
                | Operation::ListAppend { .. }
                | Operation::ListAppendItems { .. }
        )
    }
}
