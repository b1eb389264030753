//! Batch policies and the policy converter

pub mod converter;
pub mod types;

pub use converter::{EXPRESSION_FIELD, convert_policy, policy_expression};
pub use types::{
    BatchApplyPolicy, BatchPolicy, BatchReadPolicy, BatchRemovePolicy, BatchWritePolicy,
    ClientPolicies, CommitLevel, GenerationPolicy, KeyPolicy, ReadModeAp, RecordExistsAction,
    RecordPolicy,
};
