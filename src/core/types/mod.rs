//! Core data types shared by the codecs, the batch pipeline and the store
//!
//! - `key` - record addressing and digests
//! - `value` - bin values and function arguments
//! - `operation` - per-record bin operations
//! - `record` - records returned by the store
//! - `result_code` - store status codes

pub mod key;
pub mod operation;
pub mod record;
pub mod result_code;
pub mod value;

pub use key::{DIGEST_LEN, Key};
pub use operation::{Operation, OperationKind};
pub use record::{Bins, Record};
pub use result_code::ResultCode;
pub use value::Value;
