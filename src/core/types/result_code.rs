//! Store status codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code reported by the store, per record or for a whole batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ResultCode {
    /// Operation succeeded
    Ok,
    /// Generic server-side failure
    ServerError,
    /// Record does not exist
    KeyNotFound,
    /// Generation check failed
    GenerationError,
    /// Server rejected a parameter
    ParameterError,
    /// Record already exists
    KeyExists,
    /// Bin type does not support the operation
    BinIncompatibleType,
    /// Timed out
    Timeout,
    /// Filter expression evaluated to false
    FilteredOut,
    /// User-defined function failed
    UdfError,
    /// Generic client-side failure
    ClientError,
    /// Client-side parameter error
    ParamError,
    /// Connection failure
    Connection,
    /// Client refused the call because too many errors happened recently
    MaxErrorRate,
    /// Any code this client does not name
    Other(i32),
}

impl ResultCode {
    /// Numeric wire code
    pub fn code(self) -> i32 {
        match self {
            ResultCode::Ok => 0,
            ResultCode::ServerError => 1,
            ResultCode::KeyNotFound => 2,
            ResultCode::GenerationError => 3,
            ResultCode::ParameterError => 4,
            ResultCode::KeyExists => 5,
            ResultCode::Timeout => 9,
            ResultCode::BinIncompatibleType => 12,
            ResultCode::FilteredOut => 27,
            ResultCode::UdfError => 100,
            ResultCode::ClientError => -1,
            ResultCode::ParamError => -2,
            ResultCode::Connection => -10,
            ResultCode::MaxErrorRate => -12,
            ResultCode::Other(code) => code,
        }
    }

    /// Map a numeric wire code back to a named status
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ResultCode::Ok,
            1 => ResultCode::ServerError,
            2 => ResultCode::KeyNotFound,
            3 => ResultCode::GenerationError,
            4 => ResultCode::ParameterError,
            5 => ResultCode::KeyExists,
            9 => ResultCode::Timeout,
            12 => ResultCode::BinIncompatibleType,
            27 => ResultCode::FilteredOut,
            100 => ResultCode::UdfError,
            -1 => ResultCode::ClientError,
            -2 => ResultCode::ParamError,
            -10 => ResultCode::Connection,
            -12 => ResultCode::MaxErrorRate,
            other => ResultCode::Other(other),
        }
    }

    /// True for code 0, whichever variant carries it
    pub fn is_ok(self) -> bool {
        self.code() == 0
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Other(code) => write!(f, "{}", code),
            named => write!(f, "{:?} ({})", named, named.code()),
        }
    }
}
