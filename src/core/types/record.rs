//! Stored records

use super::value::Value;
use std::collections::BTreeMap;

/// Bin map of a record
pub type Bins = BTreeMap<String, Value>;

/// A record as returned by the store: bins plus metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub bins: Bins,
    /// Write counter maintained by the store
    pub generation: u32,
    /// Seconds until expiration; 0 means never expires
    pub expiration: u32,
}

impl Record {
    pub fn new(bins: Bins, generation: u32, expiration: u32) -> Self {
        Self {
            bins,
            generation,
            expiration,
        }
    }

    pub fn bin(&self, name: &str) -> Option<&Value> {
        self.bins.get(name)
    }
}
