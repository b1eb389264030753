//! Configuration validation

mod client_validators;
mod trait_def;

pub use trait_def::Validate;
