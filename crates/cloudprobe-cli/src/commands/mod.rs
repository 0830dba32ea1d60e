//! CLI command implementations

pub mod validate;
pub mod wait;
