//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions where applicable. Argument errors
//! are reported by clap with its own exit code.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - a target failed validation under `--strict`
pub const VALIDATION_ERROR: i32 = 2;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Timeout - a wait did not see its condition before the deadline
pub const TIMEOUT: i32 = 6;
