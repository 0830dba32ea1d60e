//! cloudprobe Core - shared building blocks for the platform test suite
//!
//! This crate provides the pieces every other cloudprobe crate leans on:
//! - `ProbeConfig`: explicit run configuration (endpoints, compute defaults, wait budgets)
//! - `Poller`: the one bounded "check, sleep, repeat" loop used by every wait
//! - `unique_name`: collision-free fixture names for tests running in parallel

pub mod config;
pub mod error;
pub mod names;
pub mod poll;

pub use config::{
    AccountSettings, AccountType, ComputeDefaults, ProbeConfig, WaitConfig, WaitSettings,
};
pub use error::{CoreError, Result};
pub use names::{random_suffix, unique_name};
pub use poll::{PollOutcome, PollStatus, Poller, Probe};
