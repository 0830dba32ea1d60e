//! Fixture naming
//!
//! Tests run in parallel against shared platform state, so every fixture name
//! carries a random suffix. Names stay lowercase alphanumeric so they are
//! accepted as Kubernetes-style resource names.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random suffix appended by [`unique_name`]
pub const SUFFIX_LEN: usize = 8;

/// Random lowercase alphanumeric string of `len` characters
pub fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// `prefix-xxxxxxxx`
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix.trim_end_matches('-'), random_suffix(SUFFIX_LEN))
}
