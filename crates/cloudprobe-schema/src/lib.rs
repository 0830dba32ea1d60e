//! CRD-driven resource validation
//!
//! Loads every CustomResourceDefinition found under a directory, compiles one
//! validator per `(group, version, kind)`, then checks target manifests
//! against the validator matching their GroupVersionKind.
//!
//! ```text
//! crd dir ──► documents ──► CrdParser ──► ResourceValidator ──► SchemaRegistry
//!                                                                   │
//! target files ──► documents ──► TargetResource ──► lookup ─────────┘
//!                                                     │
//!                                                     ▼
//!                                              ValidationRun
//! ```
//!
//! Building the registry is fail-fast: one unreadable file or broken CRD aborts
//! the build. Validating targets is fail-soft: every target gets an outcome and
//! a bad target never stops the others.
//!
//! # Example
//!
//! ```no_run
//! use cloudprobe_schema::validate_resource_yaml;
//!
//! let run = validate_resource_yaml(&["deploy/cronjob.yaml"], "crds/")?;
//! for line in run.render_lines() {
//!     println!("{line}");
//! }
//! # Ok::<(), cloudprobe_schema::SchemaError>(())
//! ```

pub mod crd;
pub mod documents;
pub mod error;
pub mod gvk;
pub mod registry;
pub mod target;
pub mod validator;

use std::path::Path;

pub use crd::{CrdDocument, CrdNames, CrdParser, CrdScope, CrdVersion};
pub use documents::{decode_documents, read_documents};
pub use error::{Result, SchemaError};
pub use gvk::{format_gvk, gvk_from_type_meta};
pub use registry::SchemaRegistry;
pub use target::{
    IndexedViolation, RunSummary, TargetOutcome, TargetResource, ValidationRun, validate_targets,
};
pub use validator::{ResourceValidator, SchemaViolation};

/// Build the registry from `crd_dir`, then validate every target against it
pub fn validate_resource_yaml<P, D>(targets: &[P], crd_dir: D) -> Result<ValidationRun>
where
    P: AsRef<Path>,
    D: AsRef<Path>,
{
    let registry = SchemaRegistry::build(crd_dir.as_ref())?;
    Ok(validate_targets(targets, &registry))
}
