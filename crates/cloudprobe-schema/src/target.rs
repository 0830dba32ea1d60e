//! Target manifests and validation outcomes

use std::path::{Path, PathBuf};

use kube::core::{GroupVersionKind, TypeMeta};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::documents::read_documents;
use crate::error::{Result, SchemaError};
use crate::gvk::{format_gvk, gvk_from_type_meta, serialize_gvk};
use crate::registry::SchemaRegistry;

/// One decoded target document with its type information
#[derive(Debug, Clone)]
pub struct TargetResource {
    pub gvk: GroupVersionKind,
    /// `metadata.name`, empty when absent
    pub name: String,
    pub document: Value,
}

impl TargetResource {
    /// Extract apiVersion, kind and name from an untyped document
    pub fn from_value(document: Value) -> Result<Self> {
        let field = |key: &str| {
            document
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let (Some(api_version), Some(kind)) = (field("apiVersion"), field("kind")) else {
            return Err(SchemaError::MissingTypeMeta);
        };

        let gvk = gvk_from_type_meta(&TypeMeta { api_version, kind });
        let name = document
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            gvk,
            name,
            document,
        })
    }
}

/// A schema violation numbered within its document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedViolation {
    pub index: usize,
    pub path: String,
    pub message: String,
}

/// What happened to one target document
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TargetOutcome {
    /// The file, or one of its documents, could not be decoded
    ParseFailed { path: PathBuf, message: String },

    /// No CRD declares this GroupVersionKind
    NoValidator {
        path: PathBuf,
        #[serde(serialize_with = "serialize_gvk")]
        gvk: GroupVersionKind,
        name: String,
    },

    Valid {
        path: PathBuf,
        #[serde(serialize_with = "serialize_gvk")]
        gvk: GroupVersionKind,
        name: String,
    },

    Invalid {
        path: PathBuf,
        #[serde(serialize_with = "serialize_gvk")]
        gvk: GroupVersionKind,
        name: String,
        violations: Vec<IndexedViolation>,
    },
}

impl TargetOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::ParseFailed { path, .. }
            | Self::NoValidator { path, .. }
            | Self::Valid { path, .. }
            | Self::Invalid { path, .. } => path,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Human-readable report lines
    pub fn render_lines(&self) -> Vec<String> {
        match self {
            Self::ParseFailed { path, message } => {
                vec![format!("{}: failed to parse: {message}", path.display())]
            }
            Self::NoValidator { path, gvk, name } => vec![format!(
                "{}: no validator found for {} {name}",
                path.display(),
                format_gvk(gvk)
            )],
            Self::Valid { path, gvk, name } => vec![format!(
                "{}: {} {name}: Validated, OK",
                path.display(),
                format_gvk(gvk)
            )],
            Self::Invalid {
                path,
                gvk,
                name,
                violations,
            } => violations
                .iter()
                .map(|v| {
                    format!(
                        "{}: [{}] {} {name}: {}: {}",
                        path.display(),
                        v.index,
                        format_gvk(gvk),
                        v.path,
                        v.message
                    )
                })
                .collect(),
        }
    }
}

/// Outcome counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub no_validator: usize,
    pub parse_failed: usize,
}

/// Ordered outcomes of validating a set of target files
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationRun {
    pub outcomes: Vec<TargetOutcome>,
}

impl ValidationRun {
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.outcomes.len(),
            ..Default::default()
        };
        for outcome in &self.outcomes {
            match outcome {
                TargetOutcome::ParseFailed { .. } => summary.parse_failed += 1,
                TargetOutcome::NoValidator { .. } => summary.no_validator += 1,
                TargetOutcome::Valid { .. } => summary.valid += 1,
                TargetOutcome::Invalid { .. } => summary.invalid += 1,
            }
        }
        summary
    }

    /// Every document was validated and none had violations
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(TargetOutcome::is_valid)
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .flat_map(TargetOutcome::render_lines)
            .collect()
    }
}

/// Validate every document of every target file against `registry`
///
/// Never fails: unreadable files and undecodable documents become
/// `ParseFailed` outcomes and the remaining targets are still checked.
pub fn validate_targets<P: AsRef<Path>>(paths: &[P], registry: &SchemaRegistry) -> ValidationRun {
    let mut run = ValidationRun::default();

    for path in paths {
        let path = path.as_ref();
        debug!(path = %path.display(), "validating target");

        let documents = match read_documents(path) {
            Ok(documents) if documents.is_empty() => {
                run.outcomes.push(TargetOutcome::ParseFailed {
                    path: path.to_path_buf(),
                    message: "no documents".to_string(),
                });
                continue;
            }
            Ok(documents) => documents,
            Err(e) => {
                run.outcomes.push(TargetOutcome::ParseFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        for (index, document) in documents.into_iter().enumerate() {
            run.outcomes.push(validate_document(path, index, document, registry));
        }
    }

    let summary = run.summary();
    info!(
        total = summary.total,
        valid = summary.valid,
        invalid = summary.invalid,
        no_validator = summary.no_validator,
        parse_failed = summary.parse_failed,
        "validation finished"
    );
    run
}

fn validate_document(
    path: &Path,
    index: usize,
    document: Value,
    registry: &SchemaRegistry,
) -> TargetOutcome {
    let path = path.to_path_buf();

    let resource = match TargetResource::from_value(document) {
        Ok(resource) => resource,
        Err(e) => {
            return TargetOutcome::ParseFailed {
                path,
                message: format!("document {index}: {e}"),
            };
        }
    };

    let Some(validator) = registry.get(&resource.gvk) else {
        return TargetOutcome::NoValidator {
            path,
            gvk: resource.gvk,
            name: resource.name,
        };
    };

    let violations: Vec<IndexedViolation> = validator
        .validate(&resource.document)
        .into_iter()
        .enumerate()
        .map(|(index, v)| IndexedViolation {
            index,
            path: v.path,
            message: v.message,
        })
        .collect();

    if violations.is_empty() {
        TargetOutcome::Valid {
            path,
            gvk: resource.gvk,
            name: resource.name,
        }
    } else {
        TargetOutcome::Invalid {
            path,
            gvk: resource.gvk,
            name: resource.name,
            violations,
        }
    }
}
