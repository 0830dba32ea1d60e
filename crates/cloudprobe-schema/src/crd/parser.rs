//! CRD parser
//!
//! Reads an untyped YAML document into a [`CrdDocument`]. Only the fields
//! needed to build validators are extracted; printer columns, conversion
//! webhooks and subresources are ignored.

use serde_json::Value;

use super::document::{CrdDocument, CrdNames, CrdScope, CrdVersion};
use crate::error::{Result, SchemaError};

/// Kind of a CustomResourceDefinition document
pub const CRD_KIND: &str = "CustomResourceDefinition";

/// Whether a document declares `kind: CustomResourceDefinition`
pub fn is_crd(value: &Value) -> bool {
    value.get("kind").and_then(Value::as_str) == Some(CRD_KIND)
}

/// Parser for CRD manifests
pub struct CrdParser;

impl CrdParser {
    /// Parse a single-document CRD manifest
    pub fn parse(yaml: &str) -> Result<CrdDocument> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::parse_value(&value)
    }

    /// Parse an already decoded document
    pub fn parse_value(value: &Value) -> Result<CrdDocument> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing 'kind' field"))?;

        if kind != CRD_KIND {
            return Err(invalid(format!("expected {CRD_KIND}, got {kind}")));
        }

        let name = value
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing 'metadata.name' field"))?
            .to_string();

        let spec = value
            .get("spec")
            .ok_or_else(|| invalid(format!("{name}: missing 'spec' field")))?;

        let group = spec
            .get("group")
            .and_then(Value::as_str)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| invalid(format!("{name}: missing 'spec.group' field")))?
            .to_string();

        let scope = match spec.get("scope").and_then(Value::as_str) {
            Some("Cluster") => CrdScope::Cluster,
            _ => CrdScope::Namespaced,
        };

        let names = Self::parse_names(&name, spec.get("names"))?;
        let versions = Self::parse_versions(&name, spec)?;

        let legacy_schema = spec.pointer("/validation/openAPIV3Schema").cloned();

        Ok(CrdDocument {
            name,
            group,
            scope,
            names,
            versions,
            legacy_schema,
        })
    }

    fn parse_names(crd: &str, names_value: Option<&Value>) -> Result<CrdNames> {
        let names =
            names_value.ok_or_else(|| invalid(format!("{crd}: missing 'spec.names' field")))?;

        let kind = names
            .get("kind")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| invalid(format!("{crd}: missing 'spec.names.kind' field")))?
            .to_string();

        Ok(CrdNames {
            kind,
            plural: str_field(names, "plural").unwrap_or_default(),
            singular: str_field(names, "singular"),
            short_names: str_list(names, "shortNames"),
            list_kind: str_field(names, "listKind"),
            categories: str_list(names, "categories"),
        })
    }

    /// `spec.versions`, or the single `spec.version` of a v1beta1 CRD
    fn parse_versions(crd: &str, spec: &Value) -> Result<Vec<CrdVersion>> {
        if let Some(versions) = spec.get("versions").and_then(Value::as_array) {
            if versions.is_empty() {
                return Err(invalid(format!("{crd}: 'spec.versions' is empty")));
            }
            return versions
                .iter()
                .map(|v| Self::parse_version(crd, v))
                .collect();
        }

        if let Some(version) = spec.get("version").and_then(Value::as_str) {
            return Ok(vec![CrdVersion {
                name: version.to_string(),
                served: true,
                storage: true,
                deprecated: false,
                deprecation_warning: None,
                schema: None,
            }]);
        }

        Err(invalid(format!(
            "{crd}: missing 'spec.versions' array or 'spec.version'"
        )))
    }

    fn parse_version(crd: &str, version: &Value) -> Result<CrdVersion> {
        let name = version
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("{crd}: version without a name")))?
            .to_string();

        Ok(CrdVersion {
            name,
            served: bool_field(version, "served", true),
            storage: bool_field(version, "storage", false),
            deprecated: bool_field(version, "deprecated", false),
            deprecation_warning: str_field(version, "deprecationWarning"),
            schema: version.pointer("/schema/openAPIV3Schema").cloned(),
        })
    }
}

fn invalid(message: impl Into<String>) -> SchemaError {
    SchemaError::InvalidCrd(message.into())
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

fn bool_field(value: &Value, key: &str, default: bool) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn str_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
