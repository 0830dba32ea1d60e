//! Compiled per-GVK validators

use std::fmt;

use kube::core::GroupVersionKind;
use serde::Serialize;
use serde_json::{Value, json};

use crate::crd::openapi_to_json_schema;
use crate::error::{Result, SchemaError};
use crate::gvk::format_gvk;

/// One schema violation found in a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value, `(root)` for the document itself
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validator for one `(group, version, kind)`
pub struct ResourceValidator {
    gvk: GroupVersionKind,
    /// JSON Schema the validator was compiled from
    schema: Value,
    compiled: jsonschema::Validator,
}

impl ResourceValidator {
    /// Compile a validator from a CRD `openAPIV3Schema`
    ///
    /// `None` yields a validator that accepts every document.
    pub fn new(gvk: GroupVersionKind, openapi: Option<&Value>) -> Result<Self> {
        let schema = match openapi {
            Some(schema) => openapi_to_json_schema(schema),
            None => json!({}),
        };

        let compiled = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft4)
            .build(&schema)
            .map_err(|e| SchemaError::InvalidSchema {
                gvk: format_gvk(&gvk),
                message: e.to_string(),
            })?;

        Ok(Self {
            gvk,
            schema,
            compiled,
        })
    }

    pub fn gvk(&self) -> &GroupVersionKind {
        &self.gvk
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check a document, returning every violation in validator order
    pub fn validate(&self, document: &Value) -> Vec<SchemaViolation> {
        if self.compiled.is_valid(document) {
            return Vec::new();
        }

        self.compiled
            .iter_errors(document)
            .map(|e| {
                let path = e.instance_path.to_string();
                SchemaViolation {
                    path: if path.is_empty() {
                        "(root)".to_string()
                    } else {
                        path
                    },
                    message: e.to_string().replace('"', "'"),
                }
            })
            .collect()
    }
}

impl fmt::Debug for ResourceValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceValidator")
            .field("gvk", &format_gvk(&self.gvk))
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crontab_gvk() -> GroupVersionKind {
        GroupVersionKind::gvk("stable.example.com", "v1", "CronTab")
    }

    fn crontab_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "spec": {
                    "type": "object",
                    "required": ["cronSpec"],
                    "properties": {
                        "cronSpec": { "type": "string" },
                        "replicas": { "type": "integer" },
                        "image": { "type": "string", "maxLength": 5 }
                    }
                }
            }
        })
    }

    #[test]
    fn test_valid_document() {
        let validator = ResourceValidator::new(crontab_gvk(), Some(&crontab_schema())).unwrap();
        let doc = json!({ "spec": { "cronSpec": "* * * * */5", "replicas": 1 } });
        assert!(validator.validate(&doc).is_empty());
    }

    #[test]
    fn test_violation_paths() {
        let validator = ResourceValidator::new(crontab_gvk(), Some(&crontab_schema())).unwrap();
        let doc = json!({ "spec": { "cronSpec": 5 } });
        let violations = validator.validate(&doc);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/spec/cronSpec");
        assert!(!violations[0].message.contains('"'));
    }

    #[test]
    fn test_root_path() {
        let validator = ResourceValidator::new(crontab_gvk(), Some(&crontab_schema())).unwrap();
        let violations = validator.validate(&json!("not an object"));
        assert_eq!(violations[0].path, "(root)");
    }

    #[test]
    fn test_missing_schema_accepts_anything() {
        let validator = ResourceValidator::new(crontab_gvk(), None).unwrap();
        assert!(validator.validate(&json!({ "anything": [1, 2, 3] })).is_empty());
    }

    #[test]
    fn test_nullable_field_accepts_null() {
        let schema = json!({
            "type": "object",
            "properties": { "note": { "type": "string", "nullable": true } }
        });
        let validator = ResourceValidator::new(crontab_gvk(), Some(&schema)).unwrap();
        assert!(validator.validate(&json!({ "note": null })).is_empty());
        assert_eq!(validator.validate(&json!({ "note": 3 })).len(), 1);
    }

    #[test]
    fn test_int_or_string_field() {
        let schema = json!({
            "type": "object",
            "properties": { "port": { "x-kubernetes-int-or-string": true } }
        });
        let validator = ResourceValidator::new(crontab_gvk(), Some(&schema)).unwrap();
        assert!(validator.validate(&json!({ "port": 8080 })).is_empty());
        assert!(validator.validate(&json!({ "port": "http" })).is_empty());
        assert!(!validator.validate(&json!({ "port": true })).is_empty());
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let schema = json!({ "type": "no-such-type" });
        let err = ResourceValidator::new(crontab_gvk(), Some(&schema)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { .. }));
        assert!(err.to_string().contains("stable.example.com/v1, Kind=CronTab"));
    }
}
