//! Multi-document YAML decoding
//!
//! A manifest file may hold several `---` separated documents. Each one is
//! decoded into an untyped `serde_json::Value`; empty documents (nothing but
//! comments or a stray separator) are dropped.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// Decode every non-empty document in `content`
pub fn decode_documents(content: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }

    Ok(documents)
}

/// Read a file and decode its documents
pub fn read_documents(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_documents(&content).map_err(|e| SchemaError::Decode {
        path: path.to_path_buf(),
        message: match e {
            SchemaError::Yaml(message) => message,
            other => other.to_string(),
        },
    })
}
