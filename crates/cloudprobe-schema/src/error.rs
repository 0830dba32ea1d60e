//! Error types for cloudprobe-schema

use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while loading CRDs or decoding manifests
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// File could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failed
    #[error("failed to walk CRD directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// CRD location is not a directory
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// YAML or JSON decoding failed
    #[error("invalid YAML: {0}")]
    Yaml(String),

    /// A file could not be decoded as YAML documents
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Document is not a usable CustomResourceDefinition
    #[error("invalid CRD: {0}")]
    InvalidCrd(String),

    /// The OpenAPI schema could not be compiled
    #[error("invalid schema for {gvk}: {message}")]
    InvalidSchema { gvk: String, message: String },

    /// Resource has no apiVersion or kind
    #[error("resource missing apiVersion or kind")]
    MissingTypeMeta,

    /// Error located in one document of a file
    #[error("{}, document {index}: {source}", path.display())]
    Document {
        path: PathBuf,
        index: usize,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// Attach the file and document index to an error
    pub fn in_document(self, path: impl Into<PathBuf>, index: usize) -> Self {
        SchemaError::Document {
            path: path.into(),
            index,
            source: Box::new(self),
        }
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(e: serde_yaml::Error) -> Self {
        SchemaError::Yaml(e.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Yaml(e.to_string())
    }
}
