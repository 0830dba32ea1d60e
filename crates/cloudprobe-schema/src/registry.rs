//! GVK-keyed validator registry

use std::collections::HashMap;
use std::path::Path;

use kube::core::GroupVersionKind;
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::crd::{CrdDocument, CrdParser, is_crd};
use crate::documents::read_documents;
use crate::error::{Result, SchemaError};
use crate::gvk::format_gvk;
use crate::validator::ResourceValidator;

/// Validators for every GroupVersionKind declared by a set of CRDs
///
/// Built once, read-only afterwards.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    validators: HashMap<GroupVersionKind, ResourceValidator>,
}

impl SchemaRegistry {
    /// Load every CRD under `dir`
    ///
    /// Files are visited recursively in file-name order, so when two CRDs
    /// declare the same GVK the one found later wins. Any unreadable file,
    /// undecodable document, malformed CRD or uncompilable schema aborts the
    /// build.
    pub fn build(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(SchemaError::NotADirectory(dir.to_path_buf()));
        }

        let mut registry = Self::default();
        let mut files = 0usize;

        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            debug!(path = %path.display(), "loading CRD file");
            files += 1;

            for (index, document) in read_documents(path)?.iter().enumerate() {
                registry
                    .add_document(document)
                    .map_err(|e| e.in_document(path, index))?;
            }
        }

        info!(
            dir = %dir.display(),
            files,
            validators = registry.len(),
            "schema registry built"
        );
        Ok(registry)
    }

    /// Build from already decoded documents
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Value>) -> Result<Self> {
        let mut registry = Self::default();
        for (index, document) in documents.into_iter().enumerate() {
            registry
                .add_document(document)
                .map_err(|e| e.in_document("<memory>", index))?;
        }
        Ok(registry)
    }

    fn add_document(&mut self, document: &Value) -> Result<()> {
        if !document.is_object() {
            return Err(SchemaError::InvalidCrd(
                "document is not a mapping".to_string(),
            ));
        }

        if !is_crd(document) {
            let kind = document
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or("<none>");
            warn!(kind, "skipping document that is not a CustomResourceDefinition");
            return Ok(());
        }

        let crd = CrdParser::parse_value(document)?;
        self.add_crd(&crd)
    }

    /// Compile and register one validator per version of `crd`
    pub fn add_crd(&mut self, crd: &CrdDocument) -> Result<()> {
        for version in &crd.versions {
            let gvk = crd.gvk(version);
            let validator = ResourceValidator::new(gvk.clone(), crd.effective_schema(version))?;

            if self.validators.insert(gvk.clone(), validator).is_some() {
                warn!(
                    gvk = %format_gvk(&gvk),
                    crd = %crd.name,
                    "duplicate CRD version, later definition overrides earlier one"
                );
            } else {
                debug!(gvk = %format_gvk(&gvk), "registered validator");
            }
        }
        Ok(())
    }

    pub fn get(&self, gvk: &GroupVersionKind) -> Option<&ResourceValidator> {
        self.validators.get(gvk)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Registered GVKs, sorted by group, version, kind
    pub fn gvks(&self) -> Vec<&GroupVersionKind> {
        let mut gvks: Vec<_> = self.validators.keys().collect();
        gvks.sort_by(|a, b| {
            (&a.group, &a.version, &a.kind).cmp(&(&b.group, &b.version, &b.kind))
        });
        gvks
    }
}
