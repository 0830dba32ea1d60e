//! Parsed CustomResourceDefinition

use kube::core::GroupVersionKind;
use serde_json::Value;

/// A CustomResourceDefinition reduced to what validation needs
#[derive(Debug, Clone, PartialEq)]
pub struct CrdDocument {
    /// Full CRD name (e.g., "crontabs.stable.example.com")
    pub name: String,
    /// API group (e.g., "stable.example.com")
    pub group: String,
    /// Resource scope
    pub scope: CrdScope,
    /// Resource names (kind, plural, singular, shortNames)
    pub names: CrdNames,
    /// Declared API versions
    pub versions: Vec<CrdVersion>,
    /// Top-level `spec.validation.openAPIV3Schema` (v1beta1 only)
    pub legacy_schema: Option<Value>,
}

impl CrdDocument {
    /// Schema that applies to `version`: the legacy top-level schema wins
    pub fn effective_schema<'a>(&'a self, version: &'a CrdVersion) -> Option<&'a Value> {
        self.legacy_schema.as_ref().or(version.schema.as_ref())
    }

    /// GroupVersionKind for a version of this CRD
    pub fn gvk(&self, version: &CrdVersion) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &version.name, &self.names.kind)
    }
}

/// CRD scope - whether resources are namespaced or cluster-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrdScope {
    #[default]
    Namespaced,
    Cluster,
}

impl std::fmt::Display for CrdScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespaced => write!(f, "Namespaced"),
            Self::Cluster => write!(f, "Cluster"),
        }
    }
}

/// CRD naming information
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrdNames {
    /// Kind (e.g., "CronTab")
    pub kind: String,
    /// Plural name (e.g., "crontabs")
    pub plural: String,
    pub singular: Option<String>,
    pub short_names: Vec<String>,
    pub list_kind: Option<String>,
    pub categories: Vec<String>,
}

/// A single API version of a CRD
#[derive(Debug, Clone, PartialEq)]
pub struct CrdVersion {
    /// Version name (e.g., "v1", "v1beta1")
    pub name: String,
    pub served: bool,
    pub storage: bool,
    pub deprecated: bool,
    pub deprecation_warning: Option<String>,
    /// Raw `schema.openAPIV3Schema`
    pub schema: Option<Value>,
}
