//! CustomResourceDefinition handling
//!
//! - **Document** (`document`): the parts of a CRD that matter for validation
//! - **Parsing** (`parser`): turn an untyped YAML document into a `CrdDocument`
//! - **OpenAPI** (`openapi`): convert structural OpenAPI v3 schemas to JSON Schema
//!
//! Both `apiextensions.k8s.io/v1` and `v1beta1` CRDs are understood. A
//! `v1beta1` CRD may carry a top-level `spec.validation.openAPIV3Schema`;
//! when present it applies to every version and replaces any per-version
//! schema.

mod document;
mod openapi;
mod parser;

pub use document::{CrdDocument, CrdNames, CrdScope, CrdVersion};
pub use openapi::openapi_to_json_schema;
pub use parser::{CRD_KIND, CrdParser, is_crd};
