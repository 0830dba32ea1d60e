//! GroupVersionKind helpers

use kube::core::{GroupVersionKind, TypeMeta};
use serde::Serializer;

/// Convert TypeMeta to GroupVersionKind
///
/// This function parses the apiVersion field to extract group and version:
/// - "stable.example.com/v1" -> group="stable.example.com", version="v1"
/// - "v1" -> group="", version="v1" (core API)
pub fn gvk_from_type_meta(tm: &TypeMeta) -> GroupVersionKind {
    let (group, version) = match tm.api_version.rsplit_once('/') {
        Some((g, v)) => (g, v),
        None => ("", tm.api_version.as_str()),
    };
    GroupVersionKind::gvk(group, version, &tm.kind)
}

/// `group/version, Kind=Kind`
pub fn format_gvk(gvk: &GroupVersionKind) -> String {
    format!("{}/{}, Kind={}", gvk.group, gvk.version, gvk.kind)
}

pub(crate) fn serialize_gvk<S: Serializer>(
    gvk: &GroupVersionKind,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_gvk(gvk))
}
