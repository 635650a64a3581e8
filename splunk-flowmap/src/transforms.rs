//! `transforms.conf` extraction and routing-flag derivation.

use std::path::Path;

use conf_layers::{load_merged, MergedConf, Provenance};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::values::{optional_string, residual_options};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStanza {
    pub name: String,
    pub regex: Option<String>,
    pub format: Option<String>,
    pub dest_key: Option<String>,
    pub source_key: Option<String>,
    pub lookup_name: Option<String>,
    pub filename: Option<String>,
    pub is_drop: bool,
    pub is_index_routing: bool,
    pub is_sourcetype_rewrite: bool,
    pub is_host_rewrite: bool,
    pub options: IndexMap<String, String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// The single routing effect a transform has, derived from `DEST_KEY`/`FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAction {
    Drop,
    IndexRouting,
    SourcetypeRewrite,
    HostRewrite,
    Other,
}

/// First match wins; `DEST_KEY` is compared case-insensitively.
pub fn classify_transform(dest_key: Option<&str>, format: Option<&str>) -> TransformAction {
    let Some(dest_key) = dest_key else {
        return TransformAction::Other;
    };
    let dest_key = dest_key.to_ascii_lowercase();
    let null_queue = format.is_some_and(|f| f.eq_ignore_ascii_case("nullqueue"));

    match dest_key.as_str() {
        "queue" | "_tcp_routing" if null_queue => TransformAction::Drop,
        "_metadata:index" => TransformAction::IndexRouting,
        "_metadata:sourcetype" => TransformAction::SourcetypeRewrite,
        "_metadata:host" => TransformAction::HostRewrite,
        _ => TransformAction::Other,
    }
}

const CONSUMED_KEYS: &[&str] = &[
    "REGEX",
    "FORMAT",
    "DEST_KEY",
    "SOURCE_KEY",
    "lookup_name",
    "filename",
];

/// Convert merged `transforms.conf` stanzas into typed records.
pub fn extract_transforms(merged: &MergedConf) -> Vec<TransformStanza> {
    merged
        .iter()
        .map(|(name, record)| {
            let dest_key = optional_string(record, "DEST_KEY");
            let format = optional_string(record, "FORMAT");
            let action = classify_transform(dest_key.as_deref(), format.as_deref());
            TransformStanza {
                name: name.clone(),
                regex: optional_string(record, "REGEX"),
                source_key: optional_string(record, "SOURCE_KEY"),
                lookup_name: optional_string(record, "lookup_name"),
                filename: optional_string(record, "filename"),
                is_drop: action == TransformAction::Drop,
                is_index_routing: action == TransformAction::IndexRouting,
                is_sourcetype_rewrite: action == TransformAction::SourcetypeRewrite,
                is_host_rewrite: action == TransformAction::HostRewrite,
                options: residual_options(record, |key| CONSUMED_KEYS.contains(&key)),
                provenance: record.provenance.clone(),
                dest_key,
                format,
            }
        })
        .collect()
}

/// Locate, merge, and extract every `transforms.conf` under `root`.
pub fn parse_transforms(root: &Path) -> Vec<TransformStanza> {
    let transforms = extract_transforms(&load_merged(root, "transforms.conf"));
    info!(count = transforms.len(), "parsed transform stanzas");
    transforms
}

#[cfg(test)]
mod tests {
    use super::{classify_transform, TransformAction};

    #[test]
    fn derives_routing_flags() {
        let cases = [
            (Some("queue"), Some("nullQueue"), TransformAction::Drop),
            (Some("_TCP_ROUTING"), Some("NULLQUEUE"), TransformAction::Drop),
            (Some("queue"), Some("indexQueue"), TransformAction::Other),
            (Some("_MetaData:Index"), Some("web"), TransformAction::IndexRouting),
            (Some("_metadata:sourcetype"), Some("sourcetype::x"), TransformAction::SourcetypeRewrite),
            (Some("MetaData:Host"), Some("host::x"), TransformAction::Other),
            (Some("_metadata:host"), None, TransformAction::HostRewrite),
            (None, Some("nullQueue"), TransformAction::Other),
        ];
        for (dest, format, expected) in cases {
            assert_eq!(classify_transform(dest, format), expected, "{dest:?} {format:?}");
        }
    }
}
