//! `props.conf` extraction.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use conf_layers::{load_merged, MergedConf, Provenance};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::values::{optional_string, residual_options, split_list};

/// What a props stanza matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropsKind {
    Sourcetype,
    Source,
    Host,
    Default,
}

impl PropsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PropsKind::Sourcetype => "sourcetype",
            PropsKind::Source => "source",
            PropsKind::Host => "host",
            PropsKind::Default => "default",
        }
    }
}

impl Display for PropsKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropsStanza {
    pub stanza_name: String,
    #[serde(rename = "stanza_type")]
    pub kind: PropsKind,
    #[serde(rename = "stanza_value")]
    pub value: String,
    /// Transform names from every `TRANSFORMS-*` key, in key order.
    pub transforms: Vec<String>,
    pub line_breaker: Option<String>,
    pub time_format: Option<String>,
    pub truncate: Option<i64>,
    pub options: IndexMap<String, String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Split a stanza name into its kind and match value.
pub fn classify_props(name: &str) -> (PropsKind, &str) {
    if name == "default" {
        return (PropsKind::Default, name);
    }
    for (prefix, kind) in [
        ("sourcetype::", PropsKind::Sourcetype),
        ("source::", PropsKind::Source),
        ("host::", PropsKind::Host),
    ] {
        if let Some(value) = name.strip_prefix(prefix).filter(|v| !v.is_empty()) {
            return (kind, value);
        }
    }
    (PropsKind::Sourcetype, name)
}

fn is_transforms_key(key: &str) -> bool {
    const PREFIX: &str = "TRANSFORMS-";
    key.len() > PREFIX.len()
        && key
            .get(..PREFIX.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX))
}

const CONSUMED_KEYS: &[&str] = &["LINE_BREAKER", "TIME_FORMAT", "TRUNCATE"];

/// Convert merged `props.conf` stanzas into typed records.
pub fn extract_props(merged: &MergedConf) -> Vec<PropsStanza> {
    merged
        .iter()
        .map(|(name, record)| {
            let (kind, value) = classify_props(name);

            let mut transforms: Vec<String> = Vec::new();
            for (key, refs) in &record.values {
                if !is_transforms_key(key) {
                    continue;
                }
                for name in split_list(refs) {
                    if !transforms.contains(&name) {
                        transforms.push(name);
                    }
                }
            }

            PropsStanza {
                stanza_name: name.clone(),
                kind,
                value: value.to_string(),
                transforms,
                line_breaker: optional_string(record, "LINE_BREAKER"),
                time_format: optional_string(record, "TIME_FORMAT"),
                truncate: record
                    .get("TRUNCATE")
                    .and_then(|raw| raw.trim().parse().ok()),
                options: residual_options(record, |key| {
                    CONSUMED_KEYS.contains(&key) || is_transforms_key(key)
                }),
                provenance: record.provenance.clone(),
            }
        })
        .collect()
}

/// Locate, merge, and extract every `props.conf` under `root`.
pub fn parse_props(root: &Path) -> Vec<PropsStanza> {
    let props = extract_props(&load_merged(root, "props.conf"));
    info!(count = props.len(), "parsed props stanzas");
    props
}

#[cfg(test)]
mod tests {
    use super::{classify_props, parse_props, PropsKind};
    use std::fs;

    #[test]
    fn classifies_stanza_names() {
        assert_eq!(classify_props("default"), (PropsKind::Default, "default"));
        assert_eq!(classify_props("sourcetype::syslog"), (PropsKind::Sourcetype, "syslog"));
        assert_eq!(classify_props("source::/var/log/*"), (PropsKind::Source, "/var/log/*"));
        assert_eq!(classify_props("host::web01"), (PropsKind::Host, "web01"));
        assert_eq!(classify_props("access_combined"), (PropsKind::Sourcetype, "access_combined"));
    }

    #[test]
    fn collects_transform_refs_and_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("system/local/props.conf");
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(
            &path,
            "[syslog]\nTRANSFORMS-route = to_web, to_sec\ntransforms-drop = drop_debug,to_web\n\
             TRUNCATE = 10000\nTIME_FORMAT = %b %d\nREPORT-fields = extract_kv\n\n\
             [source::/var/log/app.log]\nTRUNCATE = lots\n",
        )
        .expect("write");

        let props = parse_props(dir.path());
        assert_eq!(props.len(), 2);

        let syslog = &props[0];
        assert_eq!(syslog.transforms, vec!["to_web", "to_sec", "drop_debug"]);
        assert_eq!(syslog.truncate, Some(10000));
        assert_eq!(syslog.time_format.as_deref(), Some("%b %d"));
        assert_eq!(syslog.options.keys().collect::<Vec<_>>(), vec!["REPORT-fields"]);

        assert_eq!(props[1].kind, PropsKind::Source);
        assert_eq!(props[1].truncate, None);
    }
}
