//! `outputs.conf` extraction.
//!
//! Three stanza families feed an [`OutputGroup`]:
//!
//! - `[tcpout:<group>]` is the group itself;
//! - `[indexer_discovery:<name>]` is attached to every group whose
//!   `indexerDiscovery` names it;
//! - `[tcpout-server://<host:port>]` is attached to every group listing that
//!   server.
//!
//! `[tcpout] defaultGroup` marks the default group(s).

use std::path::Path;

use conf_layers::{load_merged, MergedConf, Provenance, StanzaRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::values::{is_truthy, optional_bool, optional_string, residual_options, split_list};

const GROUP_PREFIX: &str = "tcpout:";
const DISCOVERY_PREFIX: &str = "indexer_discovery:";
const SERVER_PREFIX: &str = "tcpout-server://";

/// Keys lifted into typed [`OutputGroup`] fields.
const CONSUMED_KEYS: &[&str] = &[
    "server",
    "sslCertPath",
    "clientCert",
    "sslRootCAPath",
    "useSSL",
    "compressed",
    "useACK",
    "indexerDiscovery",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerDiscovery {
    pub name: String,
    pub master_uri: Option<String>,
    /// Always redacted when present.
    pub pass4_symm_key: Option<String>,
    pub ssl_cert_path: Option<String>,
    /// Always redacted when present.
    pub ssl_password: Option<String>,
    pub ssl_verify_server_cert: Option<String>,
    pub source_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputGroup {
    pub group_name: String,
    pub servers: Vec<String>,
    pub default_group: bool,
    /// `Some(true)` when any cert setting is present, else `useSSL`, else unknown.
    pub ssl_enabled: Option<bool>,
    pub ssl_cert_path: Option<String>,
    pub client_cert: Option<String>,
    pub ssl_root_ca_path: Option<String>,
    pub compressed: Option<bool>,
    pub use_ack: Option<bool>,
    pub indexer_discovery: Option<String>,
    pub indexer_discovery_details: Option<IndexerDiscovery>,
    /// Settings from `[tcpout-server://...]` stanzas, keyed by server.
    pub per_server_options: IndexMap<String, IndexMap<String, String>>,
    pub options: IndexMap<String, String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

// Lookup preferring the canonical spelling, then the all-lowercase one.
fn either_case(record: &StanzaRecord, key: &str) -> Option<String> {
    record
        .get(key)
        .or_else(|| record.get(&key.to_ascii_lowercase()))
        .map(ToOwned::to_owned)
}

fn discovery_details(name: &str, record: &StanzaRecord) -> IndexerDiscovery {
    IndexerDiscovery {
        name: name.to_string(),
        master_uri: optional_string(record, "master_uri")
            .or_else(|| optional_string(record, "masterUri")),
        pass4_symm_key: either_case(record, "pass4SymmKey"),
        ssl_cert_path: either_case(record, "sslCertPath"),
        ssl_password: either_case(record, "sslPassword"),
        ssl_verify_server_cert: either_case(record, "sslVerifyServerCert"),
        source_file: record.provenance.source_file.clone(),
    }
}

fn ssl_enabled(record: &StanzaRecord) -> Option<bool> {
    let has_cert = ["sslCertPath", "clientCert", "sslRootCAPath"]
        .iter()
        .any(|key| record.get(key).is_some_and(|v| !v.is_empty()));
    if has_cert {
        return Some(true);
    }
    record.get("useSSL").map(is_truthy)
}

/// Convert merged `outputs.conf` stanzas into output groups, in stanza order.
pub fn extract_outputs(merged: &MergedConf) -> Vec<OutputGroup> {
    let default_groups = merged
        .get("tcpout")
        .and_then(|record| record.get("defaultGroup"))
        .map(split_list)
        .unwrap_or_default();

    let discoveries: IndexMap<&str, IndexerDiscovery> = merged
        .iter()
        .filter_map(|(stanza, record)| {
            let name = stanza.strip_prefix(DISCOVERY_PREFIX)?;
            Some((name, discovery_details(name, record)))
        })
        .collect();

    let server_overrides: IndexMap<&str, IndexMap<String, String>> = merged
        .iter()
        .filter_map(|(stanza, record)| {
            let server = stanza.strip_prefix(SERVER_PREFIX)?;
            Some((server, record.values.clone()))
        })
        .collect();

    let mut groups = Vec::new();
    for (stanza, record) in merged {
        let Some(group_name) = stanza.strip_prefix(GROUP_PREFIX) else {
            continue;
        };
        let servers = record.get("server").map(split_list).unwrap_or_default();
        let indexer_discovery = optional_string(record, "indexerDiscovery");

        let indexer_discovery_details = indexer_discovery.as_deref().and_then(|name| {
            let details = discoveries.get(name).cloned();
            if details.is_none() {
                warn!(group = group_name, discovery = name, "indexerDiscovery references a missing stanza");
            }
            details
        });

        let per_server_options = servers
            .iter()
            .filter_map(|server| {
                let settings = server_overrides.get(server.as_str())?;
                Some((server.clone(), settings.clone()))
            })
            .collect();

        groups.push(OutputGroup {
            group_name: group_name.to_string(),
            default_group: default_groups.iter().any(|g| g == group_name),
            ssl_enabled: ssl_enabled(record),
            ssl_cert_path: optional_string(record, "sslCertPath"),
            client_cert: optional_string(record, "clientCert"),
            ssl_root_ca_path: optional_string(record, "sslRootCAPath"),
            compressed: optional_bool(record, "compressed"),
            use_ack: optional_bool(record, "useACK"),
            indexer_discovery,
            indexer_discovery_details,
            per_server_options,
            options: residual_options(record, |key| CONSUMED_KEYS.contains(&key)),
            provenance: record.provenance.clone(),
            servers,
        });
    }
    groups
}

/// Locate, merge, and extract every `outputs.conf` under `root`.
pub fn parse_outputs(root: &Path) -> Vec<OutputGroup> {
    let groups = extract_outputs(&load_merged(root, "outputs.conf"));
    info!(count = groups.len(), "parsed output groups");
    groups
}

#[cfg(test)]
mod tests {
    use super::parse_outputs;
    use conf_layers::REDACTED;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write");
    }

    #[test]
    fn extracts_groups_with_ssl_and_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "apps/fwd/local/outputs.conf",
            "[tcpout]\ndefaultGroup = primary\n\n\
             [tcpout:primary]\nserver = idx1:9997, idx2:9997,\nsslCertPath = /certs/a.pem\nuseACK = true\nmaxQueueSize = 7MB\n\n\
             [tcpout:backup]\nserver = idx3:9997\nuseSSL = false\ncompressed = 1\n\n\
             [tcpout:unknown_tls]\nserver = idx4:9997\n",
        );

        let groups = parse_outputs(dir.path());
        assert_eq!(groups.len(), 3);

        let primary = &groups[0];
        assert_eq!(primary.group_name, "primary");
        assert_eq!(primary.servers, vec!["idx1:9997", "idx2:9997"]);
        assert!(primary.default_group);
        assert_eq!(primary.ssl_enabled, Some(true));
        assert_eq!(primary.use_ack, Some(true));
        assert_eq!(primary.compressed, None);
        assert_eq!(primary.options.get("maxQueueSize").map(String::as_str), Some("7MB"));
        assert!(!primary.options.contains_key("server"));
        assert_eq!(primary.provenance.source_app.as_deref(), Some("fwd"));

        assert!(!groups[1].default_group);
        assert_eq!(groups[1].ssl_enabled, Some(false));
        assert_eq!(groups[1].compressed, Some(true));
        assert_eq!(groups[2].ssl_enabled, None);
    }

    #[test]
    fn attaches_discovery_and_per_server_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "system/local/outputs.conf",
            "[indexer_discovery:cm1]\nmaster_uri = https://cm:8089\npass4SymmKey = s3cret\nsslVerifyServerCert = true\n\n\
             [tcpout:disc]\nindexerDiscovery = cm1\nsslVerifyServerCert = false\n\n\
             [tcpout:static]\nserver = idx9:9997\n\n\
             [tcpout-server://idx9:9997]\nsslCommonNameToCheck = idx9.example.com\n",
        );

        let groups = parse_outputs(dir.path());
        let disc = groups.iter().find(|g| g.group_name == "disc").expect("disc");
        let details = disc.indexer_discovery_details.as_ref().expect("details");
        assert_eq!(details.master_uri.as_deref(), Some("https://cm:8089"));
        assert_eq!(details.pass4_symm_key.as_deref(), Some(REDACTED));
        assert_eq!(details.source_file, "system/local/outputs.conf");
        assert_eq!(disc.options.get("sslVerifyServerCert").map(String::as_str), Some("false"));

        let fixed = groups.iter().find(|g| g.group_name == "static").expect("static");
        let overrides = fixed.per_server_options.get("idx9:9997").expect("override");
        assert_eq!(
            overrides.get("sslCommonNameToCheck").map(String::as_str),
            Some("idx9.example.com")
        );
        assert!(fixed.indexer_discovery_details.is_none());
    }
}
