//! `inputs.conf` extraction.
//!
//! Stanza names encode the input kind:
//!
//! - `monitor://<path>`: file/directory monitor
//! - `tcp://[host:]<port>` / `udp://[host:]<port>`: raw network inputs
//! - `splunktcp://[host:]<port>`: forwarded data receiver
//! - `http` / `http://<token>`: HTTP Event Collector
//! - `script://<path>`: scripted input
//! - `WinEventLog://<channel>`: Windows event log
//!
//! Anything else is treated as a modular input.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

use conf_layers::{load_merged, MergedConf, Provenance};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::values::{is_truthy, optional_string, residual_options};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    #[serde(rename = "monitor")]
    Monitor,
    #[serde(rename = "tcp")]
    Tcp,
    #[serde(rename = "udp")]
    Udp,
    #[serde(rename = "splunktcp")]
    SplunkTcp,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "script")]
    Script,
    #[serde(rename = "WinEventLog")]
    WinEventLog,
    #[serde(rename = "modular")]
    Modular,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Monitor => "monitor",
            InputKind::Tcp => "tcp",
            InputKind::Udp => "udp",
            InputKind::SplunkTcp => "splunktcp",
            InputKind::Http => "http",
            InputKind::Script => "script",
            InputKind::WinEventLog => "WinEventLog",
            InputKind::Modular => "modular",
        }
    }

    /// Inputs that originate data on this host (as opposed to receiving it).
    pub fn is_data_input(self) -> bool {
        matches!(
            self,
            InputKind::Monitor
                | InputKind::Tcp
                | InputKind::Udp
                | InputKind::Script
                | InputKind::WinEventLog
        )
    }
}

impl Display for InputKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputStanza {
    pub stanza_name: String,
    #[serde(rename = "input_type")]
    pub kind: InputKind,
    pub source_path: Option<String>,
    pub port: Option<u16>,
    pub sourcetype: Option<String>,
    pub index: Option<String>,
    pub host: Option<String>,
    pub disabled: bool,
    pub options: IndexMap<String, String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

const CONSUMED_KEYS: &[&str] = &["sourcetype", "index", "host", "disabled"];

/// Classify an input stanza name. First matching pattern wins.
///
/// Returns the kind plus the path/token/channel and port carried by the name.
pub fn classify_input(name: &str) -> (InputKind, Option<String>, Option<u16>) {
    if let Some(path) = non_empty_suffix(name, "monitor://") {
        return (InputKind::Monitor, Some(path.to_string()), None);
    }
    for (prefix, kind) in [
        ("tcp://", InputKind::Tcp),
        ("udp://", InputKind::Udp),
        ("splunktcp://", InputKind::SplunkTcp),
    ] {
        if let Some(port) = name.strip_prefix(prefix).and_then(network_port) {
            return (kind, None, port.parse().ok());
        }
    }
    if name == "http" {
        return (InputKind::Http, None, None);
    }
    if let Some(token) = non_empty_suffix(name, "http://") {
        return (InputKind::Http, Some(token.to_string()), None);
    }
    if let Some(path) = non_empty_suffix(name, "script://") {
        return (InputKind::Script, Some(path.to_string()), None);
    }
    const WIN_EVENT_LOG: &str = "WinEventLog://";
    if let Some(channel) = name
        .get(..WIN_EVENT_LOG.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(WIN_EVENT_LOG))
        .and_then(|_| name.get(WIN_EVENT_LOG.len()..))
        .filter(|rest| !rest.is_empty())
    {
        return (InputKind::WinEventLog, Some(channel.to_string()), None);
    }
    (InputKind::Modular, None, None)
}

fn non_empty_suffix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

// `[host:]port`, where host has no colon and port is all digits.
fn network_port(rest: &str) -> Option<&str> {
    let port = match rest.split_once(':') {
        Some((_, port)) => port,
        None => rest,
    };
    (!port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())).then_some(port)
}

/// Convert merged `inputs.conf` stanzas into typed records.
pub fn extract_inputs(merged: &MergedConf) -> Vec<InputStanza> {
    merged
        .iter()
        .map(|(name, record)| {
            let (kind, source_path, port) = classify_input(name);
            InputStanza {
                stanza_name: name.clone(),
                kind,
                source_path,
                port,
                sourcetype: optional_string(record, "sourcetype"),
                index: optional_string(record, "index"),
                host: optional_string(record, "host"),
                disabled: record.get("disabled").is_some_and(is_truthy),
                options: residual_options(record, |key| CONSUMED_KEYS.contains(&key)),
                provenance: record.provenance.clone(),
            }
        })
        .collect()
}

/// Locate, merge, and extract every `inputs.conf` under `root`.
pub fn parse_inputs(root: &Path) -> Vec<InputStanza> {
    let inputs = extract_inputs(&load_merged(root, "inputs.conf"));
    info!(count = inputs.len(), "parsed input stanzas");
    inputs
}

#[cfg(test)]
mod tests {
    use super::{classify_input, InputKind};

    #[test]
    fn classifies_each_kind() {
        let cases = [
            ("monitor:///var/log/messages", InputKind::Monitor, Some("/var/log/messages"), None),
            ("tcp://9999", InputKind::Tcp, None, Some(9999)),
            ("tcp://10.0.0.1:514", InputKind::Tcp, None, Some(514)),
            ("udp://:514", InputKind::Udp, None, Some(514)),
            ("splunktcp://9997", InputKind::SplunkTcp, None, Some(9997)),
            ("http", InputKind::Http, None, None),
            ("http://my_hec_token", InputKind::Http, Some("my_hec_token"), None),
            ("script://./bin/collect.sh", InputKind::Script, Some("./bin/collect.sh"), None),
            ("WinEventLog://Security", InputKind::WinEventLog, Some("Security"), None),
            ("wineventlog://System", InputKind::WinEventLog, Some("System"), None),
            ("perfmon://CPU", InputKind::Modular, None, None),
        ];
        for (name, kind, path, port) in cases {
            let (got_kind, got_path, got_port) = classify_input(name);
            assert_eq!(got_kind, kind, "{name}");
            assert_eq!(got_path.as_deref(), path, "{name}");
            assert_eq!(got_port, port, "{name}");
        }
    }

    #[test]
    fn non_numeric_port_falls_through_to_modular() {
        assert_eq!(classify_input("tcp://host:abc").0, InputKind::Modular);
        assert_eq!(classify_input("splunktcp://a:b:9997").0, InputKind::Modular);
        assert_eq!(classify_input("monitor://").0, InputKind::Modular);
    }

    #[test]
    fn oversized_port_keeps_kind_without_port() {
        assert_eq!(classify_input("tcp://99999"), (InputKind::Tcp, None, None));
    }
}
