//! Canonical graph model.
//!
//! The JSON shape of these types is the contract with graph consumers:
//!
//! ```text
//! { "hosts": [{id, roles, labels, apps}],
//!   "edges": [{src_host, dst_host, protocol, path_kind, sources, sourcetypes,
//!              indexes, filters, drop_rules, tls, weight, app_contexts, confidence}],
//!   "meta":  {generator, generated_at, host_count, edge_count, source_hosts, traceability} }
//! ```

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const GENERATOR: &str = concat!("splunk-flowmap/", env!("CARGO_PKG_VERSION"));

/// Destination used when a host has inputs but nowhere to send them.
pub const UNKNOWN_DESTINATION: &str = "unknown_destination";
pub const INDEXER_DISCOVERY_PREFIX: &str = "indexer_discovery:";
pub const PLACEHOLDER_LABEL: &str = "placeholder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Indexer,
    HeavyForwarder,
    UniversalForwarder,
    SearchHead,
    Unknown,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Indexer => "indexer",
            Role::HeavyForwarder => "heavy_forwarder",
            Role::UniversalForwarder => "universal_forwarder",
            Role::SearchHead => "search_head",
            Role::Unknown => "unknown",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Splunktcp,
    HttpEventCollector,
    Syslog,
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Splunktcp => "splunktcp",
            Protocol::HttpEventCollector => "http_event_collector",
            Protocol::Syslog => "syslog",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Forwarding,
    Hec,
    Syslog,
    ScriptedInput,
    Modinput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Ordered first so `max` picks `Explicit` and `min` picks `Derived`.
    Derived,
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub roles: Vec<Role>,
    pub labels: Vec<String>,
    pub apps: Vec<String>,
}

impl Host {
    pub fn is_placeholder(&self) -> bool {
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        let roles: Vec<&str> = self.roles.iter().map(|r| r.as_str()).collect();
        is_placeholder(&self.id, &labels, &roles)
    }
}

/// A host is a placeholder iff it is labelled so, is the unknown destination,
/// stands for an indexer-discovery pool, or has the `unknown` role.
pub fn is_placeholder(id: &str, labels: &[&str], roles: &[&str]) -> bool {
    labels.contains(&PLACEHOLDER_LABEL)
        || id == UNKNOWN_DESTINATION
        || id.starts_with(INDEXER_DISCOVERY_PREFIX)
        || roles.contains(&Role::Unknown.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub src_host: String,
    pub dst_host: String,
    pub protocol: Protocol,
    pub path_kind: PathKind,
    pub sources: Vec<String>,
    pub sourcetypes: Vec<String>,
    pub indexes: Vec<String>,
    pub filters: Vec<String>,
    pub drop_rules: Vec<String>,
    /// `None` when the transport security could not be determined.
    pub tls: Option<bool>,
    pub weight: u32,
    pub app_contexts: Vec<String>,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMeta {
    pub generator: String,
    pub generated_at: DateTime<Utc>,
    pub host_count: usize,
    pub edge_count: usize,
    pub source_hosts: Vec<String>,
    pub traceability: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalGraph {
    pub hosts: Vec<Host>,
    pub edges: Vec<Edge>,
    pub meta: GraphMeta,
}

impl CanonicalGraph {
    pub fn host(&self, id: &str) -> Option<&Host> {
        self.hosts.iter().find(|host| host.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
