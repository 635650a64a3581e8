//! Graph validation.
//!
//! Rules run over the graph JSON rather than the typed model so that graphs
//! written by other producers (or older versions) can still be checked. Missing
//! or mistyped sections are treated as empty.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::graph::is_placeholder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    DanglingOutput,
    UnknownIndex,
    UnsecuredPipe,
    DropPath,
    AmbiguousGroup,
}

impl FindingCode {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingCode::DanglingOutput => "DANGLING_OUTPUT",
            FindingCode::UnknownIndex => "UNKNOWN_INDEX",
            FindingCode::UnsecuredPipe => "UNSECURED_PIPE",
            FindingCode::DropPath => "DROP_PATH",
            FindingCode::AmbiguousGroup => "AMBIGUOUS_GROUP",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            FindingCode::DanglingOutput => Severity::Error,
            FindingCode::DropPath => Severity::Info,
            FindingCode::UnknownIndex | FindingCode::UnsecuredPipe | FindingCode::AmbiguousGroup => {
                Severity::Warning
            }
        }
    }
}

impl Display for FindingCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub message: String,
    pub context: Map<String, Value>,
}

/// Protocols expected to run over TLS.
const TLS_REQUIRED_PROTOCOLS: &[&str] = &["splunktcp", "http_event_collector"];

struct GraphView<'a> {
    hosts: &'a [Value],
    edges: &'a [Value],
    meta: Option<&'a Map<String, Value>>,
}

fn section<'a>(graph: &'a Value, key: &str) -> &'a [Value] {
    match graph.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            warn!(key, "graph section is not a list");
            &[]
        }
        None => {
            warn!(key, "graph is missing section");
            &[]
        }
    }
}

impl<'a> GraphView<'a> {
    fn new(graph: &'a Value) -> Self {
        let meta = match graph.get("meta") {
            Some(Value::Object(meta)) => Some(meta),
            Some(_) => {
                warn!(key = "meta", "graph section is not an object");
                None
            }
            None => {
                warn!(key = "meta", "graph is missing section");
                None
            }
        };
        Self {
            hosts: section(graph, "hosts"),
            edges: section(graph, "edges"),
            meta: meta.filter(|m| !m.is_empty()),
        }
    }

    fn placeholder_ids(&self) -> HashSet<&'a str> {
        self.hosts
            .iter()
            .filter_map(|host| {
                let id = str_field(host, "id");
                let labels = str_list(host, "labels");
                let roles = str_list(host, "roles");
                (is_placeholder(id, &labels, &roles) && !id.is_empty()).then_some(id)
            })
            .collect()
    }

    fn finding(&self, code: FindingCode, message: String, mut context: Map<String, Value>) -> Finding {
        if let Some(meta) = self.meta {
            context.insert("meta".into(), Value::Object(meta.clone()));
        }
        Finding {
            code,
            severity: code.severity(),
            message,
            context,
        }
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn str_list<'a>(value: &'a Value, key: &str) -> Vec<&'a str> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn field_or(value: &Value, key: &str, default: Value) -> Value {
    value.get(key).cloned().unwrap_or(default)
}

fn host_or_unknown(edge: &Value, key: &str) -> String {
    match str_field(edge, key) {
        "" => "unknown".to_string(),
        host => host.to_string(),
    }
}

fn context(pairs: Vec<(&str, Value)>) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn dangling_outputs(view: &GraphView<'_>, placeholders: &HashSet<&str>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for edge in view.edges {
        let dst = str_field(edge, "dst_host");
        if dst.is_empty() || !placeholders.contains(dst) {
            continue;
        }
        let src = host_or_unknown(edge, "src_host");
        findings.push(view.finding(
            FindingCode::DanglingOutput,
            format!("Output from {src} to {dst} is dangling (destination unreachable or undefined)"),
            context(vec![
                ("src_host", Value::from(src.clone())),
                ("dst_host", Value::from(dst)),
                ("protocol", field_or(edge, "protocol", Value::Null)),
                ("sources", field_or(edge, "sources", Value::Array(vec![]))),
                ("indexes", field_or(edge, "indexes", Value::Array(vec![]))),
            ]),
        ));
    }
    findings
}

/// Indexes seen on edges reaching real (non-placeholder) hosts.
fn known_indexes<'a>(view: &GraphView<'a>, placeholders: &HashSet<&str>) -> HashSet<&'a str> {
    view.edges
        .iter()
        .filter(|edge| {
            let dst = str_field(edge, "dst_host");
            !dst.is_empty() && !placeholders.contains(dst)
        })
        .flat_map(|edge| str_list(edge, "indexes"))
        .collect()
}

fn unknown_indexes(view: &GraphView<'_>, known: &HashSet<&str>) -> Vec<Finding> {
    // Without any real destination there is nothing to compare against.
    if known.is_empty() {
        debug!("no indexes reach a real host, skipping unknown index check");
        return Vec::new();
    }

    let mut findings = Vec::new();
    for edge in view.edges {
        let src = host_or_unknown(edge, "src_host");
        let dst = host_or_unknown(edge, "dst_host");
        for index in str_list(edge, "indexes") {
            if known.contains(index) {
                continue;
            }
            findings.push(view.finding(
                FindingCode::UnknownIndex,
                format!("Edge from {src} to {dst} references unknown index '{index}'"),
                context(vec![
                    ("src_host", Value::from(src.clone())),
                    ("dst_host", Value::from(dst.clone())),
                    ("index", Value::from(index)),
                    ("protocol", field_or(edge, "protocol", Value::Null)),
                    ("sourcetypes", field_or(edge, "sourcetypes", Value::Array(vec![]))),
                ]),
            ));
        }
    }
    findings
}

fn unsecured_pipes(view: &GraphView<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for edge in view.edges {
        let protocol = str_field(edge, "protocol");
        if !TLS_REQUIRED_PROTOCOLS.contains(&protocol) {
            continue;
        }
        let tls = edge.get("tls").and_then(Value::as_bool);
        if tls == Some(true) {
            continue;
        }
        let src = host_or_unknown(edge, "src_host");
        let dst = host_or_unknown(edge, "dst_host");
        findings.push(view.finding(
            FindingCode::UnsecuredPipe,
            format!("{protocol} connection from {src} to {dst} does not use TLS"),
            context(vec![
                ("src_host", Value::from(src.clone())),
                ("dst_host", Value::from(dst.clone())),
                ("protocol", Value::from(protocol)),
                ("tls", tls.map_or(Value::Null, Value::from)),
                ("sources", field_or(edge, "sources", Value::Array(vec![]))),
            ]),
        ));
    }
    findings
}

fn drop_paths(view: &GraphView<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for edge in view.edges {
        let rules = str_list(edge, "drop_rules");
        if rules.is_empty() {
            continue;
        }
        let src = host_or_unknown(edge, "src_host");
        let dst = host_or_unknown(edge, "dst_host");
        findings.push(view.finding(
            FindingCode::DropPath,
            format!("Data from {src} is dropped via nullQueue: {}", rules.join(", ")),
            context(vec![
                ("src_host", Value::from(src.clone())),
                ("dst_host", Value::from(dst.clone())),
                ("drop_rules", Value::from(rules.clone())),
                ("sources", field_or(edge, "sources", Value::Array(vec![]))),
                ("sourcetypes", field_or(edge, "sourcetypes", Value::Array(vec![]))),
                ("filters", field_or(edge, "filters", Value::Array(vec![]))),
            ]),
        ));
    }
    findings
}

fn ambiguous_groups(view: &GraphView<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for edge in view.edges {
        if str_field(edge, "confidence") != "derived" {
            continue;
        }
        let src = host_or_unknown(edge, "src_host");
        let dst = host_or_unknown(edge, "dst_host");
        findings.push(view.finding(
            FindingCode::AmbiguousGroup,
            format!("Ambiguous routing from {src} to {dst}: multiple output groups without defaultGroup"),
            context(vec![
                ("src_host", Value::from(src.clone())),
                ("dst_host", Value::from(dst.clone())),
                ("protocol", field_or(edge, "protocol", Value::Null)),
                ("confidence", Value::from("derived")),
                ("sources", field_or(edge, "sources", Value::Array(vec![]))),
            ]),
        ));
    }
    findings
}

/// Run every rule over `graph`, in rule order.
pub fn validate_graph(graph: &Value) -> Vec<Finding> {
    let view = GraphView::new(graph);
    if view.hosts.is_empty() && view.edges.is_empty() {
        warn!("graph has no hosts and no edges");
        return Vec::new();
    }

    let placeholders = view.placeholder_ids();
    let known = known_indexes(&view, &placeholders);
    debug!(placeholders = placeholders.len(), known_indexes = known.len(), "validating graph");

    let mut findings = dangling_outputs(&view, &placeholders);
    findings.extend(unknown_indexes(&view, &known));
    findings.extend(unsecured_pipes(&view));
    findings.extend(drop_paths(&view));
    findings.extend(ambiguous_groups(&view));
    findings
}

/// Findings with per-severity totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new(findings: Vec<Finding>) -> Self {
        let count = |severity| findings.iter().filter(|f| f.severity == severity).count();
        Self {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            info: count(Severity::Info),
            findings,
        }
    }
}

pub fn build_validation_report(graph: &Value) -> ValidationReport {
    ValidationReport::new(validate_graph(graph))
}

pub fn render_validation_text(report: &ValidationReport) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "result errors={} warnings={} info={}",
        report.errors, report.warnings, report.info
    ));
    out.push("findings".to_string());
    if report.findings.is_empty() {
        out.push("- none".to_string());
        return out.join("\n");
    }
    for finding in &report.findings {
        out.push(format!(
            "- [{}] {}: {}",
            finding.severity.as_str(),
            finding.code,
            finding.message
        ));
    }
    out.join("\n")
}
