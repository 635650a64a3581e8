//! Resolution of a [`ParsedConfig`] into a [`CanonicalGraph`].
//!
//! A snapshot describes a single primary host. The resolver:
//!
//! 1. builds the primary host (id, inferred roles, labels, apps);
//! 2. builds one edge per enabled input and output target, with routing
//!    evaluated through props/transforms;
//! 3. collapses edges sharing endpoints, protocol, and path kind;
//! 4. adds placeholder hosts for every destination it only knows by name;
//! 5. attaches metadata and traceability.

pub mod edges;
pub mod evaluate;
pub mod host;
pub mod placeholders;
pub mod routing;

use chrono::Utc;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::info;

use crate::graph::{CanonicalGraph, Edge, GraphMeta, Host, GENERATOR, PLACEHOLDER_LABEL};
use crate::keywords::RoleKeywords;
use crate::snapshot::ParsedConfig;

pub use edges::{build_edges, merge_confidence, merge_edges, merge_tls};
pub use evaluate::{evaluate_transforms, RoutingOutcome, MAX_TRANSFORM_ITERATIONS};
pub use host::{build_host, sanitize_host_id};
pub use placeholders::synthesize_placeholders;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("parsed configuration has no inputs and no outputs")]
    EmptyConfig,
}

/// Resolve one snapshot into its canonical graph.
pub fn build_canonical_graph(
    parsed: &ParsedConfig,
    keywords: &[RoleKeywords],
) -> Result<CanonicalGraph, ResolveError> {
    if parsed.is_empty() {
        return Err(ResolveError::EmptyConfig);
    }

    let host = build_host(parsed, keywords);
    info!(host = %host.id, roles = ?host.roles, "resolved primary host");

    let edges = build_edges(parsed, &host.id);
    let built = edges.len();
    let edges = merge_edges(edges);
    info!(built, merged = edges.len(), "built edges");

    let placeholders = synthesize_placeholders(&edges, &host.id);
    let mut hosts = Vec::with_capacity(placeholders.len() + 1);
    hosts.push(host);
    hosts.extend(placeholders);

    let meta = build_meta(parsed, &hosts, &edges);
    Ok(CanonicalGraph { hosts, edges, meta })
}

fn build_meta(parsed: &ParsedConfig, hosts: &[Host], edges: &[Edge]) -> GraphMeta {
    let mut traceability: Map<String, Value> = parsed
        .traceability
        .iter()
        .map(|(name, files)| {
            let files = files.iter().cloned().map(Value::String).collect();
            (name.clone(), Value::Array(files))
        })
        .collect();

    let mut input_counts = Map::new();
    for input in &parsed.inputs {
        let count = input_counts
            .entry(input.kind.as_str())
            .or_insert(Value::from(0u64));
        *count = Value::from(count.as_u64().unwrap_or(0) + 1);
    }

    traceability.insert(
        "resolver".to_string(),
        json!({
            "input_counts": input_counts,
            "output_group_count": parsed.outputs.len(),
            "props_count": parsed.props.len(),
            "transforms_count": parsed.transforms.len(),
            "apps_found": parsed.host_metadata.apps.clone(),
        }),
    );

    GraphMeta {
        generator: GENERATOR.to_string(),
        generated_at: Utc::now(),
        host_count: hosts.len(),
        edge_count: edges.len(),
        source_hosts: hosts
            .iter()
            .filter(|host| !host.labels.iter().any(|l| l == PLACEHOLDER_LABEL))
            .map(|host| host.id.clone())
            .collect(),
        traceability,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_canonical_graph, ResolveError};
    use crate::keywords::default_role_keywords;
    use crate::snapshot::ParsedConfig;

    #[test]
    fn empty_config_is_rejected() {
        let err = build_canonical_graph(&ParsedConfig::default(), &default_role_keywords())
            .expect_err("empty");
        assert!(matches!(err, ResolveError::EmptyConfig));
    }
}
