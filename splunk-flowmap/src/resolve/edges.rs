//! Edge construction and aggregation.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;

use super::evaluate::evaluate_transforms;
use super::routing::{resolve_output_targets, transport_for};
use crate::graph::{Confidence, Edge, PathKind, Protocol, UNKNOWN_DESTINATION};
use crate::snapshot::ParsedConfig;

/// More than one output group and none marked default.
pub fn is_ambiguous_routing(parsed: &ParsedConfig) -> bool {
    parsed.outputs.len() > 1 && !parsed.outputs.iter().any(|group| group.default_group)
}

/// One edge per (enabled input, output target), or per input to the unknown
/// destination when nothing is configured to receive the data.
pub fn build_edges(parsed: &ParsedConfig, src_host: &str) -> Vec<Edge> {
    let targets = resolve_output_targets(&parsed.outputs);
    let confidence = if is_ambiguous_routing(parsed) {
        Confidence::Derived
    } else {
        Confidence::Explicit
    };

    let mut edges = Vec::new();
    for input in parsed.inputs.iter().filter(|input| !input.disabled) {
        let (transport, path_kind) = transport_for(input);
        debug!(input = %input.stanza_name, transport = transport.as_str(), "classified input");
        let outcome = evaluate_transforms(input, &parsed.props, &parsed.transforms);

        let edge = |dst_host: &str, tls: Option<bool>, confidence: Confidence| Edge {
            src_host: src_host.to_string(),
            dst_host: dst_host.to_string(),
            // Forwarded traffic leaves the host over splunktcp whatever the input transport.
            protocol: Protocol::Splunktcp,
            path_kind,
            sources: vec![input.stanza_name.clone()],
            sourcetypes: input.sourcetype.iter().cloned().collect(),
            indexes: outcome.indexes.clone(),
            filters: outcome.filters.clone(),
            drop_rules: outcome.drop_rules.clone(),
            tls,
            weight: 1,
            app_contexts: input.provenance.source_app.iter().cloned().collect(),
            confidence,
        };

        if targets.is_empty() {
            edges.push(edge(UNKNOWN_DESTINATION, None, Confidence::Derived));
            continue;
        }
        for target in &targets {
            edges.push(edge(target.host.as_str(), Some(target.tls), confidence));
        }
    }
    edges
}

/// `false` dominates; `true` only when every edge is known to be secured.
pub fn merge_tls(values: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut all_true = true;
    for value in values {
        match value {
            Some(false) => return Some(false),
            Some(true) => {}
            None => all_true = false,
        }
    }
    all_true.then_some(true)
}

/// `derived` dominates.
pub fn merge_confidence(values: impl IntoIterator<Item = Confidence>) -> Confidence {
    values.into_iter().min().unwrap_or(Confidence::Explicit)
}

type EdgeKey = (String, String, Protocol, PathKind);

fn sorted_union<'a>(lists: impl Iterator<Item = &'a Vec<String>>) -> Vec<String> {
    lists
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn merge_group(group: Vec<Edge>) -> Edge {
    let mut filters: Vec<String> = Vec::new();
    for filter in group.iter().flat_map(|edge| &edge.filters) {
        if !filters.contains(filter) {
            filters.push(filter.clone());
        }
    }

    let first = &group[0];
    Edge {
        src_host: first.src_host.clone(),
        dst_host: first.dst_host.clone(),
        protocol: first.protocol,
        path_kind: first.path_kind,
        sources: sorted_union(group.iter().map(|e| &e.sources)),
        sourcetypes: sorted_union(group.iter().map(|e| &e.sourcetypes)),
        indexes: sorted_union(group.iter().map(|e| &e.indexes)),
        filters,
        drop_rules: sorted_union(group.iter().map(|e| &e.drop_rules)),
        tls: merge_tls(group.iter().map(|e| e.tls)),
        weight: group.iter().map(|e| e.weight).sum(),
        app_contexts: sorted_union(group.iter().map(|e| &e.app_contexts)),
        confidence: merge_confidence(group.iter().map(|e| e.confidence)),
    }
}

/// Collapse edges sharing (src, dst, protocol, path kind), keeping first-seen order.
pub fn merge_edges(edges: Vec<Edge>) -> Vec<Edge> {
    let mut groups: IndexMap<EdgeKey, Vec<Edge>> = IndexMap::new();
    for edge in edges {
        let key = (
            edge.src_host.clone(),
            edge.dst_host.clone(),
            edge.protocol,
            edge.path_kind,
        );
        groups.entry(key).or_default().push(edge);
    }

    groups
        .into_values()
        .map(|mut group| {
            if group.len() == 1 {
                group.remove(0)
            } else {
                merge_group(group)
            }
        })
        .collect()
}
