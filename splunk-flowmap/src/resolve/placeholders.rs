use indexmap::IndexSet;

use crate::graph::{Edge, Host, Role, INDEXER_DISCOVERY_PREFIX, PLACEHOLDER_LABEL, UNKNOWN_DESTINATION};

/// Guess a role from a destination id. Checked in order, on the lowercased id.
fn placeholder_role(id: &str) -> Role {
    let lower = id.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if id == UNKNOWN_DESTINATION {
        Role::Unknown
    } else if id.starts_with(INDEXER_DISCOVERY_PREFIX) || has(&["idx", "indexer"]) {
        Role::Indexer
    } else if has(&["hf", "heavy"]) {
        Role::HeavyForwarder
    } else if has(&["uf", "forwarder"]) {
        Role::UniversalForwarder
    } else if has(&["search", "sh"]) {
        Role::SearchHead
    } else {
        Role::Unknown
    }
}

/// One placeholder host per edge destination other than `primary`, in first-seen order.
pub fn synthesize_placeholders(edges: &[Edge], primary: &str) -> Vec<Host> {
    let destinations: IndexSet<&str> = edges
        .iter()
        .map(|edge| edge.dst_host.as_str())
        .filter(|dst| *dst != primary)
        .collect();

    destinations
        .into_iter()
        .map(|id| {
            let labels = if id.starts_with(INDEXER_DISCOVERY_PREFIX) {
                vec!["indexer_discovery".to_string(), PLACEHOLDER_LABEL.to_string()]
            } else {
                vec![PLACEHOLDER_LABEL.to_string()]
            };
            Host {
                id: id.to_string(),
                roles: vec![placeholder_role(id)],
                labels,
                apps: Vec::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{placeholder_role, synthesize_placeholders};
    use crate::graph::{Confidence, Edge, PathKind, Protocol, Role};

    #[test]
    fn roles_from_ids() {
        assert_eq!(placeholder_role("unknown_destination"), Role::Unknown);
        assert_eq!(placeholder_role("indexer_discovery:cm1"), Role::Indexer);
        assert_eq!(placeholder_role("IDX01"), Role::Indexer);
        assert_eq!(placeholder_role("hf-east"), Role::HeavyForwarder);
        assert_eq!(placeholder_role("uf-7"), Role::UniversalForwarder);
        assert_eq!(placeholder_role("sh3"), Role::SearchHead);
        assert_eq!(placeholder_role("10.0.0.5"), Role::Unknown);
    }

    #[test]
    fn one_placeholder_per_destination() {
        let edge = |dst: &str| Edge {
            src_host: "uf01".into(),
            dst_host: dst.into(),
            protocol: Protocol::Splunktcp,
            path_kind: PathKind::Forwarding,
            sources: vec![],
            sourcetypes: vec![],
            indexes: vec![],
            filters: vec![],
            drop_rules: vec![],
            tls: None,
            weight: 1,
            app_contexts: vec![],
            confidence: Confidence::Explicit,
        };
        let hosts = synthesize_placeholders(
            &[edge("idx2"), edge("indexer_discovery:cm"), edge("idx2"), edge("uf01")],
            "uf01",
        );
        let ids: Vec<&str> = hosts.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["idx2", "indexer_discovery:cm"]);
        assert_eq!(hosts[0].labels, vec!["placeholder"]);
        assert_eq!(hosts[1].labels, vec!["indexer_discovery", "placeholder"]);
        assert!(hosts.iter().all(|h| h.is_placeholder()));
    }
}
