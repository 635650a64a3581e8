//! Input transport classification and output target resolution.

use tracing::warn;

use crate::graph::{PathKind, Protocol, INDEXER_DISCOVERY_PREFIX};
use crate::inputs::{InputKind, InputStanza};
use crate::outputs::OutputGroup;

/// Transport and path category for each input kind, tried in order.
const TRANSPORT_TABLE: &[(InputKind, Protocol, PathKind)] = &[
    (InputKind::Monitor, Protocol::Splunktcp, PathKind::Forwarding),
    (InputKind::Tcp, Protocol::Tcp, PathKind::Syslog),
    (InputKind::Udp, Protocol::Udp, PathKind::Syslog),
    (InputKind::SplunkTcp, Protocol::Splunktcp, PathKind::Forwarding),
    (InputKind::Http, Protocol::HttpEventCollector, PathKind::Hec),
    (InputKind::Script, Protocol::Splunktcp, PathKind::ScriptedInput),
    (InputKind::WinEventLog, Protocol::Splunktcp, PathKind::Modinput),
];

/// Look up the transport for an input; unknown kinds default to forwarded splunktcp.
pub fn transport_for(input: &InputStanza) -> (Protocol, PathKind) {
    TRANSPORT_TABLE
        .iter()
        .find(|(kind, _, _)| *kind == input.kind)
        .map(|(_, protocol, path_kind)| (*protocol, *path_kind))
        .unwrap_or_else(|| {
            warn!(
                input = %input.stanza_name,
                kind = %input.kind,
                "unknown input type, defaulting to splunktcp/forwarding"
            );
            (Protocol::Splunktcp, PathKind::Forwarding)
        })
}

/// A destination host reached through one output group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub host: String,
    pub tls: bool,
    pub group: String,
}

fn group_tls(group: &OutputGroup) -> bool {
    group.ssl_enabled == Some(true) || group.ssl_cert_path.as_deref().is_some_and(|p| !p.is_empty())
}

/// Expand output groups into concrete targets, in group then server order.
pub fn resolve_output_targets(groups: &[OutputGroup]) -> Vec<OutputTarget> {
    let mut targets = Vec::new();

    for group in groups {
        let tls = group_tls(group);

        if let Some(discovery) = group.indexer_discovery.as_deref() {
            targets.push(OutputTarget {
                host: format!("{INDEXER_DISCOVERY_PREFIX}{discovery}"),
                tls,
                group: group.group_name.clone(),
            });
            continue;
        }

        for server in &group.servers {
            let host = server.split(':').next().unwrap_or_default().trim();
            if host.is_empty() {
                warn!(server = %server, group = %group.group_name, "empty host in output server");
                continue;
            }
            targets.push(OutputTarget {
                host: host.to_string(),
                tls,
                group: group.group_name.clone(),
            });
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::{resolve_output_targets, transport_for, OutputTarget};
    use crate::graph::{PathKind, Protocol};
    use crate::inputs::{classify_input, InputStanza};
    use crate::outputs::OutputGroup;

    fn input(name: &str) -> InputStanza {
        let (kind, source_path, port) = classify_input(name);
        InputStanza {
            stanza_name: name.into(),
            kind,
            source_path,
            port,
            sourcetype: None,
            index: None,
            host: None,
            disabled: false,
            options: Default::default(),
            provenance: Default::default(),
        }
    }

    fn group(name: &str, servers: &[&str]) -> OutputGroup {
        OutputGroup {
            group_name: name.into(),
            servers: servers.iter().map(|s| s.to_string()).collect(),
            default_group: false,
            ssl_enabled: None,
            ssl_cert_path: None,
            client_cert: None,
            ssl_root_ca_path: None,
            compressed: None,
            use_ack: None,
            indexer_discovery: None,
            indexer_discovery_details: None,
            per_server_options: Default::default(),
            options: Default::default(),
            provenance: Default::default(),
        }
    }

    #[test]
    fn transport_table() {
        assert_eq!(transport_for(&input("udp://514")), (Protocol::Udp, PathKind::Syslog));
        assert_eq!(transport_for(&input("http://tok")), (Protocol::HttpEventCollector, PathKind::Hec));
        assert_eq!(
            transport_for(&input("script://./bin/a.sh")),
            (Protocol::Splunktcp, PathKind::ScriptedInput)
        );
        assert_eq!(
            transport_for(&input("WinEventLog://Security")),
            (Protocol::Splunktcp, PathKind::Modinput)
        );
        assert_eq!(
            transport_for(&input("perfmon://CPU")),
            (Protocol::Splunktcp, PathKind::Forwarding)
        );
    }

    #[test]
    fn targets_per_server_and_discovery() {
        let mut secured = group("secure", &["idx1.corp:9997", ":9997", "idx2"]);
        secured.ssl_cert_path = Some("/certs/client.pem".into());
        let mut discovered = group("disc", &["ignored:9997"]);
        discovered.indexer_discovery = Some("cm1".into());
        discovered.ssl_enabled = Some(false);

        let targets = resolve_output_targets(&[secured, discovered]);
        let target = |host: &str, tls, group: &str| OutputTarget {
            host: host.into(),
            tls,
            group: group.into(),
        };
        assert_eq!(
            targets,
            vec![
                target("idx1.corp", true, "secure"),
                target("idx2", true, "secure"),
                target("indexer_discovery:cm1", false, "disc"),
            ]
        );
    }
}
