//! Static evaluation of props/transforms routing for one input.
//!
//! No event data is available, so regexes are never matched: every transform
//! referenced by a matching props stanza is assumed to fire. The evaluation is
//! a small state machine over the current sourcetype. A sourcetype rewrite
//! re-runs props matching under the new sourcetype, bounded by
//! [`MAX_TRANSFORM_ITERATIONS`].

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::warn;

use crate::inputs::InputStanza;
use crate::props::{PropsKind, PropsStanza};
use crate::transforms::TransformStanza;

pub const MAX_TRANSFORM_ITERATIONS: usize = 10;
pub const DEFAULT_INDEX: &str = "main";

/// Indexes, filters, and drop rules accumulated for one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingOutcome {
    pub indexes: Vec<String>,
    pub filters: Vec<String>,
    pub drop_rules: Vec<String>,
}

type VisitKey<'a> = (PropsKind, &'a str, Option<String>);

struct Evaluation<'a> {
    input: &'a InputStanza,
    transforms: IndexMap<&'a str, &'a TransformStanza>,
    sourcetype: Option<String>,
    outcome: RoutingOutcome,
    visited: HashSet<VisitKey<'a>>,
    iteration: usize,
}

// Later entries are applied last and therefore win.
fn match_rank(kind: PropsKind) -> u8 {
    match kind {
        PropsKind::Host => 0,
        PropsKind::Source => 1,
        PropsKind::Sourcetype | PropsKind::Default => 2,
    }
}

fn source_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => pattern == path || path.starts_with(prefix),
        None => pattern == path,
    }
}

impl<'a> Evaluation<'a> {
    fn new(input: &'a InputStanza, transforms: &'a [TransformStanza]) -> Self {
        let mut by_name = IndexMap::new();
        for transform in transforms {
            by_name.entry(transform.name.as_str()).or_insert(transform);
        }
        let index = input.index.clone().unwrap_or_else(|| DEFAULT_INDEX.to_string());
        Self {
            input,
            transforms: by_name,
            sourcetype: input.sourcetype.clone(),
            outcome: RoutingOutcome {
                indexes: vec![index],
                ..RoutingOutcome::default()
            },
            visited: HashSet::new(),
            iteration: 0,
        }
    }

    fn matches(&self, props: &PropsStanza) -> bool {
        match props.kind {
            PropsKind::Sourcetype => self.sourcetype.as_deref() == Some(props.value.as_str()),
            PropsKind::Source => self
                .input
                .source_path
                .as_deref()
                .is_some_and(|path| source_matches(&props.value, path)),
            PropsKind::Host => self.input.host.as_deref() == Some(props.value.as_str()),
            PropsKind::Default => false,
        }
    }

    /// One pass over the props. Returns true when the sourcetype was rewritten.
    fn step(&mut self, props: &'a [PropsStanza]) -> bool {
        let entry_sourcetype = self.sourcetype.clone();
        let mut matched: Vec<&'a PropsStanza> = props
            .iter()
            .filter(|p| {
                !self
                    .visited
                    .contains(&(p.kind, p.value.as_str(), entry_sourcetype.clone()))
            })
            .filter(|p| self.matches(p))
            .collect();
        if matched.is_empty() {
            return false;
        }
        matched.sort_by_key(|p| match_rank(p.kind));

        let mut rewritten = false;
        for stanza in matched {
            self.visited
                .insert((stanza.kind, stanza.value.as_str(), entry_sourcetype.clone()));
            for reference in &stanza.transforms {
                rewritten |= self.apply(reference);
            }
        }
        rewritten
    }

    fn apply(&mut self, reference: &str) -> bool {
        let Some(transform) = self.transforms.get(reference).copied() else {
            warn!(transform = reference, input = %self.input.stanza_name, "transform referenced in props but not defined");
            return false;
        };
        let format = transform.format.as_deref().filter(|f| !f.is_empty());

        if transform.is_index_routing {
            match format {
                Some(index) => {
                    self.outcome.indexes.push(index.to_string());
                    self.outcome.filters.push(format!("TRANSFORMS:{reference}"));
                }
                None => warn!(transform = reference, "index routing transform has no FORMAT"),
            }
        }

        if transform.is_drop {
            self.outcome.indexes.clear();
            self.outcome.drop_rules.push(format!("DROP:{reference}"));
        }

        if transform.is_sourcetype_rewrite {
            let Some(format) = format else {
                warn!(transform = reference, "sourcetype rewrite transform has no FORMAT");
                return false;
            };
            self.outcome.filters.push(format!("SOURCETYPE_REWRITE:{reference}"));
            let target = format.strip_prefix("sourcetype::").unwrap_or(format);
            if self.sourcetype.as_deref() != Some(target) {
                self.sourcetype = Some(target.to_string());
                return true;
            }
        }
        false
    }
}

/// Evaluate routing for `input` against every props and transforms stanza.
pub fn evaluate_transforms(
    input: &InputStanza,
    props: &[PropsStanza],
    transforms: &[TransformStanza],
) -> RoutingOutcome {
    let mut eval = Evaluation::new(input, transforms);

    let mut pending = true;
    while pending {
        if eval.iteration == MAX_TRANSFORM_ITERATIONS {
            warn!(
                input = %input.stanza_name,
                iterations = MAX_TRANSFORM_ITERATIONS,
                "sourcetype rewrites did not settle, possible rewrite cycle"
            );
            break;
        }
        eval.iteration += 1;
        pending = eval.step(props);
    }

    eval.outcome
}

#[cfg(test)]
mod tests {
    use super::{evaluate_transforms, source_matches, RoutingOutcome, MAX_TRANSFORM_ITERATIONS};
    use crate::inputs::{classify_input, InputStanza};
    use crate::props::{classify_props, PropsStanza};
    use crate::transforms::{classify_transform, TransformAction, TransformStanza};
    use pretty_assertions::assert_eq;

    fn input(name: &str, sourcetype: Option<&str>, index: Option<&str>) -> InputStanza {
        let (kind, source_path, port) = classify_input(name);
        InputStanza {
            stanza_name: name.into(),
            kind,
            source_path,
            port,
            sourcetype: sourcetype.map(Into::into),
            index: index.map(Into::into),
            host: None,
            disabled: false,
            options: Default::default(),
            provenance: Default::default(),
        }
    }

    fn props(name: &str, refs: &[&str]) -> PropsStanza {
        let (kind, value) = classify_props(name);
        PropsStanza {
            stanza_name: name.into(),
            kind,
            value: value.into(),
            transforms: refs.iter().map(|r| r.to_string()).collect(),
            line_breaker: None,
            time_format: None,
            truncate: None,
            options: Default::default(),
            provenance: Default::default(),
        }
    }

    fn transform(name: &str, dest_key: &str, format: &str) -> TransformStanza {
        let action = classify_transform(Some(dest_key), Some(format));
        TransformStanza {
            name: name.into(),
            regex: Some(".".into()),
            format: Some(format.into()),
            dest_key: Some(dest_key.into()),
            source_key: None,
            lookup_name: None,
            filename: None,
            is_drop: action == TransformAction::Drop,
            is_index_routing: action == TransformAction::IndexRouting,
            is_sourcetype_rewrite: action == TransformAction::SourcetypeRewrite,
            is_host_rewrite: action == TransformAction::HostRewrite,
            options: Default::default(),
            provenance: Default::default(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_main_without_matches() {
        let outcome = evaluate_transforms(&input("udp://514", None, None), &[], &[]);
        assert_eq!(
            outcome,
            RoutingOutcome {
                indexes: strings(&["main"]),
                ..RoutingOutcome::default()
            }
        );
    }

    #[test]
    fn index_routing_appends() {
        let outcome = evaluate_transforms(
            &input("monitor:///var/log/web.log", Some("access"), None),
            &[props("access", &["to_web"])],
            &[transform("to_web", "_MetaData:Index", "web")],
        );
        assert_eq!(outcome.indexes, strings(&["main", "web"]));
        assert_eq!(outcome.filters, strings(&["TRANSFORMS:to_web"]));
    }

    #[test]
    fn drop_clears_indexes() {
        let outcome = evaluate_transforms(
            &input("monitor:///var/log/debug.log", None, Some("app")),
            &[props("source::/var/log/*", &["drop_debug"])],
            &[transform("drop_debug", "queue", "nullQueue")],
        );
        assert!(outcome.indexes.is_empty());
        assert_eq!(outcome.drop_rules, strings(&["DROP:drop_debug"]));
    }

    #[test]
    fn missing_transform_is_skipped() {
        let outcome = evaluate_transforms(
            &input("udp://514", Some("syslog"), None),
            &[props("syslog", &["ghost", "to_net"])],
            &[transform("to_net", "_MetaData:Index", "network")],
        );
        assert_eq!(outcome.indexes, strings(&["main", "network"]));
    }

    #[test]
    fn sourcetype_rewrite_reevaluates_props() {
        let outcome = evaluate_transforms(
            &input("udp://514", Some("syslog"), None),
            &[
                props("syslog", &["as_cisco"]),
                props("cisco:asa", &["to_net"]),
            ],
            &[
                transform("as_cisco", "MetaData:Sourcetype", "sourcetype::cisco:asa"),
                transform("to_net", "_MetaData:Index", "network"),
            ],
        );
        // "MetaData:Sourcetype" without the underscore is not a rewrite.
        assert_eq!(outcome.indexes, strings(&["main"]));

        let outcome = evaluate_transforms(
            &input("udp://514", Some("syslog"), None),
            &[
                props("syslog", &["as_cisco"]),
                props("cisco:asa", &["to_net"]),
            ],
            &[
                transform("as_cisco", "_MetaData:Sourcetype", "sourcetype::cisco:asa"),
                transform("to_net", "_MetaData:Index", "network"),
            ],
        );
        assert_eq!(outcome.indexes, strings(&["main", "network"]));
        assert_eq!(
            outcome.filters,
            strings(&["SOURCETYPE_REWRITE:as_cisco", "TRANSFORMS:to_net"])
        );
    }

    #[test]
    fn rewrite_cycle_terminates() {
        let outcome = evaluate_transforms(
            &input("udp://514", Some("a"), None),
            &[props("a", &["to_b"]), props("b", &["to_a"])],
            &[
                transform("to_b", "_MetaData:Sourcetype", "b"),
                transform("to_a", "_MetaData:Sourcetype", "a"),
            ],
        );
        assert!(!outcome.filters.is_empty());
        assert!(outcome.filters.len() <= MAX_TRANSFORM_ITERATIONS);
        assert_eq!(outcome.indexes, strings(&["main"]));
    }

    #[test]
    fn long_rewrite_chain_stops_at_iteration_cap() {
        let names: Vec<String> = (0..16).map(|i| format!("st{i}")).collect();
        let mut stanzas = Vec::new();
        let mut rules = vec![transform("to_web", "_MetaData:Index", "web")];
        for i in 0..15 {
            let rewrite = format!("r{i}");
            let refs: Vec<&str> = if i == 0 {
                vec![rewrite.as_str(), "to_web"]
            } else {
                vec![rewrite.as_str()]
            };
            stanzas.push(props(&names[i], &refs));
            rules.push(transform(
                &rewrite,
                "_MetaData:Sourcetype",
                &format!("sourcetype::{}", names[i + 1]),
            ));
        }

        let outcome = evaluate_transforms(&input("udp://514", Some("st0"), None), &stanzas, &rules);

        let rewrites: Vec<&String> = outcome
            .filters
            .iter()
            .filter(|f| f.starts_with("SOURCETYPE_REWRITE:"))
            .collect();
        assert_eq!(rewrites.len(), MAX_TRANSFORM_ITERATIONS);
        assert_eq!(rewrites.last().map(|f| f.as_str()), Some("SOURCETYPE_REWRITE:r9"));
        assert_eq!(outcome.indexes, strings(&["main", "web"]));
        assert!(outcome.filters.contains(&"TRANSFORMS:to_web".to_string()));
    }

    #[test]
    fn source_wildcards() {
        assert!(source_matches("/var/log/*", "/var/log/messages"));
        assert!(source_matches("/var/log/messages", "/var/log/messages"));
        assert!(!source_matches("/var/log/messages", "/var/log/secure"));
        assert!(!source_matches("/opt/*", "/var/log/messages"));
    }
}
