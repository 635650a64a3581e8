//! Primary host construction and role inference.

use crate::graph::{Host, Role};
use crate::inputs::InputKind;
use crate::keywords::{match_role_keyword, RoleKeywords};
use crate::snapshot::ParsedConfig;

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_host_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `serverName` when known, otherwise `host_<job-id>`; always sanitized.
pub fn host_id(parsed: &ParsedConfig) -> String {
    let meta = &parsed.host_metadata;
    match meta.hostname.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => sanitize_host_id(name),
        None => sanitize_host_id(&format!("host_{}", meta.job_id)),
    }
}

fn is_parsing_app(lower: &str) -> bool {
    ["splunk_ta_", "sa-", "ta-"].iter().any(|p| lower.contains(p))
}

/// Role cascade over the snapshot contents, falling back to keyword hints.
pub fn infer_roles(parsed: &ParsedConfig, keywords: &[RoleKeywords], hostname: &str) -> Vec<Role> {
    let apps: Vec<String> = parsed
        .host_metadata
        .apps
        .iter()
        .map(|app| app.to_ascii_lowercase())
        .collect();
    let has_parsing_apps = apps.iter().any(|app| is_parsing_app(app));
    let has_search_apps = apps.iter().any(|app| app.contains("search"));

    let has_outputs = !parsed.outputs.is_empty();
    let has_props = !parsed.props.is_empty();
    let has_transforms = !parsed.transforms.is_empty();

    let enabled = || parsed.inputs.iter().filter(|input| !input.disabled);
    let has_splunktcp = enabled().any(|input| input.kind == InputKind::SplunkTcp);
    let has_data_inputs = enabled().any(|input| input.kind.is_data_input());
    let parses = has_parsing_apps || has_props || has_transforms;

    let mut roles = Vec::new();
    if has_splunktcp && (!has_outputs || (!has_parsing_apps && !has_props)) {
        roles.push(Role::Indexer);
    }
    if has_data_inputs && has_outputs && parses {
        roles.push(Role::HeavyForwarder);
    }
    if has_data_inputs && has_outputs && !parses && !roles.contains(&Role::HeavyForwarder) {
        roles.push(Role::UniversalForwarder);
    }
    if has_search_apps && !has_data_inputs {
        roles.push(Role::SearchHead);
    }

    if roles.is_empty() {
        if let Some(role) = match_role_keyword(keywords, hostname, &parsed.host_metadata.apps) {
            roles.push(role);
        }
    }
    if roles.is_empty() {
        roles.push(Role::Unknown);
    }
    roles
}

pub fn build_host(parsed: &ParsedConfig, keywords: &[RoleKeywords]) -> Host {
    let meta = &parsed.host_metadata;
    let id = host_id(parsed);
    let roles = infer_roles(parsed, keywords, meta.hostname.as_deref().unwrap_or(""));

    let mut labels = Vec::new();
    if let Some(env) = meta.environment.as_deref().filter(|v| !v.is_empty()) {
        labels.push(format!("env:{env}"));
    }
    if let Some(cluster) = meta.cluster.as_deref().filter(|v| !v.is_empty()) {
        labels.push(format!("cluster:{cluster}"));
    }

    Host {
        id,
        roles,
        labels,
        apps: meta.apps.clone(),
    }
}
