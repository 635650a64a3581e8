use colored::Colorize;

use crate::snapshot::ParsedConfig;

/// Render a parsed snapshot: counts first, then stanza names per family.
pub fn render_parse_text(parsed: &ParsedConfig) -> String {
    let meta = &parsed.host_metadata;
    let mut out = Vec::new();
    out.push(format!(
        "snapshot job={} host={} apps={}",
        meta.job_id,
        meta.hostname.as_deref().unwrap_or("unknown"),
        meta.app_count
    ));
    out.push(
        format!(
            "counts inputs={} outputs={} props={} transforms={}",
            meta.input_count, meta.output_count, meta.props_count, meta.transforms_count
        )
        .cyan()
        .to_string(),
    );

    out.push("inputs".to_string());
    append_list(
        &mut out,
        parsed.inputs.iter().map(|input| {
            let state = if input.disabled { " (disabled)" } else { "" };
            format!("{} [{}]{state}", input.stanza_name, input.kind)
        }),
    );
    out.push("outputs".to_string());
    append_list(
        &mut out,
        parsed.outputs.iter().map(|group| {
            let default = if group.default_group { " (default)" } else { "" };
            format!("tcpout:{} servers={}{default}", group.group_name, group.servers.join(","))
        }),
    );
    out.push("props".to_string());
    append_list(&mut out, parsed.props.iter().map(|p| p.stanza_name.clone()));
    out.push("transforms".to_string());
    append_list(&mut out, parsed.transforms.iter().map(|t| t.name.clone()));

    out.join("\n")
}

/// Color the severity lines of a rendered validation report for terminal output.
pub fn colorize_findings(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.starts_with("- [error]") {
                line.red().to_string()
            } else if line.starts_with("- [warning]") {
                line.yellow().to_string()
            } else if line.starts_with("- [info]") {
                line.blue().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn append_list(out: &mut Vec<String>, items: impl Iterator<Item = String>) {
    let before = out.len();
    out.extend(items.map(|item| format!("- {item}")));
    if out.len() == before {
        out.push("- none".to_string());
    }
}
